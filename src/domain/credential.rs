//! Credential - 服务商 API 密钥
//!
//! 不透明字符串，只在会话内存中持有，Debug 输出永远脱敏

use std::fmt;

/// API 凭证
///
/// 不变量:
/// - 去除首尾空白后非空
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Result<Self, &'static str> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err("API key cannot be empty");
        }
        Ok(Self(secret))
    }

    /// 原始密钥，仅用于写入请求头
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
