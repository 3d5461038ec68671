//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 服务商音色 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(i64);

impl VoiceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for VoiceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for VoiceId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| "voice id must be an integer")
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 可合成音色
///
/// 拉取后不可变，目录中按 id 去重
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    id: VoiceId,
    #[serde(rename = "voice_name", default)]
    display_name: String,
}

impl Voice {
    pub fn new(id: VoiceId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// 调用方给出的音色选择
///
/// 宿主应用的音色 ID 常来自表单等字符串来源，提交前才解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelector {
    Id(VoiceId),
    Raw(String),
}

impl VoiceSelector {
    /// 解析为数值 ID，非整数输入返回错误
    pub fn resolve(&self) -> Result<VoiceId, &'static str> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Raw(raw) => raw.parse(),
        }
    }
}

impl fmt::Display for VoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<VoiceId> for VoiceSelector {
    fn from(id: VoiceId) -> Self {
        Self::Id(id)
    }
}

impl From<i64> for VoiceSelector {
    fn from(id: i64) -> Self {
        Self::Id(VoiceId(id))
    }
}

impl From<&str> for VoiceSelector {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for VoiceSelector {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_deserializes_provider_shape() {
        let voice: Voice =
            serde_json::from_str(r#"{"id": 42, "voice_name": "Narrator A", "gender": 1}"#).unwrap();
        assert_eq!(voice.id(), VoiceId::new(42));
        assert_eq!(voice.display_name(), "Narrator A");
    }

    #[test]
    fn test_selector_resolution() {
        assert_eq!(VoiceSelector::from(7_i64).resolve(), Ok(VoiceId::new(7)));
        assert_eq!(VoiceSelector::from(" 12 ").resolve(), Ok(VoiceId::new(12)));
        assert!(VoiceSelector::from("abc").resolve().is_err());
        assert!(VoiceSelector::from("1.5").resolve().is_err());
        assert!(VoiceSelector::from("").resolve().is_err());
    }
}
