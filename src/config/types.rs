//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::services::{BusyPolicy, PollSettings, SessionSettings, VoiceRecovery};
use crate::domain::voice::VoiceId;
use crate::infrastructure::adapters::HttpProviderClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务商配置
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 会话配置
    #[serde(default)]
    pub narrator: NarratorConfig,

    /// 轮询配置
    #[serde(default)]
    pub poll: PollConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 会话参数
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            language: self.narrator.language,
            gender: self.narrator.gender,
            voice_recovery: self.narrator.voice_recovery,
            on_busy: self.narrator.on_busy,
            validation_timeout: Duration::from_secs(self.provider.validation_timeout_secs),
            poll: self.poll.settings(),
        }
    }

    /// HTTP 客户端参数
    pub fn client_config(&self) -> HttpProviderClientConfig {
        HttpProviderClientConfig::new(self.provider.base_url.clone())
            .with_timeout(self.provider.timeout_secs)
    }
}

/// 服务商配置
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// 服务商基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API 密钥，通常通过 `NARRATOR_PROVIDER__API_KEY` 提供
    #[serde(default)]
    pub api_key: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 凭证校验超时时间（秒）
    #[serde(default = "default_validation_timeout")]
    pub validation_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://client.camb.ai/apis".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_validation_timeout() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            validation_timeout_secs: default_validation_timeout(),
        }
    }
}

// 手写 Debug，避免密钥进入日志
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("validation_timeout_secs", &self.validation_timeout_secs)
            .finish()
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarratorConfig {
    /// 首选音色 ID
    #[serde(default)]
    pub preferred_voice_id: Option<i64>,

    /// 语言代码
    #[serde(default = "default_language")]
    pub language: u32,

    /// 性别代码
    #[serde(default = "default_gender")]
    pub gender: u32,

    /// 音色被拒后的恢复策略: first_in_catalog, preferred_then_first
    #[serde(default)]
    pub voice_recovery: VoiceRecovery,

    /// 会话忙时的处理方式: reject, queue
    #[serde(default)]
    pub on_busy: BusyPolicy,
}

fn default_language() -> u32 {
    1
}

fn default_gender() -> u32 {
    1
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            preferred_voice_id: None,
            language: default_language(),
            gender: default_gender(),
            voice_recovery: VoiceRecovery::default(),
            on_busy: BusyPolicy::default(),
        }
    }
}

impl NarratorConfig {
    pub fn preferred_voice(&self) -> Option<VoiceId> {
        self.preferred_voice_id.map(VoiceId::new)
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// 最大轮询次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 基础退避（毫秒），第 n 次等待 base * (n + 1)
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,

    /// 退避上限（毫秒）
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// 单次轮询出错后的等待（毫秒）
    #[serde(default = "default_error_penalty")]
    pub error_penalty_ms: u64,
}

fn default_max_attempts() -> u32 {
    15
}

fn default_base_backoff() -> u64 {
    1500
}

fn default_max_backoff() -> u64 {
    5000
}

fn default_error_penalty() -> u64 {
    2000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff(),
            max_backoff_ms: default_max_backoff(),
            error_penalty_ms: default_error_penalty(),
        }
    }
}

impl PollConfig {
    pub fn settings(&self) -> PollSettings {
        PollSettings {
            max_attempts: self.max_attempts,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            error_penalty: Duration::from_millis(self.error_penalty_ms),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 音频输出目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
