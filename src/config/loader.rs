//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（narrator.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["narrator", "narrator.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NARRATOR_`，层级分隔符 `__`）
/// 2. 配置文件（narrator.toml 或 narrator.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NARRATOR_PROVIDER__API_KEY=...`
/// - `NARRATOR_PROVIDER__BASE_URL=https://client.camb.ai/apis`
/// - `NARRATOR_NARRATOR__ON_BUSY=queue`
/// - `NARRATOR_POLL__MAX_ATTEMPTS=20`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("provider.base_url", "https://client.camb.ai/apis")?
        .set_default("provider.timeout_secs", 30)?
        .set_default("provider.validation_timeout_secs", 10)?
        .set_default("narrator.language", 1)?
        .set_default("narrator.gender", 1)?
        .set_default("narrator.voice_recovery", "first_in_catalog")?
        .set_default("narrator.on_busy", "reject")?
        .set_default("poll.max_attempts", 15)?
        .set_default("poll.base_backoff_ms", 1500)?
        .set_default("poll.max_backoff_ms", 5000)?
        .set_default("poll.error_penalty_ms", 2000)?
        .set_default("output.dir", "out")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: NARRATOR_PROVIDER__API_KEY=xxx
    builder = builder.add_source(
        Environment::with_prefix("NARRATOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Provider base URL cannot be empty".to_string(),
        ));
    }

    if config.provider.timeout_secs == 0 || config.provider.validation_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Provider timeouts cannot be 0".to_string(),
        ));
    }

    if config.poll.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Poll max_attempts must be at least 1".to_string(),
        ));
    }

    if config.poll.base_backoff_ms > config.poll.max_backoff_ms {
        return Err(ConfigError::ValidationError(format!(
            "Poll base_backoff_ms ({}) exceeds max_backoff_ms ({})",
            config.poll.base_backoff_ms, config.poll.max_backoff_ms
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Narrator Configuration ===");
    tracing::info!("Provider URL: {}", config.provider.base_url);
    tracing::info!(
        "API Key: {}",
        if config.provider.api_key.is_some() {
            "***"
        } else {
            "<not set>"
        }
    );
    tracing::info!("Request Timeout: {}s", config.provider.timeout_secs);
    tracing::info!("Validation Timeout: {}s", config.provider.validation_timeout_secs);
    if let Some(voice) = config.narrator.preferred_voice_id {
        tracing::info!("Preferred Voice: {}", voice);
    }
    tracing::info!(
        "Language/Gender: {}/{}",
        config.narrator.language,
        config.narrator.gender
    );
    tracing::info!("Voice Recovery: {:?}", config.narrator.voice_recovery);
    tracing::info!("On Busy: {:?}", config.narrator.on_busy);
    tracing::info!(
        "Polling: {} attempts, {}ms..{}ms backoff, {}ms error penalty",
        config.poll.max_attempts,
        config.poll.base_backoff_ms,
        config.poll.max_backoff_ms,
        config.poll.error_penalty_ms
    );
    tracing::info!("Output Directory: {:?}", config.output.dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("==============================");
}
