//! Narrator - 文本转语音旁白命令行
//!
//! 用法:
//! - `narrator 要朗读的文本`
//! - `narrator --product product.json`（按商品信息生成旁白）
//!
//! 音频写入 `output.dir/{handle}.{ext}`；服务商返回远程 URL 时直接打印

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use narrator::application::SynthesisOptions;
use narrator::cli::Args;
use narrator::config::{load_config, print_config, LogConfig};
use narrator::domain::audio::AudioSource;
use narrator::infrastructure::{HttpProviderClient, InMemoryAudioRegistry};
use narrator::NarratorSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config.log);
    print_config(&config);

    let text = args.narration_text().await?;
    let api_key = config
        .provider
        .api_key
        .clone()
        .context("API key missing: set NARRATOR_PROVIDER__API_KEY or provider.api_key")?;

    let provider = Arc::new(HttpProviderClient::new(config.client_config())?);
    let registry = InMemoryAudioRegistry::new().arc();
    let session = NarratorSession::new(provider, registry, config.session_settings());

    let voice = session
        .try_initialize(&api_key, config.narrator.preferred_voice())
        .await?;
    tracing::info!(voice_id = %voice.id(), voice_name = %voice.display_name(), "Using voice");

    let result = session.synthesize(&text, SynthesisOptions::default()).await;
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            session.release().await;
            return Err(e.into());
        }
    };

    match result.source() {
        AudioSource::Inline { data, mime_type } => {
            tokio::fs::create_dir_all(&config.output.dir).await?;
            let path = config
                .output
                .dir
                .join(format!("{}.{}", result.handle().as_uuid(), result.extension()));
            tokio::fs::write(&path, data).await?;
            tracing::info!(path = %path.display(), bytes = data.len(), mime_type = %mime_type, "Audio written");
            println!("{}", path.display());
        }
        AudioSource::Remote { url } => {
            tracing::info!(url = %url, "Audio available at remote URL");
            println!("{}", url);
        }
    }

    session.release_result(&result.handle());
    session.release().await;

    Ok(())
}

fn init_logging(config: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{},narrator={}", config.level, config.level).into()
    });

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
