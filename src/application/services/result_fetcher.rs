//! Result Fetcher - 拉取并归一化合成结果
//!
//! 按 Content-Type 分派:
//! - audio/* 或 application/octet-stream: 原始音频字节
//! - application/json: `url` 地址，或 base64 内联音频
//! - 其他: 不支持

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;

use super::envelope::unwrap_envelope;
use crate::application::error::ResultError;
use crate::application::ports::{ProviderPort, ProviderResponse};
use crate::domain::audio::{AudioResult, DEFAULT_AUDIO_MIME};
use crate::domain::job::RunId;
use crate::domain::Credential;

/// 内联音频可能出现的字段名（按优先级）
const INLINE_AUDIO_FIELDS: &[&str] = &["audio_content", "audio", "data"];

/// 标准字母表，解码时补齐与否都接受
const INLINE_AUDIO_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub struct ResultFetcher {
    provider: Arc<dyn ProviderPort>,
}

impl ResultFetcher {
    pub fn new(provider: Arc<dyn ProviderPort>) -> Self {
        Self { provider }
    }

    pub async fn fetch(
        &self,
        credential: &Credential,
        run_id: &RunId,
    ) -> Result<AudioResult, ResultError> {
        tracing::debug!(run_id = %run_id, "Fetching TTS result");

        let response = self
            .provider
            .tts_result(credential, run_id)
            .await
            .map_err(|e| ResultError::Transport(e.to_string()))?;

        if !response.is_success() {
            tracing::error!(run_id = %run_id, status = %response.status, body = %response.text(), "Failed to get TTS result");
            return Err(ResultError::ResultFetchFailed {
                status: response.status,
            });
        }

        let result = decode_result(&response)?;
        tracing::info!(
            run_id = %run_id,
            handle = %result.handle(),
            mime_type = ?result.mime_type(),
            bytes = result.bytes().map(|b| b.len()),
            remote = result.url().is_some(),
            "TTS result ready"
        );
        Ok(result)
    }
}

/// 把 2xx 响应归一化为 AudioResult
pub fn decode_result(response: &ProviderResponse) -> Result<AudioResult, ResultError> {
    let raw_type = response.content_type.clone().unwrap_or_default();
    let essence = raw_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("audio/") || essence == "application/octet-stream" {
        if response.body.is_empty() {
            return Err(ResultError::EmptyAudio);
        }
        let mime_type = if essence.starts_with("audio/") {
            essence
        } else {
            DEFAULT_AUDIO_MIME.to_string()
        };
        return Ok(AudioResult::inline(response.body.clone(), mime_type));
    }

    if essence == "application/json" {
        let body: Value = serde_json::from_slice(&response.body)
            .map_err(|e| ResultError::MalformedBody(e.to_string()))?;
        return decode_json_result(&body);
    }

    Err(ResultError::UnsupportedContentType(raw_type))
}

fn decode_json_result(body: &Value) -> Result<AudioResult, ResultError> {
    let payload = unwrap_envelope(body);

    if let Some(url) = payload.get("url").and_then(|u| u.as_str()).filter(|u| !u.is_empty()) {
        return Ok(AudioResult::remote(url));
    }

    let encoded = INLINE_AUDIO_FIELDS
        .iter()
        .find_map(|field| payload.get(*field).and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
        .ok_or(ResultError::NoAudioData)?;

    // 允许换行等空白（部分服务商按 76 列折行）
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let audio = INLINE_AUDIO_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| ResultError::DecodeError(e.to_string()))?;

    if audio.is_empty() {
        return Err(ResultError::EmptyAudio);
    }
    Ok(AudioResult::inline(audio, DEFAULT_AUDIO_MIME))
}
