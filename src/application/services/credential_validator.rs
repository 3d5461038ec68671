//! Credential Validator - 凭证校验
//!
//! 用一次只读的音色列表请求确认密钥可用。
//! 成功时的响应可直接作为音色目录的初始数据，避免重复请求

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;

use super::envelope::{normalize_listing, Listing};
use super::voice_catalog::parse_voices;
use crate::application::error::CredentialError;
use crate::application::ports::{ProviderPort, ProviderResponse, TransportError};
use crate::domain::voice::Voice;
use crate::domain::Credential;

/// 校验通过的凭证
#[derive(Debug, Clone)]
pub struct ValidatedCredential {
    pub credential: Credential,
    /// 校验响应中携带的音色列表（可用于预填目录）
    pub voices: Option<Vec<Voice>>,
}

pub struct CredentialValidator {
    provider: Arc<dyn ProviderPort>,
    timeout: Duration,
}

impl CredentialValidator {
    pub fn new(provider: Arc<dyn ProviderPort>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// 校验凭证
    ///
    /// 空白凭证直接失败，不发起网络请求
    pub async fn validate(&self, secret: &str) -> Result<ValidatedCredential, CredentialError> {
        let credential = Credential::new(secret).map_err(|_| CredentialError::EmptyCredential)?;

        tracing::debug!(timeout_ms = self.timeout.as_millis() as u64, "Validating API key");

        let response = tokio::time::timeout(self.timeout, self.provider.list_voices(&credential))
            .await
            .map_err(|_| {
                CredentialError::NetworkError(
                    "connection timeout: the provider took too long to respond".to_string(),
                )
            })?
            .map_err(|e| match e {
                TransportError::Timeout => CredentialError::NetworkError(
                    "connection timeout: the provider took too long to respond".to_string(),
                ),
                TransportError::Network(msg) => CredentialError::NetworkError(msg),
            })?;

        let voices = classify(&response)?;
        tracing::info!(
            status = %response.status,
            seeded_voices = voices.as_ref().map(|v| v.len()),
            "API key validated"
        );

        Ok(ValidatedCredential { credential, voices })
    }
}

/// 按状态码与响应形状分类
fn classify(response: &ProviderResponse) -> Result<Option<Vec<Voice>>, CredentialError> {
    let status = response.status;

    if status.is_success() {
        let body = response
            .json_body()
            .ok_or(CredentialError::UnrecognizedResponse)?;
        return match normalize_listing(&body) {
            Listing::Recognized(items) => Ok(parse_voices(items).ok()),
            Listing::Unrecognized if body.get("status_code").and_then(|c| c.as_u64()) == Some(200) => {
                Ok(None)
            }
            Listing::Unrecognized => {
                tracing::warn!(body = %body, "Unexpected validation response format");
                Err(CredentialError::UnrecognizedResponse)
            }
        };
    }

    tracing::warn!(status = %status, "API key rejected by provider");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CredentialError::AuthRejected(status),
        StatusCode::BAD_REQUEST => CredentialError::BadRequest,
        StatusCode::NOT_FOUND => CredentialError::EndpointMismatch,
        StatusCode::TOO_MANY_REQUESTS => CredentialError::RateLimited,
        _ => CredentialError::UnknownProviderError {
            status,
            message: response
                .json_body()
                .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| response.text()),
        },
    })
}
