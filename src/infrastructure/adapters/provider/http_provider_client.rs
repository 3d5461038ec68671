//! HTTP Provider Client - 调用 TTS 服务商 HTTP 接口
//!
//! 实现 ProviderPort trait，每个请求附带 `x-api-key` 头
//!
//! 服务商 API:
//! GET  {base}/list-voices
//! POST {base}/tts                 Request: {"text", "voice_id", "language", "gender"} (JSON)
//! GET  {base}/tts/{task_id}       Response: {"status", "run_id"?}
//! GET  {base}/tts-result/{run_id} Response: 音频二进制或 JSON

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::application::ports::{ProviderPort, ProviderResponse, TransportError};
use crate::domain::job::{JobId, RunId, SynthesisRequest};
use crate::domain::Credential;

/// 凭证请求头
pub const API_KEY_HEADER: &str = "x-api-key";

const JSON_ACCEPT: &str = "application/json";
const RESULT_ACCEPT: &str = "audio/wav, audio/mpeg, audio/mp3, audio/*, application/json";

/// HTTP Provider 客户端配置
#[derive(Debug, Clone)]
pub struct HttpProviderClientConfig {
    /// 服务商基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpProviderClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://client.camb.ai/apis".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpProviderClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Provider 客户端
pub struct HttpProviderClient {
    client: Client,
    base_url: String,
}

impl HttpProviderClient {
    /// 创建新的 HTTP Provider 客户端
    pub fn new(config: HttpProviderClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        credential: &Credential,
        accept: &str,
    ) -> Result<ProviderResponse, TransportError> {
        let response = request
            .header(API_KEY_HEADER, credential.expose())
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(
            status = %status,
            content_type = ?content_type,
            body_len = body.len(),
            "Provider response received"
        );

        Ok(ProviderResponse::new(status, content_type, body))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Network(format!("Cannot connect to provider: {}", e))
    } else {
        TransportError::Network(e.to_string())
    }
}

#[async_trait]
impl ProviderPort for HttpProviderClient {
    async fn list_voices(
        &self,
        credential: &Credential,
    ) -> Result<ProviderResponse, TransportError> {
        let url = self.url("/list-voices");
        tracing::debug!(url = %url, "Listing provider voices");
        self.send(self.client.get(&url), credential, JSON_ACCEPT).await
    }

    async fn submit_tts(
        &self,
        credential: &Credential,
        request: &SynthesisRequest,
    ) -> Result<ProviderResponse, TransportError> {
        let url = self.url("/tts");
        tracing::debug!(
            url = %url,
            text_len = request.text().len(),
            voice_id = %request.voice_id(),
            "Submitting TTS job"
        );
        self.send(self.client.post(&url).json(request), credential, JSON_ACCEPT)
            .await
    }

    async fn tts_status(
        &self,
        credential: &Credential,
        job_id: &JobId,
    ) -> Result<ProviderResponse, TransportError> {
        let url = self.url(&format!("/tts/{}", job_id.as_str()));
        self.send(self.client.get(&url), credential, JSON_ACCEPT).await
    }

    async fn tts_result(
        &self,
        credential: &Credential,
        run_id: &RunId,
    ) -> Result<ProviderResponse, TransportError> {
        let url = self.url(&format!("/tts-result/{}", run_id.as_str()));
        tracing::debug!(url = %url, "Fetching TTS result");
        self.send(self.client.get(&url), credential, RESULT_ACCEPT).await
    }
}
