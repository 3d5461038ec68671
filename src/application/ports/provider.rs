//! Provider Port - TTS 服务商 HTTP 接口抽象
//!
//! 只负责传输，状态码/信封/内容类型的解释在 application/services 中完成

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

use crate::domain::job::{JobId, RunId, SynthesisRequest};
use crate::domain::Credential;

/// 传输层错误（未拿到 HTTP 响应）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),
}

/// 服务商原始响应
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: StatusCode,
    /// Content-Type 头（原样）
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ProviderResponse {
    pub fn new(status: StatusCode, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 尝试把 body 解析为 JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// body 的文本形式（错误详情用）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Provider Port
///
/// 四个服务商端点，每个请求都附带凭证头
#[async_trait]
pub trait ProviderPort: Send + Sync {
    /// GET /list-voices
    async fn list_voices(&self, credential: &Credential)
        -> Result<ProviderResponse, TransportError>;

    /// POST /tts
    async fn submit_tts(
        &self,
        credential: &Credential,
        request: &SynthesisRequest,
    ) -> Result<ProviderResponse, TransportError>;

    /// GET /tts/{task_id}
    async fn tts_status(
        &self,
        credential: &Credential,
        job_id: &JobId,
    ) -> Result<ProviderResponse, TransportError>;

    /// GET /tts-result/{run_id}
    async fn tts_result(
        &self,
        credential: &Credential,
        run_id: &RunId,
    ) -> Result<ProviderResponse, TransportError>;
}
