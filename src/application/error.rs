//! 应用层错误定义
//!
//! 每个组件一个错误枚举，会话层统一包装为 NarratorError

use http::StatusCode;
use thiserror::Error;

use crate::domain::voice::VoiceId;

/// 凭证校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("API key cannot be empty")]
    EmptyCredential,

    #[error("Authentication failed: invalid API key or insufficient permissions ({0})")]
    AuthRejected(StatusCode),

    #[error("Bad request: the API parameters are invalid")]
    BadRequest,

    #[error("Endpoint not found: the provider base URL may be incorrect")]
    EndpointMismatch,

    #[error("Rate limit exceeded: too many requests to the provider")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unrecognized response format from provider")]
    UnrecognizedResponse,

    #[error("Provider error ({status}): {message}")]
    UnknownProviderError { status: StatusCode, message: String },
}

/// 音色目录错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Voice listing request failed: {0}")]
    Transport(String),

    #[error("Voice listing failed with status {status}")]
    FetchFailed { status: StatusCode },

    #[error("Unexpected voice listing format: {0}")]
    FormatError(String),

    #[error("No voices available")]
    NoVoicesAvailable,

    #[error("Voice {0} is not in the catalog")]
    UnknownVoice(VoiceId),
}

/// 任务提交错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Narration text cannot be empty")]
    EmptyText,

    #[error("Invalid voice selector: {0}")]
    InvalidVoiceSelector(String),

    #[error("Provider rejected voice id: {detail}")]
    VoiceRejected { detail: String },

    #[error("Provider error ({status}): {detail}")]
    ProviderError { status: StatusCode, detail: String },

    #[error("Malformed submission response: {0}")]
    MalformedResponse(String),

    #[error("Submission request failed: {0}")]
    Transport(String),
}

/// 任务轮询错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Synthesis job {job_id} failed")]
    JobFailed { job_id: String },

    #[error("Timed out waiting for synthesis job after {attempts} attempts")]
    PollTimeout { attempts: u32 },

    #[error("Polling cancelled")]
    Cancelled,
}

/// 结果拉取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("Result fetch failed with status {status}")]
    ResultFetchFailed { status: StatusCode },

    #[error("Received empty audio body")]
    EmptyAudio,

    #[error("Failed to decode inline audio: {0}")]
    DecodeError(String),

    #[error("Unsupported result content type: {0}")]
    UnsupportedContentType(String),

    #[error("No audio data found in result")]
    NoAudioData,

    #[error("Malformed result body: {0}")]
    MalformedBody(String),

    #[error("Result request failed: {0}")]
    Transport(String),
}

/// 会话层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarratorError {
    #[error("Narrator is not initialized")]
    NotInitialized,

    #[error("Narrator session is busy")]
    SessionBusy,

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Poll(PollError),

    #[error(transparent)]
    Result(#[from] ResultError),
}

impl From<PollError> for NarratorError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Cancelled => Self::Cancelled,
            other => Self::Poll(other),
        }
    }
}

impl NarratorError {
    /// 是否为可通过刷新音色目录恢复的提交错误
    pub fn is_voice_rejected(&self) -> bool {
        matches!(self, Self::Submit(SubmitError::VoiceRejected { .. }))
    }

    /// 关联的 HTTP 状态码（如有）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Credential(CredentialError::AuthRejected(status))
            | Self::Credential(CredentialError::UnknownProviderError { status, .. })
            | Self::Catalog(CatalogError::FetchFailed { status })
            | Self::Submit(SubmitError::ProviderError { status, .. })
            | Self::Result(ResultError::ResultFetchFailed { status }) => Some(*status),
            Self::Submit(SubmitError::VoiceRejected { .. }) => {
                Some(StatusCode::UNPROCESSABLE_ENTITY)
            }
            _ => None,
        }
    }
}
