//! Job Submitter - 提交合成任务
//!
//! `POST /tts`，成功返回 task_id。
//! 422 且错误详情指向 voice_id 字段时归类为 VoiceRejected，由会话层决定是否重试

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use super::envelope::{string_field, unwrap_envelope};
use crate::application::error::SubmitError;
use crate::application::ports::{ProviderPort, ProviderResponse};
use crate::domain::job::{JobId, SynthesisRequest};
use crate::domain::voice::VoiceSelector;
use crate::domain::Credential;

const VOICE_FIELD: &str = "voice_id";

pub struct JobSubmitter {
    provider: Arc<dyn ProviderPort>,
}

impl JobSubmitter {
    pub fn new(provider: Arc<dyn ProviderPort>) -> Self {
        Self { provider }
    }

    /// 提交合成任务
    ///
    /// 音色选择无法解析为整数时本地失败，不发起请求
    pub async fn submit(
        &self,
        credential: &Credential,
        text: &str,
        voice: &VoiceSelector,
        language: u32,
        gender: u32,
    ) -> Result<JobId, SubmitError> {
        let voice_id = voice
            .resolve()
            .map_err(|_| SubmitError::InvalidVoiceSelector(voice.to_string()))?;
        let request = SynthesisRequest::new(text, voice_id, language, gender)
            .map_err(|_| SubmitError::EmptyText)?;

        tracing::debug!(
            voice_id = %voice_id,
            language = language,
            gender = gender,
            text_len = text.len(),
            "Submitting TTS job"
        );

        let response = self
            .provider
            .submit_tts(credential, &request)
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        if !response.is_success() {
            let err = classify_rejection(&response);
            tracing::warn!(status = %response.status, error = %err, "TTS job submission rejected");
            return Err(err);
        }

        let body = response.json_body().ok_or_else(|| {
            SubmitError::MalformedResponse("submission response is not JSON".to_string())
        })?;
        let task_id = string_field(&body, "task_id")
            .or_else(|| string_field(unwrap_envelope(&body), "task_id"))
            .ok_or_else(|| {
                SubmitError::MalformedResponse(format!("no task_id found in response: {}", body))
            })?;

        tracing::info!(task_id = %task_id, voice_id = %voice_id, "TTS job submitted");
        Ok(JobId::new(task_id))
    }
}

/// 非 2xx 响应分类
fn classify_rejection(response: &ProviderResponse) -> SubmitError {
    let body = response.json_body();

    if response.status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(detail) = body.as_ref().and_then(|b| b.get("detail")) {
            if mentions_voice_field(detail) {
                return SubmitError::VoiceRejected {
                    detail: render_detail(detail),
                };
            }
        }
    }

    let detail = match body {
        Some(body) => describe_error_body(response.status, &body),
        None => response.text(),
    };
    SubmitError::ProviderError {
        status: response.status,
        detail,
    }
}

/// 错误详情是否指向 voice_id 字段
fn mentions_voice_field(detail: &Value) -> bool {
    match detail {
        Value::Array(items) => items.iter().any(|item| match item.get("loc") {
            Some(Value::Array(loc)) => loc.iter().any(|part| part.as_str() == Some(VOICE_FIELD)),
            // 部分服务商把 loc 写成 "body.voice_id"
            Some(Value::String(loc)) => loc.contains(VOICE_FIELD),
            _ => false,
        }),
        Value::String(s) => s.contains(VOICE_FIELD),
        _ => false,
    }
}

/// `loc.a.b: msg; ...` 形式的字段级错误描述
fn render_detail(detail: &Value) -> String {
    let items = match detail {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };

    items
        .iter()
        .map(|item| {
            let path = match item.get("loc") {
                Some(Value::Array(loc)) => Some(
                    loc.iter()
                        .map(|part| match part {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join("."),
                ),
                Some(Value::String(loc)) => Some(loc.clone()),
                _ => None,
            };
            let msg = item.get("msg").and_then(|m| m.as_str());
            match (path, msg) {
                (Some(path), Some(msg)) => format!("{}: {}", path, msg),
                _ => match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_error_body(status: StatusCode, body: &Value) -> String {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(detail) = body.get("detail") {
            return render_detail(detail);
        }
    }

    for key in ["message", "error"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }
    if let Some(details) = body.get("details") {
        return details.to_string();
    }
    if let Some(detail) = body.get("detail") {
        return render_detail(detail);
    }
    body.to_string()
}
