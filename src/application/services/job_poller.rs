//! Job Poller - 轮询任务状态直到终态
//!
//! 每次尝试只有一个请求在途；两次尝试之间按
//! `min(base * (attempt + 1), max)` 退避。
//! 传输/HTTP 错误不中止轮询，固定等待 error_penalty 后计入一次尝试

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::envelope::{string_field, unwrap_envelope};
use crate::application::error::PollError;
use crate::application::ports::{ProviderPort, ProviderResponse};
use crate::domain::job::{JobId, JobStatus, RunId};
use crate::domain::Credential;

/// 轮询参数
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// 最大尝试次数（即最多请求次数）
    pub max_attempts: u32,
    /// 退避基数
    pub base_backoff: Duration,
    /// 退避上限
    pub max_backoff: Duration,
    /// 请求出错后的固定等待
    pub error_penalty: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            base_backoff: Duration::from_millis(1500),
            max_backoff: Duration::from_millis(5000),
            error_penalty: Duration::from_millis(2000),
        }
    }
}

impl PollSettings {
    /// 第 attempt 次（从 0 开始）非终态响应后的等待时间
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(attempt.saturating_add(1))
            .min(self.max_backoff)
    }
}

pub struct JobPoller {
    provider: Arc<dyn ProviderPort>,
    settings: PollSettings,
}

impl JobPoller {
    pub fn new(provider: Arc<dyn ProviderPort>, settings: PollSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// 轮询直到成功（返回 run_id）、失败或尝试次数耗尽
    pub async fn poll(
        &self,
        credential: &Credential,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<RunId, PollError> {
        let max_attempts = self.settings.max_attempts;
        let mut last_rank = 0;

        for attempt in 0..max_attempts {
            tracing::debug!(
                job_id = %job_id,
                attempt = attempt + 1,
                max_attempts = max_attempts,
                "Polling TTS status"
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                outcome = self.provider.tts_status(credential, job_id) => outcome,
            };

            let wait = match outcome {
                Ok(response) if response.is_success() => match parse_status(&response) {
                    Some(JobStatus::Succeeded(run_id)) => {
                        tracing::info!(job_id = %job_id, run_id = %run_id, attempts = attempt + 1, "TTS job completed");
                        return Ok(run_id);
                    }
                    Some(JobStatus::Failed) => {
                        tracing::error!(job_id = %job_id, body = %response.text(), "TTS job failed");
                        return Err(PollError::JobFailed {
                            job_id: job_id.to_string(),
                        });
                    }
                    Some(status) => {
                        if status.rank() < last_rank {
                            tracing::warn!(job_id = %job_id, status = ?status, "TTS job status moved backwards");
                        }
                        last_rank = last_rank.max(status.rank());
                        self.settings.backoff(attempt)
                    }
                    None => {
                        tracing::warn!(job_id = %job_id, body = %response.text(), "Unreadable TTS status body");
                        self.settings.error_penalty
                    }
                },
                Ok(response) => {
                    tracing::warn!(job_id = %job_id, status = %response.status, body = %response.text(), "Failed to check TTS status");
                    self.settings.error_penalty
                }
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Error checking TTS status");
                    self.settings.error_penalty
                }
            };

            // 最后一次尝试之后不再等待
            if attempt + 1 < max_attempts {
                tracing::debug!(job_id = %job_id, wait_ms = wait.as_millis() as u64, "Waiting before next poll");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PollError::Cancelled),
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        }

        tracing::error!(job_id = %job_id, attempts = max_attempts, "Timed out waiting for TTS job");
        Err(PollError::PollTimeout {
            attempts: max_attempts,
        })
    }
}

/// 解析 `{payload: {status, run_id}}` 或扁平结构
fn parse_status(response: &ProviderResponse) -> Option<JobStatus> {
    let body = response.json_body()?;
    let payload = unwrap_envelope(&body);
    let status = string_field(payload, "status").unwrap_or_else(|| "UNKNOWN".to_string());
    let run_id = string_field(payload, "run_id");
    Some(JobStatus::from_provider(&status, run_id.as_deref()))
}
