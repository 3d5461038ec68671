//! Job Context - 任务状态机
//!
//! Pending -> Processing -> {Succeeded(run_id) | Failed}
//! Succeeded 与 Failed 为终态

use super::RunId;

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Succeeded(RunId),
    Failed,
}

impl JobStatus {
    /// 从服务商返回的状态字符串构造
    ///
    /// 未知状态、以及缺少 run_id 的 SUCCESS 都视为 Processing，继续轮询
    pub fn from_provider(status: &str, run_id: Option<&str>) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PROCESSING" => Self::Processing,
            "SUCCESS" => match run_id.filter(|id| !id.is_empty()) {
                Some(id) => Self::Succeeded(RunId::new(id)),
                None => Self::Processing,
            },
            "FAILED" | "ERROR" => Self::Failed,
            _ => Self::Processing,
        }
    }

    /// 状态在状态机中的位置，只允许前进
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Succeeded(_) | Self::Failed => 2,
        }
    }
}
