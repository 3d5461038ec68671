//! Job Context - 合成任务
//!
//! 职责:
//! - 合成请求构造
//! - 任务/运行标识
//! - 任务状态机

mod status;
mod value_objects;

pub use status::JobStatus;
pub use value_objects::{JobId, RunId, SynthesisRequest};
