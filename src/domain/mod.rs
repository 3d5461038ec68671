//! Domain Layer - 领域层
//!
//! 包含:
//! - Voice Context: 服务商音色
//! - Job Context: 合成请求与任务状态机
//! - Audio Context: 可播放音频结果
//! - Credential: 会话凭证
//! - 商品旁白文本

pub mod audio;
pub mod job;
pub mod voice;

mod credential;
mod narration;

pub use credential::Credential;
pub use narration::ProductNarration;
