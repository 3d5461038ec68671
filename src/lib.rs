//! Narrator - 异步文本转语音旁白客户端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice: 音色与音色选择器
//! - Job: 合成请求、任务/运行标识、任务状态
//! - Audio: 调用方持有的音频结果
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Provider, AudioRegistry）
//! - Services: CredentialValidator, VoiceCatalog, JobSubmitter, JobPoller, ResultFetcher
//! - NarratorSession: 组合以上组件的会话门面
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 基于 reqwest 的 HTTP Provider 客户端
//! - Memory: AudioRegistry 内存实现
//!
//! 命令行 (cli.rs): clap 参数定义

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{NarratorError, NarratorSession, SynthesisOptions};
pub use config::{load_config, AppConfig};
