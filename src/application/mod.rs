//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Provider、AudioRegistry）
//! - services: 凭证校验、音色目录、任务提交/轮询、结果拉取及会话门面
//! - error: 应用层错误定义

pub mod error;
pub mod ports;
pub mod services;

pub use error::{CatalogError, CredentialError, NarratorError, PollError, ResultError, SubmitError};

pub use ports::{AudioRegistryPort, ProviderPort, ProviderResponse, TransportError};

pub use services::{
    BusyPolicy, CredentialValidator, JobPoller, JobSubmitter, NarratorSession, PollSettings,
    ResultFetcher, SessionSettings, SynthesisOptions, ValidatedCredential, VoiceCatalog,
    VoiceRecovery,
};
