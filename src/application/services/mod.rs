//! Application Services - 合成流程各组件与会话门面

mod credential_validator;
mod envelope;
mod job_poller;
mod job_submitter;
mod narrator_session;
mod result_fetcher;
mod voice_catalog;

#[cfg(test)]
pub(crate) mod test_support;

pub use credential_validator::{CredentialValidator, ValidatedCredential};
pub use job_poller::{JobPoller, PollSettings};
pub use job_submitter::JobSubmitter;
pub use narrator_session::{
    BusyPolicy, NarratorSession, SessionSettings, SynthesisOptions, VoiceRecovery,
};
pub use result_fetcher::{decode_result, ResultFetcher};
pub use voice_catalog::{parse_voices, pick_default, VoiceCatalog};
