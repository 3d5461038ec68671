//! Narrator Session - 旁白会话门面
//!
//! 组合 CredentialValidator → VoiceCatalog → JobSubmitter → JobPoller → ResultFetcher，
//! 持有会话状态（凭证、已选音色、音色缓存）直到 release。
//!
//! 并发模型:
//! - 同一会话同一时刻只有一个操作在途（single-flight gate）
//! - 状态锁从不跨网络请求持有
//! - 每个操作绑定一个取消令牌（会话令牌的子令牌 + 调用方令牌）

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio_util::sync::CancellationToken;

use super::credential_validator::CredentialValidator;
use super::job_poller::{JobPoller, PollSettings};
use super::job_submitter::JobSubmitter;
use super::result_fetcher::ResultFetcher;
use super::voice_catalog::{pick_default, VoiceCatalog};
use crate::application::error::{CatalogError, NarratorError};
use crate::application::ports::{AudioRegistryPort, ProviderPort};
use crate::domain::audio::{AudioHandle, AudioResult};
use crate::domain::voice::{Voice, VoiceId, VoiceSelector};
use crate::domain::Credential;

/// 音色被拒后重新选择音色的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceRecovery {
    /// 使用刷新后目录中的第一个音色
    #[default]
    FirstInCatalog,
    /// 初始化时的首选音色仍在目录中则用之，否则第一个
    PreferredThenFirst,
}

/// 会话忙时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// 直接返回 SessionBusy
    #[default]
    Reject,
    /// 排队等待前一个操作完成
    Queue,
}

/// 会话参数
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// 默认语言代码
    pub language: u32,
    /// 默认性别代码
    pub gender: u32,
    pub voice_recovery: VoiceRecovery,
    pub on_busy: BusyPolicy,
    /// 凭证校验超时
    pub validation_timeout: Duration,
    pub poll: PollSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            language: 1,
            gender: 1,
            voice_recovery: VoiceRecovery::default(),
            on_busy: BusyPolicy::default(),
            validation_timeout: Duration::from_secs(10),
            poll: PollSettings::default(),
        }
    }
}

/// 单次合成的可选参数
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    pub language: Option<u32>,
    pub gender: Option<u32>,
    /// 覆盖会话当前音色（仅本次）
    pub voice: Option<VoiceSelector>,
}

impl SynthesisOptions {
    pub fn with_voice(mut self, voice: impl Into<VoiceSelector>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_language(mut self, language: u32) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_gender(mut self, gender: u32) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// 已初始化会话的状态
#[derive(Debug, Clone)]
struct ActiveSession {
    credential: Credential,
    selected: Voice,
    preferred: Option<VoiceId>,
}

struct SessionState {
    active: Option<ActiveSession>,
    cancel: CancellationToken,
}

/// 旁白会话
pub struct NarratorSession {
    validator: CredentialValidator,
    catalog: VoiceCatalog,
    submitter: JobSubmitter,
    poller: JobPoller,
    fetcher: ResultFetcher,
    registry: Arc<dyn AudioRegistryPort>,
    settings: SessionSettings,
    state: RwLock<SessionState>,
    gate: Mutex<()>,
}

impl NarratorSession {
    pub fn new(
        provider: Arc<dyn ProviderPort>,
        registry: Arc<dyn AudioRegistryPort>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            validator: CredentialValidator::new(provider.clone(), settings.validation_timeout),
            catalog: VoiceCatalog::new(provider.clone()),
            submitter: JobSubmitter::new(provider.clone()),
            poller: JobPoller::new(provider.clone(), settings.poll.clone()),
            fetcher: ResultFetcher::new(provider),
            registry,
            settings,
            state: RwLock::new(SessionState {
                active: None,
                cancel: CancellationToken::new(),
            }),
            gate: Mutex::new(()),
        }
    }

    /// 初始化会话
    ///
    /// 失败原因只记录日志，返回 false；需要具体原因时用 `try_initialize`
    pub async fn initialize(&self, secret: &str, preferred: Option<VoiceId>) -> bool {
        match self.try_initialize(secret, preferred).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize narrator");
                false
            }
        }
    }

    /// 初始化会话并返回选定的音色
    ///
    /// 重新初始化会先丢弃之前的会话状态，失败后会话保持未初始化
    pub async fn try_initialize(
        &self,
        secret: &str,
        preferred: Option<VoiceId>,
    ) -> Result<Voice, NarratorError> {
        let _guard = self.acquire().await?;

        let token = {
            let mut state = self.state.write().await;
            state.active = None;
            state.cancel.clone()
        };
        self.catalog.clear().await;

        let validated = cancellable(&token, self.validator.validate(secret)).await??;
        let credential = validated.credential;

        let voices = match validated.voices {
            Some(voices) => {
                self.catalog.seed(voices.clone()).await;
                voices
            }
            None => cancellable(&token, self.catalog.fetch(&credential)).await??,
        };
        if voices.is_empty() {
            return Err(CatalogError::NoVoicesAvailable.into());
        }

        let voice = self.catalog.resolve_default(&credential, preferred).await?;

        let mut state = self.state.write().await;
        if token.is_cancelled() {
            return Err(NarratorError::Cancelled);
        }
        state.active = Some(ActiveSession {
            credential,
            selected: voice.clone(),
            preferred,
        });

        tracing::info!(
            voice_id = %voice.id(),
            voice_name = %voice.display_name(),
            voices = voices.len(),
            "Narrator initialized"
        );
        Ok(voice)
    }

    /// 合成文本，返回的 AudioResult 由调用方负责释放
    pub async fn synthesize(
        &self,
        text: &str,
        options: SynthesisOptions,
    ) -> Result<AudioResult, NarratorError> {
        self.synthesize_with_cancel(text, options, CancellationToken::new())
            .await
    }

    /// 合成文本，可由调用方令牌取消
    ///
    /// 调用方令牌已取消时直接返回，不发起任何请求
    pub async fn synthesize_with_cancel(
        &self,
        text: &str,
        options: SynthesisOptions,
        cancel: CancellationToken,
    ) -> Result<AudioResult, NarratorError> {
        if cancel.is_cancelled() {
            return Err(NarratorError::Cancelled);
        }

        // 调用方令牌与整个流程竞争（含排队等待），触发时丢弃在途 future
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Synthesis cancelled by caller");
                Err(NarratorError::Cancelled)
            }
            result = self.synthesize_gated(text, options) => result,
        }
    }

    async fn synthesize_gated(
        &self,
        text: &str,
        options: SynthesisOptions,
    ) -> Result<AudioResult, NarratorError> {
        let _guard = self.acquire().await?;

        let (active, session_token) = {
            let state = self.state.read().await;
            let active = state.active.clone().ok_or(NarratorError::NotInitialized)?;
            (active, state.cancel.clone())
        };
        let token = session_token.child_token();

        let language = options.language.unwrap_or(self.settings.language);
        let gender = options.gender.unwrap_or(self.settings.gender);
        let selector = options
            .voice
            .unwrap_or_else(|| VoiceSelector::Id(active.selected.id()));

        let first = self
            .run_pipeline(&active.credential, text, &selector, language, gender, &token, None)
            .await;

        let rejected = match first {
            Err(err) if err.is_voice_rejected() => err,
            other => return other,
        };

        tracing::warn!(error = %rejected, voice = %selector, "Voice rejected, refreshing catalog and retrying once");

        let fresh = match cancellable(&token, self.catalog.fetch(&active.credential)).await? {
            Ok(voices) => voices,
            Err(e) => {
                tracing::warn!(error = %e, "Voice catalog refresh failed during recovery");
                return Err(rejected);
            }
        };
        let preferred = match self.settings.voice_recovery {
            VoiceRecovery::FirstInCatalog => None,
            VoiceRecovery::PreferredThenFirst => active.preferred,
        };
        let Some(voice) = pick_default(&fresh, preferred) else {
            return Err(rejected);
        };

        tracing::info!(voice_id = %voice.id(), voice_name = %voice.display_name(), "Retrying with recovered voice");

        self.run_pipeline(
            &active.credential,
            text,
            &VoiceSelector::Id(voice.id()),
            language,
            gender,
            &token,
            Some(&voice),
        )
        .await
    }

    /// submit → poll → fetch
    ///
    /// `recovered` 为恢复流程选出的音色，在服务商接受提交后才写入会话状态
    async fn run_pipeline(
        &self,
        credential: &Credential,
        text: &str,
        selector: &VoiceSelector,
        language: u32,
        gender: u32,
        token: &CancellationToken,
        recovered: Option<&Voice>,
    ) -> Result<AudioResult, NarratorError> {
        let job_id = cancellable(
            token,
            self.submitter
                .submit(credential, text, selector, language, gender),
        )
        .await??;

        if let Some(voice) = recovered {
            self.commit_voice(voice, token).await?;
        }

        let run_id = self.poller.poll(credential, &job_id, token).await?;
        let result = cancellable(token, self.fetcher.fetch(credential, &run_id)).await??;

        self.registry.register(result.clone());
        Ok(result)
    }

    async fn commit_voice(
        &self,
        voice: &Voice,
        token: &CancellationToken,
    ) -> Result<(), NarratorError> {
        let mut state = self.state.write().await;
        if token.is_cancelled() {
            return Err(NarratorError::Cancelled);
        }
        if let Some(active) = state.active.as_mut() {
            active.selected = voice.clone();
            tracing::info!(voice_id = %voice.id(), "Session voice updated after recovery");
        }
        Ok(())
    }

    /// 可用音色列表（失败时为空，不抛错）
    ///
    /// 会话忙或未初始化时只返回缓存
    pub async fn list_voices(&self) -> Vec<Voice> {
        let credential = self
            .state
            .read()
            .await
            .active
            .as_ref()
            .map(|a| a.credential.clone());

        let Some(credential) = credential else {
            return self.catalog.cached().await;
        };
        match self.gate.try_lock() {
            Ok(_guard) => self.catalog.get(&credential).await,
            Err(_) => self.catalog.cached().await,
        }
    }

    /// 显式刷新音色目录
    pub async fn refresh_voices(&self) -> Result<Vec<Voice>, NarratorError> {
        let _guard = self.acquire().await?;
        let (credential, token) = {
            let state = self.state.read().await;
            let active = state.active.as_ref().ok_or(NarratorError::NotInitialized)?;
            (active.credential.clone(), state.cancel.clone())
        };
        Ok(cancellable(&token, self.catalog.fetch(&credential)).await??)
    }

    /// 切换会话音色，音色必须在当前目录中
    pub async fn set_voice(&self, voice_id: VoiceId) -> Result<Voice, NarratorError> {
        let _guard = self.acquire().await?;
        let mut state = self.state.write().await;
        let active = state.active.as_mut().ok_or(NarratorError::NotInitialized)?;
        let voice = self
            .catalog
            .find(voice_id)
            .await
            .ok_or(CatalogError::UnknownVoice(voice_id))?;
        active.selected = voice.clone();

        tracing::info!(voice_id = %voice.id(), voice_name = %voice.display_name(), "Voice selected");
        Ok(voice)
    }

    /// 当前选定的音色
    pub async fn selected_voice(&self) -> Option<Voice> {
        self.state
            .read()
            .await
            .active
            .as_ref()
            .map(|a| a.selected.clone())
    }

    pub async fn is_ready(&self) -> bool {
        self.state.read().await.active.is_some()
    }

    /// 取消在途操作，不改变会话状态
    pub async fn cancel(&self) {
        let mut state = self.state.write().await;
        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        tracing::debug!("In-flight narrator operation cancelled");
    }

    /// 结束会话：取消在途操作，清除凭证、已选音色和音色缓存
    ///
    /// 未释放的 AudioResult 不受影响
    pub async fn release(&self) {
        {
            let mut state = self.state.write().await;
            state.cancel.cancel();
            state.cancel = CancellationToken::new();
            state.active = None;
        }
        self.catalog.clear().await;
        tracing::info!(
            outstanding_results = self.registry.outstanding(),
            "Narrator session released"
        );
    }

    /// 按句柄取回音频结果
    pub fn audio(&self, handle: &AudioHandle) -> Option<AudioResult> {
        self.registry.get(handle)
    }

    /// 释放音频结果
    pub fn release_result(&self, handle: &AudioHandle) -> bool {
        self.registry.release(handle)
    }

    /// 尚未释放的音频结果数量
    pub fn outstanding_results(&self) -> usize {
        self.registry.outstanding()
    }

    async fn acquire(&self) -> Result<MutexGuard<'_, ()>, NarratorError> {
        match self.settings.on_busy {
            BusyPolicy::Reject => self.gate.try_lock().map_err(|_| NarratorError::SessionBusy),
            BusyPolicy::Queue => Ok(self.gate.lock().await),
        }
    }
}

/// 令牌取消时放弃正在进行的 future
async fn cancellable<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, NarratorError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(NarratorError::Cancelled),
        output = fut => Ok(output),
    }
}
