//! Voice Catalog - 音色目录与缓存
//!
//! 缓存只在显式刷新或音色恢复时重新拉取，会话内不主动过期

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::envelope::{normalize_listing, Listing};
use crate::application::error::CatalogError;
use crate::application::ports::ProviderPort;
use crate::domain::voice::{Voice, VoiceId};
use crate::domain::Credential;

/// 解析音色列表，按 id 去重并保留首次出现的顺序
pub fn parse_voices(items: Vec<Value>) -> Result<Vec<Voice>, CatalogError> {
    let mut seen = HashSet::new();
    let mut voices = Vec::with_capacity(items.len());

    for item in items {
        let voice: Voice = serde_json::from_value(item)
            .map_err(|e| CatalogError::FormatError(format!("invalid voice entry: {}", e)))?;
        if seen.insert(voice.id()) {
            voices.push(voice);
        }
    }

    Ok(voices)
}

/// 选出默认音色：首选 ID 存在则用之，否则取第一个
pub fn pick_default(voices: &[Voice], preferred: Option<VoiceId>) -> Option<Voice> {
    preferred
        .and_then(|id| voices.iter().find(|v| v.id() == id))
        .or_else(|| voices.first())
        .cloned()
}

pub struct VoiceCatalog {
    provider: Arc<dyn ProviderPort>,
    cache: RwLock<Vec<Voice>>,
}

impl VoiceCatalog {
    pub fn new(provider: Arc<dyn ProviderPort>) -> Self {
        Self {
            provider,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// 从服务商拉取音色列表并写入缓存
    ///
    /// 空列表同样写入缓存，但返回 NoVoicesAvailable
    pub async fn fetch(&self, credential: &Credential) -> Result<Vec<Voice>, CatalogError> {
        tracing::debug!("Fetching available voices");

        let response = self
            .provider
            .list_voices(credential)
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        if !response.is_success() {
            tracing::warn!(status = %response.status, body = %response.text(), "Failed to fetch voices");
            return Err(CatalogError::FetchFailed {
                status: response.status,
            });
        }

        let body = response
            .json_body()
            .ok_or_else(|| CatalogError::FormatError("response body is not JSON".to_string()))?;

        let items = match normalize_listing(&body) {
            Listing::Recognized(items) => items,
            Listing::Unrecognized => {
                return Err(CatalogError::FormatError(
                    "expected a voice array or a payload envelope".to_string(),
                ))
            }
        };

        let voices = parse_voices(items)?;
        self.seed(voices.clone()).await;

        tracing::info!(count = voices.len(), "Fetched voices");

        if voices.is_empty() {
            return Err(CatalogError::NoVoicesAvailable);
        }
        Ok(voices)
    }

    /// 用已解析的列表填充缓存
    pub async fn seed(&self, voices: Vec<Voice>) {
        *self.cache.write().await = voices;
    }

    /// 惰性读取：缓存非空时直接返回，否则拉取；拉取失败返回空列表
    pub async fn get(&self, credential: &Credential) -> Vec<Voice> {
        let cached = self.cached().await;
        if !cached.is_empty() {
            return cached;
        }

        match self.fetch(credential).await {
            Ok(voices) => voices,
            Err(e) => {
                tracing::warn!(error = %e, "Voice catalog unavailable");
                Vec::new()
            }
        }
    }

    /// 当前缓存（不发起请求）
    pub async fn cached(&self) -> Vec<Voice> {
        self.cache.read().await.clone()
    }

    /// 在缓存中查找音色
    pub async fn find(&self, id: VoiceId) -> Option<Voice> {
        self.cache.read().await.iter().find(|v| v.id() == id).cloned()
    }

    /// 解析默认音色
    pub async fn resolve_default(
        &self,
        credential: &Credential,
        preferred: Option<VoiceId>,
    ) -> Result<Voice, CatalogError> {
        let voices = self.get(credential).await;
        let voice = pick_default(&voices, preferred).ok_or(CatalogError::NoVoicesAvailable)?;

        match preferred {
            Some(id) if id != voice.id() => tracing::info!(
                preferred = %id,
                voice_id = %voice.id(),
                voice_name = %voice.display_name(),
                "Preferred voice not found, using first available voice"
            ),
            _ => tracing::debug!(voice_id = %voice.id(), voice_name = %voice.display_name(), "Resolved voice"),
        }

        Ok(voice)
    }

    /// 清空缓存
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
