//! In-Memory Audio Registry Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::AudioRegistryPort;
use crate::domain::audio::{AudioHandle, AudioResult};

/// 内存音频结果登记表
pub struct InMemoryAudioRegistry {
    results: DashMap<AudioHandle, AudioResult>,
}

impl InMemoryAudioRegistry {
    pub fn new() -> Self {
        Self {
            results: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryAudioRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRegistryPort for InMemoryAudioRegistry {
    fn register(&self, result: AudioResult) {
        let handle = result.handle();
        self.results.insert(handle, result);
        tracing::debug!(handle = %handle, outstanding = self.results.len(), "Audio result registered");
    }

    fn get(&self, handle: &AudioHandle) -> Option<AudioResult> {
        self.results.get(handle).map(|r| r.clone())
    }

    fn release(&self, handle: &AudioHandle) -> bool {
        match self.results.remove(handle) {
            Some((_, result)) => {
                let held_ms = (Utc::now() - result.created_at()).num_milliseconds();
                tracing::debug!(handle = %handle, held_ms = held_ms, "Audio result released");
                true
            }
            None => {
                tracing::warn!(handle = %handle, "Release of unknown audio handle");
                false
            }
        }
    }

    fn outstanding(&self) -> usize {
        self.results.len()
    }
}
