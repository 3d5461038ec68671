//! Job Context - Value Objects

use serde::Serialize;
use std::fmt;

use crate::domain::voice::VoiceId;

/// 合成任务 ID（用于轮询状态）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 运行 ID（用于拉取已完成任务的结果，与 JobId 不同）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 合成请求
///
/// 每次调用构造，不保留。序列化结果即 `POST /tts` 的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisRequest {
    text: String,
    voice_id: VoiceId,
    language: u32,
    gender: u32,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice_id: VoiceId,
        language: u32,
        gender: u32,
    ) -> Result<Self, &'static str> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("narration text cannot be empty");
        }
        Ok(Self {
            text,
            voice_id,
            language,
            gender,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> VoiceId {
        self.voice_id
    }

    pub fn language(&self) -> u32 {
        self.language
    }

    pub fn gender(&self) -> u32 {
        self.gender
    }
}
