//! Audio Context - 可播放音频资源
//!
//! AudioResult 由会话产出后所有权转移给调用方，
//! 调用方负责通过句柄释放（类似浏览器 object URL）

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// 默认音频 MIME（服务商未给出具体子类型时）
pub const DEFAULT_AUDIO_MIME: &str = "audio/wav";

/// 音频句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(Uuid);

impl AudioHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AudioHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "audio:{}", self.0)
    }
}

/// 音频来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// 已下载/解码的音频字节
    Inline { data: Bytes, mime_type: String },
    /// 服务商给出的可访问地址
    Remote { url: String },
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct AudioResult {
    handle: AudioHandle,
    source: AudioSource,
    created_at: DateTime<Utc>,
}

impl AudioResult {
    pub fn inline(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self::with_source(AudioSource::Inline {
            data: data.into(),
            mime_type: mime_type.into(),
        })
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::with_source(AudioSource::Remote { url: url.into() })
    }

    fn with_source(source: AudioSource) -> Self {
        Self {
            handle: AudioHandle::new(),
            source,
            created_at: Utc::now(),
        }
    }

    pub fn handle(&self) -> AudioHandle {
        self.handle
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// 内联音频字节，远程地址返回 None
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.source {
            AudioSource::Inline { data, .. } => Some(data),
            AudioSource::Remote { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.source {
            AudioSource::Remote { url } => Some(url),
            AudioSource::Inline { .. } => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match &self.source {
            AudioSource::Inline { mime_type, .. } => Some(mime_type),
            AudioSource::Remote { .. } => None,
        }
    }

    /// 按 MIME 推断文件扩展名
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            Some("audio/mpeg") | Some("audio/mp3") => "mp3",
            Some("audio/ogg") => "ogg",
            Some("audio/flac") => "flac",
            _ => "wav",
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
