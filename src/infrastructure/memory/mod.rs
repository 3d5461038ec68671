//! Memory Layer - In-Memory State Management
//!
//! 实现 AudioRegistry，管理调用方持有的音频结果

mod audio_registry;

pub use audio_registry::InMemoryAudioRegistry;
