//! Voice Context - 音色
//!
//! 职责:
//! - 服务商音色标识与元数据
//! - 调用方音色选择的解析

mod value_objects;

pub use value_objects::{Voice, VoiceId, VoiceSelector};
