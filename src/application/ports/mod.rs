//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_registry;
mod provider;

pub use audio_registry::AudioRegistryPort;
pub use provider::{ProviderPort, ProviderResponse, TransportError};
