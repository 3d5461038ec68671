//! Provider Adapter - HTTP 服务商客户端实现

mod http_provider_client;

pub use http_provider_client::*;
