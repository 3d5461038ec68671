//! Audio Registry Port - 未释放音频结果的登记
//!
//! 每个产出的 AudioResult 在调用方显式释放前都保留在登记表中

use crate::domain::audio::{AudioHandle, AudioResult};

/// Audio Registry Port
pub trait AudioRegistryPort: Send + Sync {
    /// 登记一个新结果
    fn register(&self, result: AudioResult);

    /// 按句柄获取结果
    fn get(&self, handle: &AudioHandle) -> Option<AudioResult>;

    /// 释放结果，句柄不存在时返回 false
    fn release(&self, handle: &AudioHandle) -> bool;

    /// 未释放结果数量
    fn outstanding(&self) -> usize;
}
