//! # Hand Serial Adapter Layer
//!
//! 串口硬件抽象层，提供统一的半双工串口接口。
//!
//! - [`SerialAdapter`]: 适配器 trait，上层只通过它访问线路
//! - [`SerialPortAdapter`]: 基于 `serialport` 的真实串口实现
//! - `mock::MockSerialAdapter`: 无硬件的脚本化模拟（`mock` feature）

use std::time::Duration;
use thiserror::Error;

mod port;

pub use port::SerialPortAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// 串口适配层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("Read timeout")]
    Timeout,
    #[error("Write timeout")]
    WriteTimeout,
    #[error("Port disconnected")]
    Disconnected,
}

impl SerialError {
    /// 是否为超时（读或写）
    pub fn is_timeout(&self) -> bool {
        matches!(self, SerialError::Timeout | SerialError::WriteTimeout)
    }
}

/// 串口适配器
///
/// 所有读写都受超时约束；读取在截止时间前没有收到任何字节时返回
/// [`SerialError::Timeout`]。
pub trait SerialAdapter: Send {
    /// 写入全部字节
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// 读取最多 `max` 字节
    ///
    /// 在收满 `max` 字节或读超时到期时返回，超时前收到的部分数据会正常返回。
    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, SerialError>;

    /// 读取当前输入缓冲区中的全部字节（可能为空）
    fn read_available(&mut self) -> Result<Vec<u8>, SerialError>;

    /// 丢弃输入缓冲区中的残留数据
    fn clear_input(&mut self) -> Result<(), SerialError>;

    /// 设置读写超时
    fn set_timeouts(&mut self, _read: Duration, _write: Duration) -> Result<(), SerialError> {
        Ok(())
    }
}

impl<T: SerialAdapter + ?Sized> SerialAdapter for Box<T> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        (**self).write_all(bytes)
    }

    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, SerialError> {
        (**self).read_up_to(max)
    }

    fn read_available(&mut self) -> Result<Vec<u8>, SerialError> {
        (**self).read_available()
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        (**self).clear_input()
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> Result<(), SerialError> {
        (**self).set_timeouts(read, write)
    }
}
