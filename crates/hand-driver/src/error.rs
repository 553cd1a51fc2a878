//! 驱动层错误类型定义

use hand_protocol::{FrameError, ProtocolError};
use hand_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口适配器错误（超时以外的传输失败）
    #[error("Serial transport error: {0}")]
    Serial(#[from] SerialError),

    /// 协议错误（非法寄存器、非法 ID、数据过长）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 响应帧解析错误
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// 后台线程错误
    #[error("IO thread error: {0}")]
    IoThread(String),

    /// 无效输入（如未指定串口）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
