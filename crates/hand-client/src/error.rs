//! 客户端错误类型

use crate::gesture::GestureError;
use hand_driver::DriverError;
use hand_protocol::ProtocolError;
use thiserror::Error;

/// 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 协议错误（非法 ID、非法寄存器）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 手势库错误
    #[error("Gesture error: {0}")]
    Gesture(#[from] GestureError),

    /// 位置表所有者线程已退出
    #[error("Actuator control stopped")]
    ControlStopped,

    /// 线程创建或运行失败
    #[error("Thread error: {0}")]
    Thread(String),
}

/// 客户端结果类型
pub type Result<T> = std::result::Result<T, ClientError>;
