//! 状态查询失败类型

use hand_protocol::{ActuatorId, FrameError};
use thiserror::Error;

/// 状态查询失败的原因（仅用于诊断）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnavailableCause {
    /// 设备未在超时内应答
    #[error("no response before timeout")]
    Timeout,
    /// 应答帧过短、帧头错误或校验和错误
    #[error("{0}")]
    Frame(#[from] FrameError),
    /// 串口传输失败
    #[error("transport failure: {0}")]
    Transport(String),
}

/// 执行器状态不可用
///
/// 超时、应答过短、校验和错误统一表示为"不可用"，调用方无需区分；
/// 具体原因保存在 `cause` 中。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Status unavailable for actuator {id}: {cause}")]
pub struct StatusUnavailable {
    pub id: ActuatorId,
    pub cause: UnavailableCause,
}

impl StatusUnavailable {
    pub fn new(id: ActuatorId, cause: impl Into<UnavailableCause>) -> Self {
        Self {
            id,
            cause: cause.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.cause == UnavailableCause::Timeout
    }

    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(&self.cause, UnavailableCause::Frame(e) if e.is_checksum_mismatch())
    }
}
