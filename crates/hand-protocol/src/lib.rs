//! # Hand Protocol
//!
//! 灵巧手串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（帧头、指令码、行程范围）
//! - `ids`: 执行器 ID 与位置类型
//! - `register`: 控制表寄存器映射
//! - `frame`: 请求帧构建与校验和
//! - `status`: 响应帧解析（状态查询、寄存器读取）
//!
//! ## 帧格式
//!
//! ```text
//! 请求: 55 AA LEN ID CMD [PAYLOAD...] CHK
//! 响应: AA 55 LEN ID CMD [PAYLOAD...] CHK
//! CHK = sum(bytes[2..]) & 0xFF
//! ```
//!
//! ## 字节序
//!
//! 协议中的多字节数值使用小端字节序（低字节在前）。

pub mod constants;
pub mod frame;
pub mod ids;
pub mod register;
pub mod status;

// 重新导出常用类型
pub use constants::*;
pub use frame::*;
pub use ids::*;
pub use register::*;
pub use status::*;

use thiserror::Error;

/// 帧解析错误类型
///
/// 每一种结构或校验失败都对应独立的变体，调用方可以据此区分
/// "校验和错误" 与 "帧结构错误"，但绝不会得到部分解析的数据。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid frame header: {found:02X?}")]
    InvalidHeader { found: [u8; 2] },

    #[error("Checksum mismatch: computed 0x{computed:02X}, received 0x{received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },

    #[error("Truncated frame: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Invalid length byte: {0}")]
    InvalidLengthByte(u8),

    #[error("Register count mismatch: requested {requested}, device reported {reported}")]
    CountMismatch { requested: u8, reported: usize },

    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),
}

impl FrameError {
    /// 是否为校验和错误（其余变体均视为帧结构错误）
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, FrameError::ChecksumMismatch { .. })
    }

    /// 是否为帧结构错误
    pub fn is_malformed(&self) -> bool {
        !self.is_checksum_mismatch()
    }
}

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Invalid register: {0}")]
    InvalidRegister(String),

    #[error("Invalid actuator id: {0} (expected 1..={max})", max = ACTUATOR_COUNT)]
    InvalidActuatorId(u8),

    #[error("Position {0} out of range [{min}, {max}]", min = MIN_POS, max = MAX_POS)]
    PositionOutOfRange(u16),

    #[error("Payload too large: max {max} bytes, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },
}
