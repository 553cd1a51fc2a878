//! 执行器 ID 与行程位置类型
//!
//! 使用 newtype 保证 ID 与位置在构造时即合法，避免在协议层之外再做范围检查。

use crate::ProtocolError;
use crate::constants::{ACTUATOR_COUNT, MAX_POS, MIN_POS};
use std::fmt;

/// 执行器 ID（合法范围 1-5）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct ActuatorId(u8);

impl ActuatorId {
    /// 创建执行器 ID
    ///
    /// # 错误
    ///
    /// `id` 不在 1-5 之间时返回 `ProtocolError::InvalidActuatorId`。
    pub fn new(id: u8) -> Result<Self, ProtocolError> {
        if (1..=ACTUATOR_COUNT as u8).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ProtocolError::InvalidActuatorId(id))
        }
    }

    /// 从 0 起始的索引构造（0 → ID 1）
    pub fn from_index(index: usize) -> Option<Self> {
        if index < ACTUATOR_COUNT {
            Some(Self(index as u8 + 1))
        } else {
            None
        }
    }

    /// 线上使用的 ID 字节
    pub fn get(self) -> u8 {
        self.0
    }

    /// 0 起始的索引（用于位置表）
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// 按 ID 升序遍历全部执行器
    pub fn all() -> impl DoubleEndedIterator<Item = ActuatorId> + ExactSizeIterator {
        (1..=ACTUATOR_COUNT as u8).map(ActuatorId)
    }
}

impl TryFrom<u8> for ActuatorId {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ActuatorId> for u8 {
    fn from(id: ActuatorId) -> Self {
        id.0
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 执行器目标行程（单位：设备行程刻度）
///
/// 永远处于 `[MIN_POS, MAX_POS]` 区间内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct Position(u16);

impl Position {
    /// 完全收回
    pub const MIN: Position = Position(MIN_POS);
    /// 完全伸出
    pub const MAX: Position = Position(MAX_POS);

    /// 创建位置（严格检查范围）
    pub fn new(ticks: u16) -> Result<Self, ProtocolError> {
        if (MIN_POS..=MAX_POS).contains(&ticks) {
            Ok(Self(ticks))
        } else {
            Err(ProtocolError::PositionOutOfRange(ticks))
        }
    }

    /// 创建位置（超出范围时截断到边界）
    pub fn clamped(ticks: i32) -> Self {
        Self(ticks.clamp(MIN_POS as i32, MAX_POS as i32) as u16)
    }

    /// 偏移指定刻度并截断
    ///
    /// 在边界处重复调用是幂等的。
    pub fn offset(self, delta: i32) -> Self {
        Self::clamped(self.0 as i32 + delta)
    }

    /// 行程刻度值
    pub fn ticks(self) -> u16 {
        self.0
    }

    /// 小端字节（低字节在前）
    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u16> for Position {
    type Error = ProtocolError;

    fn try_from(ticks: u16) -> Result<Self, Self::Error> {
        Self::new(ticks)
    }
}

impl From<Position> for u16 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 整手位置表（按 ID 1-5 排列）
pub type HandPositions = [Position; ACTUATOR_COUNT];

/// 从刻度数组构造整手位置（逐个截断）
pub fn clamp_positions(ticks: [i32; ACTUATOR_COUNT]) -> HandPositions {
    ticks.map(Position::clamped)
}
