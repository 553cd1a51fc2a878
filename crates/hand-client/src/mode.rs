//! 点动模式
//!
//! 决定单次点动的步长，由操作者设置，位置表所有者线程读取。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// 正常模式的点动步长
pub const NORMAL_STEP: i32 = 100;
/// 微调模式的点动步长
pub const MICRO_STEP: i32 = 10;

/// 点动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum JogMode {
    /// 正常模式（步长 100）
    #[default]
    Normal = 0,
    /// 微调模式（步长 10）
    Micro = 1,
}

impl JogMode {
    /// 从 u8 转换，无效值返回 Normal
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Micro,
            _ => Self::Normal,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 单次点动的步长（行程刻度）
    pub fn step(self) -> i32 {
        match self {
            JogMode::Normal => NORMAL_STEP,
            JogMode::Micro => MICRO_STEP,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            JogMode::Normal => JogMode::Micro,
            JogMode::Micro => JogMode::Normal,
        }
    }
}

impl fmt::Display for JogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JogMode::Normal => f.write_str("normal"),
            JogMode::Micro => f.write_str("micro"),
        }
    }
}

impl FromStr for JogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(JogMode::Normal),
            "micro" => Ok(JogMode::Micro),
            other => Err(format!("unknown jog mode: {}", other)),
        }
    }
}

/// 点动模式（原子版本，用于线程间共享）
///
/// ```rust
/// use hand_client::mode::{AtomicJogMode, JogMode};
/// use std::sync::atomic::Ordering;
///
/// let mode = AtomicJogMode::new(JogMode::Normal);
/// mode.set(JogMode::Micro, Ordering::Relaxed);
/// assert_eq!(mode.get(Ordering::Relaxed).step(), 10);
/// ```
#[derive(Debug, Default)]
pub struct AtomicJogMode {
    inner: AtomicU8,
}

impl AtomicJogMode {
    pub fn new(mode: JogMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    pub fn get(&self, ordering: Ordering) -> JogMode {
        JogMode::from_u8(self.inner.load(ordering))
    }

    pub fn set(&self, mode: JogMode, ordering: Ordering) {
        self.inner.store(mode.as_u8(), ordering);
    }

    /// 切换模式，返回切换后的模式
    pub fn toggle(&self, ordering: Ordering) -> JogMode {
        let previous = self.inner.fetch_xor(1, ordering);
        JogMode::from_u8(previous).toggled()
    }
}
