//! Hand SDK - 灵巧手串口控制 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 帧编解码、寄存器表、状态解析，不涉及 I/O
//! - **串口层** (`serial`): 串口硬件抽象
//! - **驱动层** (`driver`): 串口互斥、寄存器读写、状态查询与后台轮询
//! - **客户端层** (`client`): 位置表、点动、手势库与脚本化动作
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use hand_sdk::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! hand_sdk::init_logging();
//!
//! let driver = HandBuilder::new().port("/dev/ttyUSB0").build()?;
//! let mut client = HandClient::new(driver, ClientConfig::default())?;
//!
//! client.actuators().extend_all()?;
//! client.capture_gesture("open")?;
//! client.play_gesture(0)?.join()?;
//! # Ok(())
//! # }
//! ```

pub use hand_client as client;
pub use hand_driver as driver;
pub use hand_protocol as protocol;
pub use hand_serial as serial;

pub mod prelude;

mod logging;

pub use logging::{init_logging, init_logging_with};

// 常用类型
pub use hand_client::{ClientConfig, ClientError, HandClient};
pub use hand_driver::{DriverError, HandBuilder, HandDriver};
pub use hand_protocol::{FrameError, ProtocolError};
pub use hand_serial::{SerialAdapter, SerialError};
