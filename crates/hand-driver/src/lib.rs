//! # Hand Driver
//!
//! 驱动层，提供：
//! - 串口独占访问（[`TransportGuard`]，同一时刻最多一个请求/应答交换）
//! - 寄存器读写与位置类寄存器写入
//! - 广播定位与状态查询
//! - 后台状态轮询（[`StatusPoller`]，ArcSwap 无锁读取）
//! - 链路指标（[`LinkMetrics`]）
//!
//! 大多数用户应该使用 `hand-client` 提供的更高级接口。

mod builder;
pub mod config;
mod driver;
mod error;
pub mod metrics;
pub mod poller;
mod status;
pub mod transport;

pub use builder::HandBuilder;
pub use config::{LinkConfig, PollerConfig};
pub use driver::HandDriver;
pub use error::DriverError;
pub use metrics::{LinkMetrics, LinkMetricsSnapshot};
pub use poller::{HandTelemetry, StatusPoller};
pub use status::{StatusUnavailable, UnavailableCause};
pub use transport::{Expect, Response, TransportGuard};
