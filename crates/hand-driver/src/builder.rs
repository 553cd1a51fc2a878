//! Builder 模式实现
//!
//! 提供链式构造 `HandDriver` 实例的便捷方式。

use crate::config::LinkConfig;
use crate::driver::HandDriver;
use crate::error::DriverError;
use hand_protocol::DEFAULT_BAUD_RATE;
use hand_serial::{SerialAdapter, SerialPortAdapter};
use tracing::info;

/// HandDriver Builder（链式构造）
///
/// ```no_run
/// use hand_driver::{HandBuilder, LinkConfig};
///
/// let driver = HandBuilder::new()
///     .port("/dev/ttyUSB0")
///     .baud_rate(921_600)
///     .link_config(LinkConfig::default())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandBuilder {
    /// 串口设备路径
    port: Option<String>,
    /// 波特率（默认 921600）
    baud_rate: Option<u32>,
    /// 链路配置
    link_config: Option<LinkConfig>,
}

impl HandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置串口设备路径（必填）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置波特率（可选）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// 设置链路配置（可选）
    pub fn link_config(mut self, config: LinkConfig) -> Self {
        self.link_config = Some(config);
        self
    }

    /// 打开串口并构建驱动
    ///
    /// # Errors
    /// - `DriverError::InvalidInput`: 未指定串口
    /// - `DriverError::Serial`: 串口打开失败
    pub fn build(self) -> Result<HandDriver, DriverError> {
        let port = self
            .port
            .ok_or_else(|| DriverError::InvalidInput("serial port not specified".to_string()))?;
        let baud_rate = self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE);
        let config = self.link_config.unwrap_or_default();

        let adapter = SerialPortAdapter::open(&port, baud_rate, config.read_timeout())?;
        info!("Connected to hand on {} ({} baud)", port, baud_rate);
        HandDriver::new(adapter, config)
    }

    /// 使用外部提供的适配器构建驱动（测试或自定义传输）
    pub fn build_with_adapter(
        self,
        adapter: impl SerialAdapter + 'static,
    ) -> Result<HandDriver, DriverError> {
        HandDriver::new(adapter, self.link_config.unwrap_or_default())
    }
}
