//! 一次命令执行的连接上下文

use crate::config::CliConfig;
use anyhow::{Context, Result};
use hand_sdk::driver::{HandBuilder, HandDriver};
use hand_sdk::prelude::{HandClient, HandPositions, Position};
use hand_sdk::protocol::{ACTUATOR_COUNT, ActuatorId};
use std::path::Path;
use tracing::warn;

/// 命令执行上下文（配置 + 命令行覆盖）
pub struct Session {
    pub config: CliConfig,
    port: Option<String>,
}

impl Session {
    pub fn new(config: CliConfig, port_override: Option<String>) -> Self {
        Self {
            config,
            port: port_override,
        }
    }

    /// 串口名称（命令行参数优先）
    pub fn port(&self) -> Result<&str> {
        self.port
            .as_deref()
            .or(self.config.port.as_deref())
            .context("No serial port configured; pass --port or run `hand-cli config set --port <PORT>`")
    }

    pub fn gestures_path(&self) -> &Path {
        &self.config.gestures
    }

    /// 打开串口并创建驱动
    pub fn driver(&self) -> Result<HandDriver> {
        let port = self.port()?;
        HandBuilder::new()
            .port(port)
            .baud_rate(self.config.baud_rate)
            .link_config(self.config.link.clone())
            .build()
            .with_context(|| format!("Failed to open {}", port))
    }

    /// 创建客户端
    pub fn client(&self, poller: bool, retract_on_start: bool) -> Result<HandClient> {
        let driver = self.driver()?;
        Ok(HandClient::new(
            driver,
            self.config.client_config(poller, retract_on_start),
        )?)
    }

    /// 创建客户端并以设备实测位置初始化位置表
    ///
    /// 单次命令不做启动收回，点动等操作从手的当前姿态开始。
    pub fn client_at_measured(&self) -> Result<HandClient> {
        let client = self.client(false, false)?;
        let measured = measured_positions(client.driver());
        client.actuators().reconcile(measured)?;
        Ok(client)
    }
}

/// 读取全部执行器的实测位置，不可用的执行器按收回位置处理
pub fn measured_positions(driver: &HandDriver) -> HandPositions {
    let mut positions = [Position::MIN; ACTUATOR_COUNT];
    for id in ActuatorId::all() {
        match driver.query_status(id) {
            Ok(status) => positions[id.index()] = status.position_clamped(),
            Err(e) => warn!("{}; assuming retracted", e),
        }
    }
    positions
}
