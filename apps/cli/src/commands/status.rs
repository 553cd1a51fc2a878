//! 状态查询与监控命令

use crate::session::Session;
use crate::utils::{OutputFormat, cancel_on_ctrlc, print_statuses};
use anyhow::Result;
use clap::Args;
use hand_sdk::driver::{PollerConfig, StatusPoller};
use std::time::Duration;

/// 状态查询参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl StatusCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let driver = session.driver()?;
        let statuses = driver.query_all();
        print_statuses(&statuses, self.format)
    }
}

/// 监控参数
#[derive(Args, Debug)]
pub struct MonitorCommand {
    /// 轮询间隔（毫秒，覆盖配置）
    #[arg(short, long)]
    pub interval_ms: Option<u64>,
}

impl MonitorCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let driver = session.driver()?;
        let config = PollerConfig {
            sweep_interval_ms: self
                .interval_ms
                .unwrap_or(session.config.poller.sweep_interval_ms),
            enabled: true,
        };
        let interval = config.sweep_interval().max(Duration::from_millis(50));
        let mut poller = StatusPoller::spawn(driver.clone(), config)?;
        let cancel = cancel_on_ctrlc()?;

        println!("Monitoring, press Ctrl+C to stop");
        let mut last_sweep = 0;
        while cancel.sleep(interval) {
            let telemetry = poller.latest();
            if telemetry.sweep == last_sweep {
                continue;
            }
            last_sweep = telemetry.sweep;
            println!(
                "\nsweep {} ({}/5 online)",
                telemetry.sweep,
                telemetry.online_count()
            );
            print_statuses(&telemetry.actuators, OutputFormat::Table)?;
        }

        poller.shutdown();
        let metrics = driver.metrics().snapshot();
        println!(
            "\n{} exchanges, {} timeouts, {} frame errors ({:.1}% failed)",
            metrics.exchanges_total,
            metrics.timeouts(),
            metrics.frame_errors,
            metrics.failure_rate() * 100.0
        );
        Ok(())
    }
}
