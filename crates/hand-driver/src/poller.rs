//! 后台状态轮询
//!
//! 按 ID 1-5 轮流查询执行器状态，每轮结束后等待 `sweep_interval`。
//! 最新一轮的结果通过 `ArcSwap` 发布，读取方无锁。
//! 单个执行器查询失败只记录日志，不会中断轮询线程。

use crate::config::PollerConfig;
use crate::driver::HandDriver;
use crate::error::DriverError;
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use hand_protocol::{ACTUATOR_COUNT, ActuatorId, ActuatorStatus};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// 一轮轮询的结果
#[derive(Debug, Clone, Default)]
pub struct HandTelemetry {
    /// 每个执行器的状态（按 ID 1-5），查询失败为 `None`
    pub actuators: [Option<ActuatorStatus>; ACTUATOR_COUNT],
    /// 已完成的轮数
    pub sweep: u64,
    /// 本轮完成时间
    pub updated_at: Option<Instant>,
}

impl HandTelemetry {
    pub fn status(&self, id: ActuatorId) -> Option<ActuatorStatus> {
        self.actuators[id.index()]
    }

    /// 本轮成功应答的执行器数量
    pub fn online_count(&self) -> usize {
        self.actuators.iter().filter(|s| s.is_some()).count()
    }
}

/// 后台状态轮询器
///
/// drop 时自动停止并等待线程退出。
pub struct StatusPoller {
    telemetry: Arc<ArcSwap<HandTelemetry>>,
    shutdown_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StatusPoller {
    /// 启动轮询线程
    pub fn spawn(driver: HandDriver, config: PollerConfig) -> Result<Self, DriverError> {
        let telemetry = Arc::new(ArcSwap::from_pointee(HandTelemetry::default()));
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let published = telemetry.clone();
        let handle = thread::Builder::new()
            .name("hand-status-poller".into())
            .spawn(move || poll_loop(driver, config, published, shutdown_rx))
            .map_err(|e| DriverError::IoThread(e.to_string()))?;

        Ok(Self {
            telemetry,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// 最新一轮的结果
    pub fn latest(&self) -> Arc<HandTelemetry> {
        self.telemetry.load_full()
    }

    /// 共享的结果句柄（可交给其他线程读取）
    pub fn telemetry(&self) -> Arc<ArcSwap<HandTelemetry>> {
        self.telemetry.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 停止轮询并等待线程退出
    pub fn shutdown(&mut self) {
        // 关闭发送端即通知线程退出
        self.shutdown_tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Status poller thread panicked");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stop_requested(shutdown_rx: &Receiver<()>) -> bool {
    !matches!(shutdown_rx.try_recv(), Err(TryRecvError::Empty))
}

fn poll_loop(
    driver: HandDriver,
    config: PollerConfig,
    telemetry: Arc<ArcSwap<HandTelemetry>>,
    shutdown_rx: Receiver<()>,
) {
    info!(
        "Status poller started (sweep interval {} ms)",
        config.sweep_interval_ms
    );
    let mut sweep = 0u64;

    'outer: loop {
        let mut actuators = [None; ACTUATOR_COUNT];
        for id in ActuatorId::all() {
            if stop_requested(&shutdown_rx) {
                break 'outer;
            }
            match driver.query_status(id) {
                Ok(status) => actuators[id.index()] = Some(status),
                Err(e) => warn!("{}", e),
            }
        }

        sweep += 1;
        telemetry.store(Arc::new(HandTelemetry {
            actuators,
            sweep,
            updated_at: Some(Instant::now()),
        }));

        match shutdown_rx.recv_timeout(config.sweep_interval()) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("Status poller stopped after {} sweeps", sweep);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;
    use hand_serial::mock::SimulatedHand;
    use std::time::Duration;

    fn driver(hand: &SimulatedHand) -> HandDriver {
        let config = LinkConfig {
            settle_delay_ms: 0,
            ..LinkConfig::default()
        };
        HandDriver::new(hand.adapter(), config).unwrap()
    }

    fn wait_for_sweep(poller: &StatusPoller, sweep: u64) -> Arc<HandTelemetry> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let latest = poller.latest();
            if latest.sweep >= sweep || Instant::now() > deadline {
                return latest;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_poller_publishes_sweeps() {
        let hand = SimulatedHand::new();
        let config = PollerConfig {
            sweep_interval_ms: 5,
            enabled: true,
        };
        let mut poller = StatusPoller::spawn(driver(&hand), config).unwrap();

        let latest = wait_for_sweep(&poller, 2);
        assert!(latest.sweep >= 2);
        assert_eq!(latest.online_count(), ACTUATOR_COUNT);
        assert_eq!(
            latest.status(ActuatorId::new(1).unwrap()).unwrap().position,
            25
        );

        poller.shutdown();
        assert!(!poller.is_running());
    }

    #[test]
    fn test_poller_survives_bad_actuators() {
        let hand = SimulatedHand::new();
        hand.set_offline(2, true);
        hand.set_corrupt(4, true);
        let config = PollerConfig {
            sweep_interval_ms: 1,
            enabled: true,
        };
        let poller = StatusPoller::spawn(driver(&hand), config).unwrap();

        let latest = wait_for_sweep(&poller, 3);
        assert!(latest.sweep >= 3);
        assert_eq!(latest.online_count(), 3);
        assert!(latest.actuators[1].is_none());
        assert!(latest.actuators[3].is_none());
        assert!(poller.is_running());
    }

    #[test]
    fn test_drop_stops_thread() {
        let hand = SimulatedHand::new();
        let config = PollerConfig {
            sweep_interval_ms: 10_000,
            enabled: true,
        };
        let poller = StatusPoller::spawn(driver(&hand), config).unwrap();
        wait_for_sweep(&poller, 1);

        let started = Instant::now();
        drop(poller);
        // 不需要等满一个轮询间隔
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
