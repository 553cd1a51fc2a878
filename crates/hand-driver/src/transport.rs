//! 串口独占访问
//!
//! [`TransportGuard`] 是任何组件访问线路的唯一入口。每次交换在同一把锁内完成
//! "清空残留输入 → 写请求 → 等待 → 读应答"，同一时刻最多一个交换在进行。
//!
//! 超时不会作为错误向上传播：交换返回空的 [`Response`]（`timed_out = true`），
//! 记录 `warn` 日志并计入 [`LinkMetrics`]。

use crate::config::LinkConfig;
use crate::error::DriverError;
use crate::metrics::LinkMetrics;
use hand_serial::{SerialAdapter, SerialError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{trace, warn};

/// 期望的应答形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// 读取最多 n 字节
    Exact(usize),
    /// 读取输入缓冲区中的全部字节（长度未知）
    Drain,
    /// 不读取应答
    Nothing,
}

/// 一次交换的应答
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub bytes: Vec<u8>,
    /// 读或写超时
    pub timed_out: bool,
}

impl Response {
    fn timeout() -> Self {
        Self {
            bytes: Vec::new(),
            timed_out: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 串口独占访问守卫
pub struct TransportGuard {
    adapter: Mutex<Box<dyn SerialAdapter>>,
    config: LinkConfig,
    metrics: Arc<LinkMetrics>,
}

impl TransportGuard {
    /// 包装一个已打开的适配器，并下发读写超时
    pub fn new(
        mut adapter: impl SerialAdapter + 'static,
        config: LinkConfig,
    ) -> Result<Self, DriverError> {
        adapter.set_timeouts(config.read_timeout(), config.write_timeout())?;
        Ok(Self {
            adapter: Mutex::new(Box::new(adapter)),
            config,
            metrics: Arc::new(LinkMetrics::new()),
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }

    /// 执行一次请求/应答交换
    ///
    /// # 错误
    ///
    /// 超时以外的适配器失败返回 `DriverError::Serial`。
    pub fn exchange(&self, request: &[u8], expect: Expect) -> Result<Response, DriverError> {
        let mut port = self.adapter.lock();

        port.clear_input().map_err(|e| self.transport_error(e))?;

        if let Err(e) = port.write_all(request) {
            if e.is_timeout() {
                warn!("Serial write timed out ({} bytes)", request.len());
                LinkMetrics::add(&self.metrics.write_timeouts, 1);
                return Ok(Response::timeout());
            }
            return Err(self.transport_error(e));
        }
        LinkMetrics::add(&self.metrics.exchanges_total, 1);
        LinkMetrics::add(&self.metrics.bytes_written, request.len() as u64);
        trace!("TX {:02X?}", request);

        // 广播同样要等待，半双工总线在此期间不能发下一帧
        let settle = self.config.settle_delay();
        if !settle.is_zero() {
            spin_sleep::sleep(settle);
        }

        if expect == Expect::Nothing {
            return Ok(Response::default());
        }

        let read = match expect {
            Expect::Exact(n) => port.read_up_to(n),
            Expect::Drain => port.read_available(),
            Expect::Nothing => Ok(Vec::new()),
        };

        match read {
            Ok(bytes) => {
                LinkMetrics::add(&self.metrics.bytes_read, bytes.len() as u64);
                trace!("RX {:02X?}", bytes);
                Ok(Response {
                    bytes,
                    timed_out: false,
                })
            }
            Err(e) if e.is_timeout() => {
                warn!(
                    "Serial read timed out waiting for response to {:02X?}",
                    request
                );
                LinkMetrics::add(&self.metrics.read_timeouts, 1);
                Ok(Response::timeout())
            }
            Err(e) => Err(self.transport_error(e)),
        }
    }

    fn transport_error(&self, e: SerialError) -> DriverError {
        LinkMetrics::add(&self.metrics.transport_errors, 1);
        DriverError::Serial(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_serial::mock::{MockReply, MockSerialAdapter};
    use std::time::{Duration, Instant};

    fn fast_config() -> LinkConfig {
        LinkConfig {
            settle_delay_ms: 0,
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_exchange_exact() {
        let mock = MockSerialAdapter::new(|_| MockReply::Bytes(vec![0xAA, 0x55, 0x01, 0x02]));
        let probe = mock.clone();
        let guard = TransportGuard::new(mock, fast_config()).unwrap();

        let response = guard.exchange(&[0x55, 0xAA, 0x00], Expect::Exact(3)).unwrap();
        assert_eq!(response.bytes, vec![0xAA, 0x55, 0x01]);
        assert!(!response.timed_out);
        assert_eq!(probe.written_frames(), vec![vec![0x55, 0xAA, 0x00]]);

        let snap = guard.metrics().snapshot();
        assert_eq!(snap.exchanges_total, 1);
        assert_eq!(snap.bytes_written, 3);
        assert_eq!(snap.bytes_read, 3);
    }

    #[test]
    fn test_exchange_applies_timeouts() {
        let mock = MockSerialAdapter::silent();
        let probe = mock.clone();
        let config = LinkConfig {
            read_timeout_ms: 250,
            write_timeout_ms: 500,
            settle_delay_ms: 0,
        };
        let _guard = TransportGuard::new(mock, config).unwrap();
        assert_eq!(
            probe.timeouts(),
            Some((Duration::from_millis(250), Duration::from_millis(500)))
        );
    }

    #[test]
    fn test_timeout_degrades_to_empty_response() {
        let guard = TransportGuard::new(MockSerialAdapter::silent(), fast_config()).unwrap();

        let response = guard.exchange(&[0x01], Expect::Exact(22)).unwrap();
        assert!(response.is_empty());
        assert!(response.timed_out);
        assert_eq!(guard.metrics().snapshot().read_timeouts, 1);
    }

    #[test]
    fn test_write_timeout_degrades() {
        let mock = MockSerialAdapter::new(|_| MockReply::WriteError(std::io::ErrorKind::TimedOut));
        let guard = TransportGuard::new(mock, fast_config()).unwrap();

        let response = guard.exchange(&[0x01], Expect::Drain).unwrap();
        assert!(response.timed_out);
        assert_eq!(guard.metrics().snapshot().write_timeouts, 1);
    }

    #[test]
    fn test_other_failures_propagate() {
        let mock = MockSerialAdapter::new(|_| MockReply::WriteError(std::io::ErrorKind::BrokenPipe));
        let guard = TransportGuard::new(mock, fast_config()).unwrap();

        let result = guard.exchange(&[0x01], Expect::Nothing);
        assert!(matches!(result, Err(DriverError::Serial(SerialError::Io(_)))));
        assert_eq!(guard.metrics().snapshot().transport_errors, 1);
    }

    #[test]
    fn test_stale_input_is_discarded() {
        let mock = MockSerialAdapter::new(|_| MockReply::Bytes(vec![0x10, 0x20]));
        let probe = mock.clone();
        probe.inject_input(&[0xEE, 0xEE, 0xEE]);
        let guard = TransportGuard::new(mock, fast_config()).unwrap();

        let response = guard.exchange(&[0x01], Expect::Drain).unwrap();
        assert_eq!(response.bytes, vec![0x10, 0x20]);
        assert_eq!(probe.clear_count(), 1);
    }

    #[test]
    fn test_nothing_does_not_read() {
        let mock = MockSerialAdapter::new(|_| MockReply::Bytes(vec![0x01]));
        let probe = mock.clone();
        let guard = TransportGuard::new(mock, fast_config()).unwrap();

        let response = guard.exchange(&[0x01], Expect::Nothing).unwrap();
        assert!(response.is_empty());
        assert!(!response.timed_out);
        assert_eq!(probe.pending_len(), 1);
    }

    #[test]
    fn test_settle_delay_follows_broadcast() {
        let stamps = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let recorded = stamps.clone();
        let mock = MockSerialAdapter::new(move |_| {
            recorded.lock().push(Instant::now());
            MockReply::Silence
        });
        let config = LinkConfig {
            settle_delay_ms: 20,
            ..LinkConfig::default()
        };
        let guard = TransportGuard::new(mock, config).unwrap();

        guard.exchange(&[0x55, 0xAA, 0x10], Expect::Nothing).unwrap();
        guard.exchange(&[0x55, 0xAA, 0x10], Expect::Nothing).unwrap();

        let stamps = stamps.lock();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[1] - stamps[0] >= Duration::from_millis(20));
    }

    #[test]
    fn test_exchanges_are_serialized() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (flight, max) = (in_flight.clone(), max_seen.clone());

        let mock = MockSerialAdapter::new(move |req| {
            let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
            max.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            flight.fetch_sub(1, Ordering::SeqCst);
            MockReply::Bytes(req.to_vec())
        });
        let guard = Arc::new(TransportGuard::new(mock, fast_config()).unwrap());

        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let guard = guard.clone();
                thread::spawn(move || {
                    for i in 0..10u8 {
                        let req = [t, i];
                        let response = guard.exchange(&req, Expect::Exact(2)).unwrap();
                        // 每个请求都拿到自己的应答，没有交错
                        assert_eq!(response.bytes, req.to_vec());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(guard.metrics().snapshot().exchanges_total, 40);
    }
}
