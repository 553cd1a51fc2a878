//! 链路指标
//!
//! 原子计数器，可以在任何线程读取，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 串口链路实时指标
///
/// ```rust
/// use hand_driver::LinkMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = LinkMetrics::new();
/// metrics.exchanges_total.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(metrics.snapshot().exchanges_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// 完成写入的交换次数
    pub exchanges_total: AtomicU64,
    /// 其中的广播帧数量
    pub broadcasts_total: AtomicU64,
    /// 写入的总字节数
    pub bytes_written: AtomicU64,
    /// 读取的总字节数
    pub bytes_read: AtomicU64,
    /// 读超时次数（设备未应答）
    pub read_timeouts: AtomicU64,
    /// 写超时次数
    pub write_timeouts: AtomicU64,
    /// 响应帧解析失败次数（结构错误或校验和错误）
    pub frame_errors: AtomicU64,
    /// 其他传输错误次数
    pub transport_errors: AtomicU64,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// 读取所有计数器的当前值
    pub fn snapshot(&self) -> LinkMetricsSnapshot {
        LinkMetricsSnapshot {
            exchanges_total: self.exchanges_total.load(Ordering::Relaxed),
            broadcasts_total: self.broadcasts_total.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            read_timeouts: self.read_timeouts.load(Ordering::Relaxed),
            write_timeouts: self.write_timeouts.load(Ordering::Relaxed),
            frame_errors: self.frame_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        for counter in [
            &self.exchanges_total,
            &self.broadcasts_total,
            &self.bytes_written,
            &self.bytes_read,
            &self.read_timeouts,
            &self.write_timeouts,
            &self.frame_errors,
            &self.transport_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkMetricsSnapshot {
    pub exchanges_total: u64,
    pub broadcasts_total: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub read_timeouts: u64,
    pub write_timeouts: u64,
    pub frame_errors: u64,
    pub transport_errors: u64,
}

impl LinkMetricsSnapshot {
    /// 超时总次数
    pub fn timeouts(&self) -> u64 {
        self.read_timeouts + self.write_timeouts
    }

    /// 失败率（超时 + 帧错误 + 传输错误，相对交换次数）
    pub fn failure_rate(&self) -> f64 {
        if self.exchanges_total == 0 {
            return 0.0;
        }
        let failures = self.timeouts() + self.frame_errors + self.transport_errors;
        failures as f64 / self.exchanges_total as f64
    }
}
