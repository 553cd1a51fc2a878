//! 链路与轮询配置

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 串口链路配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// 读超时（毫秒）
    pub read_timeout_ms: u64,
    /// 写超时（毫秒）
    pub write_timeout_ms: u64,
    /// 写入请求后等待设备应答的时间（毫秒）
    pub settle_delay_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 1000,
            write_timeout_ms: 1000,
            settle_delay_ms: 10,
        }
    }
}

impl LinkConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// 后台状态轮询配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// 两轮完整轮询之间的间隔（毫秒）
    pub sweep_interval_ms: u64,
    /// 是否启用后台轮询
    pub enabled: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 200,
            enabled: true,
        }
    }
}

impl PollerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let link = LinkConfig::default();
        assert_eq!(link.read_timeout(), Duration::from_secs(1));
        assert_eq!(link.write_timeout(), Duration::from_secs(1));
        assert_eq!(link.settle_delay(), Duration::from_millis(10));

        let poller = PollerConfig::default();
        assert_eq!(poller.sweep_interval(), Duration::from_millis(200));
        assert!(poller.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let link: LinkConfig = toml::from_str("settle_delay_ms = 20").unwrap();
        assert_eq!(link.settle_delay_ms, 20);
        assert_eq!(link.read_timeout_ms, 1000);

        let poller: PollerConfig = toml::from_str("enabled = false").unwrap();
        assert!(!poller.enabled);
        assert_eq!(poller.sweep_interval_ms, 200);
    }
}
