//! CLI 配置文件
//!
//! 默认位置为 `<config_dir>/hand/config.toml`，可用 `--config` 覆盖。

use anyhow::{Context, Result};
use hand_sdk::client::{ClientConfig, DEFAULT_GESTURE_FILE, MotionConfig};
use hand_sdk::driver::{LinkConfig, PollerConfig};
use hand_sdk::protocol::DEFAULT_BAUD_RATE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Cannot determine the user config directory")?;
    path.push("hand");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 串口名称（如 /dev/ttyUSB0、COM3）
    pub port: Option<String>,
    pub baud_rate: u32,
    /// 手势文件
    pub gestures: PathBuf,
    pub link: LinkConfig,
    pub poller: PollerConfig,
    pub motion: MotionConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            gestures: PathBuf::from(DEFAULT_GESTURE_FILE),
            link: LinkConfig::default(),
            poller: PollerConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl CliConfig {
    /// 读取配置，文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// 写入配置（自动创建目录）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// 客户端配置
    pub fn client_config(&self, poller: bool, retract_on_start: bool) -> ClientConfig {
        ClientConfig {
            poller: PollerConfig {
                enabled: poller && self.poller.enabled,
                ..self.poller.clone()
            },
            motion: self.motion.clone(),
            retract_on_start,
            ..ClientConfig::default()
        }
    }
}
