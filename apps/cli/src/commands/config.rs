//! 配置管理命令

use crate::config::CliConfig;
use anyhow::{Result, bail};
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前配置
    Show,

    /// 显示配置文件路径
    Path,

    /// 写入默认配置文件
    Init {
        /// 覆盖已有文件
        #[arg(short, long)]
        force: bool,
    },

    /// 设置配置项
    Set {
        /// 串口名称
        #[arg(short, long)]
        port: Option<String>,

        /// 波特率
        #[arg(short, long)]
        baud_rate: Option<u32>,

        /// 手势文件
        #[arg(short, long)]
        gestures: Option<PathBuf>,
    },
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = CliConfig::load(path)?;
                print!("{}", toml::to_string_pretty(&config)?);
            },

            ConfigCommand::Path => println!("{}", path.display()),

            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                CliConfig::default().save(path)?;
                println!("Wrote {}", path.display());
            },

            ConfigCommand::Set {
                port,
                baud_rate,
                gestures,
            } => {
                if port.is_none() && baud_rate.is_none() && gestures.is_none() {
                    bail!("Nothing to set");
                }
                let mut config = CliConfig::load(path)?;
                if let Some(port) = port {
                    println!("port = {}", port);
                    config.port = Some(port);
                }
                if let Some(baud_rate) = baud_rate {
                    println!("baud_rate = {}", baud_rate);
                    config.baud_rate = baud_rate;
                }
                if let Some(gestures) = gestures {
                    println!("gestures = {}", gestures.display());
                    config.gestures = gestures;
                }
                config.save(path)?;
            },
        }
        Ok(())
    }
}
