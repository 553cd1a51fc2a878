//! # Hand CLI
//!
//! Command-line interface for dexterous hand control.
//!
//! ## One-shot 模式
//!
//! ```bash
//! hand-cli config set --port /dev/ttyUSB0
//! hand-cli status
//! hand-cli jog 2 extend --micro
//! hand-cli gesture play fist
//! ```
//!
//! ## Shell 模式
//!
//! ```bash
//! $ hand-cli shell
//! hand> + 2
//! hand> capture fist
//! hand> dance
//! hand> stop
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod session;
mod shell;
mod utils;

use commands::{
    ConfigCommand, GestureCommand, JogCommand, MonitorCommand, MoveCommand, ReadRegisterCommand,
    StatusCommand, WritePositionCommand,
};
use config::{CliConfig, default_config_file};
use session::Session;
use shell::Shell;

/// Hand CLI - 灵巧手命令行工具
#[derive(Parser, Debug)]
#[command(name = "hand-cli")]
#[command(about = "Command-line interface for dexterous hand control", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 串口（覆盖配置）
    #[arg(short, long)]
    port: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询全部执行器状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 持续监控执行器状态
    Monitor {
        #[command(flatten)]
        args: MonitorCommand,
    },

    /// 点动单个执行器
    Jog {
        #[command(flatten)]
        args: JogCommand,
    },

    /// 广播整手目标位置
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 全部伸出
    ExtendAll,

    /// 全部收回
    RetractAll,

    /// 手势管理
    #[command(subcommand)]
    Gesture(GestureCommand),

    /// 演示动作
    Dance,

    /// 读寄存器
    ReadRegister {
        #[command(flatten)]
        args: ReadRegisterCommand,
    },

    /// 写位置类寄存器
    WritePosition {
        #[command(flatten)]
        args: WritePositionCommand,
    },

    /// 启动交互式 Shell
    Shell,
}

fn main() -> Result<()> {
    hand_sdk::init_logging_with("hand_cli=info,warn");

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_file()?,
    };

    if let Commands::Config(cmd) = cli.command {
        return cmd.execute(&config_path);
    }

    let session = Session::new(CliConfig::load(&config_path)?, cli.port);
    match cli.command {
        Commands::Config(_) => Ok(()),
        Commands::Status { args } => args.execute(&session),
        Commands::Monitor { args } => args.execute(&session),
        Commands::Jog { args } => args.execute(&session),
        Commands::Move { args } => args.execute(&session),
        Commands::ExtendAll => commands::motion::extend_all(&session),
        Commands::RetractAll => commands::motion::retract_all(&session),
        Commands::Gesture(cmd) => cmd.execute(&session),
        Commands::Dance => commands::motion::dance(&session),
        Commands::ReadRegister { args } => args.execute(&session),
        Commands::WritePosition { args } => args.execute(&session),
        Commands::Shell => Shell::open(&session)?.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_jog() {
        let cli = Cli::try_parse_from(["hand-cli", "-p", "COM3", "jog", "2", "extend", "--micro"])
            .unwrap();
        assert_eq!(cli.port.as_deref(), Some("COM3"));
        let Commands::Jog { args } = cli.command else {
            panic!("expected jog");
        };
        assert_eq!(args.id.get(), 2);
        assert!(args.micro);
    }

    #[test]
    fn test_parse_rejects_bad_register() {
        assert!(
            Cli::try_parse_from(["hand-cli", "write-position", "-i", "1", "current-position", "5"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["hand-cli", "read-register", "-i", "1", "current-position"])
                .is_ok()
        );
    }
}
