//! 命令共用的解析与输出工具

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use hand_sdk::client::CancelToken;
use hand_sdk::prelude::{ActuatorId, ActuatorStatus, HandPositions, Position};
use hand_sdk::protocol::ACTUATOR_COUNT;
use serde::Serialize;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// 解析执行器 ID（1-5）
pub fn parse_actuator(s: &str) -> Result<ActuatorId> {
    let id: u8 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid actuator id '{}'", s))?;
    Ok(ActuatorId::new(id)?)
}

/// 解析 5 个位置（逗号或空白分隔），超出行程的值会被截断
pub fn parse_positions(s: &str) -> Result<[i32; ACTUATOR_COUNT]> {
    let values = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .with_context(|| format!("Invalid position '{}'", part))
        })
        .collect::<Result<Vec<_>>>()?;

    match <[i32; ACTUATOR_COUNT]>::try_from(values) {
        Ok(positions) => Ok(positions),
        Err(values) => bail!(
            "Expected {} positions, got {}",
            ACTUATOR_COUNT,
            values.len()
        ),
    }
}

/// 位置表的刻度值
pub fn ticks(positions: &HandPositions) -> [u16; ACTUATOR_COUNT] {
    positions.map(Position::ticks)
}

#[derive(Serialize)]
struct StatusRow {
    id: u8,
    online: bool,
    status: Option<ActuatorStatus>,
}

/// 打印状态表
pub fn print_statuses(
    statuses: &[Option<ActuatorStatus>; ACTUATOR_COUNT],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{:<4} {:>8} {:>6} {:>8} {:>7}", "ID", "POS", "TEMP", "CURRENT", "FORCE");
            for id in ActuatorId::all() {
                match statuses[id.index()] {
                    Some(s) => println!(
                        "{:<4} {:>8} {:>6} {:>8} {:>7}",
                        id.get(),
                        s.position,
                        s.temperature,
                        s.current,
                        s.force
                    ),
                    None => println!("{:<4} {:>8}", id.get(), "offline"),
                }
            }
        },
        OutputFormat::Json => {
            let rows: Vec<_> = ActuatorId::all()
                .map(|id| StatusRow {
                    id: id.get(),
                    online: statuses[id.index()].is_some(),
                    status: statuses[id.index()],
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        },
    }
    Ok(())
}

/// 十六进制显示
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ctrl+C 触发取消的令牌（每个进程只能安装一次）
pub fn cancel_on_ctrlc() -> Result<CancelToken> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted, stopping...");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl+C handler")?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions() {
        assert_eq!(
            parse_positions("100,200, 300 400,500").unwrap(),
            [100, 200, 300, 400, 500]
        );
        assert_eq!(parse_positions("-5 0 0 0 9999").unwrap(), [-5, 0, 0, 0, 9999]);
        assert!(parse_positions("1,2,3").is_err());
        assert!(parse_positions("1,2,3,4,x").is_err());
    }

    #[test]
    fn test_parse_actuator() {
        assert_eq!(parse_actuator("3").unwrap().get(), 3);
        assert!(parse_actuator("0").is_err());
        assert!(parse_actuator("6").is_err());
        assert!(parse_actuator("thumb").is_err());
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x55, 0xAA, 0x01]), "55 AA 01");
        assert_eq!(hex(&[]), "");
    }
}
