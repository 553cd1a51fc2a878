//! 寄存器读写命令

use crate::session::Session;
use crate::utils::{hex, parse_actuator};
use anyhow::Result;
use clap::Args;
use hand_sdk::protocol::{ActuatorId, Register, WritableRegister};

/// 读寄存器参数
#[derive(Args, Debug)]
pub struct ReadRegisterCommand {
    /// 执行器 ID（1-5）
    #[arg(short, long, value_parser = parse_actuator_arg)]
    pub id: ActuatorId,

    /// 寄存器名称（如 current-position）
    pub register: Register,

    /// 读取字节数
    #[arg(short = 'n', long, default_value_t = 2)]
    pub count: u8,
}

impl ReadRegisterCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let id = self.id;
        let driver = session.driver()?;
        let values = driver.read_register(id, self.register, self.count)?;

        if values.is_empty() {
            println!("{} @ actuator {}: no data", self.register, id);
            return Ok(());
        }
        println!("{} @ actuator {}: {}", self.register, id, hex(&values));
        if let [lo, hi] = values[..] {
            println!("  = {}", u16::from_le_bytes([lo, hi]));
        }
        Ok(())
    }
}

/// 写位置类寄存器参数
#[derive(Args, Debug)]
pub struct WritePositionCommand {
    /// 执行器 ID（1-5）
    #[arg(short, long, value_parser = parse_actuator_arg)]
    pub id: ActuatorId,

    /// 寄存器名称（target-position、zero-calibration 等）
    pub register: WritableRegister,

    /// 写入值
    pub value: u16,
}

impl WritePositionCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let id = self.id;
        let driver = session.driver()?;
        driver.write_position(id, self.register, self.value)?;
        println!("Wrote {} = {} to actuator {}", self.register, self.value, id);
        Ok(())
    }
}

pub(crate) fn parse_actuator_arg(s: &str) -> Result<ActuatorId, String> {
    parse_actuator(s).map_err(|e| e.to_string())
}
