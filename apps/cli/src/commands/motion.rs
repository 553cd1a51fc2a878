//! 位置控制命令

use super::register::parse_actuator_arg;
use crate::session::Session;
use crate::utils::{cancel_on_ctrlc, parse_positions, ticks};
use anyhow::Result;
use clap::{Args, ValueEnum};
use hand_sdk::prelude::{ActuatorId, JogDirection, JogMode, MotionOutcome};
use hand_sdk::protocol::clamp_positions;
use std::time::Duration;

/// 点动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Extend,
    Retract,
}

impl From<Direction> for JogDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Extend => JogDirection::Extend,
            Direction::Retract => JogDirection::Retract,
        }
    }
}

/// 点动参数
#[derive(Args, Debug)]
pub struct JogCommand {
    /// 执行器 ID（1-5）
    #[arg(value_parser = parse_actuator_arg)]
    pub id: ActuatorId,

    /// 方向
    #[arg(value_enum)]
    pub direction: Direction,

    /// 微调模式（步长 10）
    #[arg(short, long)]
    pub micro: bool,

    /// 点动次数
    #[arg(short = 'n', long, default_value_t = 1)]
    pub times: u32,
}

impl JogCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let client = session.client_at_measured()?;
        let actuators = client.actuators();
        actuators.set_mode(if self.micro {
            JogMode::Micro
        } else {
            JogMode::Normal
        });

        let mut position = actuators.snapshot()?[self.id.index()];
        for _ in 0..self.times {
            position = actuators.jog(self.id, self.direction.into())?;
        }
        println!("Actuator {} -> {}", self.id, position);
        client.shutdown();
        Ok(())
    }
}

/// 移动参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 5 个目标位置（如 "100,200,300,400,500"）
    pub positions: String,

    /// 等待所有执行器到位
    #[arg(short, long)]
    pub wait: bool,

    /// 到位容差（刻度）
    #[arg(long, default_value_t = 20)]
    pub tolerance: u16,

    /// 等待超时（毫秒）
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

impl MoveCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let target = clamp_positions(parse_positions(&self.positions)?);
        let client = session.client(false, false)?;

        if !self.wait {
            client.actuators().move_to(target)?;
            println!("Moved to {:?}", ticks(&target));
            client.shutdown();
            return Ok(());
        }

        let cancel = cancel_on_ctrlc()?;
        let outcome = client.sequencer().move_and_wait(
            target,
            self.tolerance,
            Duration::from_millis(100),
            Duration::from_millis(self.timeout_ms),
            &cancel,
        )?;
        match outcome {
            MotionOutcome::Completed => println!("Reached {:?}", ticks(&target)),
            MotionOutcome::TimedOut => println!("Timed out before reaching {:?}", ticks(&target)),
            MotionOutcome::Cancelled => println!("Cancelled"),
        }
        client.shutdown();
        Ok(())
    }
}

/// 全部伸出
pub fn extend_all(session: &Session) -> Result<()> {
    let client = session.client(false, false)?;
    client.actuators().extend_all()?;
    println!("Extended all actuators");
    client.shutdown();
    Ok(())
}

/// 全部收回
pub fn retract_all(session: &Session) -> Result<()> {
    let client = session.client(false, false)?;
    client.actuators().retract_all()?;
    println!("Retracted all actuators");
    client.shutdown();
    Ok(())
}

/// 执行演示动作（Ctrl+C 取消，结束后全部收回）
pub fn dance(session: &Session) -> Result<()> {
    let client = session.client(false, true)?;
    let task = client.dance()?;
    let cancel = cancel_on_ctrlc()?;
    let task_token = task.cancel_token();

    println!("Dancing, press Ctrl+C to stop");
    while !task.is_finished() {
        if !cancel.sleep(Duration::from_millis(50)) {
            task_token.cancel();
            break;
        }
    }

    let outcome = task.join()?;
    println!("Dance {:?}", outcome);
    client.shutdown();
    Ok(())
}
