//! 执行器位置控制
//!
//! 整手目标位置表由专用线程 [`ActuatorControl`] 独占持有，
//! 所有读写都通过 [`ActuatorHandle`] 以命令队列方式提交，按提交顺序串行执行。
//! 每次修改后都会广播完整的位置表，避免联动的手指失去同步。

use crate::error::{ClientError, Result};
use crate::mode::{AtomicJogMode, JogMode};
use crossbeam_channel::{Receiver, Sender, bounded};
use hand_driver::HandDriver;
use hand_protocol::{
    ACTUATOR_COUNT, ActuatorId, EXTEND_ALL_ACTUATOR5_OFFSET, HandPositions, MAX_POS, Position,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use tracing::{debug, info, warn};

/// 命令队列容量
const COMMAND_QUEUE_CAPACITY: usize = 32;

/// 点动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogDirection {
    /// 伸出（位置增大）
    Extend,
    /// 收回（位置减小）
    Retract,
}

impl JogDirection {
    fn sign(self) -> i32 {
        match self {
            JogDirection::Extend => 1,
            JogDirection::Retract => -1,
        }
    }
}

/// 全部伸出时的位置（第 5 号执行器回退，避免与第 4 号干涉）
pub fn extended_positions() -> HandPositions {
    let mut positions = [Position::MAX; ACTUATOR_COUNT];
    positions[ACTUATOR_COUNT - 1] = Position::clamped((MAX_POS - EXTEND_ALL_ACTUATOR5_OFFSET) as i32);
    positions
}

/// 全部收回时的位置
pub fn retracted_positions() -> HandPositions {
    [Position::MIN; ACTUATOR_COUNT]
}

type Reply<T> = Sender<Result<T>>;

enum ControlCommand {
    Jog {
        id: ActuatorId,
        direction: JogDirection,
        reply: Reply<Position>,
    },
    SetAll {
        positions: HandPositions,
        reason: &'static str,
        reply: Reply<()>,
    },
    SetOne {
        id: ActuatorId,
        position: Position,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Sender<HandPositions>,
    },
    Shutdown,
}

/// 位置表所有者线程
///
/// drop 时停止线程；此后所有句柄调用返回 `ClientError::ControlStopped`。
pub struct ActuatorControl {
    handle: ActuatorHandle,
    thread: Option<thread::JoinHandle<()>>,
}

impl ActuatorControl {
    /// 启动所有者线程
    ///
    /// `initial` 只作为初始表内容，不会立即广播。
    pub fn spawn(
        driver: HandDriver,
        mode: Arc<AtomicJogMode>,
        initial: HandPositions,
    ) -> Result<Self> {
        let (tx, rx) = bounded(COMMAND_QUEUE_CAPACITY);
        let loop_mode = mode.clone();
        let thread = thread::Builder::new()
            .name("hand-actuator-control".into())
            .spawn(move || control_loop(driver, loop_mode, initial, rx))
            .map_err(|e| ClientError::Thread(e.to_string()))?;

        Ok(Self {
            handle: ActuatorHandle { tx, mode },
            thread: Some(thread),
        })
    }

    /// 获取一个控制句柄
    pub fn handle(&self) -> ActuatorHandle {
        self.handle.clone()
    }

    /// 停止所有者线程并等待退出
    pub fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.tx.send(ControlCommand::Shutdown);
            if thread.join().is_err() {
                warn!("Actuator control thread panicked");
            }
        }
    }
}

impl Drop for ActuatorControl {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 位置表控制句柄（可克隆，可跨线程使用）
#[derive(Clone)]
pub struct ActuatorHandle {
    tx: Sender<ControlCommand>,
    mode: Arc<AtomicJogMode>,
}

impl ActuatorHandle {
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> ControlCommand) -> Result<T> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(make(reply_tx))
            .map_err(|_| ClientError::ControlStopped)?;
        reply_rx.recv().map_err(|_| ClientError::ControlStopped)
    }

    /// 当前点动模式
    pub fn mode(&self) -> JogMode {
        self.mode.get(Ordering::Relaxed)
    }

    pub fn set_mode(&self, mode: JogMode) {
        self.mode.set(mode, Ordering::Relaxed);
    }

    /// 切换点动模式
    pub fn toggle_mode(&self) -> JogMode {
        self.mode.toggle(Ordering::Relaxed)
    }

    /// 点动单个执行器，返回新的目标位置
    ///
    /// 步长由当前模式决定；结果截断到行程范围内，在边界处重复点动不改变位置。
    pub fn jog(&self, id: ActuatorId, direction: JogDirection) -> Result<Position> {
        self.request(|reply| ControlCommand::Jog {
            id,
            direction,
            reply,
        })?
    }

    /// 全部伸出（第 5 号执行器停在 `MAX_POS - 300`）
    pub fn extend_all(&self) -> Result<()> {
        self.set_all(extended_positions(), "extend all")
    }

    /// 全部收回
    pub fn retract_all(&self) -> Result<()> {
        self.set_all(retracted_positions(), "retract all")
    }

    /// 替换整张位置表并广播
    pub fn move_to(&self, positions: HandPositions) -> Result<()> {
        self.set_all(positions, "move")
    }

    /// 用实测位置校正位置表并广播
    pub fn reconcile(&self, positions: HandPositions) -> Result<()> {
        self.set_all(positions, "reconcile")
    }

    /// 修改单个执行器的目标位置并广播整张表
    pub fn set_actuator(&self, id: ActuatorId, position: Position) -> Result<()> {
        self.request(|reply| ControlCommand::SetOne {
            id,
            position,
            reply,
        })?
    }

    /// 位置表的副本
    pub fn snapshot(&self) -> Result<HandPositions> {
        self.request(|reply| ControlCommand::Snapshot { reply })
    }

    fn set_all(&self, positions: HandPositions, reason: &'static str) -> Result<()> {
        self.request(|reply| ControlCommand::SetAll {
            positions,
            reason,
            reply,
        })?
    }
}

fn control_loop(
    driver: HandDriver,
    mode: Arc<AtomicJogMode>,
    mut table: HandPositions,
    rx: Receiver<ControlCommand>,
) {
    info!("Actuator control started");

    let broadcast = |table: &HandPositions| -> Result<()> {
        driver.broadcast_positions(table).map_err(ClientError::from)
    };

    while let Ok(command) = rx.recv() {
        match command {
            ControlCommand::Jog {
                id,
                direction,
                reply,
            } => {
                let step = mode.get(Ordering::Relaxed).step() * direction.sign();
                let slot = &mut table[id.index()];
                *slot = slot.offset(step);
                debug!("Jog actuator {} by {} -> {}", id, step, slot);
                let position = *slot;
                let _ = reply.send(broadcast(&table).map(|_| position));
            }
            ControlCommand::SetAll {
                positions,
                reason,
                reply,
            } => {
                table = positions;
                debug!("{}: {:?}", reason, table.map(|p| p.ticks()));
                let _ = reply.send(broadcast(&table));
            }
            ControlCommand::SetOne {
                id,
                position,
                reply,
            } => {
                table[id.index()] = position;
                let _ = reply.send(broadcast(&table));
            }
            ControlCommand::Snapshot { reply } => {
                let _ = reply.send(table);
            }
            ControlCommand::Shutdown => break,
        }
    }

    info!("Actuator control stopped");
}
