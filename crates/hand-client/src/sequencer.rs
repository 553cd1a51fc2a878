//! 脚本化动作
//!
//! 手势回放（到位等待 + 实测校正）、编排动作和"移动并等待到位"。
//! 每个脚本可以在调用线程同步执行，也可以作为 [`MotionTask`] 在独立线程执行；
//! 步骤之间检查 [`CancelToken`]，等待期间可以被立即打断。

use crate::cancel::CancelToken;
use crate::control::ActuatorHandle;
use crate::error::{ClientError, Result};
use crate::gesture::Gesture;
use hand_driver::HandDriver;
use hand_protocol::{
    ACTUATOR_COUNT, ActuatorId, HandPositions, MAX_POS, MIN_POS, Position, clamp_positions,
};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 动作配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 手势回放后等待机械到位的时间（毫秒）
    pub settle_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { settle_ms: 1500 }
    }
}

impl MotionConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// 脚本执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// 正常完成
    Completed,
    /// 被取消
    Cancelled,
    /// 未在期限内到位（仅 `move_and_wait`）
    TimedOut,
}

/// 编排中的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreographyStep {
    /// 目标位置（执行时截断到行程范围）
    pub positions: [i32; ACTUATOR_COUNT],
    /// 广播后保持的时间
    pub hold: Duration,
}

/// 编排：按顺序执行的 `{位置, 保持时间}` 列表
///
/// 执行结束（包括被取消）后总是回到全部收回的位置。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choreography {
    steps: Vec<ChoreographyStep>,
}

impl Choreography {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一步
    pub fn step(mut self, positions: [i32; ACTUATOR_COUNT], hold: Duration) -> Self {
        self.steps.push(ChoreographyStep { positions, hold });
        self
    }

    /// 延长上一步的保持时间
    pub fn pause(mut self, extra: Duration) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.hold += extra;
        }
        self
    }

    pub fn steps(&self) -> &[ChoreographyStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 总时长（各步保持时间之和）
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|s| s.hold).sum()
    }

    /// 从全部收回开始的演示动作
    pub fn dance() -> Self {
        Self::dance_from(&[Position::MIN; ACTUATOR_COUNT])
    }

    /// 演示动作
    ///
    /// 逐指伸出再逐指收回（两遍，第二遍节奏放慢），手指波浪约 10 秒，
    /// 全部收回后依次摆出两个手势。第一遍伸出时尚未轮到的执行器保持 `start` 位置。
    pub fn dance_from(start: &HandPositions) -> Self {
        const MIN: i32 = MIN_POS as i32;
        const MAX: i32 = MAX_POS as i32;
        const WAVE: [i32; 6] = [MIN, 500, 1000, 1500, 1000, 500];
        const WIGGLE_ROUNDS: usize = 9;

        let ms = Duration::from_millis;
        let mut choreo = Choreography::new();
        let mut table = start.map(|p| i32::from(p.ticks()));

        for (extend_hold, retract_hold) in [(ms(200), ms(500)), (ms(500), ms(500))] {
            for i in 0..ACTUATOR_COUNT {
                table[i] = MAX;
                choreo = choreo.step(table, extend_hold);
            }
            for i in (0..ACTUATOR_COUNT).rev() {
                table[i] = MIN;
                choreo = choreo.step(table, retract_hold);
            }
        }
        choreo = choreo.pause(ms(1000));

        let wave = |k: i32| WAVE[k.rem_euclid(WAVE.len() as i32) as usize];
        for _ in 0..WIGGLE_ROUNDS {
            for i in 1..=6 {
                let positions = [wave(i), wave(i - 1), wave(i - 2), wave(i - 3), wave(i - 4)];
                choreo = choreo.step(positions, ms(200));
            }
        }

        choreo
            .step([MIN; ACTUATOR_COUNT], ms(1000))
            .step([25, 25, 225, 1775, 1775], ms(3000))
            .step([1775, 25, 225, 25, 1775], ms(3000))
    }
}

/// 在独立线程运行的脚本
///
/// drop 时取消并等待线程退出。
pub struct MotionTask {
    name: String,
    cancel: CancelToken,
    handle: Option<thread::JoinHandle<Result<MotionOutcome>>>,
}

impl MotionTask {
    fn spawn(
        name: &str,
        cancel: CancelToken,
        work: impl FnOnce(CancelToken) -> Result<MotionOutcome> + Send + 'static,
    ) -> Result<Self> {
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name("hand-motion".into())
            .spawn(move || work(token))
            .map_err(|e| ClientError::Thread(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            cancel,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 请求取消（在下一个步骤边界或等待中生效）
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// 等待脚本结束
    pub fn join(mut self) -> Result<MotionOutcome> {
        self.wait()
    }

    fn wait(&mut self) -> Result<MotionOutcome> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ClientError::Thread(format!("motion task '{}' panicked", self.name)))?,
            None => Ok(MotionOutcome::Completed),
        }
    }
}

impl Drop for MotionTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
            if let Err(e) = self.wait() {
                warn!("Motion task '{}' failed: {}", self.name, e);
            }
        }
    }
}

/// 脚本执行器
#[derive(Clone)]
pub struct MotionSequencer {
    control: ActuatorHandle,
    driver: HandDriver,
    config: MotionConfig,
}

impl MotionSequencer {
    pub fn new(control: ActuatorHandle, driver: HandDriver, config: MotionConfig) -> Self {
        Self {
            control,
            driver,
            config,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// 回放手势
    ///
    /// 立即广播手势位置，等待 `settle` 后查询每个执行器的实际位置，
    /// 查询失败的执行器使用手势目标位置，最后用结果做一次校正广播并同步位置表。
    /// 等待期间被取消时不做校正。
    pub fn play_gesture(&self, gesture: &Gesture, cancel: &CancelToken) -> Result<MotionOutcome> {
        info!("Playing gesture '{}'", gesture.name());
        let target = *gesture.positions();
        self.control.move_to(target)?;

        if !cancel.sleep(self.config.settle()) {
            return Ok(MotionOutcome::Cancelled);
        }

        let actual = self.measured_or_target(&target);
        self.control.reconcile(actual)?;
        debug!(
            "Gesture '{}' reconciled to {:?}",
            gesture.name(),
            actual.map(Position::ticks)
        );
        Ok(MotionOutcome::Completed)
    }

    /// 每个执行器的实测位置，查询失败时退回到目标位置
    fn measured_or_target(&self, target: &HandPositions) -> HandPositions {
        let mut positions = *target;
        for id in ActuatorId::all() {
            match self.driver.query_status(id) {
                Ok(status) => positions[id.index()] = status.position_clamped(),
                Err(e) => warn!("{}; keeping commanded target", e),
            }
        }
        positions
    }

    /// 执行编排
    ///
    /// 每步截断后广播并保持指定时间；结束或被取消后都会全部收回。
    pub fn run_choreography(
        &self,
        choreography: &Choreography,
        cancel: &CancelToken,
    ) -> Result<MotionOutcome> {
        info!(
            "Running choreography ({} steps, {:?})",
            choreography.len(),
            choreography.duration()
        );
        let outcome = self.run_steps(choreography, cancel);
        let retracted = self.control.retract_all();

        let outcome = outcome?;
        retracted?;
        if outcome == MotionOutcome::Cancelled {
            info!("Choreography cancelled, hand retracted");
        }
        Ok(outcome)
    }

    fn run_steps(
        &self,
        choreography: &Choreography,
        cancel: &CancelToken,
    ) -> Result<MotionOutcome> {
        for step in choreography.steps() {
            if cancel.is_cancelled() {
                return Ok(MotionOutcome::Cancelled);
            }
            self.control.move_to(clamp_positions(step.positions))?;
            if !cancel.sleep(step.hold) {
                return Ok(MotionOutcome::Cancelled);
            }
        }
        Ok(MotionOutcome::Completed)
    }

    /// 广播目标位置并轮询直到所有执行器进入容差范围
    ///
    /// 任一执行器状态不可用时视为未到位。
    pub fn move_and_wait(
        &self,
        target: HandPositions,
        tolerance: u16,
        poll: Duration,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<MotionOutcome> {
        self.control.move_to(target)?;
        let deadline = Instant::now() + timeout;

        loop {
            if !cancel.sleep(poll) {
                return Ok(MotionOutcome::Cancelled);
            }
            let reached = ActuatorId::all().all(|id| match self.driver.query_status(id) {
                Ok(status) => {
                    let error = (status.position as i32 - target[id.index()].ticks() as i32).abs();
                    error <= tolerance as i32
                }
                Err(_) => false,
            });
            if reached {
                return Ok(MotionOutcome::Completed);
            }
            if Instant::now() >= deadline {
                warn!(
                    "Actuators did not reach {:?} within {:?}",
                    target.map(Position::ticks),
                    timeout
                );
                return Ok(MotionOutcome::TimedOut);
            }
        }
    }

    /// 在独立线程回放手势
    pub fn spawn_gesture(&self, gesture: Gesture) -> Result<MotionTask> {
        let sequencer = self.clone();
        let name = gesture.name().to_string();
        MotionTask::spawn(&name, CancelToken::new(), move |cancel| {
            sequencer.play_gesture(&gesture, &cancel)
        })
    }

    /// 在独立线程执行编排
    pub fn spawn_choreography(&self, name: &str, choreography: Choreography) -> Result<MotionTask> {
        let sequencer = self.clone();
        MotionTask::spawn(name, CancelToken::new(), move |cancel| {
            sequencer.run_choreography(&choreography, &cancel)
        })
    }
}
