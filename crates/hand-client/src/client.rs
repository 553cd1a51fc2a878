//! 灵巧手客户端
//!
//! 组合位置表所有者线程、手势库、脚本执行器和后台状态轮询。

use crate::cancel::CancelToken;
use crate::control::{ActuatorControl, ActuatorHandle, retracted_positions};
use crate::error::{ClientError, Result};
use crate::gesture::{Gesture, GestureError, GestureStore, LoadedGestures};
use crate::mode::{AtomicJogMode, JogMode};
use crate::sequencer::{Choreography, MotionConfig, MotionOutcome, MotionSequencer, MotionTask};
use hand_driver::{HandDriver, HandTelemetry, PollerConfig, StatusPoller, StatusUnavailable};
use hand_protocol::{ActuatorId, ActuatorStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub poller: PollerConfig,
    pub motion: MotionConfig,
    /// 启动时广播全部收回
    pub retract_on_start: bool,
    pub jog_mode: JogMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            motion: MotionConfig::default(),
            retract_on_start: true,
            jog_mode: JogMode::Normal,
        }
    }
}

/// 灵巧手客户端
pub struct HandClient {
    poller: Option<StatusPoller>,
    sequencer: MotionSequencer,
    control: ActuatorControl,
    gestures: GestureStore,
    driver: HandDriver,
}

impl HandClient {
    /// 启动客户端
    ///
    /// 位置表初始为全部收回；`retract_on_start` 为真时同时广播一次。
    pub fn new(driver: HandDriver, config: ClientConfig) -> Result<Self> {
        let mode = Arc::new(AtomicJogMode::new(config.jog_mode));
        let control = ActuatorControl::spawn(driver.clone(), mode, retracted_positions())?;
        if config.retract_on_start {
            control.handle().retract_all()?;
        }

        let poller = if config.poller.enabled {
            Some(StatusPoller::spawn(driver.clone(), config.poller.clone())?)
        } else {
            None
        };

        let sequencer = MotionSequencer::new(control.handle(), driver.clone(), config.motion);
        info!("Hand client started");

        Ok(Self {
            poller,
            sequencer,
            control,
            gestures: GestureStore::new(),
            driver,
        })
    }

    pub fn driver(&self) -> &HandDriver {
        &self.driver
    }

    /// 位置控制句柄
    pub fn actuators(&self) -> ActuatorHandle {
        self.control.handle()
    }

    pub fn sequencer(&self) -> &MotionSequencer {
        &self.sequencer
    }

    pub fn gestures(&self) -> &GestureStore {
        &self.gestures
    }

    pub fn gestures_mut(&mut self) -> &mut GestureStore {
        &mut self.gestures
    }

    /// 后台轮询的最新结果（未启用轮询时为 `None`）
    pub fn telemetry(&self) -> Option<Arc<HandTelemetry>> {
        self.poller.as_ref().map(StatusPoller::latest)
    }

    /// 直接查询单个执行器状态
    pub fn query_status(&self, id: ActuatorId) -> std::result::Result<ActuatorStatus, StatusUnavailable> {
        self.driver.query_status(id)
    }

    /// 以当前位置表创建手势
    pub fn capture_gesture(&mut self, name: impl Into<String>) -> Result<&Gesture> {
        let snapshot = self.control.handle().snapshot()?;
        Ok(self.gestures.capture(name, snapshot)?)
    }

    fn gesture(&self, index: usize) -> Result<Gesture> {
        self.gestures.get(index).cloned().ok_or_else(|| {
            ClientError::Gesture(GestureError::IndexOutOfRange {
                index,
                len: self.gestures.len(),
            })
        })
    }

    /// 在后台回放手势
    pub fn play_gesture(&self, index: usize) -> Result<MotionTask> {
        self.sequencer.spawn_gesture(self.gesture(index)?)
    }

    /// 在当前线程回放手势
    pub fn play_gesture_blocking(&self, index: usize, cancel: &CancelToken) -> Result<MotionOutcome> {
        self.sequencer.play_gesture(&self.gesture(index)?, cancel)
    }

    /// 在后台执行演示动作（从当前位置表开始）
    pub fn dance(&self) -> Result<MotionTask> {
        let start = self.control.handle().snapshot()?;
        self.sequencer
            .spawn_choreography("dance", Choreography::dance_from(&start))
    }

    /// 从文件加载手势（替换当前手势库）
    pub fn load_gestures(&mut self, path: impl AsRef<Path>) -> Result<LoadedGestures> {
        let loaded = GestureStore::load_from_file(path)?;
        self.gestures.replace_all(loaded.gestures.clone());
        Ok(loaded)
    }

    /// 保存手势到文件
    pub fn save_gestures(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.gestures.save_to_file(path)?)
    }

    /// 停止后台线程
    pub fn shutdown(mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.shutdown();
        }
        self.control.shutdown();
        info!("Hand client stopped");
    }
}
