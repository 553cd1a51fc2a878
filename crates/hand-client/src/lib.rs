//! # Hand Client
//!
//! 灵巧手高层控制：位置表所有者线程、点动模式、手势库与脚本化动作。
//!
//! ```rust,no_run
//! use hand_client::{ClientConfig, HandClient, JogDirection};
//! use hand_driver::HandBuilder;
//! use hand_protocol::ActuatorId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = HandBuilder::new().port("/dev/ttyUSB0").build()?;
//! let client = HandClient::new(driver, ClientConfig::default())?;
//!
//! let thumb = ActuatorId::new(1)?;
//! client.actuators().jog(thumb, JogDirection::Extend)?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
mod client;
pub mod control;
mod error;
pub mod gesture;
pub mod mode;
pub mod sequencer;

pub use cancel::CancelToken;
pub use client::{ClientConfig, HandClient};
pub use control::{
    ActuatorControl, ActuatorHandle, JogDirection, extended_positions, retracted_positions,
};
pub use error::{ClientError, Result};
pub use gesture::{
    DEFAULT_GESTURE_FILE, Gesture, GestureError, GestureStore, LoadedGestures, MAX_GESTURES,
};
pub use mode::{AtomicJogMode, JogMode};
pub use sequencer::{
    Choreography, ChoreographyStep, MotionConfig, MotionOutcome, MotionSequencer, MotionTask,
};
