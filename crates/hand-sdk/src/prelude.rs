//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use hand_sdk::prelude::*;
//! ```

// 客户端层
pub use hand_client::{
    CancelToken, Choreography, ClientConfig, Gesture, GestureStore, HandClient, JogDirection,
    JogMode, MotionConfig, MotionOutcome, MotionTask,
};

// 驱动层
pub use hand_driver::{HandBuilder, HandDriver, HandTelemetry, LinkConfig, PollerConfig};

// 协议层
pub use hand_protocol::{ActuatorId, ActuatorStatus, HandPositions, Position, Register};

// 串口层
pub use hand_serial::SerialAdapter;

// 错误类型
pub use hand_client::{ClientError, GestureError};
pub use hand_driver::{DriverError, StatusUnavailable};
pub use hand_protocol::{FrameError, ProtocolError};
pub use hand_serial::SerialError;
