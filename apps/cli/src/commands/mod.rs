//! 命令定义和实现

pub mod config;
pub mod gesture;
pub mod motion;
pub mod register;
pub mod status;

pub use config::ConfigCommand;
pub use gesture::GestureCommand;
pub use motion::{JogCommand, MoveCommand};
pub use register::{ReadRegisterCommand, WritePositionCommand};
pub use status::{MonitorCommand, StatusCommand};
