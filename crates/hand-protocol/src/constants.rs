//! 协议常量定义
//!
//! 集中定义所有协议相关的常量，避免在代码中散落"魔法数"。

/// 请求帧头（主机 → 执行器）
pub const REQUEST_HEADER: [u8; 2] = [0x55, 0xAA];

/// 响应帧头（执行器 → 主机，字节顺序与请求相反）
pub const RESPONSE_HEADER: [u8; 2] = [0xAA, 0x55];

/// 广播目标 ID
pub const BROADCAST_ID: u8 = 0xFF;

/// 状态查询指令的固定参数
pub const STATUS_QUERY_PARAMS: [u8; 2] = [0x00, 0x22];

/// 状态查询响应帧的固定长度（字节）
pub const STATUS_RESPONSE_LEN: usize = 22;

/// 寄存器读取响应中数据区的起始偏移
pub const REGISTER_VALUES_OFFSET: usize = 6;

/// 单次寄存器写入允许的最大数据字节数
///
/// 长度字节为 `values.len() + 2`，必须能装入一个字节。
pub const MAX_REGISTER_VALUES: usize = 64;

/// 执行器数量（ID 1-5）
///
/// 部分广播帧中存在第 6 个槽位，当前保留未用。
pub const ACTUATOR_COUNT: usize = 5;

/// 最小行程（完全收回）
pub const MIN_POS: u16 = 25;

/// 最大行程（完全伸出）
pub const MAX_POS: u16 = 1775;

/// 全部伸出时第 5 号执行器的回退量
///
/// 第 5 号执行器伸到最大行程会与第 4 号发生机械干涉。
pub const EXTEND_ALL_ACTUATOR5_OFFSET: u16 = 300;

/// 默认串口波特率
pub const DEFAULT_BAUD_RATE: u32 = 921_600;
