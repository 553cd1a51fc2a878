//! 请求帧构建与校验和
//!
//! 帧格式：`55 AA LEN ID CMD [PAYLOAD...] CHK`，
//! 校验和为 `LEN` 至 payload 末尾所有字节之和（取低 8 位）。

use crate::constants::{
    BROADCAST_ID, MAX_REGISTER_VALUES, REQUEST_HEADER, STATUS_QUERY_PARAMS,
};
use crate::ids::{ActuatorId, HandPositions};
use crate::register::Register;
use crate::{FrameError, ProtocolError};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use smallvec::SmallVec;

/// 编码后的帧字节（常见帧长度不超过 32 字节，无需堆分配）
pub type FrameBytes = SmallVec<[u8; 32]>;

/// 帧头 + 长度 + ID + 指令 占用的字节数
const FRAME_PREFIX_LEN: usize = 5;

/// 指令码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Command {
    /// 读寄存器（payload: 起始地址, 数量）
    ReadRegister = 0x01,
    /// 写寄存器（payload: 起始地址, 数据...）
    WriteRegister = 0x02,
    /// 单执行器状态查询（payload 固定 `00 22`）
    QueryStatus = 0x04,
    /// 广播定位（payload: 重复的 `[ID, 低字节, 高字节]`）
    BroadcastPosition = 0xF2,
}

impl Command {
    /// 计算长度字节
    ///
    /// 读寄存器时长度字节由请求的数量决定（`count + 2`），
    /// 其余指令为 `payload.len() + 1`：
    /// - 写寄存器：`values.len() + 2`
    /// - 广播定位：`1 + 3 × n`
    /// - 状态查询：固定 `3`
    pub fn length_byte(self, payload: &[u8]) -> usize {
        match self {
            Command::ReadRegister => match payload {
                [_, count, ..] => *count as usize + 2,
                _ => payload.len() + 1,
            },
            _ => payload.len() + 1,
        }
    }
}

/// 计算校验和（逐字节累加，取低 8 位）
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// 校验完整帧的末尾校验和字节
///
/// 校验范围为 `frame[2..len-1]`，请求帧与响应帧规则一致。
pub fn verify_checksum(frame: &[u8]) -> Result<(), FrameError> {
    if frame.len() < 3 {
        return Err(FrameError::Truncated {
            needed: 3,
            actual: frame.len(),
        });
    }
    let last = frame.len() - 1;
    let computed = checksum(&frame[2..last]);
    let received = frame[last];
    if computed == received {
        Ok(())
    } else {
        Err(FrameError::ChecksumMismatch { computed, received })
    }
}

/// 编码请求帧
///
/// # 错误
///
/// 长度字节超过 255 时返回 `ProtocolError::PayloadTooLarge`。
pub fn encode_request(
    target: u8,
    command: Command,
    payload: &[u8],
) -> Result<FrameBytes, ProtocolError> {
    let length = command.length_byte(payload);
    let length = u8::try_from(length).map_err(|_| ProtocolError::PayloadTooLarge {
        max: u8::MAX as usize - 1,
        actual: payload.len(),
    })?;
    Ok(encode_frame(length, target, command, payload))
}

fn encode_frame(length: u8, target: u8, command: Command, payload: &[u8]) -> FrameBytes {
    let mut frame = FrameBytes::with_capacity(FRAME_PREFIX_LEN + payload.len() + 1);
    frame.extend_from_slice(&REQUEST_HEADER);
    frame.push(length);
    frame.push(target);
    frame.push(command.into());
    frame.extend_from_slice(payload);
    let chk = checksum(&frame[2..]);
    frame.push(chk);
    frame
}

/// 构建读寄存器请求
///
/// # 错误
///
/// `count` 超过 [`MAX_REGISTER_VALUES`] 时返回 `PayloadTooLarge`。
pub fn read_register_request(
    id: ActuatorId,
    register: Register,
    count: u8,
) -> Result<FrameBytes, ProtocolError> {
    if count as usize > MAX_REGISTER_VALUES {
        return Err(ProtocolError::PayloadTooLarge {
            max: MAX_REGISTER_VALUES,
            actual: count as usize,
        });
    }
    encode_request(
        id.get(),
        Command::ReadRegister,
        &[register.address(), count],
    )
}

/// 构建写寄存器请求
pub fn write_register_request(
    id: ActuatorId,
    register: Register,
    values: &[u8],
) -> Result<FrameBytes, ProtocolError> {
    if values.len() > MAX_REGISTER_VALUES {
        return Err(ProtocolError::PayloadTooLarge {
            max: MAX_REGISTER_VALUES,
            actual: values.len(),
        });
    }
    let mut payload: SmallVec<[u8; 16]> = SmallVec::with_capacity(values.len() + 1);
    payload.push(register.address());
    payload.extend_from_slice(values);
    encode_request(id.get(), Command::WriteRegister, &payload)
}

/// 构建状态查询请求（固定 8 字节）
pub fn status_query_request(id: ActuatorId) -> FrameBytes {
    encode_frame(3, id.get(), Command::QueryStatus, &STATUS_QUERY_PARAMS)
}

/// 构建广播定位请求
///
/// 目标 ID 为 `0xFF`，每个执行器占 3 字节：ID、位置低字节、位置高字节。
pub fn broadcast_positions_request(positions: &HandPositions) -> FrameBytes {
    let mut payload: SmallVec<[u8; 16]> = SmallVec::with_capacity(positions.len() * 3);
    for (id, position) in ActuatorId::all().zip(positions.iter()) {
        let [lo, hi] = position.to_le_bytes();
        payload.extend_from_slice(&[id.get(), lo, hi]);
    }
    let length = (payload.len() + 1) as u8;
    encode_frame(length, BROADCAST_ID, Command::BroadcastPosition, &payload)
}

/// 位置类寄存器的写入数据
///
/// 设备要求同一个小端 u16 值连续重复三次（共 6 字节）。
pub fn position_register_values(value: u16) -> [u8; 6] {
    let [lo, hi] = value.to_le_bytes();
    [lo, hi, lo, hi, lo, hi]
}

/// 已解析的请求帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    pub length: u8,
    pub target: u8,
    pub command: Command,
    pub payload: SmallVec<[u8; 16]>,
    pub checksum: u8,
}

impl RequestFrame {
    /// 是否为广播帧
    pub fn is_broadcast(&self) -> bool {
        self.target == BROADCAST_ID
    }

    /// 广播帧中的 `(ID, 位置)` 列表
    ///
    /// 非广播帧返回空列表。
    pub fn broadcast_entries(&self) -> Vec<(u8, u16)> {
        if self.command != Command::BroadcastPosition {
            return Vec::new();
        }
        self.payload
            .chunks_exact(3)
            .map(|c| (c[0], u16::from_le_bytes([c[1], c[2]])))
            .collect()
    }
}

/// 解析请求帧（用于模拟设备和测试）
pub fn decode_request(bytes: &[u8]) -> Result<RequestFrame, FrameError> {
    if bytes.len() < FRAME_PREFIX_LEN + 1 {
        return Err(FrameError::Truncated {
            needed: FRAME_PREFIX_LEN + 1,
            actual: bytes.len(),
        });
    }
    if bytes[0..2] != REQUEST_HEADER {
        return Err(FrameError::InvalidHeader {
            found: [bytes[0], bytes[1]],
        });
    }
    verify_checksum(bytes)?;

    let command = Command::try_from(bytes[4]).map_err(|_| FrameError::UnknownCommand(bytes[4]))?;
    let last = bytes.len() - 1;

    Ok(RequestFrame {
        length: bytes[2],
        target: bytes[3],
        command,
        payload: SmallVec::from_slice(&bytes[FRAME_PREFIX_LEN..last]),
        checksum: bytes[last],
    })
}
