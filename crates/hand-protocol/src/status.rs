//! 响应帧解析
//!
//! 解析失败时只返回 [`FrameError`]，不会返回部分解析的数据。

use crate::FrameError;
use crate::constants::{
    REGISTER_VALUES_OFFSET, RESPONSE_HEADER, STATUS_QUERY_PARAMS, STATUS_RESPONSE_LEN,
};
use crate::frame::{Command, checksum, verify_checksum};
use crate::ids::Position;

/// 状态响应中各字段的字节偏移
mod offset {
    pub const POSITION: usize = 9;
    pub const TEMPERATURE: usize = 11;
    pub const CURRENT: usize = 12;
    pub const FORCE: usize = 14;
}

/// 执行器实时状态
///
/// 仅代表读取瞬间的设备状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActuatorStatus {
    /// 当前行程（有符号，设备可能上报超出行程范围的值）
    pub position: i16,
    /// 温度（℃）
    pub temperature: i8,
    /// 电流
    pub current: u16,
    /// 力传感器读数
    pub force: i16,
}

impl ActuatorStatus {
    /// 截断到合法行程范围的位置
    pub fn position_clamped(&self) -> Position {
        Position::clamped(self.position as i32)
    }
}

/// 解析状态查询响应
///
/// 要求：恰好 22 字节，帧头 `AA 55`，`bytes[2..21]` 的校验和等于 `bytes[21]`。
pub fn decode_status_response(bytes: &[u8]) -> Result<ActuatorStatus, FrameError> {
    if bytes.len() != STATUS_RESPONSE_LEN {
        return Err(FrameError::InvalidLength {
            expected: STATUS_RESPONSE_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[0..2] != RESPONSE_HEADER {
        return Err(FrameError::InvalidHeader {
            found: [bytes[0], bytes[1]],
        });
    }
    verify_checksum(bytes)?;

    let le_i16 = |at: usize| i16::from_le_bytes([bytes[at], bytes[at + 1]]);

    Ok(ActuatorStatus {
        position: le_i16(offset::POSITION),
        temperature: bytes[offset::TEMPERATURE] as i8,
        current: u16::from_le_bytes([bytes[offset::CURRENT], bytes[offset::CURRENT + 1]]),
        force: le_i16(offset::FORCE),
    })
}

/// 解析寄存器读取响应
///
/// - 空响应表示"无数据"，返回空列表而非错误
/// - 数据个数为 `bytes[2] - 2`，数据从偏移 6 开始
/// - 设备上报的个数多于请求个数时视为帧错误
pub fn decode_register_read_response(
    bytes: &[u8],
    requested_count: u8,
) -> Result<Vec<u8>, FrameError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.len() < 3 {
        return Err(FrameError::Truncated {
            needed: 3,
            actual: bytes.len(),
        });
    }
    if bytes[0..2] != RESPONSE_HEADER {
        return Err(FrameError::InvalidHeader {
            found: [bytes[0], bytes[1]],
        });
    }

    let count = bytes[2]
        .checked_sub(2)
        .ok_or(FrameError::InvalidLengthByte(bytes[2]))? as usize;
    if count > requested_count as usize {
        return Err(FrameError::CountMismatch {
            requested: requested_count,
            reported: count,
        });
    }

    let end = REGISTER_VALUES_OFFSET + count;
    if bytes.len() < end {
        return Err(FrameError::Truncated {
            needed: end,
            actual: bytes.len(),
        });
    }

    Ok(bytes[REGISTER_VALUES_OFFSET..end].to_vec())
}

/// 编码状态查询响应（模拟设备使用）
pub fn encode_status_response(id: u8, status: &ActuatorStatus) -> [u8; STATUS_RESPONSE_LEN] {
    let mut frame = [0u8; STATUS_RESPONSE_LEN];
    frame[0..2].copy_from_slice(&RESPONSE_HEADER);
    frame[2] = (STATUS_RESPONSE_LEN - 4) as u8;
    frame[3] = id;
    frame[4] = Command::QueryStatus.into();
    frame[5..7].copy_from_slice(&STATUS_QUERY_PARAMS);
    frame[offset::POSITION..offset::POSITION + 2].copy_from_slice(&status.position.to_le_bytes());
    frame[offset::TEMPERATURE] = status.temperature as u8;
    frame[offset::CURRENT..offset::CURRENT + 2].copy_from_slice(&status.current.to_le_bytes());
    frame[offset::FORCE..offset::FORCE + 2].copy_from_slice(&status.force.to_le_bytes());
    frame[STATUS_RESPONSE_LEN - 1] = checksum(&frame[2..STATUS_RESPONSE_LEN - 1]);
    frame
}

/// 编码寄存器读取响应（模拟设备使用）
pub fn encode_register_read_response(id: u8, address: u8, values: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(REGISTER_VALUES_OFFSET + values.len() + 1);
    frame.extend_from_slice(&RESPONSE_HEADER);
    frame.push((values.len() + 2) as u8);
    frame.push(id);
    frame.push(Command::ReadRegister.into());
    frame.push(address);
    frame.extend_from_slice(values);
    let chk = checksum(&frame[2..]);
    frame.push(chk);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActuatorStatus {
        ActuatorStatus {
            position: 100,
            temperature: 36,
            current: 250,
            force: -42,
        }
    }

    #[test]
    fn test_decode_valid_status() {
        let frame = encode_status_response(1, &sample());
        assert_eq!(&frame[9..11], &[0x64, 0x00]);
        assert_eq!(decode_status_response(&frame).unwrap(), sample());
    }

    #[test]
    fn test_decode_negative_position() {
        let status = ActuatorStatus {
            position: -100,
            ..sample()
        };
        let frame = encode_status_response(2, &status);
        assert_eq!(&frame[9..11], &[0x9C, 0xFF]);

        let decoded = decode_status_response(&frame).unwrap();
        assert_eq!(decoded.position, -100);
        assert_eq!(decoded.position_clamped(), Position::MIN);
    }

    #[test]
    fn test_decode_wrong_length() {
        let frame = encode_status_response(1, &sample());
        assert_eq!(
            decode_status_response(&frame[..21]),
            Err(FrameError::InvalidLength {
                expected: 22,
                actual: 21
            })
        );
        assert!(decode_status_response(&[]).is_err());
    }

    #[test]
    fn test_decode_request_header_rejected() {
        let mut frame = encode_status_response(1, &sample());
        frame[0] = 0x55;
        frame[1] = 0xAA;
        assert!(matches!(
            decode_status_response(&frame),
            Err(FrameError::InvalidHeader { found: [0x55, 0xAA] })
        ));
    }

    #[test]
    fn test_every_single_byte_corruption_fails() {
        let frame = encode_status_response(3, &sample());
        for i in 0..frame.len() {
            let mut corrupted = frame;
            corrupted[i] = corrupted[i].wrapping_add(1);
            assert!(
                decode_status_response(&corrupted).is_err(),
                "corruption at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_register_read_empty_is_no_data() {
        assert_eq!(decode_register_read_response(&[], 2), Ok(vec![]));
    }

    #[test]
    fn test_register_read_values() {
        let frame = encode_register_read_response(1, 26, &[0xE8, 0x03]);
        assert_eq!(frame[2], 4);
        assert_eq!(
            decode_register_read_response(&frame, 2).unwrap(),
            vec![0xE8, 0x03]
        );
    }

    #[test]
    fn test_register_read_shorter_count_accepted() {
        let frame = encode_register_read_response(1, 26, &[0x01]);
        assert_eq!(decode_register_read_response(&frame, 4).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_register_read_errors() {
        let frame = encode_register_read_response(1, 26, &[1, 2, 3]);
        assert_eq!(
            decode_register_read_response(&frame, 2),
            Err(FrameError::CountMismatch {
                requested: 2,
                reported: 3
            })
        );

        assert!(matches!(
            decode_register_read_response(&frame[..7], 3),
            Err(FrameError::Truncated { needed: 9, .. })
        ));

        assert_eq!(
            decode_register_read_response(&[0xAA, 0x55, 0x01, 0x01], 2),
            Err(FrameError::InvalidLengthByte(1))
        );

        assert!(matches!(
            decode_register_read_response(&[0xAA], 2),
            Err(FrameError::Truncated { needed: 3, actual: 1 })
        ));
    }
}
