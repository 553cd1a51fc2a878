//! 帧编解码的属性测试
//!
//! 使用 proptest 验证校验和定律与损坏检测。

use hand_protocol::*;
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = ActuatorStatus> {
    (any::<i16>(), any::<i8>(), any::<u16>(), any::<i16>()).prop_map(
        |(position, temperature, current, force)| ActuatorStatus {
            position,
            temperature,
            current,
            force,
        },
    )
}

fn any_positions() -> impl Strategy<Value = HandPositions> {
    prop::array::uniform5(-500i32..3000).prop_map(clamp_positions)
}

proptest! {
    /// 写寄存器请求：解码后的校验和等于重新计算的校验和
    #[test]
    fn write_request_checksum_law(
        id in 1u8..=5,
        values in prop::collection::vec(any::<u8>(), 0..=MAX_REGISTER_VALUES),
    ) {
        let id = ActuatorId::new(id).unwrap();
        let frame = write_register_request(id, Register::TargetPosition, &values).unwrap();
        let decoded = decode_request(&frame).unwrap();

        prop_assert_eq!(decoded.checksum, checksum(&frame[2..frame.len() - 1]));
        prop_assert_eq!(decoded.length as usize, values.len() + 2);
        prop_assert_eq!(&decoded.payload[1..], values.as_slice());
    }

    /// 广播请求：位置原样往返，长度字节恒为 16
    #[test]
    fn broadcast_request_roundtrip(positions in any_positions()) {
        let frame = broadcast_positions_request(&positions);
        let decoded = decode_request(&frame).unwrap();

        prop_assert_eq!(decoded.length, 16);
        prop_assert_eq!(decoded.target, BROADCAST_ID);
        let ticks: Vec<u16> = decoded.broadcast_entries().into_iter().map(|(_, p)| p).collect();
        let expected: Vec<u16> = positions.iter().map(|p| p.ticks()).collect();
        prop_assert_eq!(ticks, expected);
    }

    /// 合法状态帧的解码结果与编码输入一致
    #[test]
    fn status_response_roundtrip(id in 1u8..=5, status in any_status()) {
        let frame = encode_status_response(id, &status);
        prop_assert_eq!(decode_status_response(&frame).unwrap(), status);
    }

    /// 任意单字节损坏都会得到 FrameError
    #[test]
    fn status_single_byte_corruption(
        status in any_status(),
        index in 0usize..STATUS_RESPONSE_LEN,
        delta in 1u8..=255,
    ) {
        let mut frame = encode_status_response(1, &status);
        frame[index] = frame[index].wrapping_add(delta);
        prop_assert!(decode_status_response(&frame).is_err());
    }

    /// 任意字节序列要么解码成功，要么返回错误（不会 panic）
    #[test]
    fn status_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode_status_response(&bytes);
    }

    #[test]
    fn register_read_decode_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 0..80),
        requested in any::<u8>(),
    ) {
        if let Ok(values) = decode_register_read_response(&bytes, requested) {
            prop_assert!(values.len() <= requested as usize);
        }
    }
}
