//! 端到端集成测试
//!
//! 使用 `SimulatedHand` 驱动完整的协议/驱动/客户端栈。

use hand_sdk::prelude::*;
use hand_sdk::protocol::{WritableRegister, clamp_positions, decode_request};
use hand_serial::mock::{MockReply, MockSerialAdapter, SimulatedHand};
use std::thread;
use std::time::{Duration, Instant};

fn fast_link() -> LinkConfig {
    LinkConfig {
        read_timeout_ms: 50,
        write_timeout_ms: 50,
        settle_delay_ms: 0,
    }
}

fn driver(hand: &SimulatedHand) -> HandDriver {
    HandBuilder::new()
        .link_config(fast_link())
        .build_with_adapter(hand.adapter())
        .unwrap()
}

fn client(hand: &SimulatedHand, poller: bool) -> HandClient {
    let config = ClientConfig {
        poller: PollerConfig {
            sweep_interval_ms: 5,
            enabled: poller,
        },
        motion: MotionConfig { settle_ms: 5 },
        ..ClientConfig::default()
    };
    HandClient::new(driver(hand), config).unwrap()
}

fn id(n: u8) -> ActuatorId {
    ActuatorId::new(n).unwrap()
}

#[test]
fn status_of_all_actuators() {
    let hand = SimulatedHand::new();
    let driver = driver(&hand);

    let all = driver.query_all();
    assert!(all.iter().all(Option::is_some));
    assert_eq!(all[0].unwrap().position, 25);
    assert_eq!(hand.status_query_count(), 5);
}

#[test]
fn corrupt_and_silent_actuators_are_unavailable() {
    let hand = SimulatedHand::new();
    hand.set_corrupt(2, true);
    hand.set_offline(4, true);
    let driver = driver(&hand);

    let corrupt = driver.query_status(id(2)).unwrap_err();
    assert!(corrupt.is_checksum_mismatch());

    let started = Instant::now();
    let silent = driver.query_status(id(4)).unwrap_err();
    assert!(silent.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));

    let all = driver.query_all();
    assert!(all[1].is_none() && all[3].is_none());
    assert!(all[0].is_some() && all[2].is_some() && all[4].is_some());

    let metrics = driver.metrics().snapshot();
    assert!(metrics.frame_errors >= 2);
    assert!(metrics.read_timeouts >= 2);
}

#[test]
fn register_write_then_read() {
    let hand = SimulatedHand::new();
    let driver = driver(&hand);

    driver
        .write_position_by_name(id(3), "target-position", 900)
        .unwrap();
    assert_eq!(hand.commanded()[2], 900);
    assert_eq!(
        hand.register(3, Register::TargetPosition).unwrap(),
        vec![0x84, 0x03, 0x84, 0x03, 0x84, 0x03]
    );

    let values = driver.read_register(id(3), Register::CurrentPosition, 2).unwrap();
    assert_eq!(u16::from_le_bytes([values[0], values[1]]), 900);

    driver
        .write_position(id(1), WritableRegister::OverCurrentProtection, 300)
        .unwrap();
    assert!(hand.register(1, Register::OverCurrentProtection).is_some());

    let err = driver
        .write_position_by_name(id(1), "current-position", 10)
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Protocol(ProtocolError::InvalidRegister(_))
    ));
}

#[test]
fn read_register_without_reply_is_empty() {
    let adapter = MockSerialAdapter::silent();
    let driver = HandBuilder::new()
        .link_config(fast_link())
        .build_with_adapter(adapter)
        .unwrap();

    let values = driver.read_register(id(1), Register::Id, 1).unwrap();
    assert!(values.is_empty());
}

#[test]
fn gesture_playback_reconciles_to_measured_positions() {
    let hand = SimulatedHand::new();
    let mut client = client(&hand, false);

    client.actuators().extend_all().unwrap();
    client.capture_gesture("open").unwrap();
    client.actuators().retract_all().unwrap();

    // 第 2 号执行器到位偏差 -40，第 5 号离线
    hand.set_settle_error(2, -40);
    hand.set_offline(5, true);

    let outcome = client.play_gesture(0).unwrap().join().unwrap();
    assert_eq!(outcome, MotionOutcome::Completed);

    let table = client.actuators().snapshot().unwrap().map(Position::ticks);
    assert_eq!(table, [1775, 1735, 1775, 1775, 1475]);
    assert_eq!(hand.commanded(), table);
}

#[test]
fn saved_gestures_survive_reconnect() {
    let hand = SimulatedHand::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gestures.csv");

    let mut first = client(&hand, false);
    first
        .actuators()
        .move_to(clamp_positions([1775, 25, 225, 25, 1775]))
        .unwrap();
    first.capture_gesture("peace").unwrap();
    first.save_gestures(&path).unwrap();
    first.shutdown();

    let mut second = client(&hand, false);
    assert_eq!(hand.commanded(), [25; 5]);
    let loaded = second.load_gestures(&path).unwrap();
    assert_eq!(loaded.gestures.len(), 1);

    let outcome = second.play_gesture(0).unwrap().join().unwrap();
    assert_eq!(outcome, MotionOutcome::Completed);
    assert_eq!(hand.commanded(), [1775, 25, 225, 25, 1775]);
}

#[test]
fn cancelled_dance_ends_retracted() {
    let hand = SimulatedHand::new();
    let client = client(&hand, false);

    let task = client.dance().unwrap();
    thread::sleep(Duration::from_millis(150));
    task.cancel();

    assert_eq!(task.join().unwrap(), MotionOutcome::Cancelled);
    assert_eq!(hand.commanded(), [25; 5]);
}

#[test]
fn poller_and_jogs_never_interleave_frames() {
    let hand = SimulatedHand::new();
    let adapter = hand.adapter();
    let driver = HandBuilder::new()
        .link_config(fast_link())
        .build_with_adapter(adapter.clone())
        .unwrap();
    let config = ClientConfig {
        poller: PollerConfig {
            sweep_interval_ms: 1,
            enabled: true,
        },
        ..ClientConfig::default()
    };
    let client = HandClient::new(driver, config).unwrap();

    let jogger = {
        let handle = client.actuators();
        thread::spawn(move || {
            for i in 0..50u8 {
                let direction = if i % 2 == 0 {
                    JogDirection::Extend
                } else {
                    JogDirection::Retract
                };
                handle.jog(ActuatorId::new(i % 5 + 1).unwrap(), direction).unwrap();
            }
        })
    };
    jogger.join().unwrap();
    client.shutdown();

    let frames = adapter.written_frames();
    assert!(frames.len() > 50);
    for frame in frames {
        assert!(decode_request(&frame).is_ok(), "interleaved frame: {frame:02X?}");
    }
    assert!(hand.status_query_count() > 0);
}

#[test]
fn write_failure_degrades_status_query() {
    let adapter = MockSerialAdapter::new(|_| MockReply::WriteError(std::io::ErrorKind::TimedOut));
    let driver = HandBuilder::new()
        .link_config(fast_link())
        .build_with_adapter(adapter)
        .unwrap();

    assert!(driver.query_status(id(1)).is_err());
    assert!(driver.metrics().snapshot().write_timeouts >= 1);
}

#[test]
fn init_logging_is_idempotent() {
    hand_sdk::init_logging();
    assert!(!hand_sdk::init_logging_with("debug"));
}
