//! 模拟串口适配器
//!
//! 用于无硬件测试：记录所有写入的帧，并通过回调为每个请求生成应答。
//! [`SimulatedHand`] 在此基础上模拟一只五执行器灵巧手。

use crate::{SerialAdapter, SerialError};
use hand_protocol::{
    ACTUATOR_COUNT, ActuatorStatus, Command, MIN_POS, Register, decode_request,
    encode_register_read_response, encode_status_response,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// 模拟设备对一个请求的应答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// 放入输入缓冲区的字节
    Bytes(Vec<u8>),
    /// 不应答（后续读取会超时）
    Silence,
    /// 写入失败
    WriteError(std::io::ErrorKind),
}

type Responder = Box<dyn FnMut(&[u8]) -> MockReply + Send>;

struct MockState {
    responder: Responder,
    pending: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    clear_count: usize,
    timeouts: Option<(Duration, Duration)>,
}

/// 模拟串口适配器
///
/// 克隆后共享同一份内部状态，测试可以在适配器交给驱动后继续检查写入记录。
#[derive(Clone)]
pub struct MockSerialAdapter {
    state: Arc<Mutex<MockState>>,
}

impl MockSerialAdapter {
    /// 使用应答回调创建
    pub fn new(responder: impl FnMut(&[u8]) -> MockReply + Send + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                responder: Box::new(responder),
                pending: VecDeque::new(),
                written: Vec::new(),
                clear_count: 0,
                timeouts: None,
            })),
        }
    }

    /// 从不应答的设备
    pub fn silent() -> Self {
        Self::new(|_| MockReply::Silence)
    }

    /// 已写入的所有帧（按写入顺序）
    pub fn written_frames(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// 清空写入记录
    pub fn clear_written(&self) {
        self.state.lock().written.clear();
    }

    /// 向输入缓冲区注入字节（模拟残留数据）
    pub fn inject_input(&self, bytes: &[u8]) {
        self.state.lock().pending.extend(bytes.iter().copied());
    }

    /// 输入缓冲区中尚未读取的字节数
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// `clear_input` 被调用的次数
    pub fn clear_count(&self) -> usize {
        self.state.lock().clear_count
    }

    /// 最近一次设置的 `(读超时, 写超时)`
    pub fn timeouts(&self) -> Option<(Duration, Duration)> {
        self.state.lock().timeouts
    }
}

impl SerialAdapter for MockSerialAdapter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        state.written.push(bytes.to_vec());
        match (state.responder)(bytes) {
            MockReply::Bytes(reply) => {
                state.pending.extend(reply);
                Ok(())
            }
            MockReply::Silence => Ok(()),
            MockReply::WriteError(std::io::ErrorKind::TimedOut) => Err(SerialError::WriteTimeout),
            MockReply::WriteError(kind) => Err(std::io::Error::from(kind).into()),
        }
    }

    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, SerialError> {
        if max == 0 {
            return Ok(Vec::new());
        }
        let mut state = self.state.lock();
        if state.pending.is_empty() {
            return Err(SerialError::Timeout);
        }
        let n = max.min(state.pending.len());
        Ok(state.pending.drain(..n).collect())
    }

    fn read_available(&mut self) -> Result<Vec<u8>, SerialError> {
        Ok(self.state.lock().pending.drain(..).collect())
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        state.pending.clear();
        state.clear_count += 1;
        Ok(())
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> Result<(), SerialError> {
        self.state.lock().timeouts = Some((read, write));
        Ok(())
    }
}

#[derive(Debug)]
struct HandState {
    commanded: [u16; ACTUATOR_COUNT],
    /// 实际位置相对指令位置的偏差（模拟机械误差）
    settle_error: [i32; ACTUATOR_COUNT],
    offline: [bool; ACTUATOR_COUNT],
    corrupt: [bool; ACTUATOR_COUNT],
    temperature: i8,
    registers: HashMap<(u8, u8), Vec<u8>>,
    broadcasts: usize,
    status_queries: usize,
}

impl HandState {
    fn actual(&self, index: usize) -> i16 {
        (self.commanded[index] as i32 + self.settle_error[index]) as i16
    }
}

/// 模拟的五执行器灵巧手
///
/// 记录广播和位置寄存器写入的目标位置，按目标位置（加上可配置的偏差）
/// 应答状态查询；可以让指定执行器离线或返回损坏的帧。
#[derive(Clone)]
pub struct SimulatedHand {
    state: Arc<Mutex<HandState>>,
}

impl Default for SimulatedHand {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHand {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HandState {
                commanded: [MIN_POS; ACTUATOR_COUNT],
                settle_error: [0; ACTUATOR_COUNT],
                offline: [false; ACTUATOR_COUNT],
                corrupt: [false; ACTUATOR_COUNT],
                temperature: 30,
                registers: HashMap::new(),
                broadcasts: 0,
                status_queries: 0,
            })),
        }
    }

    /// 创建连接到本设备的串口适配器
    pub fn adapter(&self) -> MockSerialAdapter {
        let hand = self.clone();
        MockSerialAdapter::new(move |request| hand.respond(request))
    }

    /// 当前目标位置
    pub fn commanded(&self) -> [u16; ACTUATOR_COUNT] {
        self.state.lock().commanded
    }

    /// 当前实际位置（目标位置 + 偏差）
    pub fn actual(&self) -> [i16; ACTUATOR_COUNT] {
        let state = self.state.lock();
        std::array::from_fn(|i| state.actual(i))
    }

    /// 设置执行器的到位偏差
    pub fn set_settle_error(&self, id: u8, delta: i32) {
        if let Some(i) = Self::index(id) {
            self.state.lock().settle_error[i] = delta;
        }
    }

    /// 设置执行器离线（状态查询不应答）
    pub fn set_offline(&self, id: u8, offline: bool) {
        if let Some(i) = Self::index(id) {
            self.state.lock().offline[i] = offline;
        }
    }

    /// 设置执行器应答损坏的状态帧（校验和错误）
    pub fn set_corrupt(&self, id: u8, corrupt: bool) {
        if let Some(i) = Self::index(id) {
            self.state.lock().corrupt[i] = corrupt;
        }
    }

    /// 寄存器的最后写入值
    pub fn register(&self, id: u8, register: Register) -> Option<Vec<u8>> {
        self.state
            .lock()
            .registers
            .get(&(id, register.address()))
            .cloned()
    }

    /// 预置寄存器内容（用于读寄存器测试）
    pub fn set_register(&self, id: u8, register: Register, values: &[u8]) {
        self.state
            .lock()
            .registers
            .insert((id, register.address()), values.to_vec());
    }

    /// 收到的广播帧数量
    pub fn broadcast_count(&self) -> usize {
        self.state.lock().broadcasts
    }

    /// 收到的状态查询数量
    pub fn status_query_count(&self) -> usize {
        self.state.lock().status_queries
    }

    fn index(id: u8) -> Option<usize> {
        (1..=ACTUATOR_COUNT as u8)
            .contains(&id)
            .then(|| id as usize - 1)
    }

    fn respond(&self, request: &[u8]) -> MockReply {
        let Ok(frame) = decode_request(request) else {
            return MockReply::Silence;
        };
        let mut state = self.state.lock();

        match frame.command {
            Command::BroadcastPosition => {
                state.broadcasts += 1;
                for (id, position) in frame.broadcast_entries() {
                    if let Some(i) = Self::index(id) {
                        state.commanded[i] = position;
                    }
                }
                MockReply::Silence
            }
            Command::QueryStatus => {
                state.status_queries += 1;
                let Some(i) = Self::index(frame.target) else {
                    return MockReply::Silence;
                };
                if state.offline[i] {
                    return MockReply::Silence;
                }
                let status = ActuatorStatus {
                    position: state.actual(i),
                    temperature: state.temperature,
                    current: 0,
                    force: 0,
                };
                let mut reply = encode_status_response(frame.target, &status).to_vec();
                if state.corrupt[i]
                    && let Some(last) = reply.last_mut()
                {
                    *last = last.wrapping_add(1);
                }
                MockReply::Bytes(reply)
            }
            Command::WriteRegister => {
                let Some((&address, values)) = frame.payload.split_first() else {
                    return MockReply::Silence;
                };
                if address == Register::TargetPosition.address()
                    && values.len() >= 2
                    && let Some(i) = Self::index(frame.target)
                {
                    state.commanded[i] = u16::from_le_bytes([values[0], values[1]]);
                }
                state
                    .registers
                    .insert((frame.target, address), values.to_vec());
                MockReply::Bytes(encode_register_read_response(frame.target, address, &[]))
            }
            Command::ReadRegister => {
                let &[address, count] = &frame.payload[..] else {
                    return MockReply::Silence;
                };
                let mut values = if address == Register::CurrentPosition.address() {
                    Self::index(frame.target)
                        .map(|i| state.actual(i).to_le_bytes().to_vec())
                        .unwrap_or_default()
                } else {
                    state
                        .registers
                        .get(&(frame.target, address))
                        .cloned()
                        .unwrap_or_default()
                };
                values.resize(count as usize, 0);
                MockReply::Bytes(encode_register_read_response(frame.target, address, &values))
            }
        }
    }
}
