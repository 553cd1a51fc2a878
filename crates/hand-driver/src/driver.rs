//! 灵巧手驱动
//!
//! 所有协议操作都经过 [`TransportGuard::exchange`]。

use crate::config::LinkConfig;
use crate::error::DriverError;
use crate::metrics::LinkMetrics;
use crate::status::{StatusUnavailable, UnavailableCause};
use crate::transport::{Expect, TransportGuard};
use hand_protocol::{
    ACTUATOR_COUNT, ActuatorId, ActuatorStatus, HandPositions, REGISTER_VALUES_OFFSET, Register,
    STATUS_RESPONSE_LEN, WritableRegister, broadcast_positions_request,
    decode_register_read_response, decode_status_response, position_register_values,
    read_register_request, status_query_request, write_register_request,
};
use hand_serial::SerialAdapter;
use std::sync::Arc;
use tracing::{debug, warn};

/// 灵巧手驱动
///
/// 克隆开销很小，所有克隆共享同一个 [`TransportGuard`]。
#[derive(Clone)]
pub struct HandDriver {
    transport: Arc<TransportGuard>,
}

impl HandDriver {
    /// 使用已打开的串口适配器创建驱动
    pub fn new(adapter: impl SerialAdapter + 'static, config: LinkConfig) -> Result<Self, DriverError> {
        Ok(Self {
            transport: Arc::new(TransportGuard::new(adapter, config)?),
        })
    }

    pub fn transport(&self) -> &Arc<TransportGuard> {
        &self.transport
    }

    pub fn metrics(&self) -> &Arc<LinkMetrics> {
        self.transport.metrics()
    }

    /// 读取寄存器
    ///
    /// 设备未应答时返回空列表（"无数据"）。
    pub fn read_register(
        &self,
        id: ActuatorId,
        register: Register,
        count: u8,
    ) -> Result<Vec<u8>, DriverError> {
        let request = read_register_request(id, register, count)?;
        let expected = REGISTER_VALUES_OFFSET + count as usize + 1;
        let response = self.transport.exchange(&request, Expect::Exact(expected))?;

        decode_register_read_response(&response.bytes, count).map_err(|e| {
            LinkMetrics::add(&self.metrics().frame_errors, 1);
            warn!("Invalid register read response from actuator {}: {}", id, e);
            DriverError::Frame(e)
        })
    }

    /// 写入寄存器
    ///
    /// 设备的确认应答会被读出并丢弃。
    pub fn write_register(
        &self,
        id: ActuatorId,
        register: Register,
        values: &[u8],
    ) -> Result<(), DriverError> {
        let request = write_register_request(id, register, values)?;
        let ack = self.transport.exchange(&request, Expect::Drain)?;
        debug!(
            "Wrote {} to actuator {} ({} ack bytes discarded)",
            register,
            id,
            ack.bytes.len()
        );
        Ok(())
    }

    /// 写入位置类寄存器（值以小端 u16 重复三次编码）
    pub fn write_position(
        &self,
        id: ActuatorId,
        register: WritableRegister,
        value: u16,
    ) -> Result<(), DriverError> {
        self.write_register(id, register.register(), &position_register_values(value))
    }

    /// 按名称写入位置类寄存器
    ///
    /// # 错误
    ///
    /// 名称不在白名单中时返回 `DriverError::Protocol(ProtocolError::InvalidRegister)`。
    pub fn write_position_by_name(
        &self,
        id: ActuatorId,
        name: &str,
        value: u16,
    ) -> Result<(), DriverError> {
        let register: WritableRegister = name.parse()?;
        self.write_position(id, register, value)
    }

    /// 广播全部执行器的目标位置（不读取应答）
    pub fn broadcast_positions(&self, positions: &HandPositions) -> Result<(), DriverError> {
        let request = broadcast_positions_request(positions);
        self.transport.exchange(&request, Expect::Nothing)?;
        LinkMetrics::add(&self.metrics().broadcasts_total, 1);
        debug!("Broadcast positions {:?}", positions.map(|p| p.ticks()));
        Ok(())
    }

    /// 查询单个执行器的实时状态
    pub fn query_status(&self, id: ActuatorId) -> Result<ActuatorStatus, StatusUnavailable> {
        let request = status_query_request(id);
        let response = self
            .transport
            .exchange(&request, Expect::Exact(STATUS_RESPONSE_LEN))
            .map_err(|e| StatusUnavailable::new(id, UnavailableCause::Transport(e.to_string())))?;

        if response.timed_out {
            return Err(StatusUnavailable::new(id, UnavailableCause::Timeout));
        }

        decode_status_response(&response.bytes).map_err(|e| {
            LinkMetrics::add(&self.metrics().frame_errors, 1);
            StatusUnavailable::new(id, e)
        })
    }

    /// 依次查询全部执行器，不可用的执行器为 `None`
    pub fn query_all(&self) -> [Option<ActuatorStatus>; ACTUATOR_COUNT] {
        let mut result = [None; ACTUATOR_COUNT];
        for id in ActuatorId::all() {
            match self.query_status(id) {
                Ok(status) => result[id.index()] = Some(status),
                Err(e) => warn!("{}", e),
            }
        }
        result
    }
}
