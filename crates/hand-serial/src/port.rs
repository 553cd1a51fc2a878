//! 基于 `serialport` 的串口适配器

use crate::{SerialAdapter, SerialError};
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 默认读写超时
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// 真实串口适配器
pub struct SerialPortAdapter {
    port: Box<dyn SerialPort>,
    read_timeout: Duration,
    write_timeout: Duration,
    /// 当前已下发到驱动的超时，避免重复设置
    applied_timeout: Duration,
}

impl SerialPortAdapter {
    /// 打开串口
    ///
    /// # 参数
    ///
    /// - `port`: 设备路径，例如 `/dev/ttyUSB0` 或 `COM3`
    /// - `baud_rate`: 波特率
    /// - `read_timeout`: 读超时（写超时使用相同的初始值）
    pub fn open(port: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, SerialError> {
        let handle = serialport::new(port, baud_rate)
            .timeout(read_timeout)
            .open()?;

        debug!("Opened serial port {} at {} baud", port, baud_rate);

        Ok(Self {
            port: handle,
            read_timeout,
            write_timeout: read_timeout,
            applied_timeout: read_timeout,
        })
    }

    /// 使用默认超时（1 秒）打开串口
    pub fn open_default(port: &str, baud_rate: u32) -> Result<Self, SerialError> {
        Self::open(port, baud_rate, DEFAULT_TIMEOUT)
    }

    /// 端口名称（如果驱动提供）
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    fn apply_timeout(&mut self, timeout: Duration) -> Result<(), SerialError> {
        if self.applied_timeout != timeout {
            self.port.set_timeout(timeout)?;
            self.applied_timeout = timeout;
        }
        Ok(())
    }

    /// 在截止时间前尽量填满 `buf`，返回实际读取的字节数
    fn fill(&mut self, buf: &mut [u8], deadline: Instant) -> Result<usize, SerialError> {
        let mut filled = 0;
        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.apply_timeout(remaining)?;
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl SerialAdapter for SerialPortAdapter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let timeout = self.write_timeout;
        self.apply_timeout(timeout)?;
        trace!("TX {:02X?}", bytes);
        match self.port.write_all(bytes).and_then(|_| self.port.flush()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::TimedOut => Err(SerialError::WriteTimeout),
            Err(e) => Err(e.into()),
        }
    }

    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, SerialError> {
        if max == 0 {
            return Ok(Vec::new());
        }
        let deadline = Instant::now() + self.read_timeout;
        let mut buf = vec![0u8; max];
        let n = self.fill(&mut buf, deadline)?;
        if n == 0 {
            return Err(SerialError::Timeout);
        }
        buf.truncate(n);
        trace!("RX {:02X?}", buf);
        Ok(buf)
    }

    fn read_available(&mut self) -> Result<Vec<u8>, SerialError> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(Vec::new());
        }
        let deadline = Instant::now() + self.read_timeout;
        let mut buf = vec![0u8; pending];
        let n = self.fill(&mut buf, deadline)?;
        buf.truncate(n);
        trace!("RX (drain) {:02X?}", buf);
        Ok(buf)
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> Result<(), SerialError> {
        self.read_timeout = read;
        self.write_timeout = write;
        Ok(())
    }
}
