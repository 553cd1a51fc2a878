//! 控制表寄存器定义
//!
//! 寄存器使用封闭枚举表示，地址在编译期确定。
//! 高层位置写入路径只接受 [`WritableRegister`] 白名单中的寄存器。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;

/// 控制表寄存器（值为控制表偏移）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Register {
    /// 执行器 ID
    Id = 2,
    /// 波特率设置
    BaudRate = 12,
    /// 当前位置
    CurrentPosition = 26,
    /// 力传感器零点校准
    ZeroCalibration = 31,
    /// 过流保护设置
    OverCurrentProtection = 32,
    /// 目标位置设置
    TargetPosition = 55,
    /// 力传感器数据
    ForceSensorData = 76,
    /// 力传感器原始值
    ForceSensorRaw = 78,
    /// 过温保护设置
    OverTemperatureProtection = 98,
    /// 预热使能
    WarmUpActivation = 100,
}

impl Register {
    /// 全部寄存器（按地址升序）
    pub const ALL: [Register; 10] = [
        Register::Id,
        Register::BaudRate,
        Register::CurrentPosition,
        Register::ZeroCalibration,
        Register::OverCurrentProtection,
        Register::TargetPosition,
        Register::ForceSensorData,
        Register::ForceSensorRaw,
        Register::OverTemperatureProtection,
        Register::WarmUpActivation,
    ];

    /// 控制表偏移
    pub fn address(self) -> u8 {
        self.into()
    }

    /// 从控制表偏移反查
    pub fn from_address(address: u8) -> Option<Self> {
        Self::try_from(address).ok()
    }

    /// 符号名（kebab-case）
    pub fn name(self) -> &'static str {
        match self {
            Register::Id => "id",
            Register::BaudRate => "baudrate",
            Register::CurrentPosition => "current-position",
            Register::ZeroCalibration => "zero-calibration",
            Register::OverCurrentProtection => "over-current-protection",
            Register::TargetPosition => "target-position",
            Register::ForceSensorData => "force-sensor-data",
            Register::ForceSensorRaw => "force-sensor-raw",
            Register::OverTemperatureProtection => "over-temperature-protection",
            Register::WarmUpActivation => "warm-up-activation",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = ProtocolError;

    /// 解析符号名，大小写不敏感，`_` 与 `-` 等价
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Register::ALL
            .into_iter()
            .find(|reg| reg.name() == normalized)
            .ok_or_else(|| ProtocolError::InvalidRegister(s.to_string()))
    }
}

/// 可通过位置写入路径写入的寄存器（白名单）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WritableRegister {
    ZeroCalibration,
    OverCurrentProtection,
    TargetPosition,
    OverTemperatureProtection,
    WarmUpActivation,
}

impl WritableRegister {
    pub const ALL: [WritableRegister; 5] = [
        WritableRegister::ZeroCalibration,
        WritableRegister::OverCurrentProtection,
        WritableRegister::TargetPosition,
        WritableRegister::OverTemperatureProtection,
        WritableRegister::WarmUpActivation,
    ];

    /// 对应的控制表寄存器
    pub fn register(self) -> Register {
        match self {
            WritableRegister::ZeroCalibration => Register::ZeroCalibration,
            WritableRegister::OverCurrentProtection => Register::OverCurrentProtection,
            WritableRegister::TargetPosition => Register::TargetPosition,
            WritableRegister::OverTemperatureProtection => Register::OverTemperatureProtection,
            WritableRegister::WarmUpActivation => Register::WarmUpActivation,
        }
    }
}

impl From<WritableRegister> for Register {
    fn from(reg: WritableRegister) -> Self {
        reg.register()
    }
}

impl TryFrom<Register> for WritableRegister {
    type Error = ProtocolError;

    fn try_from(reg: Register) -> Result<Self, Self::Error> {
        WritableRegister::ALL
            .into_iter()
            .find(|w| w.register() == reg)
            .ok_or_else(|| ProtocolError::InvalidRegister(reg.name().to_string()))
    }
}

impl FromStr for WritableRegister {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reg: Register = s.parse()?;
        WritableRegister::try_from(reg)
    }
}

impl fmt::Display for WritableRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.register().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_addresses() {
        assert_eq!(Register::Id.address(), 2);
        assert_eq!(Register::BaudRate.address(), 12);
        assert_eq!(Register::CurrentPosition.address(), 26);
        assert_eq!(Register::ZeroCalibration.address(), 31);
        assert_eq!(Register::OverCurrentProtection.address(), 32);
        assert_eq!(Register::TargetPosition.address(), 55);
        assert_eq!(Register::ForceSensorData.address(), 76);
        assert_eq!(Register::ForceSensorRaw.address(), 78);
        assert_eq!(Register::OverTemperatureProtection.address(), 98);
        assert_eq!(Register::WarmUpActivation.address(), 100);
    }

    #[test]
    fn test_register_from_address() {
        for reg in Register::ALL {
            assert_eq!(Register::from_address(reg.address()), Some(reg));
        }
        assert_eq!(Register::from_address(0), None);
    }

    #[test]
    fn test_register_parse() {
        assert_eq!(
            "target-position".parse::<Register>().unwrap(),
            Register::TargetPosition
        );
        assert_eq!(
            "Warm_Up_Activation".parse::<Register>().unwrap(),
            Register::WarmUpActivation
        );
        assert!(matches!(
            "tarLocatSet".parse::<Register>(),
            Err(ProtocolError::InvalidRegister(name)) if name == "tarLocatSet"
        ));
    }

    #[test]
    fn test_writable_whitelist() {
        assert_eq!(
            "zero-calibration".parse::<WritableRegister>().unwrap(),
            WritableRegister::ZeroCalibration
        );

        // 存在于控制表但不在白名单中
        for name in ["id", "baudrate", "current-position", "force-sensor-data"] {
            assert!(
                matches!(
                    name.parse::<WritableRegister>(),
                    Err(ProtocolError::InvalidRegister(_))
                ),
                "{} should be rejected",
                name
            );
        }

        assert!(WritableRegister::try_from(Register::ForceSensorRaw).is_err());
        assert_eq!(
            WritableRegister::try_from(Register::TargetPosition).unwrap(),
            WritableRegister::TargetPosition
        );
    }

    #[test]
    fn test_display_roundtrip() {
        for reg in WritableRegister::ALL {
            let name = reg.to_string();
            assert_eq!(name.parse::<WritableRegister>().unwrap(), reg);
        }
    }
}
