//! 传感器型号、帧格式与状态类型

use crate::ProtocolError;
use crate::constants::*;
use std::fmt;
use std::str::FromStr;

/// 传感器物理型号
///
/// 判别值即该型号 RX 线上期望的触发字节。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[repr(u8)]
pub enum SensorKind {
    /// 防水型 JSN-SR04T 模块
    JsnSr04t = 0x55,
    /// AJ-SR04M 模块（支持 ASCII “打印”输出）
    AjSr04m = 0x01,
}

impl SensorKind {
    /// 写入链路以启动测量的字节。
    #[inline]
    pub fn trigger_byte(self) -> u8 {
        self.into()
    }

    /// 该型号能否以 ASCII 帧应答。
    #[inline]
    pub fn supports_ascii(self) -> bool {
        matches!(self, Self::AjSr04m)
    }

    /// 按触发字节查找型号。
    pub fn from_trigger(byte: u8) -> Result<Self, ProtocolError> {
        Self::try_from(byte).map_err(|_| ProtocolError::UnknownSensorKind(byte))
    }

    /// 小写短名称，[`FromStr`] 同样接受。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsnSr04t => "jsn-sr04t",
            Self::AjSr04m => "aj-sr04m",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "jsnsr04t" => Ok(Self::JsnSr04t),
            "ajsr04m" => Ok(Self::AjSr04m),
            _ => Err(ProtocolError::ParseError(format!("unknown sensor kind '{s}'"))),
        }
    }
}

/// 传感器报文的帧格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Framing {
    /// `[marker, high, low, checksum]`
    Binary,
    /// `Gap=DDDDmm\r\n`
    Ascii,
}

impl Framing {
    /// 一帧报文占用的确切字节数。
    #[inline]
    pub const fn frame_len(self) -> usize {
        match self {
            Self::Binary => BINARY_FRAME_LEN,
            Self::Ascii => ASCII_FRAME_LEN,
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Ascii => f.write_str("ascii"),
        }
    }
}

/// 单次测量周期的结果
///
/// 总是与距离一起传递；见 [`Reading`](crate::Reading)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Status {
    /// 收到帧且校验通过
    #[default]
    Ok = 0,
    /// 写触发字节或读应答时链路超时
    TimeOut = 1,
    /// 链路上等待的字节数不对
    DataError = 2,
    /// 链路无法打开、配置或使用
    ConfigError = 3,
    /// 收到帧但完整性检查失败
    DataCheckError = 4,
}

impl Status {
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "Ok",
            Self::TimeOut => "TimeOut",
            Self::DataError => "DataError",
            Self::ConfigError => "ConfigError",
            Self::DataCheckError => "DataCheckError",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_bytes() {
        assert_eq!(SensorKind::JsnSr04t.trigger_byte(), 0x55);
        assert_eq!(SensorKind::AjSr04m.trigger_byte(), 0x01);
    }

    #[test]
    fn test_from_trigger() {
        assert_eq!(SensorKind::from_trigger(0x55).unwrap(), SensorKind::JsnSr04t);
        assert_eq!(SensorKind::from_trigger(0x01).unwrap(), SensorKind::AjSr04m);
        assert!(matches!(
            SensorKind::from_trigger(0x02),
            Err(ProtocolError::UnknownSensorKind(0x02))
        ));
    }

    #[test]
    fn test_ascii_support() {
        assert!(SensorKind::AjSr04m.supports_ascii());
        assert!(!SensorKind::JsnSr04t.supports_ascii());
    }

    #[test]
    fn test_sensor_kind_parse() {
        assert_eq!("jsn-sr04t".parse::<SensorKind>().unwrap(), SensorKind::JsnSr04t);
        assert_eq!("AJ_SR04M".parse::<SensorKind>().unwrap(), SensorKind::AjSr04m);
        assert_eq!("ajsr04m".parse::<SensorKind>().unwrap(), SensorKind::AjSr04m);
        assert!("hc-sr04".parse::<SensorKind>().is_err());

        for kind in [SensorKind::JsnSr04t, SensorKind::AjSr04m] {
            assert_eq!(kind.to_string().parse::<SensorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_framing_len() {
        assert_eq!(Framing::Binary.frame_len(), 4);
        assert_eq!(Framing::Ascii.frame_len(), 12);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(u8::from(Status::Ok), 0);
        assert_eq!(u8::from(Status::DataCheckError), 4);
        assert_eq!(Status::default(), Status::Ok);
        assert!(Status::Ok.is_ok());
        assert!(!Status::TimeOut.is_ok());
        assert_eq!(Status::DataError.to_string(), "DataError");
    }
}
