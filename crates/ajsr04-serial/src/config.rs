//! 链路配置

use ajsr04_protocol::{DEFAULT_BAUD_RATE, DEFAULT_LINK_TIMEOUT};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

/// 串口链路配置
///
/// 默认值与传感器出厂设置一致：9600 波特率、8N1、无流控、
/// 读写超时均为 1000 ms。
///
/// # 示例
///
/// ```
/// use ajsr04_serial::SerialConfig;
/// use std::time::Duration;
///
/// let config = SerialConfig::new("/dev/ttyS0").with_read_timeout(Duration::from_millis(200));
/// assert_eq!(config.baud_rate, 9600);
/// assert_eq!(config.read_timeout(), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerialConfig {
    /// 设备路径或名称（`/dev/ttyS0`、`COM3`）
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub write_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        let timeout_ms = DEFAULT_LINK_TIMEOUT.as_millis() as u64;
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            write_timeout_ms: timeout_ms,
            read_timeout_ms: timeout_ms,
        }
    }
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.read_timeout(), Duration::from_millis(1000));
        assert_eq!(config.write_timeout(), Duration::from_millis(1000));
        assert!(config.port.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SerialConfig::new("COM3")
            .with_baud_rate(115_200)
            .with_write_timeout(Duration::from_millis(250));
        assert_eq!(config.port, "COM3");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.write_timeout_ms, 250);
        assert_eq!(config.read_timeout_ms, 1000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SerialConfig = toml::from_str(
            r#"
            port = "/dev/ttyAMA0"
            parity = "even"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout_ms, 1000);
    }
}
