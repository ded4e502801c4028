//! 采集模式
//!
//! 模式在构建会话时确定，决定链路归属以及期望的帧格式：
//! and which framing is expected:
//!
//! | 模式              | 链路归属      | 帧格式                        |
//! |-------------------|---------------|-------------------------------|
//! | `AutoPolling`     | 轮询线程      | 二进制                        |
//! | `BinaryOnDemand`  | 会话          | 二进制                        |
//! | `AsciiOnDemand`   | 会话          | ASCII（不支持时回退二进制）   |

use ajsr04_protocol::{Framing, ProtocolError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionMode {
    /// 后台轮询线程按固定周期触发传感器
    AutoPolling,
    /// 调用方逐次触发测量，二进制应答
    BinaryOnDemand,
    /// 调用方逐次触发测量，ASCII 应答
    AsciiOnDemand,
}

impl AcquisitionMode {
    #[inline]
    pub fn is_on_demand(self) -> bool {
        !matches!(self, Self::AutoPolling)
    }

    /// 模式请求的帧格式（尚未检查传感器能力）。
    #[inline]
    pub fn requested_framing(self) -> Framing {
        match self {
            Self::AsciiOnDemand => Framing::Ascii,
            Self::AutoPolling | Self::BinaryOnDemand => Framing::Binary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoPolling => "auto-polling",
            Self::BinaryOnDemand => "binary-on-demand",
            Self::AsciiOnDemand => "ascii-on-demand",
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcquisitionMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "auto" | "auto-polling" => Ok(Self::AutoPolling),
            "binary" | "binary-on-demand" => Ok(Self::BinaryOnDemand),
            "ascii" | "ascii-on-demand" => Ok(Self::AsciiOnDemand),
            _ => Err(ProtocolError::ParseError(format!(
                "unknown acquisition mode '{s}'"
            ))),
        }
    }
}
