//! # AJ-SR04 协议层
//!
//! AJ-SR04M / JSN-SR04T 超声波测距模块的报文格式
//! （不依赖硬件）。
//!
//! ## 模块
//!
//! - `constants`: 触发字节、帧长度、时序约束
//! - `types`: 传感器型号、帧格式和状态枚举
//! - `frame`: 二进制 / ASCII 解码器及对应编码器
//! - `units`: `Distance` 单位类型
//!
//! ## 字节序
//!
//! 二进制距离字段为大端序（高字节在前）。

pub mod constants;
pub mod frame;
pub mod types;
pub mod units;

pub use constants::*;
pub use frame::*;
pub use types::*;
pub use units::*;

/// 协议层错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown sensor kind: trigger byte 0x{0:02X}")]
    UnknownSensorKind(u8),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ProtocolError {
    /// 以该错误结束周期时报告给调用方的状态。
    pub fn status(&self) -> Status {
        match self {
            Self::ChecksumMismatch { .. } => Status::DataCheckError,
            Self::InvalidLength { .. } => Status::DataError,
            Self::UnknownSensorKind(_) | Self::ParseError(_) => Status::ConfigError,
        }
    }
}
