//! # AJ-SR04 串口链路层
//!
//! 驱动层使用的字节流抽象。驱动只需要四种能力：
//! 写触发字节、查询等待读取的字节数、读取以及关闭。
//!
//! ## 后端
//!
//! - `native`（默认）：[`SerialPortLink`]，基于 `serialport` crate
//! - `mock`：[`MockSerialLink`]，用于测试的脚本化内存传感器

use thiserror::Error;

pub mod config;

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "mock")]
pub mod mock;

pub use config::{DataBits, Parity, SerialConfig, StopBits};

#[cfg(feature = "native")]
pub use native::SerialPortLink;

#[cfg(feature = "mock")]
pub use mock::{MockHandle, MockReply, MockSerialLink};

/// 串口层错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    #[error("Link timeout")]
    Timeout,
    #[error("Link closed")]
    Closed,
}

impl SerialError {
    /// 是否为读写超时。
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    Busy,
    UnsupportedConfig,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 设备已丢失或不可用，重试无济于事。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::NotFound | SerialDeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for SerialDeviceError {
    fn from(message: String) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for SerialDeviceError {
    fn from(message: &str) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

/// 已打开并配置好的双工字节流
///
/// 实现必须是 `Send`：自动轮询模式下链路会被移交给
/// 轮询线程。
pub trait SerialLink: Send {
    /// 写入 `bytes`，返回被接受的字节数。
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError>;

    /// 已接收、等待读取的字节数。
    fn bytes_available(&mut self) -> Result<usize, SerialError>;

    /// 最多读取 `buf.len()` 字节，最长阻塞读超时时间。
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// 释放底层设备。重复关闭无副作用。
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// 读满 `buf`；字节流中断时返回 `SerialError::Timeout`。
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..])? {
                0 => return Err(SerialError::Timeout),
                n => filled += n,
            }
        }
        Ok(())
    }
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        (**self).write(bytes)
    }

    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        (**self).read(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        (**self).read_exact(buf)
    }
}
