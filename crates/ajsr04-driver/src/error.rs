//! 驱动层错误类型定义

use crate::mode::AcquisitionMode;
use ajsr04_protocol::ProtocolError;
use ajsr04_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口链路错误（打开、配置、I/O）
    #[error("Serial link error: {0}")]
    Serial(#[from] SerialError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 会话配置无效
    #[error("Configuration error: {0}")]
    Config(String),

    /// 当前采集模式不支持该操作
    #[error("`{operation}` is not supported in {mode} mode")]
    UnsupportedInMode {
        operation: &'static str,
        mode: AcquisitionMode,
    },

    /// 会话已释放
    #[error("Session disposed")]
    Disposed,

    /// 轮询线程启动失败或意外退出
    #[error("Poller thread error: {0}")]
    PollerThread(String),
}
