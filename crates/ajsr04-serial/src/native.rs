//! 原生串口后端
//!
//! `serialport::SerialPort` 的薄封装。打开与配置一步完成，
//! 没有单独的“配置”阶段。

use crate::{SerialConfig, SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialLink};
use crate::{DataBits, Parity, StopBits};
use serialport::{ClearBuffer, FlowControl, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 基于操作系统串口设备的链路
pub struct SerialPortLink {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl SerialPortLink {
    /// 打开并配置串口设备。
    ///
    /// 打开后丢弃待处理的输入输出，避免上一次会话残留的
    /// 字节被误当作应答。
    ///
    /// # 错误
    /// - `SerialError::Device`:
    ///   - 未配置端口名（`UnsupportedConfig`）
    ///   - 设备不存在（`NotFound`）
    ///   - 权限不足（`AccessDenied`）
    ///   - 设备被其他进程占用（`Busy`）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use ajsr04_serial::{SerialConfig, SerialPortLink};
    ///
    /// let link = SerialPortLink::open(&SerialConfig::new("/dev/ttyS0")).unwrap();
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self, SerialError> {
        if config.port.is_empty() {
            return Err(SerialDeviceError::new(
                SerialDeviceErrorKind::UnsupportedConfig,
                "no serial port configured",
            )
            .into());
        }

        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()
            .map_err(|e| device_error(&config.port, e))?;

        if let Err(e) = port.clear(ClearBuffer::All) {
            warn!("Failed to clear buffers on '{}': {}", config.port, e);
        }

        debug!(
            "Opened serial port '{}' at {} baud ({:?}/{:?}/{:?})",
            config.port, config.baud_rate, config.data_bits, config.parity, config.stop_bits
        );

        Ok(Self {
            port: Some(port),
            name: config.port.clone(),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        })
    }

    /// 打开该链路时使用的设备路径。
    pub fn name(&self) -> &str {
        &self.name
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialError> {
        self.port.as_mut().ok_or(SerialError::Closed)
    }
}

impl SerialLink for SerialPortLink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        let (read_timeout, write_timeout) = (self.read_timeout, self.write_timeout);
        let port = self.port()?;

        // serialport 对读写方向只提供一个超时设置
        let swap = read_timeout != write_timeout;
        if swap {
            port.set_timeout(write_timeout)
                .map_err(|e| device_error("<open port>", e))?;
        }

        let result = Write::write(port, bytes).and_then(|n| Write::flush(port).map(|_| n));

        if swap {
            port.set_timeout(read_timeout)
                .map_err(|e| device_error("<open port>", e))?;
        }

        let n = result.map_err(io_error)?;
        trace!("TX {}", hex::encode(&bytes[..n]));
        Ok(n)
    }

    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        let port = self.port()?;
        port.bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| device_error("<open port>", e))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let port = self.port()?;
        let n = Read::read(port, buf).map_err(io_error)?;
        trace!("RX {}", hex::encode(&buf[..n]));
        Ok(n)
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Closed serial port '{}'", self.name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl std::fmt::Debug for SerialPortLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortLink")
            .field("name", &self.name)
            .field("open", &self.port.is_some())
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

fn io_error(e: io::Error) -> SerialError {
    if e.kind() == io::ErrorKind::TimedOut {
        SerialError::Timeout
    } else {
        SerialError::Io(e)
    }
}

fn device_error(port: &str, e: serialport::Error) -> SerialError {
    let kind = match e.kind {
        serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::UnsupportedConfig,
        serialport::ErrorKind::Io(io::ErrorKind::NotFound) => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
            SerialDeviceErrorKind::AccessDenied
        },
        serialport::ErrorKind::Io(io::ErrorKind::ResourceBusy) => SerialDeviceErrorKind::Busy,
        serialport::ErrorKind::Io(io::ErrorKind::TimedOut) => return SerialError::Timeout,
        serialport::ErrorKind::Io(_) => SerialDeviceErrorKind::Backend,
        serialport::ErrorKind::Unknown => SerialDeviceErrorKind::Unknown,
    };
    SerialDeviceError::new(kind, format!("serial port '{}': {}", port, e.description)).into()
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}
