//! Builder 模式实现
//!
//! 链式构建 [`RangingSession`]。

use crate::error::DriverError;
use crate::mode::AcquisitionMode;
use crate::poller::PollerConfig;
use crate::session::RangingSession;
use ajsr04_protocol::{Framing, SensorKind};
use ajsr04_serial::{SerialConfig, SerialLink};
use std::time::Duration;
use tracing::warn;

/// 会话构建器（链式构建）
///
/// # 示例
///
/// ```no_run
/// use ajsr04_driver::{AcquisitionMode, SessionBuilder};
/// use ajsr04_protocol::SensorKind;
/// use std::time::Duration;
///
/// // 按需二进制测量
/// let mut session = SessionBuilder::new(SensorKind::AjSr04m, AcquisitionMode::BinaryOnDemand)
///     .port("/dev/ttyS0")
///     .build()
///     .unwrap();
/// let m = session.get_distance().unwrap();
///
/// // 每 250 ms 后台轮询
/// let session = SessionBuilder::new(SensorKind::JsnSr04t, AcquisitionMode::AutoPolling)
///     .port("/dev/ttyS1")
///     .polling_interval(Duration::from_millis(250))
///     .build()
///     .unwrap();
/// let latest = session.measurement();
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    sensor: SensorKind,
    mode: AcquisitionMode,
    serial: SerialConfig,
    poller: PollerConfig,
    strict: bool,
}

impl SessionBuilder {
    pub fn new(sensor: SensorKind, mode: AcquisitionMode) -> Self {
        Self {
            sensor,
            mode,
            serial: SerialConfig::default(),
            poller: PollerConfig::default(),
            strict: false,
        }
    }

    /// 要打开的串口设备（`/dev/ttyS0`、`COM3`）。
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.serial.port = port.into();
        self
    }

    /// 整体替换链路配置（包括端口）。
    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        self.serial = config;
        self
    }

    /// 初始轮询周期（仅自动轮询模式），下限 100 ms。
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.poller.interval = interval;
        self
    }

    /// 触发与读取之间的等待时间（默认 50 ms）。
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.poller.settle_delay = delay;
        self
    }

    pub fn poller_config(mut self, config: PollerConfig) -> Self {
        self.poller = config;
        self
    }

    /// 传感器不支持 ASCII 输出时直接拒绝 ASCII 模式，
    /// 而不是回退到二进制帧格式。
    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 会话将使用的帧格式。
    ///
    /// # 错误
    /// - `DriverError::Config`: 严格模式下，对不支持 ASCII 输出的传感器
    ///   请求了 ASCII 模式
    pub fn resolve_framing(&self) -> Result<Framing, DriverError> {
        let requested = self.mode.requested_framing();
        if requested == Framing::Ascii && !self.sensor.supports_ascii() {
            if self.strict {
                return Err(DriverError::Config(format!(
                    "{} does not support ASCII framing",
                    self.sensor
                )));
            }
            warn!(
                "{} does not support ASCII framing, falling back to binary",
                self.sensor
            );
            return Ok(Framing::Binary);
        }
        Ok(requested)
    }

    /// 打开配置的串口并启动会话。
    ///
    /// 自动轮询模式下链路移交给轮询线程，
    /// 第一个 tick 立即触发。
    ///
    /// # 错误
    /// - `DriverError::Config`: 见 [`resolve_framing`](Self::resolve_framing)
    /// - `DriverError::Serial`: 串口无法打开或配置
    /// - `DriverError::PollerThread`: 无法创建轮询线程
    #[cfg(feature = "native")]
    pub fn build(self) -> Result<RangingSession, DriverError> {
        let framing = self.resolve_framing()?;
        let link = ajsr04_serial::SerialPortLink::open(&self.serial)?;
        self.start(framing, Box::new(link))
    }

    /// 在已打开的链路上启动会话。
    ///
    /// # 错误
    /// - `DriverError::Config`: 链路未打开，或见
    ///   [`resolve_framing`](Self::resolve_framing)
    /// - `DriverError::PollerThread`: 无法创建轮询线程
    pub fn build_with_link(
        self,
        link: impl SerialLink + 'static,
    ) -> Result<RangingSession, DriverError> {
        let framing = self.resolve_framing()?;

        if !link.is_open() {
            return Err(DriverError::Config("serial link is not open".into()));
        }

        self.start(framing, Box::new(link))
    }

    fn start(
        self,
        framing: Framing,
        link: Box<dyn SerialLink>,
    ) -> Result<RangingSession, DriverError> {
        match self.mode {
            AcquisitionMode::AutoPolling => RangingSession::auto(self.sensor, link, self.poller),
            AcquisitionMode::BinaryOnDemand | AcquisitionMode::AsciiOnDemand => {
                Ok(RangingSession::on_demand(
                    self.sensor,
                    self.mode,
                    framing,
                    link,
                    self.poller.settle_delay,
                ))
            },
        }
    }
}
