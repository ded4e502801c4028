//! AJ-SR04 SDK
//!
//! 通过串口连接的 AJ-SR04M / JSN-SR04T 防水超声波测距模块的
//! Rust 驱动。
//!
//! # 分层
//!
//! 自底向上：
//!
//! - **协议层** (`protocol`): 帧格式、校验和、解码器
//! - **链路层** (`serial`): `SerialLink` 抽象及其后端
//! - **驱动层** (`driver`): 测距会话、后台轮询线程、共享状态
//!
//! # 快速开始
//!
//! ```no_run
//! use ajsr04_sdk::prelude::*;
//!
//! ajsr04_sdk::init_logger();
//!
//! let mut session = SessionBuilder::new(SensorKind::AjSr04m, AcquisitionMode::BinaryOnDemand)
//!     .port("/dev/ttyUSB0")
//!     .build()?;
//!
//! let m = session.get_distance()?;
//! if let Some(d) = m.distance() {
//!     println!("{d}");
//! }
//! # Ok::<(), DriverError>(())
//! ```

pub use ajsr04_driver as driver;
pub use ajsr04_protocol as protocol;
pub use ajsr04_serial as serial;

pub mod prelude;

pub use ajsr04_driver::{
    AcquisitionMode, DriverError, Measurement, MeasurementCallback, MeasurementReader,
    MetricsSnapshot, PollerConfig, RangingSession, SessionBuilder,
};
pub use ajsr04_protocol::{Distance, Framing, ProtocolError, Reading, SensorKind, Status};
pub use ajsr04_serial::{SerialConfig, SerialError, SerialLink};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static LOGGER: Once = Once::new();

/// 安装全局 `tracing` subscriber。
///
/// 从 `RUST_LOG` 读取过滤规则（默认 `info`），并将 `log`
/// 记录转发到 `tracing`。只有第一次调用生效；
/// 已在别处安装的 subscriber 保持不变。
pub fn init_logger() {
    LOGGER.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        // log -> tracing 桥接
        if tracing_log::LogTracer::init().is_err() {
            tracing::debug!("log bridge already installed");
        }
        log::debug!("logger initialized");
    });
}
