//! 驱动层模块
//!
//! 本模块提供 AJ-SR04 / JSN-SR04T 传感器的测距会话，包括：
//! 采集模式（按需二进制、按需 ASCII、自动轮询）
//! 后台轮询线程（周期可在线调整）
//! 测量结果无锁发布（ArcSwap）
//! 测量钩子、周期统计与响应监测
//!
//! 大多数应用应通过 `ajsr04-sdk` 门面 crate 使用。

mod builder;
mod cycle;
mod error;
pub mod heartbeat;
pub mod hooks;
pub mod metrics;
pub mod mode;
pub mod poller;
mod session;
pub mod state;

pub use builder::SessionBuilder;
pub use error::DriverError;
pub use heartbeat::ResponseMonitor;
pub use hooks::{HookManager, MeasurementCallback, MeasurementChannel};
pub use metrics::{MetricsSnapshot, PollerMetrics};
pub use mode::AcquisitionMode;
pub use poller::{Poller, PollerConfig, clamp_interval};
pub use session::RangingSession;
pub use state::{Measurement, MeasurementReader, SessionState};
