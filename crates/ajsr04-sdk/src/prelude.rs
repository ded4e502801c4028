//! Prelude - 常用导入
//!
//! ```rust
//! use ajsr04_sdk::prelude::*;
//! ```

// 会话
pub use ajsr04_driver::{
    AcquisitionMode, Measurement, MeasurementCallback, MeasurementReader, RangingSession,
    SessionBuilder,
};

// 协议类型
pub use ajsr04_protocol::{Distance, Framing, SensorKind, Status};

// 链路
pub use ajsr04_serial::{SerialConfig, SerialLink};

// 错误
pub use ajsr04_driver::DriverError;
pub use ajsr04_protocol::ProtocolError;
pub use ajsr04_serial::SerialError;
