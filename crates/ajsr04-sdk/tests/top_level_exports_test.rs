//! 顶层导出
//!
//! 核心类型可直接从 `ajsr04_sdk` 导入。

use ajsr04_sdk::{
    AcquisitionMode, DriverError, Framing, ProtocolError, SensorKind, SerialError, SessionBuilder,
    Status,
};

#[test]
fn test_top_level_exports() {
    let _builder = SessionBuilder::new(SensorKind::AjSr04m, AcquisitionMode::BinaryOnDemand);
    let _error: DriverError = DriverError::Disposed;
    let _serial_error: SerialError = SerialError::Timeout;
    let _protocol_error = ProtocolError::UnknownSensorKind(0x42);
    assert_eq!(Status::default(), Status::Ok);
    assert_eq!(Framing::Ascii.frame_len(), 12);
}

#[test]
fn test_layer_modules() {
    assert_eq!(ajsr04_sdk::protocol::TRIGGER_JSN_SR04T, 0x55);
    assert_eq!(ajsr04_sdk::protocol::TRIGGER_AJ_SR04M, 0x01);
    let config = ajsr04_sdk::serial::SerialConfig::default();
    assert_eq!(config.baud_rate, 9600);
    assert_eq!(
        ajsr04_sdk::driver::clamp_interval(std::time::Duration::from_millis(10)),
        std::time::Duration::from_millis(100)
    );
}
