//! 测距会话
//!
//! 有状态的驱动对象。持有采集策略（以及对应的链路或轮询线程）
//! 和共享测量结果。

use crate::cycle::{CycleOutcome, run_cycle};
use crate::error::DriverError;
use crate::heartbeat::ResponseMonitor;
use crate::hooks::MeasurementCallback;
use crate::metrics::MetricsSnapshot;
use crate::mode::AcquisitionMode;
use crate::poller::{Poller, PollerConfig};
use crate::state::{Measurement, MeasurementReader, SessionState};
use ajsr04_protocol::{DEFAULT_POLLING_INTERVAL, Framing, Reading, SensorKind, Status};
use ajsr04_serial::SerialLink;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 已绑定的采集策略
///
/// 任意时刻只有一个变体有效；`Disposed` 为终态。
enum Acquisition {
    OnDemand {
        link: Box<dyn SerialLink>,
        framing: Framing,
    },
    Auto(Poller),
    Disposed,
}

/// AJ-SR04 测距会话
///
/// 通过 [`SessionBuilder`](crate::SessionBuilder) 构建。
///
/// - 按需模式：[`get_distance`](Self::get_distance) 在调用方线程上
///   同步完成触发、等待和解码。
/// - 自动轮询：后台轮询线程持续刷新测量结果，
///   调用方只读取。
///
/// 所有模式下，[`measurement`](Self::measurement) 和
/// [`reader`](Self::reader) 读取均为无锁操作。
pub struct RangingSession {
    sensor: SensorKind,
    mode: AcquisitionMode,
    framing: Framing,
    settle_delay: Duration,
    acquisition: Acquisition,
    state: Arc<SessionState>,
}

impl RangingSession {
    pub(crate) fn on_demand(
        sensor: SensorKind,
        mode: AcquisitionMode,
        framing: Framing,
        link: Box<dyn SerialLink>,
        settle_delay: Duration,
    ) -> Self {
        let state = Arc::new(SessionState::new(ResponseMonitor::timeout_for_interval(
            DEFAULT_POLLING_INTERVAL,
        )));
        debug!("On-demand session: sensor={}, mode={}, framing={}", sensor, mode, framing);

        Self {
            sensor,
            mode,
            framing,
            settle_delay,
            acquisition: Acquisition::OnDemand { link, framing },
            state,
        }
    }

    pub(crate) fn auto(
        sensor: SensorKind,
        link: Box<dyn SerialLink>,
        config: PollerConfig,
    ) -> Result<Self, DriverError> {
        let state = Arc::new(SessionState::new(ResponseMonitor::timeout_for_interval(
            config.interval,
        )));
        let poller = Poller::spawn(link, sensor.trigger_byte(), config, state.clone())?;

        Ok(Self {
            sensor,
            mode: AcquisitionMode::AutoPolling,
            framing: Framing::Binary,
            settle_delay: config.settle_delay,
            acquisition: Acquisition::Auto(poller),
            state,
        })
    }

    pub fn sensor(&self) -> SensorKind {
        self.sensor
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// 实际使用的帧格式。
    ///
    /// 对不支持 ASCII 的传感器请求 ASCII 时，
    /// 与模式请求的帧格式不同。
    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// 触发一次测量并等待应答（按需模式）。
    ///
    /// 最多阻塞 settle delay 加上链路读超时。
    /// 结果先发布，再返回：
    ///
    /// | 结果                            | distance | status           |
    /// |---------------------------------|----------|------------------|
    /// | 有效帧                          | 解码值   | `Ok`             |
    /// | 校验失败                        | -1       | `DataCheckError` |
    /// | 字节数不对（不读取）            | -1       | `DataError`      |
    /// | 链路超时                        | -1       | `TimeOut`        |
    ///
    /// 长度不对的应答字节会留在输入缓冲区，因此一个多余字节
    /// 会让之后的所有应答错位，此后每次调用都返回 `DataError`。
    /// 需要释放会话，并在重新打开的串口上重建会话才能恢复。
    ///
    /// # 错误
    /// - `DriverError::UnsupportedInMode`: 会话处于自动轮询模式
    /// - `DriverError::Disposed`: 会话已释放
    /// - `DriverError::Serial`: 链路因超时以外的原因失败；
    ///   返回前先发布 `(-1, ConfigError)`
    pub fn get_distance(&mut self) -> Result<Measurement, DriverError> {
        let (link, framing) = match &mut self.acquisition {
            Acquisition::OnDemand { link, framing } => (link, *framing),
            Acquisition::Auto(_) => {
                return Err(DriverError::UnsupportedInMode {
                    operation: "get_distance",
                    mode: self.mode,
                });
            },
            Acquisition::Disposed => return Err(DriverError::Disposed),
        };

        let outcome = run_cycle(
            &mut **link,
            self.sensor.trigger_byte(),
            framing,
            self.settle_delay,
            &self.state.metrics,
        );

        match outcome {
            CycleOutcome::Decoded(reading) => Ok(self.state.publish(reading)),
            CycleOutcome::WrongLength { .. } => {
                Ok(self.state.publish(Reading::failed(Status::DataError)))
            },
            CycleOutcome::Link(e) if e.is_timeout() => {
                Ok(self.state.publish(Reading::failed(Status::TimeOut)))
            },
            CycleOutcome::Link(e) => {
                warn!("get_distance: link failure: {}", e);
                self.state.publish(Reading::failed(Status::ConfigError));
                Err(e.into())
            },
        }
    }

    /// 修改轮询周期（自动轮询模式）。
    ///
    /// 低于 100 ms 的值提升到 100 ms。下一个 tick 立即触发；
    /// 正在进行的 tick 不会被中断。
    ///
    /// 返回实际生效的周期。
    ///
    /// # 错误
    /// - `DriverError::UnsupportedInMode`: 会话处于按需模式
    /// - `DriverError::Disposed`: 会话已释放
    /// - `DriverError::PollerThread`: 轮询线程已退出
    pub fn set_polling_interval(&self, interval: Duration) -> Result<Duration, DriverError> {
        match &self.acquisition {
            Acquisition::Auto(poller) => poller.set_interval(interval),
            Acquisition::OnDemand { .. } => Err(DriverError::UnsupportedInMode {
                operation: "set_polling_interval",
                mode: self.mode,
            }),
            Acquisition::Disposed => Err(DriverError::Disposed),
        }
    }

    /// 当前轮询周期；非自动轮询模式返回 `None`。
    pub fn polling_interval(&self) -> Option<Duration> {
        match &self.acquisition {
            Acquisition::Auto(poller) => Some(poller.interval()),
            _ => None,
        }
    }

    /// 最新发布的测量结果。
    #[inline]
    pub fn measurement(&self) -> Measurement {
        self.state.load()
    }

    /// 最新距离（毫米），周期失败后为 -1。
    pub fn current_distance(&self) -> i32 {
        self.state.load().distance_mm
    }

    pub fn current_status(&self) -> Status {
        self.state.load().status
    }

    /// 可克隆、线程安全的读取句柄。
    pub fn reader(&self) -> MeasurementReader {
        MeasurementReader::new(self.state.clone())
    }

    /// 注册每次发布后触发的回调。
    pub fn add_callback(&self, callback: Arc<dyn MeasurementCallback>) {
        self.state.add_callback(callback);
    }

    /// 最近是否收到有效帧。
    ///
    /// 自动轮询模式下窗口为三个轮询周期（至少一秒），
    /// 其他模式为三秒。
    pub fn is_responsive(&self) -> bool {
        self.state.monitor.is_responsive()
    }

    pub fn time_since_last_response(&self) -> Option<Duration> {
        self.state.monitor.time_since_last_response()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.metrics.snapshot()
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.acquisition, Acquisition::Disposed)
    }

    /// 释放链路（或停止轮询线程，由它释放自己的链路）。
    ///
    /// 幂等。释放后仍可读取最后一次测量结果。
    pub fn dispose(&mut self) {
        match std::mem::replace(&mut self.acquisition, Acquisition::Disposed) {
            Acquisition::OnDemand { mut link, .. } => {
                if link.is_open() {
                    link.close();
                }
                debug!("Session disposed ({})", self.mode);
            },
            Acquisition::Auto(mut poller) => {
                poller.shutdown();
                debug!("Session disposed ({})", self.mode);
            },
            Acquisition::Disposed => {},
        }
    }
}

impl Drop for RangingSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for RangingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangingSession")
            .field("sensor", &self.sensor)
            .field("mode", &self.mode)
            .field("framing", &self.framing)
            .field("disposed", &self.is_disposed())
            .field("measurement", &self.measurement())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajsr04_protocol::{encode_ascii, encode_binary};
    use ajsr04_serial::{MockReply, MockSerialLink};

    fn binary_session() -> (RangingSession, ajsr04_serial::MockHandle) {
        let (link, handle) = MockSerialLink::new();
        let session = RangingSession::on_demand(
            SensorKind::JsnSr04t,
            AcquisitionMode::BinaryOnDemand,
            Framing::Binary,
            Box::new(link),
            Duration::from_millis(1),
        );
        (session, handle)
    }

    #[test]
    fn test_get_distance_binary() {
        let (mut session, handle) = binary_session();
        handle.push_reply(MockReply::Bytes(vec![0x55, 0x00, 0xC8, 30]));

        let m = session.get_distance().unwrap();
        assert_eq!((m.distance_mm, m.status), (200, Status::Ok));
        assert_eq!(handle.written(), vec![0x55]);
        assert_eq!(session.measurement(), m);
        assert!(session.is_responsive());
    }

    #[test]
    fn test_get_distance_ascii() {
        let (link, handle) = MockSerialLink::new();
        handle.push_reply(MockReply::Bytes(encode_ascii(1881).to_vec()));
        let mut session = RangingSession::on_demand(
            SensorKind::AjSr04m,
            AcquisitionMode::AsciiOnDemand,
            Framing::Ascii,
            Box::new(link),
            Duration::from_millis(1),
        );

        let m = session.get_distance().unwrap();
        assert_eq!(m.distance_mm, 1881);
        assert_eq!(handle.written(), vec![0x01]);
    }

    #[test]
    fn test_wrong_length_is_data_error_and_not_consumed() {
        let (mut session, handle) = binary_session();
        handle.push_reply(MockReply::Bytes(vec![0xFF, 0x00, 0xC8]));

        let m = session.get_distance().unwrap();
        assert_eq!((m.distance_mm, m.status), (-1, Status::DataError));
        assert_eq!(handle.rx_len(), 3);
    }

    #[test]
    fn test_status_recovers_after_failure() {
        let (mut session, handle) = binary_session();
        handle.push_reply(MockReply::Silent);
        handle.push_reply(MockReply::Bytes(encode_binary(0xFF, 900).to_vec()));

        assert_eq!(session.get_distance().unwrap().status, Status::DataError);
        let m = session.get_distance().unwrap();
        assert_eq!((m.distance_mm, m.status), (900, Status::Ok));
        assert_eq!(m.sequence, 2);
    }

    #[test]
    fn test_timeout_and_link_failure() {
        let (mut session, handle) = binary_session();
        handle.push_reply(MockReply::WriteTimeout);
        handle.push_reply(MockReply::Disconnected);

        let m = session.get_distance().unwrap();
        assert_eq!((m.distance_mm, m.status), (-1, Status::TimeOut));

        assert!(matches!(session.get_distance(), Err(DriverError::Serial(_))));
        assert_eq!(session.current_status(), Status::ConfigError);
        assert_eq!(session.current_distance(), -1);
    }

    #[test]
    fn test_polling_interval_rejected_on_demand() {
        let (session, _handle) = binary_session();
        assert!(matches!(
            session.set_polling_interval(Duration::from_millis(500)),
            Err(DriverError::UnsupportedInMode {
                operation: "set_polling_interval",
                mode: AcquisitionMode::BinaryOnDemand
            })
        ));
        assert_eq!(session.polling_interval(), None);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let (mut session, handle) = binary_session();
        handle.push_reply(MockReply::Bytes(encode_binary(0xFF, 77).to_vec()));
        session.get_distance().unwrap();

        session.dispose();
        session.dispose();
        assert!(session.is_disposed());
        assert_eq!(handle.close_count(), 1);
        assert!(matches!(session.get_distance(), Err(DriverError::Disposed)));
        assert!(matches!(
            session.set_polling_interval(Duration::from_millis(200)),
            Err(DriverError::Disposed)
        ));
        // 最后的值仍可读取
        assert_eq!(session.current_distance(), 77);

        drop(session);
        assert_eq!(handle.close_count(), 1);
    }

    #[test]
    fn test_drop_closes_link() {
        let (session, handle) = binary_session();
        drop(session);
        assert_eq!(handle.close_count(), 1);
    }
}
