//! 共享测量状态
//!
//! 距离与状态作为一个不可变值通过 `ArcSwap` 发布。
//! 写者整体替换，读者无锁加载，
//! 因此读者不会把某个周期的距离与另一个周期的状态
//! 拼在一起。

use crate::heartbeat::{ResponseMonitor, monotonic_micros};
use crate::hooks::{HookManager, MeasurementCallback};
use crate::metrics::PollerMetrics;
use ajsr04_protocol::{Distance, Reading, Status};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 单次测量周期的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// 距离（毫米），周期失败时为 -1
    pub distance_mm: i32,
    pub status: Status,
    /// 发布计数，第一个周期为 1；0 表示尚未测量
    pub sequence: u64,
    /// 单调发布时间（微秒）
    pub system_timestamp_us: u64,
}

impl Measurement {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// 测量成功时返回距离。
    pub fn distance(&self) -> Option<Distance> {
        if self.is_ok() {
            Distance::from_reading(self.distance_mm)
        } else {
            None
        }
    }

    pub fn reading(&self) -> Reading {
        Reading {
            distance_mm: self.distance_mm,
            status: self.status,
        }
    }
}

/// 会话、轮询线程与读者之间共享的状态
pub struct SessionState {
    measurement: ArcSwap<Measurement>,
    sequence: AtomicU64,
    pub(crate) hooks: RwLock<HookManager>,
    pub(crate) monitor: ResponseMonitor,
    pub(crate) metrics: PollerMetrics,
}

impl SessionState {
    pub fn new(response_timeout: Duration) -> Self {
        Self {
            measurement: ArcSwap::from_pointee(Measurement::default()),
            sequence: AtomicU64::new(0),
            hooks: RwLock::new(HookManager::new()),
            monitor: ResponseMonitor::new(response_timeout),
            metrics: PollerMetrics::new(),
        }
    }

    /// 最新发布的测量结果（无锁）。
    #[inline]
    pub fn load(&self) -> Measurement {
        **self.measurement.load()
    }

    /// 发布一次周期结果并触发钩子。
    ///
    /// 同一会话任意时刻只有一个写者（按需模式下为调用方，
    /// 自动模式下为轮询线程）。
    pub(crate) fn publish(&self, reading: Reading) -> Measurement {
        let measurement = Measurement {
            distance_mm: reading.distance_mm,
            status: reading.status,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            system_timestamp_us: monotonic_micros(),
        };

        self.measurement.store(Arc::new(measurement));

        if measurement.is_ok() {
            self.monitor.register_response();
        }

        self.hooks.read().trigger_all(&measurement);
        measurement
    }

    pub(crate) fn add_callback(&self, callback: Arc<dyn MeasurementCallback>) {
        self.hooks.write().add_callback(callback);
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("measurement", &self.load())
            .field("hooks", &*self.hooks.read())
            .field("monitor", &self.monitor)
            .finish()
    }
}

/// 会话测量结果的可克隆只读视图
///
/// 可交给其他线程使用；会话释放后仍然有效，
/// 此后一直返回最后一次发布的值。
#[derive(Debug, Clone)]
pub struct MeasurementReader {
    state: Arc<SessionState>,
}

impl MeasurementReader {
    pub(crate) fn new(state: Arc<SessionState>) -> Self {
        Self { state }
    }

    #[inline]
    pub fn measurement(&self) -> Measurement {
        self.state.load()
    }

    pub fn distance_mm(&self) -> i32 {
        self.state.load().distance_mm
    }

    pub fn status(&self) -> Status {
        self.state.load().status
    }

    pub fn sequence(&self) -> u64 {
        self.state.load().sequence
    }

    /// 等待序号大于 `after_sequence` 的测量结果发布。
    ///
    /// 超时返回 `None`。
    pub fn wait_for_update(&self, after_sequence: u64, timeout: Duration) -> Option<Measurement> {
        let deadline = Instant::now() + timeout;
        loop {
            let measurement = self.state.load();
            if measurement.sequence > after_sequence {
                return Some(measurement);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
