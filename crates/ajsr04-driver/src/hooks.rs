//! 钩子系统（Hook System）
//!
//! 每次测量结果发布后触发的运行时回调，所有采集模式均生效。
//! 自动轮询模式下回调运行在轮询线程上，因此不得阻塞。
//!
//! # 使用示例
//!
//! ```rust
//! use ajsr04_driver::hooks::{HookManager, MeasurementCallback, MeasurementChannel};
//! use ajsr04_driver::Measurement;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (channel, rx) = MeasurementChannel::bounded(16);
//! hooks.add_callback(Arc::new(channel) as Arc<dyn MeasurementCallback>);
//!
//! hooks.trigger_all(&Measurement::default());
//! assert_eq!(rx.try_recv().unwrap(), Measurement::default());
//! ```

use crate::state::Measurement;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

/// 测量回调 Trait
///
/// # 性能要求
///
/// - **非阻塞**: 禁止 I/O 和等待锁
/// - **Channel 模式**: 使用 `try_send` 转发，在其他线程处理
pub trait MeasurementCallback: Send + Sync {
    /// `measurement` 对读者可见后立即调用。
    fn on_measurement(&self, measurement: &Measurement);
}

impl<F> MeasurementCallback for F
where
    F: Fn(&Measurement) + Send + Sync,
{
    fn on_measurement(&self, measurement: &Measurement) {
        self(measurement)
    }
}

/// 回调列表
///
/// 本身不做同步；会话用 `RwLock` 包裹。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn MeasurementCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn MeasurementCallback>) {
        self.callbacks.push(callback);
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 按注册顺序触发所有回调。
    ///
    /// 回调 panic 时记录日志并跳过；其余回调照常执行，
    /// 调用方（可能是轮询线程）继续运行。
    pub fn trigger_all(&self, measurement: &Measurement) {
        for (index, callback) in self.callbacks.iter().enumerate() {
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| callback.on_measurement(measurement)));
            if result.is_err() {
                error!(
                    "Measurement callback #{} panicked (sequence {})",
                    index, measurement.sequence
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// 将测量结果转发到有界 channel
///
/// 消费者跟不上时丢弃该测量并计数。
pub struct MeasurementChannel {
    tx: Sender<Measurement>,
    dropped: AtomicU64,
}

impl MeasurementChannel {
    pub fn bounded(capacity: usize) -> (Self, Receiver<Measurement>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// 因 channel 已满或已关闭而丢失的测量数。
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl MeasurementCallback for MeasurementChannel {
    fn on_measurement(&self, measurement: &Measurement) {
        match self.tx.try_send(*measurement) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajsr04_protocol::Status;
    use std::sync::atomic::AtomicUsize;

    fn measurement(sequence: u64) -> Measurement {
        Measurement {
            distance_mm: 100,
            status: Status::Ok,
            sequence,
            system_timestamp_us: 0,
        }
    }

    #[test]
    fn test_trigger_all_in_order() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut hooks = HookManager::new();

        for id in 0..3 {
            let order = order.clone();
            hooks.add_callback(Arc::new(move |_: &Measurement| order.lock().push(id)));
        }
        assert_eq!(hooks.len(), 3);

        hooks.trigger_all(&measurement(1));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut hooks = HookManager::new();
        hooks.add_callback(Arc::new(|m: &Measurement| {
            if m.sequence == 1 {
                panic!("callback failure");
            }
        }));
        let counter = calls.clone();
        hooks.add_callback(Arc::new(move |_: &Measurement| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        hooks.trigger_all(&measurement(1));
        hooks.trigger_all(&measurement(2));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_clear() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut hooks = HookManager::new();
        let counter = count.clone();
        hooks.add_callback(Arc::new(move |_: &Measurement| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        hooks.clear();
        assert!(hooks.is_empty());
        hooks.trigger_all(&measurement(1));
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_channel_drops_when_full() {
        let (channel, rx) = MeasurementChannel::bounded(1);
        channel.on_measurement(&measurement(1));
        channel.on_measurement(&measurement(2));

        assert_eq!(channel.dropped(), 1);
        assert_eq!(rx.try_recv().unwrap().sequence, 1);
        assert!(rx.try_recv().is_err());
    }
}
