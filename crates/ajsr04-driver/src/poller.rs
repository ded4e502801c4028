//! 后台轮询线程（自动轮询模式）
//!
//! 独立线程持有自己的链路，每个 tick 执行一次二进制测量周期。
//! tick 天然串行；调度规则为
//! `next = max(previous_deadline + interval, now)`，周期超时期间错过的 tick
//! 直接跳过，不会集中补发。
//!
//! 通过控制 channel 修改周期。修改立即生效（下一个 tick 马上触发），
//! 且不会中断正在进行的周期。
//!
//! 字节数不对的 tick 不读取任何数据，保留上一次测量结果。
//! 这些字节会留在缓冲区中，因此出现一个多余字节后，
//! 之后的 tick 都不会再发布结果，直到会话被释放并在重新打开的
//! 串口上重建。

use crate::cycle::{CycleOutcome, run_cycle};
use crate::error::DriverError;
use crate::heartbeat::ResponseMonitor;
use crate::state::SessionState;
use ajsr04_protocol::{
    DEFAULT_POLLING_INTERVAL, Framing, MIN_POLLING_INTERVAL, Reading, SETTLE_DELAY, Status,
};
use ajsr04_serial::SerialLink;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};

/// 轮询配置（POD 数据）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// tick 周期，下限为 [`MIN_POLLING_INTERVAL`]
    pub interval: Duration,
    /// 触发与读取之间的等待时间
    pub settle_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLLING_INTERVAL,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// 应用轮询周期下限。
#[inline]
pub fn clamp_interval(interval: Duration) -> Duration {
    interval.max(MIN_POLLING_INTERVAL)
}

#[derive(Debug)]
enum PollerControl {
    Reprogram(Duration),
    Shutdown,
}

/// 支持超时的线程 join 扩展 Trait
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        std::thread::spawn(move || {
            let _ = tx.send(self.join());
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(RecvTimeoutError::Timeout) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// 运行中轮询线程的句柄
///
/// 修改周期时重新编程而不是替换线程。关闭操作幂等，
/// drop 时也会执行。
#[derive(Debug)]
pub struct Poller {
    control_tx: Sender<PollerControl>,
    thread: Option<JoinHandle<()>>,
    interval_us: Arc<AtomicU64>,
    is_running: Arc<AtomicBool>,
}

impl Poller {
    /// 关闭时等待线程完成当前周期的最长时间。
    const JOIN_TIMEOUT: Duration = Duration::from_secs(3);

    /// 将 `link` 移交给新的轮询线程，并立即触发第一个 tick。
    ///
    /// # 错误
    /// - `DriverError::PollerThread`: 操作系统拒绝创建线程
    pub fn spawn(
        link: impl SerialLink + 'static,
        trigger: u8,
        config: PollerConfig,
        state: Arc<SessionState>,
    ) -> Result<Self, DriverError> {
        let interval = clamp_interval(config.interval);
        let (control_tx, control_rx) = crossbeam_channel::unbounded();
        let interval_us = Arc::new(AtomicU64::new(interval.as_micros() as u64));
        let is_running = Arc::new(AtomicBool::new(true));

        state
            .monitor
            .set_timeout(ResponseMonitor::timeout_for_interval(interval));

        let ctx = PollLoop {
            trigger,
            settle_delay: config.settle_delay,
            interval,
            control_rx,
            state,
            is_running: is_running.clone(),
        };

        let thread = std::thread::Builder::new()
            .name("ajsr04-poller".into())
            .spawn(move || ctx.run(link))
            .map_err(|e| DriverError::PollerThread(e.to_string()))?;

        debug!("Poller started: trigger=0x{:02X}, interval={:?}", trigger, interval);

        Ok(Self {
            control_tx,
            thread: Some(thread),
            interval_us,
            is_running,
        })
    }

    /// 修改 tick 周期，返回实际生效（已限幅）的周期。
    ///
    /// # 错误
    /// - `DriverError::PollerThread`: 轮询线程已不在运行
    pub fn set_interval(&self, interval: Duration) -> Result<Duration, DriverError> {
        let effective = clamp_interval(interval);
        if effective != interval {
            debug!("Polling interval {:?} clamped to {:?}", interval, effective);
        }

        self.control_tx
            .send(PollerControl::Reprogram(effective))
            .map_err(|_| DriverError::PollerThread("poller thread has exited".into()))?;
        self.interval_us
            .store(effective.as_micros() as u64, Ordering::Relaxed);
        Ok(effective)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_micros(self.interval_us.load(Ordering::Relaxed))
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some() && self.is_running.load(Ordering::Acquire)
    }

    /// 停止 tick 并释放链路。重复调用无副作用。
    pub fn shutdown(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };

        // 线程可能已经退出；channel 关闭无妨
        let _ = self.control_tx.send(PollerControl::Shutdown);

        if let Err(_e) = handle.join_timeout(Self::JOIN_TIMEOUT) {
            error!(
                "Poller thread panicked or failed to shut down within {:?}",
                Self::JOIN_TIMEOUT
            );
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 轮询线程结束时（包括 unwind）清除运行标志
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 轮询线程除链路之外持有的全部状态
struct PollLoop {
    trigger: u8,
    settle_delay: Duration,
    interval: Duration,
    control_rx: Receiver<PollerControl>,
    state: Arc<SessionState>,
    is_running: Arc<AtomicBool>,
}

impl PollLoop {
    fn run(mut self, mut link: impl SerialLink) {
        let _running = RunningGuard(self.is_running.clone());
        let mut deadline = Instant::now();

        loop {
            match self.control_rx.recv_deadline(deadline) {
                Ok(PollerControl::Reprogram(interval)) => {
                    self.interval = interval;
                    self.state
                        .monitor
                        .set_timeout(ResponseMonitor::timeout_for_interval(interval));
                    self.state.metrics.reprograms.fetch_add(1, Ordering::Relaxed);
                    deadline = Instant::now();
                    continue;
                },
                Ok(PollerControl::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {},
            }

            self.tick(&mut link);

            deadline = (deadline + self.interval).max(Instant::now());
        }

        link.close();
        debug!("Poller stopped");
    }

    fn tick(&self, link: &mut dyn SerialLink) {
        let outcome = run_cycle(
            link,
            self.trigger,
            Framing::Binary,
            self.settle_delay,
            &self.state.metrics,
        );

        match outcome {
            CycleOutcome::Decoded(reading) => {
                if !reading.is_ok() {
                    warn!("Poller tick: checksum mismatch");
                }
                self.state.publish(reading);
            },
            CycleOutcome::WrongLength { available } => {
                // 容忍读取失败：保留上一次测量结果
                trace!("Poller tick: no complete frame ({} bytes)", available);
            },
            CycleOutcome::Link(e) if e.is_timeout() => {
                self.state.publish(Reading::failed(Status::TimeOut));
            },
            CycleOutcome::Link(e) => {
                warn!("Poller tick: link failure: {}", e);
                self.state.publish(Reading::failed(Status::ConfigError));
            },
        }
    }
}
