//! Response Monitor - tracks when the sensor last produced a valid frame
//!
//! **App Start Relative Time Pattern**:
//! - Uses monotonic time anchored to the first use in this process
//! - Unaffected by system clock changes (NTP, manual adjustments)
//! - Safe to store in AtomicU64 for lock-free access

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global anchor point for monotonic time
static APP_START: OnceLock<Instant> = OnceLock::new();

/// Monotonic time as microseconds since the anchor.
///
/// Also used to stamp every published measurement.
pub fn monotonic_micros() -> u64 {
    let start = APP_START.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// Sentinel for "no valid frame yet"
const NEVER: u64 = 0;

/// Sensor responsiveness monitor
///
/// Unlike a connection heartbeat, the monitor starts out unresponsive: a
/// session is only considered alive once the sensor has answered with a frame
/// that passed its integrity check.
#[derive(Debug)]
pub struct ResponseMonitor {
    /// Micros since anchor, offset by one so that zero means never
    last_response: AtomicU64,
    timeout_us: AtomicU64,
}

impl ResponseMonitor {
    /// Create a new monitor
    ///
    /// # Parameters
    /// - `timeout`: Maximum duration without a valid frame before the sensor
    ///   is considered unresponsive
    ///
    /// # Example
    /// ```
    /// # use ajsr04_driver::heartbeat::ResponseMonitor;
    /// # use std::time::Duration;
    /// let monitor = ResponseMonitor::new(Duration::from_secs(3));
    /// assert!(!monitor.is_responsive());
    /// monitor.register_response();
    /// assert!(monitor.is_responsive());
    /// ```
    pub fn new(timeout: Duration) -> Self {
        // anchor the clock before any measurement is stamped
        let _ = monotonic_micros();
        Self {
            last_response: AtomicU64::new(NEVER),
            timeout_us: AtomicU64::new(timeout.as_micros() as u64),
        }
    }

    /// Timeout for a poller running at `interval`: three missed ticks, and
    /// never less than one second.
    pub fn timeout_for_interval(interval: Duration) -> Duration {
        (interval * 3).max(Duration::from_secs(1))
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_us
            .store(timeout.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_micros(self.timeout_us.load(Ordering::Relaxed))
    }

    /// Record a valid frame.
    pub fn register_response(&self) {
        let now = monotonic_micros();
        self.last_response.store(now + 1, Ordering::Relaxed);
    }

    /// Whether a valid frame arrived within the timeout window.
    pub fn is_responsive(&self) -> bool {
        self.time_since_last_response()
            .is_some_and(|elapsed| elapsed < self.timeout())
    }

    /// Time since the last valid frame, `None` if there never was one.
    pub fn time_since_last_response(&self) -> Option<Duration> {
        match self.last_response.load(Ordering::Relaxed) {
            NEVER => None,
            stamp => {
                let last_us = stamp - 1;
                let now_us = monotonic_micros();
                Some(Duration::from_micros(now_us.saturating_sub(last_us)))
            },
        }
    }
}
