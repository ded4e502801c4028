//! 采集统计
//!
//! 描述测量周期结束方式的原子计数器。
//! 任意线程都可以无锁读取。

use std::sync::atomic::{AtomicU64, Ordering};

/// 会话级周期计数器
///
/// 轮询线程与按需 `get_distance()` 调用都会更新。
///
/// # 示例
///
/// ```rust
/// use ajsr04_driver::metrics::PollerMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = PollerMetrics::default();
/// metrics.cycles.fetch_add(1, Ordering::Relaxed);
/// metrics.ok.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.success_rate(), 100.0);
/// ```
#[derive(Debug, Default)]
pub struct PollerMetrics {
    /// 已开始的测量周期（已尝试触发）
    pub cycles: AtomicU64,

    /// 校验通过的帧
    pub ok: AtomicU64,

    /// 长度正确但校验失败的帧
    pub checksum_failures: AtomicU64,

    /// 字节数与帧长度不符的周期
    ///
    /// 自动轮询模式下这些 tick 不发布结果。
    pub no_response: AtomicU64,

    /// 链路读写超时
    pub timeouts: AtomicU64,

    /// 其他链路错误（设备丢失、I/O 错误）
    pub link_errors: AtomicU64,

    /// 轮询周期调整次数
    pub reprograms: AtomicU64,
}

impl PollerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            ok: self.ok.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            no_response: self.no_response.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            link_errors: self.link_errors.load(Ordering::Relaxed),
            reprograms: self.reprograms.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.cycles.store(0, Ordering::Relaxed);
        self.ok.store(0, Ordering::Relaxed);
        self.checksum_failures.store(0, Ordering::Relaxed);
        self.no_response.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.link_errors.store(0, Ordering::Relaxed);
        self.reprograms.store(0, Ordering::Relaxed);
    }
}

/// [`PollerMetrics`] 的时间点快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub ok: u64,
    pub checksum_failures: u64,
    pub no_response: u64,
    pub timeouts: u64,
    pub link_errors: u64,
    pub reprograms: u64,
}

impl MetricsSnapshot {
    /// 产生有效帧的周期占比，0.0 到 100.0。
    ///
    /// 尚未运行任何周期时返回 0.0。
    pub fn success_rate(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        (self.ok as f64 / self.cycles as f64) * 100.0
    }

    /// 未得到可用距离的周期数。
    pub fn failures(&self) -> u64 {
        self.checksum_failures + self.no_response + self.timeouts + self.link_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_default() {
        let snapshot = PollerMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
        assert_eq!(snapshot.success_rate(), 0.0);
    }

    #[test]
    fn test_rates() {
        let metrics = PollerMetrics::new();
        metrics.cycles.fetch_add(8, Ordering::Relaxed);
        metrics.ok.fetch_add(6, Ordering::Relaxed);
        metrics.checksum_failures.fetch_add(1, Ordering::Relaxed);
        metrics.no_response.fetch_add(1, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.success_rate(), 75.0);
        assert_eq!(snapshot.failures(), 2);
    }

    #[test]
    fn test_reset() {
        let metrics = PollerMetrics::new();
        metrics.cycles.fetch_add(3, Ordering::Relaxed);
        metrics.reprograms.fetch_add(1, Ordering::Relaxed);
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = Arc::new(PollerMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.cycles.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().cycles, 4000);
    }
}
