//! 自动轮询监视
//!
//! 轮询线程在后台刷新共享测量结果；此循环
//! 只按自己的节奏采样。

use super::format_measurement;
use ajsr04_sdk::prelude::*;
use ajsr04_sdk::protocol::DEFAULT_POLLING_INTERVAL;
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

/// 自动轮询参数
#[derive(Args, Debug)]
pub struct WatchCommand {
    /// 传感器轮询周期（毫秒，最小 100）
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// 显示间隔（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub read_ms: u64,

    /// 输出这么多行后停止（默认：直到 Ctrl-C）
    #[arg(short = 'n', long)]
    pub count: Option<u64>,
}

impl WatchCommand {
    /// 实际使用的轮询周期（依次为 `--poll-ms`、配置文件）。
    pub fn poll_interval(&self, configured: Option<Duration>) -> Duration {
        self.poll_ms
            .map(Duration::from_millis)
            .or(configured)
            .unwrap_or(DEFAULT_POLLING_INTERVAL)
    }

    pub fn execute(
        &self,
        sensor: SensorKind,
        serial: SerialConfig,
        configured: Option<Duration>,
    ) -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .context("failed to install the Ctrl-C handler")?;

        let port = serial.port.clone();
        let mut session = SessionBuilder::new(sensor, AcquisitionMode::AutoPolling)
            .serial_config(serial)
            .polling_interval(self.poll_interval(configured))
            .build()
            .with_context(|| format!("failed to open {sensor} on {port}"))?;

        if let Some(interval) = session.polling_interval() {
            info!("{} on {}, polling every {:?}", sensor, port, interval);
        }

        let reader = session.reader();
        let mut lines = 0u64;
        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(self.read_ms));
            let m = reader.measurement();
            if m.sequence == 0 {
                continue;
            }
            println!("{}", format_measurement(&m));

            lines += 1;
            if self.count.is_some_and(|n| lines >= n) {
                break;
            }
        }

        let metrics = session.metrics();
        info!(
            "{} cycles: {} ok, {} checksum failures, {} without response, {} timeouts",
            metrics.cycles,
            metrics.ok,
            metrics.checksum_failures,
            metrics.no_response,
            metrics.timeouts
        );
        session.dispose();
        Ok(())
    }
}
