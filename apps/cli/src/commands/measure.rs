//! 按需测量

use super::format_measurement;
use ajsr04_sdk::prelude::*;
use anyhow::{Context, Result};
use clap::Args;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// 按需测量参数
#[derive(Args, Debug)]
pub struct MeasureCommand {
    /// 测量次数
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,

    /// 两次测量之间的间隔（毫秒）
    #[arg(short, long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// 请求 ASCII 报文（`Gap=DDDDmm`）
    #[arg(long)]
    pub ascii: bool,

    /// 传感器不支持 ASCII 输出时直接失败，而不是回退到二进制
    #[arg(long)]
    pub strict: bool,
}

impl MeasureCommand {
    pub fn mode(&self) -> AcquisitionMode {
        if self.ascii {
            AcquisitionMode::AsciiOnDemand
        } else {
            AcquisitionMode::BinaryOnDemand
        }
    }

    pub fn execute(&self, sensor: SensorKind, serial: SerialConfig) -> Result<()> {
        let port = serial.port.clone();
        let mut session = SessionBuilder::new(sensor, self.mode())
            .serial_config(serial)
            .strict_mode(self.strict)
            .build()
            .with_context(|| format!("failed to open {sensor} on {port}"))?;

        info!("{} on {} ({}, {} framing)", sensor, port, session.mode(), session.framing());

        for i in 0..self.count {
            if i > 0 {
                thread::sleep(Duration::from_millis(self.interval_ms));
            }
            let m = session.get_distance()?;
            if !m.is_ok() {
                warn!("cycle {} failed: {}", m.sequence, m.status);
            }
            println!("{}", format_measurement(&m));
        }

        let metrics = session.metrics();
        info!(
            "{} cycles, {} ok ({:.0}%)",
            metrics.cycles,
            metrics.ok,
            metrics.success_rate()
        );
        session.dispose();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        let mut cmd = MeasureCommand {
            count: 1,
            interval_ms: 1000,
            ascii: false,
            strict: false,
        };
        assert_eq!(cmd.mode(), AcquisitionMode::BinaryOnDemand);
        cmd.ascii = true;
        assert_eq!(cmd.mode(), AcquisitionMode::AsciiOnDemand);
    }
}
