//! 命令定义

pub mod config;
pub mod decode;
pub mod measure;
pub mod watch;

pub use config::{CliConfig, ConfigCommand};
pub use decode::DecodeCommand;
pub use measure::MeasureCommand;
pub use watch::WatchCommand;

use ajsr04_sdk::Measurement;

/// 每次测量输出一行。
pub fn format_measurement(m: &Measurement) -> String {
    match m.distance() {
        Some(d) => format!("#{:<5} {:>7}  {}", m.sequence, d.to_string(), m.status),
        None => format!("#{:<5} {:>7}  {}", m.sequence, "-", m.status),
    }
}
