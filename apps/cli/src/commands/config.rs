//! 配置文件管理
//!
//! 以 TOML 格式保存在 `<config_dir>/ajsr04/config.toml`，可用 `--config`
//! 指定其他位置。命令行参数优先于文件中的值。

use ajsr04_sdk::{SensorKind, SerialConfig};
use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("cannot determine the configuration directory")?;
    path.push("ajsr04");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 传感器型号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<SensorKind>,

    /// 自动轮询周期（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_ms: Option<u64>,

    /// 串口链路设置
    pub serial: SerialConfig,
}

impl CliConfig {
    /// 从 `path` 加载；文件不存在时返回默认值。
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// 实际使用的传感器型号（依次为 `--sensor`、配置文件、AJ-SR04M）。
    pub fn sensor(&self, flag: Option<SensorKind>) -> SensorKind {
        flag.or(self.sensor).unwrap_or(SensorKind::AjSr04m)
    }

    /// 实际使用的链路设置（依次为 `--port`、配置文件）。
    pub fn serial(&self, flag: Option<&str>) -> Result<SerialConfig> {
        let mut serial = self.serial.clone();
        if let Some(port) = flag {
            serial.port = port.to_string();
        }
        if serial.port.is_empty() {
            anyhow::bail!("no serial port given: pass --port or run `config set --port <PORT>`");
        }
        Ok(serial)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_ms.map(Duration::from_millis)
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印当前配置
    Show,

    /// 更新配置项
    ///
    /// 全局 `--port` 和 `--sensor` 参数也会一并保存。
    Set {
        /// 波特率
        #[arg(short, long)]
        baud: Option<u32>,

        /// 自动轮询周期（毫秒）
        #[arg(long)]
        poll_ms: Option<u64>,

        /// 读超时（毫秒）
        #[arg(long)]
        read_timeout_ms: Option<u64>,
    },

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(
        self,
        path: &Path,
        port: Option<String>,
        sensor: Option<SensorKind>,
    ) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = CliConfig::load(path)?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            },

            ConfigCommand::Set {
                baud,
                poll_ms,
                read_timeout_ms,
            } => {
                let mut config = CliConfig::load(path)?;

                if let Some(port) = port {
                    println!("port = {port}");
                    config.serial.port = port;
                }
                if let Some(sensor) = sensor {
                    println!("sensor = {sensor}");
                    config.sensor = Some(sensor);
                }
                if let Some(baud) = baud {
                    println!("baud_rate = {baud}");
                    config.serial.baud_rate = baud;
                }
                if let Some(ms) = poll_ms {
                    println!("poll_ms = {ms}");
                    config.poll_ms = Some(ms);
                }
                if let Some(ms) = read_timeout_ms {
                    println!("read_timeout_ms = {ms}");
                    config.serial.read_timeout_ms = ms;
                }

                config.save(path)
            },

            ConfigCommand::Path => {
                println!("{}", path.display());
                Ok(())
            },
        }
    }
}
