//! # AJ-SR04 CLI
//!
//! AJ-SR04M / JSN-SR04T 超声波传感器的命令行工具。
//!
//! ```bash
//! # 保存默认端口和传感器型号
//! ajsr04-cli config set --port /dev/ttyUSB0 --sensor jsn-sr04t
//!
//! # 五次按需测量，间隔半秒
//! ajsr04-cli measure -n 5 -i 500
//!
//! # 每 200 ms 后台轮询，每秒打印一次，直到 Ctrl-C
//! ajsr04-cli watch --poll-ms 200
//!
//! # 解码抓取到的帧
//! ajsr04-cli decode ff07d0d7
//! ```

use ajsr04_sdk::SensorKind;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{
    CliConfig, ConfigCommand, DecodeCommand, MeasureCommand, WatchCommand,
    config::default_config_file,
};

/// AJ-SR04 CLI - 超声波测距工具
#[derive(Parser, Debug)]
#[command(name = "ajsr04-cli")]
#[command(about = "Command-line interface for AJ-SR04 ultrasonic ranging sensors", long_about = None)]
#[command(version)]
struct Cli {
    /// 串口设备（覆盖配置文件）
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// 传感器型号：jsn-sr04t 或 aj-sr04m（覆盖配置文件）
    #[arg(short, long, global = true)]
    sensor: Option<SensorKind>,

    /// 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 按需测量
    Measure {
        #[command(flatten)]
        args: MeasureCommand,
    },

    /// 后台轮询并打印最新测量结果
    Watch {
        #[command(flatten)]
        args: WatchCommand,
    },

    /// 解码抓取到的帧（无需硬件）
    Decode {
        #[command(flatten)]
        args: DecodeCommand,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ajsr04_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_file()?,
    };

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&config_path, cli.port, cli.sensor),

        Commands::Decode { args } => args.execute(),

        Commands::Measure { args } => {
            let config = CliConfig::load(&config_path)?;
            args.execute(config.sensor(cli.sensor), config.serial(cli.port.as_deref())?)
        },

        Commands::Watch { args } => {
            let config = CliConfig::load(&config_path)?;
            args.execute(
                config.sensor(cli.sensor),
                config.serial(cli.port.as_deref())?,
                config.poll_interval(),
            )
        },
    }
}
