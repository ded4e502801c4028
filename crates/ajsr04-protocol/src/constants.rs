//! 硬件常量
//!
//! 传感器依赖的所有时序和帧格式数值都集中在这里，
//! 解码器和驱动层不再各自携带魔数。

use std::time::Duration;

/// JSN-SR04T 的触发字节。
pub const TRIGGER_JSN_SR04T: u8 = 0x55;

/// AJ-SR04M 的触发字节。
pub const TRIGGER_AJ_SR04M: u8 = 0x01;

/// 二进制报文长度：`[marker, high, low, checksum]`。
pub const BINARY_FRAME_LEN: usize = 4;

/// ASCII 报文长度：`Gap=DDDDmm\r\n`。
pub const ASCII_FRAME_LEN: usize = 12;

/// ASCII 报文的固定前缀。
pub const ASCII_PREFIX: &[u8; 4] = b"Gap=";

/// ASCII 报文的固定后缀。
pub const ASCII_SUFFIX: &[u8; 4] = b"mm\r\n";

/// ASCII 报文中第一个距离数字的偏移。
pub const ASCII_DIGITS_OFFSET: usize = 4;

/// ASCII 报文中距离数字的个数。
pub const ASCII_DIGIT_COUNT: usize = 4;

/// 格式正确的 ASCII 报文中八个固定字节之和。
///
/// `G a p =` 贡献 71 + 97 + 112 + 61，`m m \r \n` 贡献
/// 109 + 109 + 13 + 10。
pub const ASCII_FRAMING_SUM: u32 = 582;

/// 大多数二进制报文的起始标记字节。
pub const BINARY_MARKER: u8 = 0xFF;

/// 测量周期失败时报告的距离。
pub const INVALID_DISTANCE_MM: i32 = -1;

/// 发送触发字节与读取应答之间的等待时间。
///
/// 这是硬件时序约束：传感器测距并应答需要这段时间。
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// 自动轮询的默认周期。
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(1000);

/// 自动轮询允许的最短周期。
pub const MIN_POLLING_INTERVAL: Duration = Duration::from_millis(100);

/// 传感器出厂波特率。
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// 串口链路默认读写超时。
pub const DEFAULT_LINK_TIMEOUT: Duration = Duration::from_millis(1000);
