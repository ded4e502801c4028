//! 单次 触发/等待/读取/解码 周期
//!
//! ```text
//! Idle → Triggered → AwaitingResponse → Decoded(Ok) | Decoded(ChecksumFail) | WrongLength
//! ```
//!
//! 按需路径与轮询线程共用。周期本身不发布任何结果，
//! 由调用方决定每种结果如何写入共享状态。

use crate::metrics::PollerMetrics;
use ajsr04_protocol::{
    ASCII_FRAME_LEN, ASCII_FRAMING_SUM, Framing, Reading, ascii_framing_sum, binary_checksum,
    decode,
};
use ajsr04_serial::{SerialError, SerialLink};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, trace};

/// 周期结束方式
#[derive(Debug)]
pub(crate) enum CycleOutcome {
    /// 读到预期长度的帧并已解码
    Decoded(Reading),
    /// 字节数不匹配，未读取任何数据
    WrongLength { available: usize },
    /// 触发、查询或读取时链路失败
    Link(SerialError),
}

/// 执行一次测量周期并统计结果。
pub(crate) fn run_cycle(
    link: &mut dyn SerialLink,
    trigger: u8,
    framing: Framing,
    settle_delay: Duration,
    metrics: &PollerMetrics,
) -> CycleOutcome {
    metrics.cycles.fetch_add(1, Ordering::Relaxed);

    let outcome = acquire(link, trigger, framing, settle_delay);

    let counter = match &outcome {
        CycleOutcome::Decoded(reading) if reading.is_ok() => &metrics.ok,
        CycleOutcome::Decoded(_) => &metrics.checksum_failures,
        CycleOutcome::WrongLength { .. } => &metrics.no_response,
        CycleOutcome::Link(e) if e.is_timeout() => &metrics.timeouts,
        CycleOutcome::Link(_) => &metrics.link_errors,
    };
    counter.fetch_add(1, Ordering::Relaxed);

    outcome
}

fn acquire(
    link: &mut dyn SerialLink,
    trigger: u8,
    framing: Framing,
    settle_delay: Duration,
) -> CycleOutcome {
    if let Err(e) = link.write(&[trigger]) {
        return CycleOutcome::Link(e);
    }

    // 硬件时序约束：传感器测距并应答需要这段时间
    spin_sleep::sleep(settle_delay);

    let expected = framing.frame_len();
    let available = match link.bytes_available() {
        Ok(n) => n,
        Err(e) => return CycleOutcome::Link(e),
    };

    if available != expected {
        debug!(
            "Expected {} bytes ({} framing), {} available",
            expected, framing, available
        );
        return CycleOutcome::WrongLength { available };
    }

    let mut buf = [0u8; ASCII_FRAME_LEN];
    let frame = &mut buf[..expected];
    if let Err(e) = link.read_exact(frame) {
        return CycleOutcome::Link(e);
    }

    trace_frame(framing, frame);
    CycleOutcome::Decoded(decode(framing, frame))
}

/// 接收帧的原始字节及其校验值。
fn trace_frame(framing: Framing, frame: &[u8]) {
    match framing {
        Framing::Binary => {
            if let [marker, high, low, sum] = *frame {
                trace!(
                    "RX {} sum={} datacheck={}",
                    hex::encode(frame),
                    sum,
                    binary_checksum(marker, high, low)
                );
            }
        },
        Framing::Ascii => {
            if let Ok(ascii) = <&[u8; ASCII_FRAME_LEN]>::try_from(frame) {
                trace!(
                    "RX {} sum={} datacheck={}",
                    hex::encode(frame),
                    ascii_framing_sum(ascii),
                    ASCII_FRAMING_SUM
                );
            }
        },
    }
}
