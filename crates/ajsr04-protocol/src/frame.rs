//! 帧解码与编码
//!
//! 作用于定长字节窗口的纯函数，不涉及任何链路：
//! 调用方负责在解码前恰好读取一帧。
//!
//! # 二进制帧
//!
//! ```text
//! [marker][distance high][distance low][checksum]
//! checksum = (marker + high + low + 1) & 0xFF
//! ```
//!
//! # ASCII 帧
//!
//! ```text
//!  G  a   p  =  1  8  8  1   m   m CR LF
//! 71 97 112 61 49 56 56 49 109 109 13 10
//! ```
//!
//! ASCII 格式没有校验和。完整性通过八个固定字节之和
//! 与 [`ASCII_FRAMING_SUM`] 比较来近似判断。该检查与顺序无关，
//! 也不具备密码学强度：保持总和不变的固定字节损坏无法发现，
//! 数字部分也从不参与校验。

use crate::ProtocolError;
use crate::constants::*;
use crate::types::{Framing, Status};

/// 二进制原始报文
pub type BinaryFrame = [u8; BINARY_FRAME_LEN];

/// ASCII 原始报文
pub type AsciiFrame = [u8; ASCII_FRAME_LEN];

/// 传感器附加在二进制报文末尾的校验和。
#[inline]
pub fn binary_checksum(marker: u8, high: u8, low: u8) -> u8 {
    ((marker as u32 + high as u32 + low as u32 + 1) & 0xFF) as u8
}

/// ASCII 报文中八个非数字字节之和。
///
/// 这是 ASCII 报文唯一的完整性检查。它并不是真正意义上的校验和：
/// 不覆盖数字、与顺序无关，
/// 也发现不了保持总和不变的固定字节损坏。
#[inline]
pub fn ascii_framing_sum(frame: &AsciiFrame) -> u32 {
    frame[..ASCII_DIGITS_OFFSET]
        .iter()
        .chain(frame[ASCII_DIGITS_OFFSET + ASCII_DIGIT_COUNT..].iter())
        .map(|&b| b as u32)
        .sum()
}

/// 解码二进制报文。
///
/// # 错误
/// - `ProtocolError::ChecksumMismatch`: 末尾字节不等于
///   `(marker + high + low + 1) & 0xFF`
///
/// # 示例
///
/// ```
/// use ajsr04_protocol::decode_binary;
///
/// assert_eq!(decode_binary(&[0x55, 0x00, 0xC8, 30]).unwrap(), 200);
/// assert!(decode_binary(&[0x55, 0x00, 0xC8, 31]).is_err());
/// ```
pub fn decode_binary(frame: &BinaryFrame) -> Result<u16, ProtocolError> {
    let [marker, high, low, checksum] = *frame;
    let expected = binary_checksum(marker, high, low);

    if expected != checksum {
        return Err(ProtocolError::ChecksumMismatch {
            expected: expected as u32,
            actual: checksum as u32,
        });
    }

    Ok(u16::from_be_bytes([high, low]))
}

/// 解码 ASCII 报文。
///
/// 不校验数字：距离字段中的非数字字节仍按 `byte - '0'` 计入，
/// 因此在固定字节之和恰好匹配时，结果可能超出 `0..=9999`。
///
/// # 错误
/// - `ProtocolError::ChecksumMismatch`: 固定字节之和不等于
///   [`ASCII_FRAMING_SUM`]
pub fn decode_ascii(frame: &AsciiFrame) -> Result<i32, ProtocolError> {
    let sum = ascii_framing_sum(frame);

    if sum != ASCII_FRAMING_SUM {
        return Err(ProtocolError::ChecksumMismatch {
            expected: ASCII_FRAMING_SUM,
            actual: sum,
        });
    }

    let digits = &frame[ASCII_DIGITS_OFFSET..ASCII_DIGITS_OFFSET + ASCII_DIGIT_COUNT];
    let distance = digits
        .iter()
        .fold(0i32, |acc, &b| acc * 10 + (b as i32 - b'0' as i32));

    Ok(distance)
}

/// 按传感器的方式构造二进制报文。
///
/// 供 mock 链路和测试使用。
pub fn encode_binary(marker: u8, distance_mm: u16) -> BinaryFrame {
    let [high, low] = distance_mm.to_be_bytes();
    [marker, high, low, binary_checksum(marker, high, low)]
}

/// 按传感器的方式构造 ASCII 报文。
///
/// 超过 9999 mm 的距离无法表示，按饱和处理。
pub fn encode_ascii(distance_mm: u16) -> AsciiFrame {
    let value = distance_mm.min(9999);
    let mut frame = [0u8; ASCII_FRAME_LEN];
    frame[..ASCII_DIGITS_OFFSET].copy_from_slice(ASCII_PREFIX);
    let digits = [
        (value / 1000) % 10,
        (value / 100) % 10,
        (value / 10) % 10,
        value % 10,
    ];
    for (slot, digit) in frame[ASCII_DIGITS_OFFSET..].iter_mut().zip(digits) {
        *slot = b'0' + digit as u8;
    }
    frame[ASCII_DIGITS_OFFSET + ASCII_DIGIT_COUNT..].copy_from_slice(ASCII_SUFFIX);
    frame
}

/// 单次解码产生的距离/状态对
///
/// 两个字段总是一起产生；解码失败时
/// `distance_mm` 必为 -1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// 距离（毫米），失败时为 -1
    pub distance_mm: i32,
    /// 周期结果
    pub status: Status,
}

impl Reading {
    /// 成功读数。
    #[inline]
    pub const fn ok(distance_mm: i32) -> Self {
        Self {
            distance_mm,
            status: Status::Ok,
        }
    }

    /// 带指定状态的失败读数。
    #[inline]
    pub const fn failed(status: Status) -> Self {
        Self {
            distance_mm: INVALID_DISTANCE_MM,
            status,
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::ok(0)
    }
}

impl From<Result<i32, ProtocolError>> for Reading {
    fn from(result: Result<i32, ProtocolError>) -> Self {
        match result {
            Ok(distance_mm) => Self::ok(distance_mm),
            Err(e) => Self::failed(e.status()),
        }
    }
}

/// 带长度检查的解码，返回距离。
///
/// # 错误
/// - `ProtocolError::InvalidLength`: `bytes` 长度不等于 `framing.frame_len()`
/// - `ProtocolError::ChecksumMismatch`: 见 [`decode_binary`] / [`decode_ascii`]
pub fn decode_frame(framing: Framing, bytes: &[u8]) -> Result<i32, ProtocolError> {
    let invalid_length = || ProtocolError::InvalidLength {
        expected: framing.frame_len(),
        actual: bytes.len(),
    };

    match framing {
        Framing::Binary => {
            let frame = <&BinaryFrame>::try_from(bytes).map_err(|_| invalid_length())?;
            decode_binary(frame).map(i32::from)
        },
        Framing::Ascii => {
            let frame = <&AsciiFrame>::try_from(bytes).map_err(|_| invalid_length())?;
            decode_ascii(frame)
        },
    }
}

/// 带长度检查的解码。
///
/// 长度不等于 `framing.frame_len()` 的缓冲区不会进入解码器，
/// 结果为 `Status::DataError`。
pub fn decode(framing: Framing, bytes: &[u8]) -> Reading {
    decode_frame(framing, bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_binary_known_frame() {
        // (0x55 + 0x00 + 0xC8 + 1) & 0xFF = 286 & 0xFF = 30
        assert_eq!(decode_binary(&[0x55, 0x00, 0xC8, 30]).unwrap(), 200);
    }

    #[test]
    fn test_decode_binary_high_byte() {
        let frame = [0xFF, 0x07, 0xD0, binary_checksum(0xFF, 0x07, 0xD0)];
        assert_eq!(decode_binary(&frame).unwrap(), 2000);
    }

    #[test]
    fn test_decode_binary_checksum_mismatch() {
        let err = decode_binary(&[0x55, 0x00, 0xC8, 0xC8]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ChecksumMismatch {
                expected: 30,
                actual: 0xC8
            }
        ));
        assert_eq!(err.status(), Status::DataCheckError);
    }

    #[test]
    fn test_decode_ascii_sample_stream() {
        let frame = *b"Gap=1881mm\r\n";
        assert_eq!(frame, [71, 97, 112, 61, 49, 56, 56, 49, 109, 109, 13, 10]);
        assert_eq!(decode_ascii(&frame).unwrap(), 1881);
    }

    #[test]
    fn test_decode_ascii_zero_padded() {
        assert_eq!(decode_ascii(b"Gap=0042mm\r\n").unwrap(), 42);
    }

    #[test]
    fn test_decode_ascii_bad_framing() {
        let err = decode_ascii(b"Gap:1881mm\r\n").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ChecksumMismatch {
                expected: 582,
                actual: 579
            }
        ));
    }

    #[test]
    fn test_decode_ascii_swapped_literals_pass() {
        // 与顺序无关：打乱固定字节不改变总和。
        assert_eq!(decode_ascii(b"paG=0100mm\n\r").unwrap(), 100);
    }

    #[test]
    fn test_encode_binary_roundtrip_edges() {
        for distance in [0u16, 1, 255, 256, 6000, u16::MAX] {
            let frame = encode_binary(BINARY_MARKER, distance);
            assert_eq!(decode_binary(&frame).unwrap(), distance);
        }
    }

    #[test]
    fn test_encode_ascii_layout() {
        assert_eq!(&encode_ascii(1881), b"Gap=1881mm\r\n");
        assert_eq!(&encode_ascii(7), b"Gap=0007mm\r\n");
        assert_eq!(&encode_ascii(12_000), b"Gap=9999mm\r\n");
    }

    #[test]
    fn test_decode_wrong_length_is_data_error() {
        let reading = decode(Framing::Binary, &[0x55, 0x00, 0xC8]);
        assert_eq!(reading, Reading::failed(Status::DataError));
        assert_eq!(reading.distance_mm, -1);

        let reading = decode(Framing::Ascii, b"Gap=1881mm\r");
        assert_eq!(reading.status, Status::DataError);
    }

    #[test]
    fn test_decode_frame_reports_length() {
        assert_eq!(
            decode_frame(Framing::Binary, &[0xFF, 0x00, 0xC8]),
            Err(ProtocolError::InvalidLength {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            decode_frame(Framing::Ascii, &encode_binary(0xFF, 10)),
            Err(ProtocolError::InvalidLength {
                expected: 12,
                actual: 4
            })
        );
        assert_eq!(decode_frame(Framing::Ascii, &encode_ascii(42)), Ok(42));
    }

    #[test]
    fn test_decode_dispatch() {
        assert_eq!(decode(Framing::Binary, &[0x55, 0x00, 0xC8, 30]), Reading::ok(200));
        assert_eq!(decode(Framing::Ascii, b"Gap=0200mm\r\n"), Reading::ok(200));
        assert_eq!(
            decode(Framing::Binary, &[0x55, 0x00, 0xC8, 29]),
            Reading::failed(Status::DataCheckError)
        );
    }

    proptest! {
        #[test]
        fn prop_binary_ok_iff_checksum_matches(marker: u8, high: u8, low: u8, checksum: u8) {
            let frame = [marker, high, low, checksum];
            let matches = ((marker as u32 + high as u32 + low as u32 + 1) & 0xFF) as u8 == checksum;
            let reading = decode(Framing::Binary, &frame);

            if matches {
                prop_assert_eq!(reading, Reading::ok(((high as i32) << 8) | low as i32));
            } else {
                prop_assert_eq!(reading, Reading::failed(Status::DataCheckError));
            }
        }

        #[test]
        fn prop_ascii_status_ignores_digits(
            framing in proptest::array::uniform8(any::<u8>()),
            digits in proptest::array::uniform4(any::<u8>()),
        ) {
            let mut frame = [0u8; ASCII_FRAME_LEN];
            frame[..4].copy_from_slice(&framing[..4]);
            frame[4..8].copy_from_slice(&digits);
            frame[8..].copy_from_slice(&framing[4..]);

            let sum: u32 = framing.iter().map(|&b| b as u32).sum();
            let reading = decode(Framing::Ascii, &frame);

            prop_assert_eq!(reading.status.is_ok(), sum == ASCII_FRAMING_SUM);
            if sum != ASCII_FRAMING_SUM {
                prop_assert_eq!(reading.distance_mm, -1);
            }
        }

        #[test]
        fn prop_ascii_valid_digits_decode(distance in 0u16..=9999) {
            prop_assert_eq!(decode_ascii(&encode_ascii(distance)).unwrap(), distance as i32);
        }
    }
}
