//! 距离单位类型

use std::fmt;

/// 测量距离
///
/// 以整毫米存储，即两种报文格式的分辨率。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Distance(u32);

impl Distance {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_millimeters(mm: u32) -> Self {
        Self(mm)
    }

    /// 转换原始读数；负值（周期失败）返回 `None`。
    #[inline]
    pub fn from_reading(distance_mm: i32) -> Option<Self> {
        u32::try_from(distance_mm).ok().map(Self)
    }

    #[inline]
    pub const fn millimeters(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn centimeters(self) -> f64 {
        self.0 as f64 / 10.0
    }

    #[inline]
    pub fn meters(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl From<u16> for Distance {
    fn from(mm: u16) -> Self {
        Self(mm as u32)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mm", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let d = Distance::from_millimeters(1881);
        assert_eq!(d.millimeters(), 1881);
        assert!((d.centimeters() - 188.1).abs() < 1e-9);
        assert!((d.meters() - 1.881).abs() < 1e-9);
        assert_eq!(d.to_string(), "1881 mm");
    }

    #[test]
    fn test_from_reading_rejects_failure_marker() {
        assert_eq!(Distance::from_reading(-1), None);
        assert_eq!(Distance::from_reading(0), Some(Distance::ZERO));
        assert_eq!(Distance::from_reading(200), Some(Distance::from(200u16)));
    }
}
