use serde::{Deserialize, Serialize};

/// 彩色像素判定阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    /// max(r,g,b) - min(r,g,b) must exceed this
    pub saturation: u8,
    /// max(r,g,b) must exceed this
    pub brightness: u8,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            saturation: 30,
            brightness: 80,
        }
    }
}

impl ColorThresholds {
    /// Saturation measured as distance from gray, gated on brightness so dark
    /// noisy pixels never count.
    #[inline]
    pub fn is_colorful(&self, r: u8, g: u8, b: u8) -> bool {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        max - min > self.saturation && max > self.brightness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_is_not_colorful() {
        let t = ColorThresholds::default();
        assert!(!t.is_colorful(128, 128, 128));
        assert!(!t.is_colorful(255, 255, 255));
        assert!(!t.is_colorful(0, 0, 0));
    }

    #[test]
    fn test_saturated_bright_is_colorful() {
        let t = ColorThresholds::default();
        assert!(t.is_colorful(239, 68, 68));
        assert!(t.is_colorful(34, 197, 94));
        assert!(t.is_colorful(59, 130, 246));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let t = ColorThresholds::default();
        // saturation exactly 30
        assert!(!t.is_colorful(130, 100, 100));
        assert!(t.is_colorful(131, 100, 100));
        // brightness exactly 80
        assert!(!t.is_colorful(80, 10, 10));
        assert!(t.is_colorful(81, 10, 10));
    }

    #[test]
    fn test_custom_thresholds() {
        let t = ColorThresholds {
            saturation: 100,
            brightness: 200,
        };
        assert!(!t.is_colorful(239, 180, 200));
        assert!(!t.is_colorful(190, 20, 20));
        assert!(t.is_colorful(239, 68, 68));
    }
}
