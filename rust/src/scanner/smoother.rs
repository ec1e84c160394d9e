use super::selector::DetectionResult;

/// 位置平滑器 - 指数平滑，检测丢失即清空
pub struct PositionSmoother {
    num_sections: usize,
    smoothing_factor: f64,
    value: Option<f64>,
}

impl PositionSmoother {
    pub fn new(num_sections: usize, smoothing_factor: f64) -> Self {
        Self {
            num_sections: num_sections.max(1),
            smoothing_factor,
            value: None,
        }
    }

    /// Normalized center of `section`.
    pub fn target_for(&self, section: usize) -> f64 {
        ((section as f64 + 0.5) / self.num_sections as f64).clamp(0.0, 1.0)
    }

    /// Feed one tick's detection; returns the smoothed position, or `None`
    /// when nothing is being tracked.
    ///
    /// The first detection after a reset takes the target as-is. Losing the
    /// detection clears the value entirely, there is no hold or decay.
    pub fn update(&mut self, detection: &DetectionResult) -> Option<f64> {
        if !detection.detected {
            self.value = None;
            return None;
        }

        let target = self.target_for(detection.dominant_index);
        let alpha = self.smoothing_factor;
        let next = match self.value {
            None => target,
            // (1 - a) * prev + a * target, written so target == prev is exact
            Some(previous) => previous + alpha * (target - previous),
        };

        self.value = Some(next);
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected_at(index: usize) -> DetectionResult {
        DetectionResult {
            dominant_index: index,
            count: 100,
            detected: true,
        }
    }

    #[test]
    fn test_first_detection_not_blended() {
        let mut smoother = PositionSmoother::new(12, 0.25);
        let position = smoother.update(&detected_at(5)).unwrap();
        assert!((position - 5.5 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_update() {
        let mut smoother = PositionSmoother::new(12, 0.25);
        smoother.update(&detected_at(0));
        let position = smoother.update(&detected_at(11)).unwrap();

        let expected = 0.75 * (0.5 / 12.0) + 0.25 * (11.5 / 12.0);
        assert!((position - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_point_when_target_unchanged() {
        let mut smoother = PositionSmoother::new(12, 0.25);
        let first = smoother.update(&detected_at(3)).unwrap();
        for _ in 0..50 {
            assert_eq!(smoother.update(&detected_at(3)), Some(first));
        }
    }

    #[test]
    fn test_reset_on_lost_detection() {
        let mut smoother = PositionSmoother::new(12, 0.25);
        smoother.update(&detected_at(0));
        smoother.update(&detected_at(3));
        assert!(smoother.value().is_some());

        assert_eq!(smoother.update(&DetectionResult::none()), None);
        assert_eq!(smoother.value(), None);

        // next detection starts fresh
        let position = smoother.update(&detected_at(11)).unwrap();
        assert!((position - 11.5 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_stays_in_unit_range() {
        let mut smoother = PositionSmoother::new(12, 0.9);
        for index in [0, 11, 0, 11, 5, 11, 0] {
            let position = smoother.update(&detected_at(index)).unwrap();
            assert!((0.0..=1.0).contains(&position));
        }
        // out-of-range index still clamps
        assert_eq!(smoother.target_for(40), 1.0);
    }
}
