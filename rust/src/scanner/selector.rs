use super::sections::SectionCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionResult {
    pub dominant_index: usize,
    pub count: u32,
    pub detected: bool,
}

impl DetectionResult {
    pub fn none() -> Self {
        Self {
            dominant_index: 0,
            count: 0,
            detected: false,
        }
    }
}

/// Pick the section with the most colorful pixels.
///
/// Ties go to the lowest index. The region counts as detected only when its
/// count is strictly above `threshold`.
pub fn select_dominant(counts: &SectionCounts, threshold: u32) -> DetectionResult {
    let mut best: Option<(usize, u32)> = None;
    for (index, &count) in counts.as_slice().iter().enumerate() {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((index, count)),
        }
    }

    match best {
        Some((dominant_index, count)) => DetectionResult {
            dominant_index,
            count,
            detected: count > threshold,
        },
        None => DetectionResult::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[u32]) -> SectionCounts {
        SectionCounts::from(values.to_vec())
    }

    #[test]
    fn test_all_zero_not_detected() {
        let result = select_dominant(&SectionCounts::zeroed(12), 20);
        assert_eq!(result.dominant_index, 0);
        assert_eq!(result.count, 0);
        assert!(!result.detected);
    }

    #[test]
    fn test_single_hot_section() {
        for k in 0..12 {
            let mut values = vec![0u32; 12];
            values[k] = 50;
            let result = select_dominant(&counts(&values), 20);
            assert_eq!(result.dominant_index, k);
            assert_eq!(result.count, 50);
            assert!(result.detected);
        }
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let result = select_dominant(&counts(&[3, 40, 7, 40, 40]), 20);
        assert_eq!(result.dominant_index, 1);
        assert!(result.detected);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!select_dominant(&counts(&[0, 20, 5]), 20).detected);
        assert!(select_dominant(&counts(&[0, 21, 5]), 20).detected);
    }

    #[test]
    fn test_empty_counts() {
        assert_eq!(select_dominant(&SectionCounts::default(), 0), DetectionResult::none());
    }
}
