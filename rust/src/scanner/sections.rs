//! 横向分区统计 - 按列把彩色像素计入各分区

use super::classifier::ColorThresholds;
use crate::core::video::Frame;
use rayon::prelude::*;

/// 每个横向分区的彩色像素计数，下标即分区号
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionCounts(Vec<u32>);

impl SectionCounts {
    pub fn zeroed(num_sections: usize) -> Self {
        Self(vec![0; num_sections])
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, section: usize) -> Option<u32> {
        self.0.get(section).copied()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| c as u64).sum()
    }
}

impl From<Vec<u32>> for SectionCounts {
    fn from(counts: Vec<u32>) -> Self {
        Self(counts)
    }
}

pub struct SectionAggregator {
    num_sections: usize,
    sample_step: usize,
    thresholds: ColorThresholds,
}

impl SectionAggregator {
    pub fn new(num_sections: usize, sample_step: usize, thresholds: ColorThresholds) -> Self {
        Self {
            num_sections: num_sections.max(1),
            sample_step: sample_step.max(1),
            thresholds,
        }
    }

    pub fn num_sections(&self) -> usize {
        self.num_sections
    }

    /// floor(W / N), never below one pixel
    pub fn section_width(&self, frame_width: u32) -> usize {
        (frame_width as usize / self.num_sections).max(1)
    }

    /// Pixels right of N * section_width would land past the last section
    /// when W is not a multiple of N; they are folded into the last one.
    #[inline]
    pub fn section_for(&self, x: usize, section_width: usize) -> usize {
        (x / section_width).min(self.num_sections - 1)
    }

    /// Count sampled colorful pixels per section.
    ///
    /// Only every `sample_step`-th pixel on both axes is visited. Rows are
    /// counted independently and summed, so the result does not depend on
    /// visiting order.
    pub fn count(&self, frame: &Frame) -> SectionCounts {
        let n = self.num_sections;
        if !frame.is_ready() {
            return SectionCounts::zeroed(n);
        }

        let height = frame.height as usize;
        let step = self.sample_step;
        let section_width = self.section_width(frame.width);
        let sampled_rows = (height + step - 1) / step;

        let counts = (0..sampled_rows)
            .into_par_iter()
            .fold(
                || vec![0u32; n],
                |mut acc, row| {
                    self.count_row(frame, row * step, section_width, &mut acc);
                    acc
                },
            )
            .reduce(
                || vec![0u32; n],
                |mut a, b| {
                    for (total, partial) in a.iter_mut().zip(b) {
                        *total += partial;
                    }
                    a
                },
            );

        SectionCounts(counts)
    }

    fn count_row(&self, frame: &Frame, y: usize, section_width: usize, acc: &mut [u32]) {
        let width = frame.width as usize;
        let row_offset = y * width;

        for x in (0..width).step_by(self.sample_step) {
            let idx = (row_offset + x) * 4;
            let Some(px) = frame.data.get(idx..idx + 3) else {
                // short buffer, the rest of the row is missing too
                break;
            };
            if self.thresholds.is_colorful(px[0], px[1], px[2]) {
                acc[self.section_for(x, section_width)] += 1;
            }
        }
    }
}
