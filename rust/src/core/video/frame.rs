use image::RgbaImage;
use std::time::Duration;

/// 分析帧（RGBA，行优先）
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 相机刚启动时会给出 0 尺寸的帧，这类帧直接跳过
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.data.is_empty()
    }

    /// RGB of the pixel at (x, y), or `None` when the buffer is too short.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 3)?;
        Some((px[0], px[1], px[2]))
    }

    pub fn from_rgba_image(image: RgbaImage, timestamp_ms: u64, frame_number: u64) -> Self {
        let (width, height) = image.dimensions();
        Frame::new(width, height, image.into_raw(), timestamp_ms, frame_number)
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        Frame::from_rgba_image(image, 0, 0)
    }
}

/// 宿主层传入的 RGBA 帧数据
#[derive(Debug, Clone)]
pub struct RgbaFrameData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl From<RgbaFrameData> for Frame {
    fn from(raw: RgbaFrameData) -> Self {
        Frame::new(
            raw.width,
            raw.height,
            raw.data,
            raw.timestamp_ms,
            raw.frame_number,
        )
    }
}

/// 从原生相机传递的 I420 原始帧
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl RawFrame {
    pub fn to_rgba(&self) -> Frame {
        let w = self.width as usize;
        let h = self.height as usize;
        // odd widths still get a chroma sample for the last column
        let chroma_w = (w + 1) / 2;
        let mut rgba_data = Vec::with_capacity(w * h * 4);

        for y in 0..h {
            for x in 0..w {
                let uv_idx = (y / 2) * chroma_w + x / 2;
                let luma = self.y_plane.get(y * w + x).copied().unwrap_or(0);
                let u = self.u_plane.get(uv_idx).copied().unwrap_or(128);
                let v = self.v_plane.get(uv_idx).copied().unwrap_or(128);

                let (r, g, b) = yuv_to_rgb(luma, u, v);
                rgba_data.extend_from_slice(&[r, g, b, 255]);
            }
        }

        Frame::new(
            self.width,
            self.height,
            rgba_data,
            self.timestamp_ms,
            self.frame_number,
        )
    }
}

fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 4];
        let frame = Frame::new(100, 100, data, 1000, 30);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.timestamp.as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
        assert!(frame.is_ready());
    }

    #[test]
    fn test_zero_sized_frame_not_ready() {
        assert!(!Frame::new(0, 480, vec![], 0, 0).is_ready());
        assert!(!Frame::new(640, 0, vec![], 0, 0).is_ready());
    }

    #[test]
    fn test_rgb_at_bounds() {
        let frame = Frame::from(RgbaImage::from_fn(4, 2, |x, y| {
            Rgba([x as u8 * 10, y as u8 * 10, 7, 255])
        }));

        assert_eq!(frame.rgb_at(3, 1), Some((30, 10, 7)));
        assert_eq!(frame.rgb_at(4, 0), None);
        assert_eq!(frame.rgb_at(0, 2), None);

        let short = Frame::new(4, 2, vec![0u8; 8], 0, 0);
        assert_eq!(short.rgb_at(1, 0), Some((0, 0, 0)));
        assert_eq!(short.rgb_at(2, 0), None);
    }

    #[test]
    fn test_yuv_to_rgba() {
        let width = 64;
        let height = 64;
        let raw_frame = RawFrame {
            width,
            height,
            y_plane: vec![128u8; (width * height) as usize],
            u_plane: vec![128u8; (width * height / 4) as usize],
            v_plane: vec![128u8; (width * height / 4) as usize],
            timestamp_ms: 40,
            frame_number: 2,
        };

        let frame = raw_frame.to_rgba();
        assert_eq!(frame.width, width);
        assert_eq!(frame.height, height);
        assert_eq!(frame.data.len(), (width * height * 4) as usize);
        assert_eq!(frame.rgb_at(10, 10), Some((128, 128, 128)));
        assert_eq!(frame.frame_number, 2);
    }

    #[test]
    fn test_yuv_odd_dimensions() {
        let raw_frame = RawFrame {
            width: 3,
            height: 3,
            y_plane: vec![200u8; 9],
            u_plane: vec![128u8; 4],
            v_plane: vec![255u8; 4],
            timestamp_ms: 0,
            frame_number: 0,
        };

        let frame = raw_frame.to_rgba();
        assert_eq!(frame.data.len(), 3 * 3 * 4);
        let (r, _, b) = frame.rgb_at(2, 2).unwrap();
        assert_eq!(r, 255);
        assert_eq!(b, 200);
    }
}
