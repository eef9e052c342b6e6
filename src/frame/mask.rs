//! Single-channel 8-bit mask

use super::blur::gaussian_blur;
use super::raster::stroke_segment;
use super::{saturate, Frame, CHANNELS};

/// Single-channel coverage image (0 = empty, 255 = full)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Create an empty (all zero) mask
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Filled disk of 255 centered at (cx, cy); pixels with
    /// `dist <= radius` are inside. A negative radius gives an empty mask.
    pub fn disk(width: u32, height: u32, cx: i32, cy: i32, radius: i32) -> Self {
        let mut mask = Self::with_size(width, height);
        if radius < 0 {
            return mask;
        }
        // Bounds in i64 so centers far off-frame cannot overflow
        let (cx, cy, radius) = (cx as i64, cy as i64, radius as i64);
        let r_sq = radius * radius;
        let y_start = (cy - radius).max(0);
        let y_end = (cy + radius).min(height as i64 - 1);
        let x_start = (cx - radius).max(0);
        let x_end = (cx + radius).min(width as i64 - 1);

        for y in y_start..=y_end {
            let dy = y - cy;
            for x in x_start..=x_end {
                let dx = x - cx;
                if dx * dx + dy * dy <= r_sq {
                    mask.data[y as usize * width as usize + x as usize] = 255;
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(self.data[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, v: u8) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.data[y as usize * self.width as usize + x as usize] = v;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy with every value multiplied by `factor` (truncating)
    pub fn scaled(&self, factor: f32) -> Mask {
        Mask {
            data: self
                .data
                .iter()
                .map(|&v| (v as f32 * factor).clamp(0.0, 255.0) as u8)
                .collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Draw an anti-aliased white line, keeping the brighter value where strokes overlap
    pub fn line_aa_thick(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32) {
        let w = self.width as usize;
        let data = &mut self.data;
        stroke_segment(x0, y0, x1, y1, thickness, self.width, self.height, |x, y, c| {
            let idx = y as usize * w + x as usize;
            data[idx] = data[idx].max(saturate(c * 255.0));
        });
    }

    pub fn gaussian_blur(&mut self, ksize: usize) {
        gaussian_blur(&mut self.data, self.width, self.height, 1, ksize);
    }

    /// Stretch values linearly so the minimum maps to 0 and the maximum to 255.
    /// A constant mask becomes all zero.
    pub fn normalize_min_max(&mut self) {
        let (min, max) = self
            .data
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if self.data.is_empty() {
            return;
        }
        if min == max {
            self.data.fill(0);
            return;
        }
        let scale = 255.0 / (max - min) as f32;
        for v in &mut self.data {
            *v = saturate((*v - min) as f32 * scale);
        }
    }

    /// Gray RGB frame with every channel equal to the mask value
    pub fn to_frame(&self) -> Frame {
        let mut frame = Frame::with_size(self.width, self.height);
        for (px, &v) in frame
            .as_bytes_mut()
            .chunks_exact_mut(CHANNELS)
            .zip(self.data.iter())
        {
            px.fill(v);
        }
        frame
    }

    /// True if any pixel is set
    pub fn any(&self) -> bool {
        self.data.iter().any(|&v| v > 0)
    }
}
