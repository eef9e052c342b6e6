//! Pixel containers the compositor works on.
//!
//! `Frame` is a packed RGB8 image (row-major, 3 bytes per pixel) and `Mask` a
//! single 8-bit channel of the same geometry. Every effect in the crate reads
//! and writes these two types and nothing else.

mod blur;
mod mask;
mod raster;
mod sample;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use mask::Mask;
pub use raster::stroke_segment;
pub use sample::{reflect, reflect_101, remap};

/// Bytes per pixel in a `Frame`
pub const CHANNELS: usize = 3;

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Round and clamp a float to the 0..=255 byte range
#[inline]
pub fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Rec.601 luma, the weighting used for every grayscale conversion
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    saturate(0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
}

// ============================================================================
// Frame
// ============================================================================

/// RGB8 image for software compositing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Create a black frame
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    /// Create a frame filled with one color
    pub fn filled(width: u32, height: u32, r: u8, g: u8, b: u8) -> Self {
        let mut frame = Self::with_size(width, height);
        frame.clear(r, g, b);
        frame
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
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]))
        } else {
            None
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx] = r;
            self.pixels[idx + 1] = g;
            self.pixels[idx + 2] = b;
        }
    }

    /// Set pixel with alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let alpha = a as u16;
            self.pixels[idx] = blend_channel(r, self.pixels[idx], alpha);
            self.pixels[idx + 1] = blend_channel(g, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(b, self.pixels[idx + 2], alpha);
        }
    }

    /// Draw a horizontal line
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let mut idx = self.pixel_index(start as u32, y as u32);
        for _ in start..=end {
            self.pixels[idx] = r;
            self.pixels[idx + 1] = g;
            self.pixels[idx + 2] = b;
            idx += CHANNELS;
        }
    }

    /// Draw a filled circle using horizontal spans
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8) {
        if radius <= 0 {
            if radius == 0 {
                self.set_pixel(cx, cy, r, g, b);
            }
            return;
        }

        // Midpoint circle algorithm with span filling
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            self.hline(cx - x, cx + x, cy + y, r, g, b);
            if y != 0 {
                self.hline(cx - x, cx + x, cy - y, r, g, b);
            }
            if x != y {
                self.hline(cx - y, cx + y, cy + x, r, g, b);
                if y != 0 {
                    self.hline(cx - y, cx + y, cy - x, r, g, b);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Anti-aliased line of the given thickness, alpha blended onto the frame
    pub fn line_aa_thick(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        thickness: f32,
        color: (u8, u8, u8),
    ) {
        let (w, h) = (self.width, self.height);
        stroke_segment(x0, y0, x1, y1, thickness, w, h, |x, y, coverage| {
            let a = (coverage * 255.0) as u8;
            self.blend_pixel(x, y, color.0, color.1, color.2, a);
        });
    }

    /// `self = saturate(self + other * weight)`, the additive layer blend.
    /// Frames must be the same size; a mismatched layer is ignored.
    pub fn add_weighted(&mut self, other: &Frame, weight: f32) {
        if other.width != self.width || other.height != self.height {
            return;
        }
        for (d, &s) in self.pixels.iter_mut().zip(other.pixels.iter()) {
            *d = saturate(*d as f32 + s as f32 * weight);
        }
    }

    /// `saturate(self * alpha + other * beta)` into a new frame
    pub fn weighted_sum(&self, alpha: f32, other: &Frame, beta: f32) -> Frame {
        let mut out = self.clone();
        if other.width != self.width || other.height != self.height {
            return out;
        }
        for (d, (&a, &b)) in out
            .pixels
            .iter_mut()
            .zip(self.pixels.iter().zip(other.pixels.iter()))
        {
            *d = saturate(a as f32 * alpha + b as f32 * beta);
        }
        out
    }

    /// Multiply every channel by a factor, clamping to 0..=255
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.pixels {
            *v = (*v as f32 * factor).clamp(0.0, 255.0) as u8;
        }
    }

    /// Per-pixel select: `mask` 255 takes `fg`, 0 takes `self`, between blends
    pub fn composite_masked(&mut self, fg: &Frame, mask: &Mask) {
        if fg.width != self.width
            || fg.height != self.height
            || mask.width() != self.width
            || mask.height() != self.height
        {
            return;
        }
        for (i, &m) in mask.as_slice().iter().enumerate() {
            let idx = i * CHANNELS;
            match m {
                0 => {},
                255 => self.pixels[idx..idx + CHANNELS]
                    .copy_from_slice(&fg.pixels[idx..idx + CHANNELS]),
                _ => {
                    let alpha = m as u16;
                    for c in 0..CHANNELS {
                        self.pixels[idx + c] =
                            blend_channel(fg.pixels[idx + c], self.pixels[idx + c], alpha);
                    }
                },
            }
        }
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to raw pixels for per-pixel effects
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Row stride in bytes
    pub fn pitch(&self) -> usize {
        self.width as usize * CHANNELS
    }
}
