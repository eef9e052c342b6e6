//! Frame sources feeding the compositor
//!
//! Real camera capture lives outside the crate; anything that can hand over
//! fixed-size RGB frames implements `FrameSource`. `SyntheticCamera` is an
//! animated test pattern used by the demo binary and the tests.

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Supplier of same-sized frames, one per call
pub trait FrameSource {
    /// (width, height) of every frame this source produces
    fn size(&self) -> (u32, u32);

    /// Fetch the next frame. May block until one is available; an error
    /// means the stream is over or the device failed.
    fn next_frame(&mut self) -> Result<Frame>;
}

// SMPTE color bars (75% intensity)
const BARS: [(u8, u8, u8); 7] = [
    (191, 191, 191),
    (191, 191, 0),
    (0, 191, 191),
    (0, 191, 0),
    (191, 0, 191),
    (191, 0, 0),
    (0, 0, 191),
];

/// Color bars over a drifting sine gradient, with a bright scanline sweeping
/// down the picture so motion is visible through the effect.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    time: f32,
    frame_period: f32,
    frames: u64,
    limit: Option<u64>,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, fps: f32) -> Self {
        Self {
            width,
            height,
            time: 0.0,
            frame_period: 1.0 / fps.max(1.0),
            frames: 0,
            limit: None,
        }
    }

    /// End the stream after `frames` frames
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    pub fn frames_produced(&self) -> u64 {
        self.frames
    }

    fn draw(&self) -> Frame {
        let (w, h) = (self.width, self.height);
        let mut frame = Frame::with_size(w, h);
        let bars_height = h * 2 / 3;
        let bar_width = (w as usize).div_ceil(BARS.len()).max(1);
        let t = self.time;
        let sweep = ((t * 0.25).fract() * h as f32) as u32;

        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = if y < bars_height {
                    BARS[(x as usize / bar_width).min(BARS.len() - 1)]
                } else {
                    let fx = x as f32 * 0.02;
                    let fy = y as f32 * 0.03;
                    let v = ((fx + t).sin() + (fy + t * 0.5).sin() + 2.0) / 4.0;
                    let v = (v * 255.0) as u8;
                    (v, 255 - v, 128)
                };
                if y == sweep {
                    frame.set_pixel(x as i32, y as i32, 255, 255, 255);
                } else {
                    frame.set_pixel(x as i32, y as i32, r, g, b);
                }
            }
        }
        frame
    }
}

impl FrameSource for SyntheticCamera {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if self.limit.is_some_and(|limit| self.frames >= limit) {
            return Err(Error::source("end of stream"));
        }
        let frame = self.draw();
        self.frames += 1;
        self.time += self.frame_period;
        Ok(frame)
    }
}
