//! Coordinate remapping with bilinear interpolation

use super::{Frame, CHANNELS};

/// Mirror an index into `0..n` repeating the edge pixel (`cba|abc|cba`)
#[inline]
pub fn reflect(i: i32, n: i32) -> i32 {
    if n <= 1 {
        return 0;
    }
    let period = 2 * n;
    let i = i.rem_euclid(period);
    if i >= n {
        period - 1 - i
    } else {
        i
    }
}

/// Mirror an index into `0..n` without repeating the edge pixel (`cb|abc|ba`)
#[inline]
pub fn reflect_101(i: i32, n: i32) -> i32 {
    if n <= 1 {
        return 0;
    }
    let period = 2 * n - 2;
    let i = i.rem_euclid(period);
    if i >= n {
        period - i
    } else {
        i
    }
}

/// Build a new frame where each destination pixel `(x, y)` samples `src` at
/// the coordinate `map(x, y)` returns. Sampling is bilinear and coordinates
/// outside the frame reflect back in.
pub fn remap(src: &Frame, mut map: impl FnMut(u32, u32) -> (f32, f32)) -> Frame {
    let w = src.width();
    let h = src.height();
    let mut out = Frame::with_size(w, h);
    if src.is_empty() {
        return out;
    }
    let (wi, hi) = (w as i32, h as i32);
    let pitch = src.pitch();
    let pixels = src.as_bytes();
    let dst = out.as_bytes_mut();

    let mut di = 0;
    for y in 0..h {
        for x in 0..w {
            let (sx, sy) = map(x, y);
            let x0f = sx.floor();
            let y0f = sy.floor();
            let fx = sx - x0f;
            let fy = sy - y0f;
            let x0 = x0f as i32;
            let y0 = y0f as i32;

            let xa = reflect(x0, wi) as usize * CHANNELS;
            let xb = reflect(x0.saturating_add(1), wi) as usize * CHANNELS;
            let ya = reflect(y0, hi) as usize * pitch;
            let yb = reflect(y0.saturating_add(1), hi) as usize * pitch;

            for c in 0..CHANNELS {
                let p00 = pixels[ya + xa + c] as f32;
                let p10 = pixels[ya + xb + c] as f32;
                let p01 = pixels[yb + xa + c] as f32;
                let p11 = pixels[yb + xb + c] as f32;
                let top = p00 + (p10 - p00) * fx;
                let bottom = p01 + (p11 - p01) * fx;
                dst[di + c] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
            }
            di += CHANNELS;
        }
    }
    out
}
