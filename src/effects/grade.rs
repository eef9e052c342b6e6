//! Full-frame post processing: tonal grade, channel split, CRT, flicker

use rand::Rng;

use crate::frame::{luma, remap, saturate, Frame, CHANNELS};

/// Color the grade washes toward (dark red-purple)
pub const GRADE_WASH: (u8, u8, u8) = (60, 10, 18);

/// `saturate(|alpha * v + beta|)`, the scale-and-absolute used for contrast
#[inline]
fn scale_abs(v: u8, alpha: f32, beta: f32) -> u8 {
    saturate((v as f32 * alpha + beta).abs())
}

/// Fixed "upside down" look: push red up, green down, blue up, boost contrast,
/// pull a quarter of the way to gray and mix 15% of a dark red-purple wash.
pub fn color_grade_upside_down(image: &Frame) -> Frame {
    let mut out = image.clone();
    let wash = [GRADE_WASH.0 as f32, GRADE_WASH.1 as f32, GRADE_WASH.2 as f32];

    for px in out.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let shifted = [
            px[0].saturating_add(30),
            px[1].saturating_sub(10),
            px[2].saturating_add(10),
        ];
        let merged = shifted.map(|v| scale_abs(v, 1.15, -10.0));
        let gray = luma(merged[0], merged[1], merged[2]) as f32;
        for c in 0..CHANNELS {
            let tinted = saturate(0.25 * gray + 0.75 * merged[c] as f32);
            px[c] = saturate(0.85 * tinted as f32 + 0.15 * wash[c]);
        }
    }
    out
}

/// Grayscale, darkened background: `|0.75 * luma - 20|` on every channel
pub fn desaturate_dark(image: &Frame) -> Frame {
    let mut out = image.clone();
    for px in out.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let v = scale_abs(luma(px[0], px[1], px[2]), 0.75, -20.0);
        px.fill(v);
    }
    out
}

/// Shift red toward (+0.2, -0.2) * amount and blue toward (-0.3, +0.3) * amount,
/// leaving green in place. Borders reflect.
pub fn chromatic_aberration(image: &Frame, amount: f32) -> Frame {
    if amount == 0.0 || image.is_empty() {
        return image.clone();
    }
    let (rx, ry) = (amount * 0.2, amount * -0.2);
    let (bx, by) = (amount * -0.3, amount * 0.3);
    let red = remap(image, |x, y| (x as f32 - rx, y as f32 - ry));
    let blue = remap(image, |x, y| (x as f32 - bx, y as f32 - by));

    let mut out = image.clone();
    let dst = out.as_bytes_mut();
    let (rs, bs) = (red.as_bytes(), blue.as_bytes());
    for i in (0..dst.len()).step_by(CHANNELS) {
        dst[i] = rs[i];
        dst[i + 2] = bs[i + 2];
    }
    out
}

/// Scanlines plus a radial vignette.
///
/// Each row is darkened by `1 - scan_alpha * (0.5 + 0.5 * sin(y / 2.5))`; the
/// vignette multiplies by `clamp(1 - 0.6 * r², 0.45, 1)` with `r` measured in
/// normalized [-1, 1] coordinates. A positive `curvature` first bows the image
/// outward like a tube face; this resamples the whole frame, so 0 skips it.
pub fn crt_filter(image: &Frame, scan_alpha: f32, curvature: f32) -> Frame {
    let w = image.width();
    let h = image.height();
    if image.is_empty() {
        return image.clone();
    }
    let norm = |i: u32, n: u32| {
        if n > 1 {
            -1.0 + 2.0 * i as f32 / (n - 1) as f32
        } else {
            0.0
        }
    };

    let mut out = if curvature > 0.0 {
        let (half_w, half_h) = ((w as f32 - 1.0) * 0.5, (h as f32 - 1.0) * 0.5);
        remap(image, |x, y| {
            let (u, v) = (norm(x, w), norm(y, h));
            let bow = 1.0 + curvature * (u * u + v * v);
            (half_w + u * bow * half_w, half_h + v * bow * half_h)
        })
    } else {
        image.clone()
    };

    let pitch = out.pitch();
    let pixels = out.as_bytes_mut();
    for y in 0..h {
        let scan = 1.0 - (0.5 + 0.5 * (y as f32 / 2.5).sin()) * scan_alpha;
        let v = norm(y, h);
        let row = &mut pixels[y as usize * pitch..(y as usize + 1) * pitch];
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let u = norm(x as u32, w);
            let vign = (1.0 - (u * u + v * v) * 0.6).clamp(0.45, 1.0);
            let k = scan * vign;
            for c in px.iter_mut() {
                *c = (*c as f32 * k).clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Global brightness multiplier: small random jitter times a slow sine of time
pub fn flicker_factor(rng: &mut impl Rng, time_ms: f32) -> f32 {
    (rng.random::<f32>() * 0.06 + 0.97) * (0.95 + 0.05 * (time_ms / 90.0).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn checker(w: u32, h: u32) -> Frame {
        let mut f = Frame::with_size(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let v = if (x + y) % 2 == 0 { 200 } else { 40 };
                f.set_pixel(x, y, v, v / 2, 255 - v);
            }
        }
        f
    }

    #[test]
    fn test_chromatic_zero_amount_is_identity() {
        let img = checker(17, 9);
        assert_eq!(chromatic_aberration(&img, 0.0), img);
    }

    #[test]
    fn test_chromatic_keeps_green() {
        let img = checker(17, 9);
        let out = chromatic_aberration(&img, 6.0);
        for (a, b) in img.as_bytes().chunks(3).zip(out.as_bytes().chunks(3)) {
            assert_eq!(a[1], b[1]);
        }
        assert_ne!(out, img);
    }

    #[test]
    fn test_chromatic_integer_shift_moves_red() {
        // amount 5 → red shift of exactly (+1, -1)
        let mut img = Frame::with_size(8, 8);
        img.set_pixel(3, 4, 255, 0, 0);
        let out = chromatic_aberration(&img, 5.0);
        assert_eq!(out.get_pixel(4, 3).map(|p| p.0), Some(255));
        assert_eq!(out.get_pixel(3, 4).map(|p| p.0), Some(0));
    }

    #[test]
    fn test_grade_tints_black_toward_red() {
        let out = color_grade_upside_down(&Frame::with_size(2, 2));
        let (r, g, b) = out.get_pixel(0, 0).unwrap();
        assert!(r > g && r > b);
    }

    #[test]
    fn test_grade_is_deterministic() {
        let img = checker(9, 9);
        assert_eq!(color_grade_upside_down(&img), color_grade_upside_down(&img));
    }

    #[test]
    fn test_desaturate_dark_is_gray() {
        let out = desaturate_dark(&checker(5, 5));
        for px in out.as_bytes().chunks(3) {
            assert!(px[0] == px[1] && px[1] == px[2]);
        }
        let black = desaturate_dark(&Frame::with_size(1, 1));
        assert_eq!(black.get_pixel(0, 0), Some((20, 20, 20)));
    }

    #[test]
    fn test_crt_vignette_darkens_corners() {
        let img = Frame::filled(41, 41, 200, 200, 200);
        let out = crt_filter(&img, 0.0, 0.0);
        let center = out.get_pixel(20, 20).unwrap().0;
        let corner = out.get_pixel(0, 0).unwrap().0;
        assert_eq!(center, 200);
        assert!((89..=90).contains(&corner));
    }

    #[test]
    fn test_crt_scanlines_vary_by_row() {
        let img = Frame::filled(3, 20, 200, 200, 200);
        let out = crt_filter(&img, 0.5, 0.0);
        let rows: Vec<u8> = (0..20).map(|y| out.get_pixel(1, y).unwrap().0).collect();
        assert!(rows.iter().any(|&v| v != rows[0]));
    }

    #[test]
    fn test_crt_zero_curvature_keeps_geometry() {
        let img = checker(40, 30);
        let flat = crt_filter(&img, 0.0, 0.0);
        // Vignette floor is 0.45, so light squares stay above the dark level
        for (x, y) in [(0, 0), (7, 3), (39, 29), (20, 15), (1, 0)] {
            let src = img.get_pixel(x, y).unwrap().0;
            let dst = flat.get_pixel(x, y).unwrap().0;
            assert!(dst <= src);
            assert_eq!(src == 200, dst > 40);
        }
        assert_ne!(crt_filter(&img, 0.0, 0.2), flat);
    }

    #[test]
    fn test_flicker_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for i in 0..200 {
            let f = flicker_factor(&mut rng, i as f32 * 37.0);
            assert!(f > 0.87 && f < 1.04);
        }
    }
}
