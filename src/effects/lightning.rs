//! Rim lightning and crack masks
//!
//! Both generators throw jagged polylines outward across the portal rim. Bolts
//! are drawn in color onto a layer and given a soft bloom; cracks are white
//! strokes on a black single-channel canvas used as an additive mask.

use rand::Rng;
use std::f32::consts::TAU;

use crate::frame::{gaussian_blur, Frame, Mask, CHANNELS};
use crate::math::Vec2;
use crate::util::{jitter, lerp, uniform};

/// Bolts start this far out, as a fraction of the radius
const BOLT_START: f32 = 0.8;
/// Base overshoot of a bolt end past the rim
const BOLT_REACH: f32 = 1.15;
/// Lateral jitter of bolt vertices, as a fraction of the radius
const BOLT_JITTER: f32 = 0.15;
const BOLT_GLOW_KERNEL: usize = 7;

const CRACK_JITTER: f32 = 0.08;
const CRACK_MIN_SEGMENTS: usize = 6;
const CRACK_BLUR_KERNEL: usize = 5;

/// Stroke thickness shared by bolts and cracks
#[inline]
fn stroke_thickness(intensity: f32) -> f32 {
    ((1.0 + intensity * 2.0) as i32).max(1) as f32
}

/// Jagged path from `start` to `end`: the start, `segments` jittered points at
/// `t = s / segments`, then the end. Vertices snap to whole pixels.
fn jagged_path(
    rng: &mut impl Rng,
    start: (i32, i32),
    end: (i32, i32),
    segments: usize,
    spread: i32,
) -> Vec<(i32, i32)> {
    let mut points = Vec::with_capacity(segments + 2);
    points.push(start);
    for s in 0..segments {
        let t = s as f32 / segments as f32;
        let x = lerp(start.0 as f32, end.0 as f32, t) as i32;
        let x = x.saturating_add(jitter(rng, spread));
        let y = lerp(start.1 as f32, end.1 as f32, t) as i32;
        let y = y.saturating_add(jitter(rng, spread));
        points.push((x, y));
    }
    points.push(end);
    points
}

/// Draw `2 + 4 * intensity` bolts radiating from `0.8 * radius` to just past the
/// rim, then bloom the layer: `layer = 0.6 * layer + 0.8 * blur(layer)`.
///
/// The bloom covers the whole layer, so pass a dedicated (normally black)
/// layer rather than the finished image.
pub fn draw_lightning(
    layer: &mut Frame,
    center: Vec2,
    radius: f32,
    intensity: f32,
    segments: usize,
    color: (u8, u8, u8),
    rng: &mut impl Rng,
) {
    if layer.is_empty() {
        return;
    }
    let (cx, cy) = center.pixel();
    let (cx, cy) = (cx as f32, cy as f32);
    let bolts = (2.0 + intensity * 4.0).max(0.0) as usize;
    let spread = (radius * BOLT_JITTER) as i32;
    let thickness = stroke_thickness(intensity);

    for _ in 0..bolts {
        let dir = Vec2::from_angle(rng.random::<f32>() * TAU);
        let start = (
            (cx + dir.x * radius * BOLT_START) as i32,
            (cy + dir.y * radius * BOLT_START) as i32,
        );
        let end = (
            (cx + dir.x * radius * (BOLT_REACH + uniform(rng, -0.1, 0.4))) as i32,
            (cy + dir.y * radius * (BOLT_REACH + uniform(rng, -0.1, 0.4))) as i32,
        );
        let points = jagged_path(rng, start, end, segments, spread);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            layer.line_aa_thick(a.0 as f32, a.1 as f32, b.0 as f32, b.1 as f32, thickness, color);
        }
    }

    let mut glow = layer.clone();
    let (w, h) = (glow.width(), glow.height());
    gaussian_blur(glow.as_bytes_mut(), w, h, CHANNELS, BOLT_GLOW_KERNEL);
    *layer = layer.weighted_sum(0.6, &glow, 0.8);
}

/// Crack mask of the given (width, height): `6 + 12 * intensity` jittered
/// lines starting on the rim and running outward by 1.05..1.35 radii, blurred
/// with a 5×5 Gaussian.
pub fn draw_rim_cracks(
    size: (u32, u32),
    center: Vec2,
    radius: f32,
    intensity: f32,
    rng: &mut impl Rng,
) -> Mask {
    let (w, h) = size;
    let mut mask = Mask::with_size(w, h);
    if w == 0 || h == 0 {
        return mask;
    }
    let (cx, cy) = center.pixel();
    let (cx, cy) = (cx as f32, cy as f32);
    let cracks = (6.0 + intensity * 12.0).max(0.0) as usize;
    let spread = (radius * CRACK_JITTER) as i32;
    let thickness = stroke_thickness(intensity);

    for _ in 0..cracks {
        let dir = Vec2::from_angle(rng.random::<f32>() * TAU);
        let length = (radius * (1.0 + uniform(rng, 0.05, 0.35))) as i32 as f32;
        let start = ((cx + dir.x * radius) as i32, (cy + dir.y * radius) as i32);
        let end = (
            (cx + dir.x * (radius + length)) as i32,
            (cy + dir.y * (radius + length)) as i32,
        );
        let segments = CRACK_MIN_SEGMENTS + rng.random_range(0..=6);
        let points = jagged_path(rng, start, end, segments, spread);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            mask.line_aa_thick(a.0 as f32, a.1 as f32, b.0 as f32, b.1 as f32, thickness);
        }
    }

    mask.gaussian_blur(CRACK_BLUR_KERNEL);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lightning_draws_red_strokes_near_rim() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = Frame::with_size(200, 200);
        let center = Vec2::new(100.0, 100.0);
        draw_lightning(&mut layer, center, 50.0, 1.0, 6, (240, 20, 40), &mut rng);

        let mut lit = 0;
        let mut inner = 0;
        for y in 0..200 {
            for x in 0..200 {
                let (r, g, b) = layer.get_pixel(x, y).unwrap();
                if r > 0 {
                    lit += 1;
                    assert!(r >= g && r >= b);
                    let d = Vec2::new(x as f32, y as f32).distance(&center);
                    if d < 20.0 {
                        inner += 1;
                    }
                }
            }
        }
        assert!(lit > 50);
        // Bolts start at 0.8r and jitter by at most 0.15r, so the core stays dark
        assert_eq!(inner, 0);
    }

    #[test]
    fn test_lightning_empty_layer_is_noop() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = Frame::with_size(0, 0);
        draw_lightning(&mut layer, Vec2::zero(), 10.0, 1.0, 6, (255, 0, 0), &mut rng);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_lightning_is_reproducible_with_seed() {
        let draw = || {
            let mut rng = StdRng::seed_from_u64(77);
            let mut layer = Frame::with_size(120, 90);
            draw_lightning(&mut layer, Vec2::new(60.0, 45.0), 30.0, 0.5, 6, (240, 20, 40), &mut rng);
            layer
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn test_cracks_mask_shape_and_content() {
        let mut rng = StdRng::seed_from_u64(8);
        let mask = draw_rim_cracks((160, 120), Vec2::new(80.0, 60.0), 25.0, 1.0, &mut rng);
        assert_eq!((mask.width(), mask.height()), (160, 120));
        assert!(mask.any());
        // Cracks begin on the rim, jittered by at most 0.08r plus blur
        assert_eq!(mask.get(80, 60), Some(0));
    }

    #[test]
    fn test_far_off_center_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        for center in [Vec2::new(3.0e9, 10.0), Vec2::new(-3.0e9, -3.0e9)] {
            let mut layer = Frame::with_size(64, 48);
            draw_lightning(&mut layer, center, 40.0, 1.5, 6, (240, 20, 40), &mut rng);
            assert_eq!(layer, Frame::with_size(64, 48));
            let mask = draw_rim_cracks((64, 48), center, 40.0, 1.0, &mut rng);
            assert!(!mask.any());
        }
    }

    #[test]
    fn test_cracks_zero_size() {
        let mut rng = StdRng::seed_from_u64(8);
        let mask = draw_rim_cracks((0, 0), Vec2::zero(), 25.0, 1.0, &mut rng);
        assert!(!mask.any());
    }

    #[test]
    fn test_more_intensity_more_cracks() {
        let coverage = |intensity: f32| {
            let mut rng = StdRng::seed_from_u64(21);
            let mask = draw_rim_cracks((200, 200), Vec2::new(100.0, 100.0), 40.0, intensity, &mut rng);
            mask.as_slice().iter().filter(|&&v| v > 0).count()
        };
        assert!(coverage(1.0) > coverage(0.0));
    }
}
