//! Geometry rasterization shared by `Frame` and `Mask`

/// Rasterize an anti-aliased segment of `thickness` pixels with round caps.
///
/// Calls `plot(x, y, coverage)` for every in-bounds pixel whose coverage is
/// above zero. Coverage is a one-pixel linear ramp at the stroke edge,
/// measured from the pixel center to the segment.
pub fn stroke_segment(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    thickness: f32,
    width: u32,
    height: u32,
    mut plot: impl FnMut(i32, i32, f32),
) {
    if width == 0 || height == 0 || thickness.is_nan() || thickness <= 0.0 {
        return;
    }
    let half = thickness * 0.5;
    let reach = half + 1.0;

    let min_x = ((x0.min(x1) - reach).floor() as i32).max(0);
    let max_x = ((x0.max(x1) + reach).ceil() as i32).min(width as i32 - 1);
    let min_y = ((y0.min(y1) - reach).floor() as i32).max(0);
    let max_y = ((y0.max(y1) + reach).ceil() as i32).min(height as i32 - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0;
            let py = y as f32 - y0;
            // Project onto the segment, clamped to the endpoints
            let t = if len_sq > 1e-6 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let ex = px - dx * t;
            let ey = py - dy * t;
            let dist = (ex * ex + ey * ey).sqrt();
            let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                plot(x, y, coverage);
            }
        }
    }
}
