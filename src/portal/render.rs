use rand::Rng;
use std::borrow::Cow;

use super::Portal;
use crate::effects::{
    chromatic_aberration, color_grade_upside_down, crt_filter, desaturate_dark,
    displacement_map, draw_lightning, draw_rim_cracks, flicker_factor, glow_effect, heat_distort,
};
use crate::frame::{saturate, Frame, Mask};
use crate::math::Vec2;

const LIGHTNING_COLOR: (u8, u8, u8) = (240, 20, 40);
const GLOW_COLOR: (u8, u8, u8) = (220, 16, 40);
const EPSILON: f32 = 1e-6;
/// Ripple bands per ripple radius
const RIPPLE_FREQ: f32 = 12.0;
const RIPPLE_GAIN: f32 = 160.0;

impl Portal {
    /// Composite the portal over `frame`.
    ///
    /// With `enabled == false`, or for an empty frame, the input comes back
    /// borrowed and untouched. Otherwise a new frame is built; the portal's own
    /// generator supplies the per-frame noise, bolts and flicker, and its
    /// animation clock drives the ripple and shimmer.
    pub fn render<'a>(&mut self, frame: &'a Frame, enabled: bool) -> Cow<'a, Frame> {
        if !enabled || frame.is_empty() {
            return Cow::Borrowed(frame);
        }
        let (w, h) = (frame.width(), frame.height());
        let open = self.open_amount;
        let time_ms = self.elapsed * 1000.0;
        let (cx, cy) = self.center.pixel();
        let center = Vec2::new(cx as f32, cy as f32);
        let radius = (self.radius * (0.55 + open * 1.6)) as i32;
        let radius_f = radius as f32;
        let mask = Mask::disk(w, h, cx, cy, radius);

        // Gray, darkened, graded camera feed everywhere outside the core
        let background = color_grade_upside_down(&desaturate_dark(frame));
        let core = self.core_layer(w, h, center, radius_f, time_ms);

        let mut comp = displacement_map(
            &background,
            center,
            radius_f * (1.0 + 0.9 * open),
            26.0 * (0.3 + open),
            self.config.displacement_seed,
        );
        // The warp reaches past the disk, so the ring just outside it shows
        // displaced background rather than the plain grade
        comp.composite_masked(&core, &mask);
        let mut comp = heat_distort(&comp, center, radius_f, time_ms, 12.0 * (0.3 + open));

        if open > self.config.lightning_threshold {
            let mut bolts = Frame::with_size(w, h);
            let reach = radius_f * (1.0 + 0.12 * self.rng.random::<f32>());
            draw_lightning(
                &mut bolts,
                center,
                reach,
                1.0 + open,
                self.config.lightning_segments,
                LIGHTNING_COLOR,
                &mut self.rng,
            );
            comp.add_weighted(&bolts, 0.9 * (0.6 + open * 0.7));
        }
        if open > 0.0 {
            let cracks = draw_rim_cracks((w, h), center, radius_f, open, &mut self.rng);
            comp.add_weighted(&cracks.to_frame(), 0.5 * open);
        }

        self.embers.render(&mut comp);
        self.spores.render(&mut comp);

        let glow_mask = mask.scaled(0.5 + 0.5 * open);
        let comp = glow_effect(
            &comp,
            Some(&glow_mask),
            self.config.glow_kernel,
            0.8 + open,
            GLOW_COLOR,
        );
        let comp = chromatic_aberration(&comp, 6.0 * (0.4 + open));
        let comp = color_grade_upside_down(&comp);
        let mut comp = crt_filter(&comp, self.config.scanline_alpha, self.config.crt_curvature);
        comp.scale(flicker_factor(&mut self.rng, time_ms));
        Cow::Owned(comp)
    }

    /// Glowing red core with the rotating ripple band folded into its red channel.
    ///
    /// `t = clamp((R - dist) / R, 0, 1)` shapes each channel with its own
    /// exponent (red `t²`, green `t^1.3`, blue `t`), modulated by per-pixel
    /// noise. The ripple lives in the annulus `0.2..1.1` of the ripple radius.
    fn core_layer(&mut self, w: u32, h: u32, center: Vec2, radius: f32, time_ms: f32) -> Frame {
        let mut core = Frame::with_size(w, h);
        if radius <= 0.0 {
            return core;
        }
        let open = self.open_amount;
        let ripple_radius = radius * (0.3 + 0.7 * open);
        let (ripple_inner, ripple_outer) = (ripple_radius * 0.2, ripple_radius * 1.1);
        let wavelength = (ripple_radius / RIPPLE_FREQ).max(1.0);
        let ripple_weight = 0.55 + 0.25 * open;
        let phase = time_ms / 400.0;
        let spin = self.twist * 0.5;

        let x_start = ((center.x - radius).floor() as i32).max(0);
        let x_end = ((center.x + radius).ceil() as i32).min(w as i32 - 1);
        let y_start = ((center.y - radius).floor() as i32).max(0);
        let y_end = ((center.y + radius).ceil() as i32).min(h as i32 - 1);

        for y in y_start..=y_end {
            let dy = y as f32 - center.y;
            for x in x_start..=x_end {
                let dx = x as f32 - center.x;
                let dist = (dx * dx + dy * dy).sqrt();
                let t = ((radius - dist) / (radius + EPSILON)).clamp(0.0, 1.0);
                if t <= 0.0 {
                    continue;
                }
                let noise = (self.rng.random::<f32>() * 0.6 + 0.4) * t;
                let mut red = ((200.0 + 90.0 * noise).min(255.0) * t * t) as u8;
                let green = ((18.0 + 12.0 * noise) * t.powf(1.3)) as u8;
                let blue = ((6.0 + 4.0 * noise) * t) as u8;

                if dist > ripple_inner && dist < ripple_outer {
                    let theta = dy.atan2(dx) + spin;
                    let wave = (dist / wavelength + theta * 4.0 + phase).sin() * 0.5 + 0.5;
                    let ripple = (wave * t.powf(1.4) * RIPPLE_GAIN) as u8;
                    red = saturate(red as f32 + ripple as f32 * ripple_weight);
                }
                core.set_pixel(x, y, red, green, blue);
            }
        }
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use crate::portal::PortalState;

    fn camera(w: u32, h: u32) -> Frame {
        let mut f = Frame::with_size(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                f.set_pixel(x, y, (x % 200) as u8 + 30, 160, (y % 150) as u8 + 40);
            }
        }
        f
    }

    #[test]
    fn test_disabled_is_passthrough() {
        let frame = camera(160, 120);
        let mut p = Portal::with_seed(160, 120, PortalConfig::default(), 3);
        p.open();
        p.update(0.5);
        let out = p.render(&frame, false);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(*out, frame);
    }

    #[test]
    fn test_empty_frame_is_passthrough() {
        let frame = Frame::with_size(0, 0);
        let mut p = Portal::with_seed(160, 120, PortalConfig::default(), 3);
        assert!(matches!(p.render(&frame, true), Cow::Borrowed(_)));
    }

    #[test]
    fn test_closed_portal_grades_background_and_shows_core() {
        let frame = camera(320, 240);
        let mut p = Portal::with_seed(320, 240, PortalConfig::default(), 11);
        assert_eq!(p.state(), PortalState::Closed);
        let out = p.render(&frame, true).into_owned();

        assert_eq!((out.width(), out.height()), (320, 240));
        // Background outside the disk is regraded
        assert_ne!(out.get_pixel(5, 5), frame.get_pixel(5, 5));
        assert_ne!(out.get_pixel(300, 220), frame.get_pixel(300, 220));
        // Baseline core at 0.55 of the base radius is red
        let (r, g, b) = out.get_pixel(160, 120).unwrap();
        assert!(r > g && r > b, "core pixel {:?}", (r, g, b));
    }

    #[test]
    fn test_render_is_reproducible_with_seed() {
        let frame = camera(200, 150);
        let render = || {
            let mut p = Portal::with_seed(200, 150, PortalConfig::default(), 99);
            p.open();
            p.update(0.4);
            p.render(&frame, true).into_owned()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_open_portal_is_larger_than_closed() {
        let frame = Frame::filled(240, 240, 40, 40, 40);
        let redness = |out: &Frame| {
            out.as_bytes()
                .chunks(3)
                .filter(|px| px[0] as i32 > px[1] as i32 + 60)
                .count()
        };

        let mut closed = Portal::with_seed(240, 240, PortalConfig::default(), 5);
        let closed_out = closed.render(&frame, true).into_owned();

        let mut open = Portal::with_seed(240, 240, PortalConfig::default(), 5);
        open.open();
        open.update(1.0);
        assert_eq!(open.state(), PortalState::Open);
        let open_out = open.render(&frame, true).into_owned();

        assert!(redness(&open_out) > redness(&closed_out));
    }

    #[test]
    fn test_render_leaves_animation_state_alone() {
        let frame = camera(120, 90);
        let mut p = Portal::with_seed(120, 90, PortalConfig::default(), 2);
        p.open();
        p.update(0.3);
        let (amount, elapsed, embers) = (p.open_amount(), p.elapsed(), p.ember_count());
        let _ = p.render(&frame, true);
        assert_eq!(p.open_amount(), amount);
        assert_eq!(p.elapsed(), elapsed);
        assert_eq!(p.ember_count(), embers);
    }

    #[test]
    fn test_center_off_frame_does_not_panic() {
        let frame = camera(64, 48);
        let mut p = Portal::with_seed(1280, 720, PortalConfig::default(), 4);
        p.open();
        p.update(1.0);
        p.set_position(-500.0, 9000.0);
        let out = p.render(&frame, true);
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn test_extreme_center_and_radius_do_not_panic() {
        let frame = camera(64, 48);
        for (x, y) in [(3.0e9, 10.0), (-3.0e9, 10.0), (10.0, 3.0e9), (-3.0e9, -3.0e9)] {
            let mut p = Portal::with_seed(64, 48, PortalConfig::default(), 4);
            p.open();
            p.update(1.0);
            p.set_position(x, y);
            let out = p.render(&frame, true);
            assert_eq!((out.width(), out.height()), (64, 48));
        }

        let mut p = Portal::with_seed(64, 48, PortalConfig::default(), 4);
        p.open();
        p.update(1.0);
        p.set_radius(1.0e12);
        let out = p.render(&frame, true);
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    fn render_with_threshold(seed: u64, threshold: f32, open_for: Option<f32>) -> Frame {
        let frame = camera(200, 200);
        let config = PortalConfig {
            lightning_threshold: threshold,
            ..PortalConfig::default()
        };
        let mut p = Portal::with_seed(200, 200, config, seed);
        if let Some(dt) = open_for {
            p.open();
            p.update(dt);
        }
        p.render(&frame, true).into_owned()
    }

    #[test]
    fn test_closed_portal_draws_no_lightning() {
        let default = render_with_threshold(4, 0.03, None);
        // Same seed, gate never reachable: identical output means no bolts
        assert_eq!(default, render_with_threshold(4, 0.5, None));
        // Forcing the gate open changes the picture
        assert_ne!(default, render_with_threshold(4, -1.0, None));
    }

    #[test]
    fn test_lightning_gate_just_below_threshold() {
        // 1.2 per second for 1/60 s leaves open_amount at 0.02
        let dt = 1.0 / 60.0;
        let default = render_with_threshold(9, 0.03, Some(dt));
        assert_eq!(default, render_with_threshold(9, 0.5, Some(dt)));
        assert_ne!(default, render_with_threshold(9, 0.01, Some(dt)));
    }
}
