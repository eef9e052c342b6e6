//! The portal: a four-state animation driving the compositor
//!
//! `Portal` owns its particle engines, its random generator and its animation
//! clock. Callers drive it with a handful of commands (`open`, `close`,
//! `set_position`, `apply_twist`), advance it with `update(dt)` once per frame
//! and then ask it to `render` the current camera frame.

mod render;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::debug;

use crate::config::{BurstConfig, PortalConfig};
use crate::math::Vec2;
use crate::particles::{EmberEngine, SporeEngine, EMBER_COLOR};
use crate::util::{child_rng, entropy_rng, jitter};

/// Where the portal is in its open/close cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl PortalState {
    /// True while the portal is shut or on its way to being shut
    pub fn is_closing_or_closed(self) -> bool {
        matches!(self, PortalState::Closed | PortalState::Closing)
    }
}

impl fmt::Display for PortalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortalState::Closed => "closed",
            PortalState::Opening => "opening",
            PortalState::Open => "open",
            PortalState::Closing => "closing",
        };
        f.write_str(name)
    }
}

pub struct Portal {
    width: u32,
    height: u32,
    center: Vec2,
    radius: f32,
    open_amount: f32,
    state: PortalState,
    twist: f32,
    /// Animation clock in seconds, advanced only by `update`
    elapsed: f32,
    embers: EmberEngine,
    spores: SporeEngine,
    config: PortalConfig,
    rng: StdRng,
}

impl Portal {
    /// Portal for a `width`×`height` feed, seeded from OS entropy
    pub fn new(width: u32, height: u32, config: PortalConfig) -> Self {
        Self::with_rng(width, height, config, entropy_rng())
    }

    /// Reproducible portal: identical seeds and inputs render identical frames
    pub fn with_seed(width: u32, height: u32, config: PortalConfig, seed: u64) -> Self {
        Self::with_rng(width, height, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: u32, height: u32, config: PortalConfig, mut rng: StdRng) -> Self {
        let embers = EmberEngine::new(config.max_particles, child_rng(&mut rng));
        let spores = SporeEngine::new((width, height), config.max_spores, child_rng(&mut rng));
        let radius = (width.min(height) / config.radius_divisor.max(1)) as f32;
        Self {
            width,
            height,
            center: Vec2::new((width / 2) as f32, (height / 2) as f32),
            radius,
            open_amount: 0.0,
            state: PortalState::Closed,
            twist: 0.0,
            elapsed: 0.0,
            embers,
            spores,
            config,
            rng,
        }
    }

    /// Start opening and fire the opening burst. Retargets immediately even
    /// mid-close.
    pub fn open(&mut self) {
        self.transition(PortalState::Opening);
        let burst = self.config.open_burst.clone();
        self.burst(&burst);
    }

    /// Start closing and fire the shockwave burst. Retargets immediately even
    /// mid-open.
    pub fn close(&mut self) {
        self.transition(PortalState::Closing);
        let burst = self.config.close_burst.clone();
        self.burst(&burst);
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.center = Vec2::new(x, y);
    }

    /// Add to the rotational offset of the ripple pattern
    pub fn apply_twist(&mut self, delta: f32) {
        self.twist += delta;
    }

    /// Override the base radius (before the open/close scaling)
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Advance particles, the open/close animation and twist decay by `dt`
    /// seconds. Negative `dt` counts as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.embers.update(dt);
        self.spores.update(dt);

        match self.state {
            PortalState::Opening => {
                self.open_amount = (self.open_amount + dt * self.config.opening_rate).min(1.0);
                if self.open_amount >= 1.0 {
                    self.transition(PortalState::Open);
                }
            },
            PortalState::Closing => {
                self.open_amount = (self.open_amount - dt * self.config.closing_rate).max(0.0);
                if self.open_amount <= 0.0 {
                    self.transition(PortalState::Closed);
                }
            },
            PortalState::Closed | PortalState::Open => {},
        }

        self.twist *= self.config.twist_decay.powf(dt * self.config.reference_fps);
    }

    fn transition(&mut self, next: PortalState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, open_amount = self.open_amount, "portal state");
        }
        self.state = next;
    }

    fn burst(&mut self, burst: &BurstConfig) {
        let mut emitted = 0;
        for _ in 0..burst.emit_points {
            let pos = self.center
                + Vec2::new(
                    jitter(&mut self.rng, burst.position_jitter) as f32,
                    jitter(&mut self.rng, burst.position_jitter) as f32,
                );
            emitted += self
                .embers
                .emit(pos, burst.embers_per_point, burst.spread, EMBER_COLOR);
        }

        let extent = (self.radius * burst.spore_extent) as i32;
        for _ in 0..burst.spores {
            let pos = self.center
                + Vec2::new(
                    jitter(&mut self.rng, extent) as f32,
                    jitter(&mut self.rng, extent) as f32,
                );
            self.spores.emit(Some(pos));
        }
        debug!(embers = emitted, spores = burst.spores, "portal burst");
    }

    pub fn state(&self) -> PortalState {
        self.state
    }

    /// Animation progress, 0 = shut, 1 = fully open
    pub fn open_amount(&self) -> f32 {
        self.open_amount
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn twist(&self) -> f32 {
        self.twist
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Feed dimensions the portal was built for
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn ember_count(&self) -> usize {
        self.embers.count()
    }

    pub fn spore_count(&self) -> usize {
        self.spores.count()
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal() -> Portal {
        Portal::with_seed(1280, 720, PortalConfig::default(), 7)
    }

    #[test]
    fn test_new_portal_geometry() {
        let p = portal();
        assert_eq!(p.state(), PortalState::Closed);
        assert_eq!(p.open_amount(), 0.0);
        assert_eq!(p.radius(), 120.0);
        assert_eq!(p.center(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn test_open_then_close_in_one_second_steps() {
        let mut p = portal();
        p.open();
        assert_eq!(p.state(), PortalState::Opening);
        p.update(1.0);
        assert_eq!(p.open_amount(), 1.0);
        assert_eq!(p.state(), PortalState::Open);

        p.close();
        p.update(1.0);
        assert_eq!(p.open_amount(), 0.0);
        assert_eq!(p.state(), PortalState::Closed);
    }

    #[test]
    fn test_open_amount_stays_in_range_under_interleaving() {
        let mut p = portal();
        let steps = [0.0, 0.01, 0.3, 0.05, 2.0, 0.016, 0.7, -1.0, 0.033];
        for i in 0..200 {
            match i % 7 {
                0 | 3 => p.open(),
                5 => p.close(),
                _ => {},
            }
            p.update(steps[i % steps.len()]);
            assert!((0.0..=1.0).contains(&p.open_amount()));
        }
    }

    #[test]
    fn test_states_are_reachable() {
        let mut p = portal();
        p.open();
        let mut ticks = 0;
        while p.state() != PortalState::Open {
            p.update(1.0 / 30.0);
            ticks += 1;
            assert!(ticks < 100);
        }
        p.close();
        ticks = 0;
        while p.state() != PortalState::Closed {
            p.update(1.0 / 30.0);
            ticks += 1;
            assert!(ticks < 100);
        }
    }

    #[test]
    fn test_reopen_mid_close_retargets() {
        let mut p = portal();
        p.open();
        p.update(1.0);
        p.close();
        p.update(0.25);
        let partway = p.open_amount();
        assert!(partway > 0.0 && partway < 1.0);
        p.open();
        assert_eq!(p.state(), PortalState::Opening);
        p.update(0.1);
        assert!(p.open_amount() > partway);
    }

    #[test]
    fn test_bursts_respect_caps() {
        let mut config = PortalConfig::default();
        config.max_particles = 100;
        config.max_spores = 50;
        let mut p = Portal::with_seed(640, 480, config, 1);
        for _ in 0..5 {
            p.open();
            p.close();
            assert!(p.ember_count() <= 100);
            assert!(p.spore_count() <= 50);
        }
        assert_eq!(p.ember_count(), 100);
        assert_eq!(p.spore_count(), 50);
    }

    #[test]
    fn test_twist_decay_matches_per_tick_at_reference_rate() {
        let mut p = portal();
        p.apply_twist(1.0);
        p.update(1.0 / 30.0);
        assert!((p.twist() - 0.92).abs() < 1e-4);

        // Two half steps decay as much as one full step
        let mut q = portal();
        q.apply_twist(1.0);
        q.update(1.0 / 60.0);
        q.update(1.0 / 60.0);
        assert!((q.twist() - 0.92).abs() < 1e-4);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut p = portal();
        p.open();
        p.apply_twist(0.5);
        p.update(-3.0);
        assert_eq!(p.open_amount(), 0.0);
        assert_eq!(p.twist(), 0.5);
        assert_eq!(p.elapsed(), 0.0);
    }

    #[test]
    fn test_spores_age_with_update() {
        let mut p = portal();
        p.open();
        assert_eq!(p.spore_count(), 100);
        p.update(20.0);
        assert_eq!(p.spore_count(), 0);
        assert_eq!(p.ember_count(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PortalState::Opening.to_string(), "opening");
        assert!(PortalState::Closing.is_closing_or_closed());
        assert!(!PortalState::Open.is_closing_or_closed());
    }
}
