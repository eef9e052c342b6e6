use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::TAU;

use crate::frame::Frame;
use crate::math::Vec2;
use crate::util::uniform;

/// Default ember tint (deep blue-red spark)
pub const EMBER_COLOR: (u8, u8, u8) = (10, 10, 120);

const MIN_SPEED: f32 = 10.0;
const MIN_LIFE: f32 = 0.8;
const MAX_LIFE: f32 = 2.5;
const COLOR_JITTER: i32 = 30;
const GRAVITY: f32 = 10.0;

/// A single spark
#[derive(Debug, Clone)]
pub struct Ember {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub color: (u8, u8, u8),
}

impl Ember {
    pub fn new(pos: Vec2, vel: Vec2, life: f32, color: (u8, u8, u8)) -> Self {
        Self {
            pos,
            vel,
            life,
            max_life: life,
            color,
        }
    }

    /// Remaining life fraction, 1 = just born, 0 = dead
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Disk radius: small when fresh, growing as the ember fades
    #[inline]
    pub fn radius(&self) -> i32 {
        (2.0 + 3.0 * (1.0 - self.alpha())) as i32
    }
}

/// Capped pool of embers with constant downward gravity
pub struct EmberEngine {
    particles: Vec<Ember>,
    max_particles: usize,
    rng: StdRng,
}

impl EmberEngine {
    pub fn new(max_particles: usize, rng: StdRng) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles),
            max_particles,
            rng,
        }
    }

    /// Emit up to `count` embers at `pos`. Each flies in a random direction at
    /// a speed in [10, spread] with a color jittered ±30 per channel around
    /// `base_color`. Emission stops silently once the pool is full.
    /// Returns how many embers were actually added.
    pub fn emit(&mut self, pos: Vec2, count: usize, spread: f32, base_color: (u8, u8, u8)) -> usize {
        let mut emitted = 0;
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let angle = self.rng.random_range(0.0..TAU);
            let speed = uniform(&mut self.rng, MIN_SPEED, spread);
            let vel = Vec2::from_angle(angle) * speed;
            let life = self.rng.random_range(MIN_LIFE..MAX_LIFE);
            let color = (
                jitter_channel(&mut self.rng, base_color.0),
                jitter_channel(&mut self.rng, base_color.1),
                jitter_channel(&mut self.rng, base_color.2),
            );
            self.particles.push(Ember::new(pos, vel, life, color));
            emitted += 1;
        }
        emitted
    }

    /// Advance every ember by `dt` seconds and drop the dead ones
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.life -= dt;
            p.vel.y += GRAVITY * dt;
        }
        self.particles.retain(Ember::is_alive);
    }

    /// Draw every ember as a filled disk. Embers whose pixel lies outside the
    /// frame are skipped.
    pub fn render(&self, frame: &mut Frame) {
        for p in &self.particles {
            let (x, y) = p.pos.pixel();
            if !frame.in_bounds(x, y) {
                continue;
            }
            frame.fill_circle(x, y, p.radius(), p.color.0, p.color.1, p.color.2);
        }
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn particles(&self) -> &[Ember] {
        &self.particles
    }
}

/// Uniform integer in [c - 30, c + 30] clamped to the byte range
fn jitter_channel(rng: &mut impl Rng, c: u8) -> u8 {
    let lo = (c as i32 - COLOR_JITTER).max(0);
    let hi = (c as i32 + COLOR_JITTER).min(255);
    rng.random_range(lo..=hi) as u8
}
