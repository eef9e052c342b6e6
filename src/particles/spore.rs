use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::frame::Frame;
use crate::math::Vec2;

const MIN_LIFE: f32 = 4.0;
const MAX_LIFE: f32 = 14.0;
/// Standard deviation of the per-second velocity random walk
const DRIFT_SIGMA: f32 = 2.0;

/// A slow floating mote
#[derive(Debug, Clone)]
pub struct Spore {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub color: (u8, u8, u8),
    pub size: i32,
}

impl Spore {
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Color scaled toward black as the spore ages
    pub fn faded_color(&self) -> (u8, u8, u8) {
        let a = self.alpha();
        (
            (self.color.0 as f32 * a) as u8,
            (self.color.1 as f32 * a) as u8,
            (self.color.2 as f32 * a) as u8,
        )
    }
}

/// Ambient spore field. Keeps only the newest `max_spores` entries.
pub struct SporeEngine {
    spores: Vec<Spore>,
    bounds: (u32, u32),
    max_spores: usize,
    rng: StdRng,
}

impl SporeEngine {
    /// `bounds` is the (width, height) area random spawns fall in
    pub fn new(bounds: (u32, u32), max_spores: usize, rng: StdRng) -> Self {
        Self {
            spores: Vec::with_capacity(max_spores + 1),
            bounds,
            max_spores,
            rng,
        }
    }

    /// Spawn one spore at `pos`, or anywhere inside the bounds when `None`.
    /// If the field overflows, the oldest spores are discarded.
    pub fn emit(&mut self, pos: Option<Vec2>) {
        let pos = pos.unwrap_or_else(|| {
            let (w, h) = self.bounds;
            Vec2::new(
                self.rng.random_range(0..w.max(1)) as f32,
                self.rng.random_range(0..h.max(1)) as f32,
            )
        });
        let vel = Vec2::new(
            self.rng.random_range(-8.0..8.0),
            self.rng.random_range(-12.0..6.0),
        );
        let life = self.rng.random_range(MIN_LIFE..MAX_LIFE);
        let color = (
            self.rng.random_range(30..160u8),
            self.rng.random_range(10..40u8),
            self.rng.random_range(80..200u8),
        );
        let size = self.rng.random_range(1..4);

        self.spores.push(Spore {
            pos,
            vel,
            life,
            max_life: life,
            color,
            size,
        });
        if self.spores.len() > self.max_spores {
            let excess = self.spores.len() - self.max_spores;
            self.spores.drain(..excess);
        }
    }

    /// Drift every spore by `dt` seconds, nudging velocity with Gaussian noise
    pub fn update(&mut self, dt: f32) {
        for s in &mut self.spores {
            s.pos += s.vel * dt;
            s.life -= dt;
            let nx: f32 = self.rng.sample(StandardNormal);
            let ny: f32 = self.rng.sample(StandardNormal);
            s.vel += Vec2::new(nx, ny) * (DRIFT_SIGMA * dt);
        }
        self.spores.retain(Spore::is_alive);
    }

    /// Draw spores as filled disks, fading to black with age
    pub fn render(&self, frame: &mut Frame) {
        for s in &self.spores {
            let (x, y) = s.pos.pixel();
            if !frame.in_bounds(x, y) {
                continue;
            }
            let (r, g, b) = s.faded_color();
            frame.fill_circle(x, y, s.size, r, g, b);
        }
    }

    pub fn count(&self) -> usize {
        self.spores.len()
    }

    pub fn max_spores(&self) -> usize {
        self.max_spores
    }

    pub fn spores(&self) -> &[Spore] {
        &self.spores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn engine(cap: usize) -> SporeEngine {
        SporeEngine::new((320, 240), cap, StdRng::seed_from_u64(5))
    }

    #[test]
    fn test_overflow_keeps_newest() {
        let mut e = engine(10);
        for i in 0..25 {
            e.emit(Some(Vec2::new(i as f32, 0.0)));
        }
        assert_eq!(e.count(), 10);
        let xs: Vec<f32> = e.spores().iter().map(|s| s.pos.x).collect();
        let expected: Vec<f32> = (15..25).map(|i| i as f32).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn test_random_spawn_inside_bounds() {
        let mut e = engine(200);
        for _ in 0..200 {
            e.emit(None);
        }
        for s in e.spores() {
            assert!(s.pos.x >= 0.0 && s.pos.x < 320.0);
            assert!(s.pos.y >= 0.0 && s.pos.y < 240.0);
            assert!(s.life >= 4.0 && s.life < 14.0);
            assert!((1..=3).contains(&s.size));
        }
    }

    #[test]
    fn test_update_culls_and_drifts() {
        let mut e = engine(50);
        for _ in 0..50 {
            e.emit(Some(Vec2::new(100.0, 100.0)));
        }
        e.update(3.0);
        assert_eq!(e.count(), 50);
        e.update(20.0);
        assert_eq!(e.count(), 0);
    }

    #[test]
    fn test_faded_color_goes_black() {
        let s = Spore {
            pos: Vec2::zero(),
            vel: Vec2::zero(),
            life: 0.0,
            max_life: 5.0,
            color: (150, 30, 190),
            size: 2,
        };
        assert_eq!(s.faded_color(), (0, 0, 0));
    }

    #[test]
    fn test_render_draws_inside_only() {
        let mut e = engine(4);
        e.emit(Some(Vec2::new(5.0, 5.0)));
        e.emit(Some(Vec2::new(-20.0, 5.0)));
        let mut f = Frame::with_size(10, 10);
        e.render(&mut f);
        assert_ne!(f.get_pixel(5, 5), Some((0, 0, 0)));
    }
}
