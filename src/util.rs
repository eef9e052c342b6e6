//! Shared utilities

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Randomness
// ============================================================================

/// Fresh OS-seeded generator. Only the outermost owner (the portal built by the
/// application) should call this; everything below it receives a generator.
pub fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// Derive an independent generator from a parent, keeping seeded runs reproducible
pub fn child_rng(parent: &mut impl Rng) -> StdRng {
    StdRng::seed_from_u64(parent.random())
}

/// Uniform sample between `a` and `b`, in either order.
/// Unlike `random_range` this never panics on an empty or inverted interval.
#[inline]
pub fn uniform(rng: &mut impl Rng, a: f32, b: f32) -> f32 {
    a + (b - a) * rng.random::<f32>()
}

/// Uniform integer in [-k, k]; zero when `k <= 0`
#[inline]
pub fn jitter(rng: &mut impl Rng, k: i32) -> i32 {
    if k <= 0 {
        0
    } else {
        rng.random_range(-k..=k)
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ============================================================================
// FPS Counter
// ============================================================================

use std::collections::VecDeque;
use std::time::Instant;

/// FPS counter with rolling average
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FpsCounter {
    /// Create a new FPS counter with specified sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count,
        }
    }

    /// Call at the start of each frame to record timing
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);
        (dt, self.avg_fps())
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    pub fn avg_fps(&self) -> f32 {
        let avg_dt = self.avg_frame_time_ms() / 1000.0;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    /// Get the average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        avg_dt * 1000.0
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().copied().fold(f32::INFINITY, f32::min);
        let max_dt = self.frame_times.iter().copied().fold(0.0, f32::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }
}
