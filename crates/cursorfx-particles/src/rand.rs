//! Seeded random source for spawn jitter
//!
//! Every effect owns one generator so runs are reproducible per seed.

use cursorfx_core::Vec2;
use std::f32::consts::TAU;

pub struct ParticleRng {
    inner: fastrand::Rng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.inner.u32(..)
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.f32()
    }

    /// Returns a float in [min, max); `min` when the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.next_f32() * (max - min)
    }

    /// `base` scaled by a random factor in [1 - spread, 1 + spread)
    pub fn jitter(&mut self, base: f32, spread: f32) -> f32 {
        let spread = spread.clamp(0.0, 1.0);
        base * (1.0 - spread + self.next_f32() * 2.0 * spread)
    }

    /// Uniform angle in [0, 2π)
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * TAU
    }

    /// Unit vector with a uniform random heading
    pub fn direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.angle())
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform index in [0, n); 0 when `n` is 0
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.usize(..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
        assert_eq!(rng.range(5.0, 5.0), 5.0);
        assert_eq!(rng.range(5.0, 1.0), 5.0);
    }

    #[test]
    fn jitter_stays_in_band() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..1000 {
            let v = rng.jitter(10.0, 0.2);
            assert!((8.0..12.0).contains(&v), "{v}");
        }
        assert_eq!(rng.jitter(10.0, 0.0), 10.0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ParticleRng::new(99);
        let mut b = ParticleRng::new(99);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn direction_is_unit() {
        let mut rng = ParticleRng::new(123);
        for _ in 0..100 {
            assert!((rng.direction().length() - 1.0).abs() < 1e-4);
        }
    }
}
