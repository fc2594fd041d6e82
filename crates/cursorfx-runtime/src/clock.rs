//! Overlay clock: real frame deltas feeding a fixed-step budget

use std::time::Instant;

const DEFAULT_HZ: f64 = 60.0;

/// Splits real frame time into fixed effect steps.
///
/// Real time is clamped to `max_frame_time` per frame so a stall (window drag,
/// debugger pause) never turns into hundreds of catch-up steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Sum of clamped frame deltas, in seconds
    pub total_time: f64,
    /// Clamped duration of the most recent frame
    pub delta_time: f64,
    /// Length of one effect step, in seconds
    pub fixed_timestep: f64,
    pub max_frame_time: f64,
    /// Frame time not yet consumed by fixed steps
    pending: f64,
    last_instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::with_fixed_timestep(DEFAULT_HZ)
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock stepping at `hz` updates per second. Invalid rates use 60Hz.
    pub fn with_fixed_timestep(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 {
            hz
        } else {
            DEFAULT_HZ
        };
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: hz.recip(),
            max_frame_time: 0.25,
            pending: 0.0,
            last_instant: None,
        }
    }

    /// Measure the wall-clock time since the previous `tick`. The first
    /// call only starts the measurement.
    pub fn tick(&mut self) {
        let now = Instant::now();
        match self.last_instant.replace(now) {
            Some(previous) => self.advance(now.duration_since(previous).as_secs_f64()),
            None => self.delta_time = 0.0,
        }
    }

    /// Feed an explicit frame duration, for scripted and headless runs.
    /// Negative and non-finite durations count as zero.
    pub fn advance(&mut self, elapsed: f64) {
        let elapsed = if elapsed.is_finite() && elapsed > 0.0 {
            elapsed
        } else {
            0.0
        };
        self.delta_time = elapsed.min(self.max_frame_time);
        self.total_time += self.delta_time;
        self.pending += self.delta_time;
    }

    /// Take one fixed step from the pending time if a whole step is available.
    pub fn next_fixed_step(&mut self) -> bool {
        if self.pending < self.fixed_timestep {
            return false;
        }
        self.pending -= self.fixed_timestep;
        true
    }

    /// How far into the next fixed step the clock is, in [0, 1)
    pub fn step_fraction(&self) -> f64 {
        self.pending / self.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(clock: &mut FrameClock) -> u32 {
        let mut steps = 0;
        while clock.next_fixed_step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_defaults_to_60hz() {
        let clock = FrameClock::new();
        assert!((clock.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time, 0.0);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        assert!((FrameClock::with_fixed_timestep(30.0).fixed_timestep - 1.0 / 30.0).abs() < 1e-10);
        for hz in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let clock = FrameClock::with_fixed_timestep(hz);
            assert!((clock.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_first_tick_starts_measurement() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert!(!clock.next_fixed_step());
    }

    #[test]
    fn test_two_steps_in_a_30hz_frame() {
        let mut clock = FrameClock::new();
        clock.advance(1.0 / 30.0 + 1e-9);
        assert_eq!(drain(&mut clock), 2);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(5.0);
        assert!((clock.delta_time - 0.25).abs() < 1e-10);
        // 0.25s at 60Hz, give or take float rounding
        assert!((14..=15).contains(&drain(&mut clock)));
    }

    #[test]
    fn test_bad_elapsed_is_zero() {
        let mut clock = FrameClock::new();
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.total_time, 0.0);
    }

    #[test]
    fn test_step_fraction() {
        let mut clock = FrameClock::new();
        clock.advance(clock.fixed_timestep * 1.5);
        assert!(clock.next_fixed_step());
        assert!((clock.step_fraction() - 0.5).abs() < 1e-9);
    }
}
