//! Value-over-lifetime interpolation (start → end linear) and periodic helpers

use cursorfx_core::Color;
use std::f32::consts::TAU;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two colors, `t` clamped to [0, 1]
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    a.lerp(&b, t.clamp(0.0, 1.0))
}

/// Sine pulse in [-1, 1] at `frequency` Hz
pub fn pulse(time: f32, frequency: f32, phase: f32) -> f32 {
    (time * frequency * TAU + phase).sin()
}

/// Add `rate * dt` to a phase, wrapped to [0, 2π) so it never loses precision
pub fn advance_phase(phase: f32, rate: f32, dt: f32) -> f32 {
    (phase + rate * dt).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_f32_endpoints() {
        assert!((lerp_f32(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn lerp_color_midpoint() {
        let mid = lerp_color(Color::WHITE, Color::TRANSPARENT, 0.5);
        assert!((mid.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn phase_wraps() {
        let p = advance_phase(6.0, 1.0, 1.0);
        assert!((0.0..TAU).contains(&p));
        assert!((p - (7.0 - TAU)).abs() < 1e-5);
    }
}
