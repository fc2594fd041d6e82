//! Distance → color conversion.
//!
//! Shapes are not rendered with a hard inside/outside test. Brightness is a
//! sum of gaussian-like terms over the distance to the boundary, which gives
//! a hot core line, a mid halo and a wide faint bloom.

use cursorfx_core::Color;

/// Weights and decay rates of the three glow terms.
///
/// Decay rates are in 1/px², so `core_falloff = 0.5` halves the core term
/// roughly 1.2px away from the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowParams {
    pub core_weight: f32,
    pub core_falloff: f32,
    pub mid_weight: f32,
    pub mid_falloff: f32,
    pub outer_weight: f32,
    pub outer_falloff: f32,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            core_weight: 1.0,
            core_falloff: 0.5,
            mid_weight: 0.45,
            mid_falloff: 0.04,
            outer_weight: 0.18,
            outer_falloff: 0.004,
        }
    }
}

/// Glow brightness for a signed distance (only its magnitude matters)
pub fn glow(d: f32, intensity: f32, params: &GlowParams) -> f32 {
    let d2 = d * d;
    let core = params.core_weight * (-params.core_falloff * d2).exp();
    let mid = params.mid_weight * (-params.mid_falloff * d2).exp();
    let outer = params.outer_weight * (-params.outer_falloff * d2).exp();
    intensity.max(0.0) * (core + mid + outer)
}

/// Final RGBA for a pixel at distance `d` from a shape drawn in `color`.
///
/// The core term pushes the color toward white so bright lines read as hot.
pub fn shade(d: f32, color: Color, intensity: f32, params: &GlowParams) -> [f32; 4] {
    let g = glow(d, intensity, params);
    let core = params.core_weight * (-params.core_falloff * d * d).exp() * intensity.max(0.0);
    let white_mix = (core * 0.6).clamp(0.0, 1.0);
    let r = color.r + (1.0 - color.r) * white_mix;
    let gc = color.g + (1.0 - color.g) * white_mix;
    let b = color.b + (1.0 - color.b) * white_mix;
    [r, gc, b, (g * color.a).clamp(0.0, 1.0)]
}

/// Anti-aliased coverage of a filled shape, `aa` pixels wide
pub fn fill_coverage(d: f32, aa: f32) -> f32 {
    let aa = aa.max(1e-4);
    let t = ((d + aa) / (2.0 * aa)).clamp(0.0, 1.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}
