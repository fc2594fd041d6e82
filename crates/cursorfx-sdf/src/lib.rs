//! cursorfx SDF - procedural shape model
//!
//! CPU reference of the distance-field library that every effect shader
//! evaluates per pixel. Coordinates are instance-local: the origin is the
//! instance center and one unit is one pixel unless a function says otherwise.
//!
//! - `primitives`: circle, ring, segment, arc, polygon, star, hexagon, triangle
//! - `ops`: union / subtract / intersect / smooth union, rotation, polar repeat
//! - `glow`: multi-term exponential falloff turning distance into color
//! - `patterns`: sacred-geometry composites, pattern dispatch, morphing
//! - `glyphs`: procedural emoji glyphs
//! - `shapes`: per-effect shapes (bubble shell, lightning bolt, sigil)

pub mod glow;
pub mod glyphs;
pub mod ops;
pub mod patterns;
pub mod primitives;
pub mod shapes;

pub use glow::{glow, shade, GlowParams};
pub use glyphs::{evaluate_glyph, EmojiGlyph};
pub use patterns::{evaluate_pattern, morph_patterns, SacredPattern};

/// GLSL-style sign: 0 for 0
pub(crate) fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Deterministic hash in [0, 1); identical to `hash11` in `sdf.wgsl`
pub fn hash11(x: f32) -> f32 {
    let v = (x * 127.1).sin() * 43_758.547;
    v - v.floor()
}
