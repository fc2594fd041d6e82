//! Per-effect composite shapes: bubble shell, lightning bolt, sigil

use crate::hash11;
use crate::ops::{op_outline, op_union, polar_repeat, polar_sector, rotate};
use crate::primitives::{sd_arc, sd_polygon, sd_ring, sd_segment, sd_star};
use cursorfx_core::Vec2;
use std::f32::consts::TAU;

pub const MAX_BOLT_SEGMENTS: u32 = 16;
pub const MAX_BOLT_BRANCHES: u32 = 4;
pub const MAX_SIGIL_RINGS: u32 = 4;

/// Filled bubble whose outline wobbles with three lobes
pub fn bubble(p: Vec2, radius: f32, wobble_phase: f32, wobble_amp: f32) -> f32 {
    let angle = p.y.atan2(p.x);
    let r = radius * (1.0 + wobble_amp * (3.0 * angle + wobble_phase).sin());
    p.length() - r
}

/// Thin shell of a bubble, `rim` pixels wide
pub fn bubble_rim(p: Vec2, radius: f32, rim: f32, wobble_phase: f32, wobble_amp: f32) -> f32 {
    op_outline(bubble(p, radius, wobble_phase, wobble_amp), rim)
}

/// Vertex `i` of a bolt along +x from the origin to `(length, 0)`.
/// Endpoints are pinned; interior vertices get a seeded sideways offset.
pub fn bolt_vertex(i: u32, segments: u32, length: f32, jaggedness: f32, seed: f32) -> Vec2 {
    let segments = segments.clamp(1, MAX_BOLT_SEGMENTS);
    let x = length * i as f32 / segments as f32;
    if i == 0 || i >= segments {
        return Vec2::new(x.min(length), 0.0);
    }
    let step = length / segments as f32;
    let offset = (hash11(seed + i as f32 * 1.37) - 0.5) * 2.0 * jaggedness * step;
    Vec2::new(x, offset)
}

/// Jagged polyline with up to `branches` forks, each a shorter seeded bolt
#[allow(clippy::too_many_arguments)]
pub fn bolt(
    p: Vec2,
    length: f32,
    segments: u32,
    jaggedness: f32,
    seed: f32,
    thickness: f32,
    branches: u32,
) -> f32 {
    let segments = segments.clamp(1, MAX_BOLT_SEGMENTS);
    let mut d = f32::MAX;
    let mut prev = bolt_vertex(0, segments, length, jaggedness, seed);
    for i in 1..=segments {
        let next = bolt_vertex(i, segments, length, jaggedness, seed);
        d = op_union(d, sd_segment(p, prev, next, thickness));
        prev = next;
    }

    if segments < 2 {
        return d;
    }
    for b in 0..branches.min(MAX_BOLT_BRANCHES) {
        let h = hash11(seed + 17.0 + b as f32 * 3.1);
        let fork = 1 + (h * (segments - 1) as f32) as u32 % (segments - 1);
        let origin = bolt_vertex(fork, segments, length, jaggedness, seed);
        let side = if b % 2 == 0 { 1.0 } else { -1.0 };
        let angle = side * (0.35 + 0.4 * hash11(seed + 29.0 + b as f32));
        let local = rotate(p - origin, angle);
        let branch_len = length * (0.25 + 0.2 * h);
        let branch_seed = seed + 41.0 + b as f32 * 7.0;
        let mut prev = bolt_vertex(0, 3, branch_len, jaggedness, branch_seed);
        for i in 1..=3 {
            let next = bolt_vertex(i, 3, branch_len, jaggedness, branch_seed);
            d = op_union(d, sd_segment(local, prev, next, thickness * 0.6));
            prev = next;
        }
    }
    d
}

/// Rune ring composition: concentric rings, an inscribed polygon and star,
/// and `runes` small arcs placed around the outer band. `seed` picks the
/// rune orientations; `pulse` in [-1, 1] swells the figure.
#[allow(clippy::too_many_arguments)]
pub fn sigil(
    p: Vec2,
    radius: f32,
    thickness: f32,
    rings: u32,
    spokes: u32,
    runes: u32,
    seed: f32,
    pulse: f32,
) -> f32 {
    let radius = radius * (1.0 + 0.05 * pulse);
    let mut d = f32::MAX;
    for i in 0..rings.clamp(1, MAX_SIGIL_RINGS) {
        d = op_union(d, sd_ring(p, radius * (1.0 - i as f32 * 0.12), thickness));
    }

    let spokes = spokes.max(3);
    d = op_union(d, op_outline(sd_polygon(p, radius * 0.62, spokes), thickness));
    d = op_union(d, op_outline(sd_star(p, radius * 0.55, spokes, 2.3), thickness));

    if runes > 0 {
        let q = polar_repeat(p, runes);
        let sector = polar_sector(p, runes) as f32;
        let band = radius * (1.0 - 0.06 * rings.clamp(1, MAX_SIGIL_RINGS) as f32);
        let twist = hash11(seed + sector * 5.3) * TAU;
        let glyph_r = radius * 0.06;
        let local = rotate(q - Vec2::new(band, 0.0), twist);
        d = op_union(d, sd_arc(local, glyph_r, 1.2, thickness));
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubble_without_wobble_is_a_circle() {
        assert!((bubble(Vec2::new(10.0, 0.0), 10.0, 1.3, 0.0)).abs() < 1e-5);
        assert!(bubble_rim(Vec2::new(0.0, 10.0), 10.0, 2.0, 0.0, 0.0) < 0.0);
        assert!(bubble_rim(Vec2::ZERO, 10.0, 2.0, 0.0, 0.0) > 0.0);
    }

    #[test]
    fn bolt_endpoints_are_pinned() {
        let start = bolt_vertex(0, 8, 100.0, 0.8, 3.0);
        let end = bolt_vertex(8, 8, 100.0, 0.8, 3.0);
        assert_eq!(start, Vec2::ZERO);
        assert_eq!(end, Vec2::new(100.0, 0.0));
        assert!(bolt(Vec2::ZERO, 100.0, 8, 0.8, 3.0, 2.0, 2) < 0.0);
        assert!(bolt(Vec2::new(100.0, 0.0), 100.0, 8, 0.8, 3.0, 2.0, 2) < 0.0);
    }

    #[test]
    fn bolt_offsets_are_bounded_by_jaggedness() {
        for i in 0..=8 {
            let v = bolt_vertex(i, 8, 80.0, 0.5, 11.0);
            assert!(v.y.abs() <= 0.5 * 10.0 + 1e-4);
        }
        // Zero jaggedness is a straight line
        assert!(bolt(Vec2::new(40.0, 0.0), 80.0, 8, 0.0, 11.0, 1.0, 0) < 0.0);
    }

    #[test]
    fn bolt_segment_count_is_capped() {
        let capped = bolt_vertex(MAX_BOLT_SEGMENTS, 100, 50.0, 0.3, 1.0);
        assert_eq!(capped, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn sigil_outer_ring_and_empty_far_field() {
        assert!(sigil(Vec2::new(40.0, 0.0), 40.0, 2.0, 2, 6, 8, 1.0, 0.0) < 0.0);
        assert!(sigil(Vec2::new(200.0, 0.0), 40.0, 2.0, 2, 6, 8, 1.0, 0.0) > 100.0);
    }
}
