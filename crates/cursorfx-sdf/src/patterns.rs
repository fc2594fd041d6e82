//! Sacred-geometry composite patterns.
//!
//! Every pattern is a fixed union of primitive outlines parameterized by an
//! overall `radius`, a line `thickness` and a continuous `phase` that makes
//! the elements breathe. Dispatch is a flat match on the pattern index; the
//! shader has the same switch.

use crate::ops::{op_mix, op_outline, op_union, polar_repeat, rotate};
use crate::primitives::{sd_circle, sd_ring, sd_segment, sd_triangle};
use cursorfx_core::Vec2;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_3, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SacredPattern {
    SeedOfLife,
    FlowerOfLife,
    TreeOfLife,
    SriYantra,
    MetatronsCube,
    VesicaPiscis,
    Merkaba,
    Torus,
}

impl SacredPattern {
    pub const ALL: [SacredPattern; 8] = [
        SacredPattern::SeedOfLife,
        SacredPattern::FlowerOfLife,
        SacredPattern::TreeOfLife,
        SacredPattern::SriYantra,
        SacredPattern::MetatronsCube,
        SacredPattern::VesicaPiscis,
        SacredPattern::Merkaba,
        SacredPattern::Torus,
    ];

    pub const COUNT: u32 = Self::ALL.len() as u32;

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Out-of-range indices wrap around
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % Self::COUNT) as usize]
    }

    /// The pattern after this one, wrapping
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl std::str::FromStr for SacredPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seed_of_life" => Ok(SacredPattern::SeedOfLife),
            "flower_of_life" => Ok(SacredPattern::FlowerOfLife),
            "tree_of_life" => Ok(SacredPattern::TreeOfLife),
            "sri_yantra" => Ok(SacredPattern::SriYantra),
            "metatrons_cube" => Ok(SacredPattern::MetatronsCube),
            "vesica_piscis" => Ok(SacredPattern::VesicaPiscis),
            "merkaba" => Ok(SacredPattern::Merkaba),
            "torus" => Ok(SacredPattern::Torus),
            other => Err(format!("unknown pattern '{other}'")),
        }
    }
}

/// Distance to `pattern` drawn at `radius` with line width `thickness`
pub fn evaluate_pattern(
    pattern: SacredPattern,
    p: Vec2,
    radius: f32,
    thickness: f32,
    phase: f32,
) -> f32 {
    match pattern {
        SacredPattern::SeedOfLife => seed_of_life(p, radius, thickness, phase),
        SacredPattern::FlowerOfLife => flower_of_life(p, radius, thickness, phase),
        SacredPattern::TreeOfLife => tree_of_life(p, radius, thickness, phase),
        SacredPattern::SriYantra => sri_yantra(p, radius, thickness, phase),
        SacredPattern::MetatronsCube => metatrons_cube(p, radius, thickness, phase),
        SacredPattern::VesicaPiscis => vesica_piscis(p, radius, thickness, phase),
        SacredPattern::Merkaba => merkaba(p, radius, thickness, phase),
        SacredPattern::Torus => torus(p, radius, thickness, phase),
    }
}

/// Naive cross-pattern morph: linear blend of the two distance fields
pub fn morph_patterns(
    from: SacredPattern,
    to: SacredPattern,
    blend: f32,
    p: Vec2,
    radius: f32,
    thickness: f32,
    phase: f32,
) -> f32 {
    let blend = blend.clamp(0.0, 1.0);
    if blend <= 0.0 || from == to {
        return evaluate_pattern(from, p, radius, thickness, phase);
    }
    if blend >= 1.0 {
        return evaluate_pattern(to, p, radius, thickness, phase);
    }
    op_mix(
        evaluate_pattern(from, p, radius, thickness, phase),
        evaluate_pattern(to, p, radius, thickness, phase),
        blend,
    )
}

/// Seven overlapping circles plus the enclosing circle
pub fn seed_of_life(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let r = radius * 0.5;
    let mut d = sd_ring(p, radius, thickness);
    d = op_union(d, sd_ring(p, r, thickness));
    for i in 0..6 {
        let angle = i as f32 * FRAC_PI_3;
        let breathe = 1.0 + 0.05 * (phase + i as f32).sin();
        let center = Vec2::from_angle(angle) * (r * breathe);
        d = op_union(d, sd_ring(p - center, r, thickness));
    }
    d
}

/// Nineteen circles on a hexagonal lattice plus the enclosing circle
pub fn flower_of_life(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let r = radius / 3.0;
    let mut d = sd_ring(p, radius, thickness);
    d = op_union(d, sd_ring(p, r * (1.0 + 0.04 * phase.sin()), thickness));
    for i in 0..6 {
        let angle = i as f32 * FRAC_PI_3;
        let dir = Vec2::from_angle(angle);
        let between = Vec2::from_angle(angle + FRAC_PI_3 * 0.5);
        let scale = 1.0 + 0.04 * (phase + i as f32 * 0.5).sin();
        d = op_union(d, sd_ring(p - dir * r, r * scale, thickness));
        d = op_union(d, sd_ring(p - dir * (2.0 * r), r * scale, thickness));
        d = op_union(d, sd_ring(p - between * (3.0_f32.sqrt() * r), r * scale, thickness));
    }
    d
}

/// Unit-space node positions of the tree of life (y down)
pub const TREE_NODES: [[f32; 2]; 10] = [
    [0.0, -1.0],
    [0.5, -0.75],
    [-0.5, -0.75],
    [0.5, -0.25],
    [-0.5, -0.25],
    [0.0, 0.0],
    [0.5, 0.25],
    [-0.5, 0.25],
    [0.0, 0.5],
    [0.0, 1.0],
];

/// The 22 paths between tree nodes
pub const TREE_PATHS: [[usize; 2]; 22] = [
    [0, 1],
    [0, 2],
    [0, 5],
    [1, 2],
    [1, 3],
    [1, 5],
    [2, 4],
    [2, 5],
    [3, 4],
    [3, 5],
    [3, 6],
    [4, 5],
    [4, 7],
    [5, 6],
    [5, 7],
    [5, 8],
    [6, 7],
    [6, 8],
    [6, 9],
    [7, 8],
    [7, 9],
    [8, 9],
];

/// Ten ringed nodes joined by 22 paths
pub fn tree_of_life(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let node = |i: usize| Vec2::from_array(TREE_NODES[i]) * (radius * 0.9);
    let mut d = f32::MAX;
    for path in TREE_PATHS {
        d = op_union(d, sd_segment(p, node(path[0]), node(path[1]), thickness));
    }
    for i in 0..TREE_NODES.len() {
        let pulse = 1.0 + 0.1 * (phase * 1.5 + i as f32).sin();
        d = op_union(d, sd_ring(p - node(i), radius * 0.11 * pulse, thickness));
    }
    d
}

/// Nine interlocking triangles of decreasing scale inside two rings
pub fn sri_yantra(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    const SCALES: [f32; 9] = [1.0, 0.92, 0.8, 0.72, 0.6, 0.52, 0.42, 0.32, 0.22];
    const OFFSETS: [f32; 9] = [-0.05, 0.08, -0.12, 0.14, -0.06, 0.1, -0.03, 0.05, 0.0];

    let mut d = op_union(
        sd_ring(p, radius, thickness),
        sd_ring(p, radius * 0.9, thickness),
    );
    for i in 0..9 {
        let breathe = 1.0 + 0.03 * (phase + i as f32).sin();
        let size = radius * 0.62 * SCALES[i] * breathe;
        let mut q = p - Vec2::new(0.0, OFFSETS[i] * radius);
        // Even triangles point up, odd ones down
        if i % 2 == 1 {
            q.y = -q.y;
        }
        d = op_union(d, op_outline(sd_triangle(q, size), thickness));
    }
    d
}

/// Thirteen circles with the hexagon, hexagram and spoke lines between them
pub fn metatrons_cube(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let r = radius * 0.4;
    let spin = 0.05 * phase.sin();
    let inner = |i: usize| Vec2::from_angle(i as f32 * FRAC_PI_3 + spin) * r;
    let outer = |i: usize| Vec2::from_angle(i as f32 * FRAC_PI_3 + spin) * (2.0 * r);
    let circle_r = r * 0.5;

    let mut d = sd_ring(p, circle_r, thickness);
    for i in 0..6 {
        let j = (i + 1) % 6;
        let k = (i + 2) % 6;
        d = op_union(d, sd_ring(p - inner(i), circle_r, thickness));
        d = op_union(d, sd_ring(p - outer(i), circle_r, thickness));
        // Hexagons
        d = op_union(d, sd_segment(p, inner(i), inner(j), thickness));
        d = op_union(d, sd_segment(p, outer(i), outer(j), thickness));
        // Hexagrams
        d = op_union(d, sd_segment(p, inner(i), inner(k), thickness));
        d = op_union(d, sd_segment(p, outer(i), outer(k), thickness));
        // Spokes
        d = op_union(d, sd_segment(p, Vec2::ZERO, outer(i), thickness));
    }
    d
}

/// Two overlapping circles through each other's centers, with the axis line
pub fn vesica_piscis(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let r = radius * 0.6;
    let offset = r * 0.5 * (1.0 + 0.08 * phase.sin());
    let mut d = sd_ring(p - Vec2::new(offset, 0.0), r, thickness);
    d = op_union(d, sd_ring(p + Vec2::new(offset, 0.0), r, thickness));
    let h = (r * r - offset * offset).max(0.0).sqrt();
    d = op_union(
        d,
        sd_segment(p, Vec2::new(0.0, -h), Vec2::new(0.0, h), thickness),
    );
    op_union(d, sd_ring(p, radius, thickness))
}

/// Two counter-rotating triangles inside a circle
pub fn merkaba(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let size = radius * 0.78;
    let up = rotate(p, phase * 0.3);
    let mut down = rotate(p, -phase * 0.3);
    down.y = -down.y;
    let mut d = op_outline(sd_triangle(up, size), thickness);
    d = op_union(d, op_outline(sd_triangle(down, size), thickness));
    op_union(d, sd_ring(p, radius, thickness))
}

/// Twelve rings arranged around the center, drawn with polar repetition
pub fn torus(p: Vec2, radius: f32, thickness: f32, phase: f32) -> f32 {
    let q = polar_repeat(rotate(p, phase * 0.1), 12);
    let r = radius * 0.5;
    let center = Vec2::new(r * (1.0 + 0.04 * phase.sin()), 0.0);
    let d = sd_ring(q - center, r, thickness);
    op_union(d, sd_circle(p, thickness * 1.5))
}

/// Full turn helper used by callers that animate `phase` continuously
pub fn wrap_phase(phase: f32) -> f32 {
    phase.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip_and_wrap() {
        for pattern in SacredPattern::ALL {
            assert_eq!(SacredPattern::from_index(pattern.index()), pattern);
        }
        assert_eq!(SacredPattern::from_index(SacredPattern::COUNT), SacredPattern::SeedOfLife);
        assert_eq!(SacredPattern::Torus.next(), SacredPattern::SeedOfLife);
    }

    #[test]
    fn names_parse() {
        assert_eq!("sri_yantra".parse::<SacredPattern>(), Ok(SacredPattern::SriYantra));
        assert!("pentagram".parse::<SacredPattern>().is_err());
    }

    #[test]
    fn every_pattern_draws_its_outer_boundary() {
        // All patterns except the tree include (or reach) a point on the enclosing circle
        for pattern in SacredPattern::ALL {
            let mut best = f32::MAX;
            for i in 0..64 {
                let angle = i as f32 * TAU / 64.0;
                let p = Vec2::from_angle(angle) * 60.0;
                best = best.min(evaluate_pattern(pattern, p, 60.0, 2.0, 0.0));
            }
            assert!(best < 1.0, "{pattern:?} never comes near its radius: {best}");
        }
    }

    #[test]
    fn patterns_are_empty_far_away() {
        for pattern in SacredPattern::ALL {
            let d = evaluate_pattern(pattern, Vec2::new(500.0, 500.0), 60.0, 2.0, 1.3);
            assert!(d > 100.0, "{pattern:?} leaks far outside: {d}");
        }
    }

    #[test]
    fn seed_of_life_center_ring() {
        // The central circle of radius R/2 passes through (R/2, 0)
        let d = seed_of_life(Vec2::new(30.0, 0.0), 60.0, 2.0, 0.0);
        assert!(d <= 0.0);
    }

    #[test]
    fn morph_endpoints_match_patterns() {
        let p = Vec2::new(12.0, -7.0);
        let a = evaluate_pattern(SacredPattern::SeedOfLife, p, 50.0, 1.5, 0.4);
        let b = evaluate_pattern(SacredPattern::Merkaba, p, 50.0, 1.5, 0.4);
        let m0 = morph_patterns(SacredPattern::SeedOfLife, SacredPattern::Merkaba, 0.0, p, 50.0, 1.5, 0.4);
        let m1 = morph_patterns(SacredPattern::SeedOfLife, SacredPattern::Merkaba, 1.0, p, 50.0, 1.5, 0.4);
        let mid = morph_patterns(SacredPattern::SeedOfLife, SacredPattern::Merkaba, 0.5, p, 50.0, 1.5, 0.4);
        assert_eq!(m0, a);
        assert_eq!(m1, b);
        assert!((mid - (a + b) * 0.5).abs() < 1e-4);
    }
}
