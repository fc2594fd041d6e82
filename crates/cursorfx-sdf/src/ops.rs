//! Distance combinators and coordinate transforms

use cursorfx_core::Vec2;
use std::f32::consts::TAU;

pub fn op_union(d1: f32, d2: f32) -> f32 {
    d1.min(d2)
}

/// `d1` with `d2` carved out of it
pub fn op_subtract(d1: f32, d2: f32) -> f32 {
    d1.max(-d2)
}

pub fn op_intersect(d1: f32, d2: f32) -> f32 {
    d1.max(d2)
}

/// Polynomial smooth minimum with blend radius `k`; `k <= 0` is a hard union
pub fn op_smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return op_union(d1, d2);
    }
    let h = (0.5 + 0.5 * (d2 - d1) / k).clamp(0.0, 1.0);
    d2 + (d1 - d2) * h - k * h * (1.0 - h)
}

/// Turn a filled shape into an outline of total width `thickness`
pub fn op_outline(d: f32, thickness: f32) -> f32 {
    d.abs() - thickness * 0.5
}

/// Linear blend of two distances (not distance preserving)
pub fn op_mix(d1: f32, d2: f32, t: f32) -> f32 {
    d1 + (d2 - d1) * t.clamp(0.0, 1.0)
}

/// Express `p` in the frame of a shape rotated by `angle`
pub fn rotate(p: Vec2, angle: f32) -> Vec2 {
    p.rotated(-angle)
}

/// Fold `p` into the first of `n` equal angular sectors centered on +x
pub fn polar_repeat(p: Vec2, n: u32) -> Vec2 {
    let n = n.max(1) as f32;
    let sector = TAU / n;
    let a = p.y.atan2(p.x) + sector * 0.5;
    let folded = a.rem_euclid(sector) - sector * 0.5;
    Vec2::from_angle(folded) * p.length()
}

/// Index of the sector `p` falls in, matching `polar_repeat`
pub fn polar_sector(p: Vec2, n: u32) -> u32 {
    let n = n.max(1);
    let sector = TAU / n as f32;
    let a = (p.y.atan2(p.x) + sector * 0.5).rem_euclid(TAU);
    ((a / sector).floor() as u32).min(n - 1)
}
