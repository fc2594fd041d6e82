//! Signed distance primitives. Negative inside, positive outside.
//!
//! Circle, ring, segment and arc are exact distances; polygon and star are
//! approximations that are only correct near the boundary.

use crate::sign;
use cursorfx_core::Vec2;
use std::f32::consts::{PI, TAU};

/// Filled disc of radius `r`
pub fn sd_circle(p: Vec2, r: f32) -> f32 {
    p.length() - r
}

/// Circle outline of radius `r` and total line width `thickness`
pub fn sd_ring(p: Vec2, r: f32, thickness: f32) -> f32 {
    (p.length() - r).abs() - thickness * 0.5
}

/// Line segment from `a` to `b` with total width `thickness` (round caps)
pub fn sd_segment(p: Vec2, a: Vec2, b: Vec2, thickness: f32) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let len_sq = ba.length_squared();
    let h = if len_sq > 0.0 {
        (pa.dot(&ba) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (pa - ba * h).length() - thickness * 0.5
}

/// Arc of radius `r` symmetric around +y, spanning `half_angle` either side,
/// with total width `thickness`
pub fn sd_arc(p: Vec2, r: f32, half_angle: f32, thickness: f32) -> f32 {
    let (s, c) = half_angle.clamp(0.0, PI).sin_cos();
    let q = Vec2::new(p.x.abs(), p.y);
    let d = if c * q.x > s * q.y {
        (q - Vec2::new(s, c) * r).length()
    } else {
        (q.length() - r).abs()
    };
    d - thickness * 0.5
}

/// Regular `n`-gon with circumradius `r`, one vertex pointing toward +y
pub fn sd_polygon(p: Vec2, r: f32, n: u32) -> f32 {
    let n = n.max(3) as f32;
    let sector = TAU / n;
    let a = p.x.atan2(p.y);
    // Normal direction of the nearest edge
    let edge = ((a - sector * 0.5) / sector).round() * sector + sector * 0.5;
    (a - edge).cos() * p.length() - r * (sector * 0.5).cos()
}

/// Star with `n` points, outer radius `r`; `m` in `[2, n]` controls how sharp
/// the points are (2 = sharpest, n = regular polygon)
pub fn sd_star(p: Vec2, r: f32, n: u32, m: f32) -> f32 {
    let n = n.max(2) as f32;
    let m = m.clamp(2.0, n);
    let an = PI / n;
    let en = PI / m;
    let acs = Vec2::new(an.cos(), an.sin());
    let ecs = Vec2::new(en.cos(), en.sin());

    let bn = p.x.atan2(p.y).rem_euclid(2.0 * an) - an;
    let mut q = Vec2::new(bn.cos(), bn.sin().abs()) * p.length();
    q -= acs * r;
    let limit = if ecs.y.abs() > 1e-6 { r * acs.y / ecs.y } else { 0.0 };
    q += ecs * (-q.dot(&ecs)).clamp(0.0, limit.max(0.0));
    q.length() * sign(q.x)
}

/// Regular hexagon with apothem `r` (flat top and bottom)
pub fn sd_hexagon(p: Vec2, r: f32) -> f32 {
    const K: [f32; 3] = [-0.866_025_4, 0.5, 0.577_350_26];
    let kxy = Vec2::new(K[0], K[1]);
    let mut q = p.abs();
    q -= kxy * (2.0 * kxy.dot(&q).min(0.0));
    q -= Vec2::new(q.x.clamp(-K[2] * r, K[2] * r), r);
    q.length() * sign(q.y)
}

/// Equilateral triangle with half side length `r`, apex toward -y (screen up)
pub fn sd_triangle(p: Vec2, r: f32) -> f32 {
    let k = 3.0_f32.sqrt();
    // Flip y so the apex points up on a y-down screen
    let mut q = Vec2::new(p.x.abs() - r, -p.y + r / k);
    if q.x + k * q.y > 0.0 {
        q = Vec2::new(q.x - k * q.y, -k * q.x - q.y) * 0.5;
    }
    q.x -= q.x.clamp(-2.0 * r, 0.0);
    -q.length() * sign(q.y)
}
