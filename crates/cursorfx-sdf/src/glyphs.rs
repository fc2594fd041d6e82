//! Procedural emoji glyphs, filled shapes centered on the origin

use crate::ops::{op_smooth_union, op_subtract, op_union, polar_repeat};
use crate::primitives::{sd_arc, sd_circle, sd_segment, sd_star};
use cursorfx_core::{Color, Vec2};
use serde::Serialize;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiGlyph {
    Heart,
    Star,
    Smiley,
    Sparkle,
    Flower,
}

impl EmojiGlyph {
    pub const ALL: [EmojiGlyph; 5] = [
        EmojiGlyph::Heart,
        EmojiGlyph::Star,
        EmojiGlyph::Smiley,
        EmojiGlyph::Sparkle,
        EmojiGlyph::Flower,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize) % Self::ALL.len()]
    }

    pub fn default_color(self) -> Color {
        match self {
            EmojiGlyph::Heart => Color::from_hex(0xff3b5c),
            EmojiGlyph::Star => Color::from_hex(0xffd23f),
            EmojiGlyph::Smiley => Color::from_hex(0xffcc33),
            EmojiGlyph::Sparkle => Color::from_hex(0x9be7ff),
            EmojiGlyph::Flower => Color::from_hex(0xff8ad8),
        }
    }
}

impl std::str::FromStr for EmojiGlyph {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heart" => Ok(EmojiGlyph::Heart),
            "star" => Ok(EmojiGlyph::Star),
            "smiley" => Ok(EmojiGlyph::Smiley),
            "sparkle" => Ok(EmojiGlyph::Sparkle),
            "flower" => Ok(EmojiGlyph::Flower),
            other => Err(format!("unknown glyph '{other}'")),
        }
    }
}

/// Filled distance to `glyph` scaled to fit a disc of radius `size`
pub fn evaluate_glyph(glyph: EmojiGlyph, p: Vec2, size: f32) -> f32 {
    let size = size.max(1e-3);
    match glyph {
        EmojiGlyph::Heart => heart(p, size),
        EmojiGlyph::Star => sd_star(p, size, 5, 2.6),
        EmojiGlyph::Smiley => smiley(p, size),
        EmojiGlyph::Sparkle => sd_star(p, size, 4, 2.0),
        EmojiGlyph::Flower => flower(p, size),
    }
}

/// Two lobes smoothly joined over a point, tip toward +y (screen down)
fn heart(p: Vec2, size: f32) -> f32 {
    let q = Vec2::new(p.x.abs(), p.y);
    let lobe = sd_circle(q - Vec2::new(size * 0.35, -size * 0.2), size * 0.5);
    let tip = sd_segment(
        q,
        Vec2::new(size * 0.35, -size * 0.05),
        Vec2::new(0.0, size * 0.75),
        size * 0.45,
    );
    op_smooth_union(lobe, tip, size * 0.15)
}

/// Face with the eyes and the mouth carved out
fn smiley(p: Vec2, size: f32) -> f32 {
    let face = sd_circle(p, size);
    let eye_l = sd_circle(p - Vec2::new(-size * 0.35, -size * 0.3), size * 0.13);
    let eye_r = sd_circle(p - Vec2::new(size * 0.35, -size * 0.3), size * 0.13);
    // Arcs open around +y, which is the lower half on screen
    let mouth = sd_arc(p - Vec2::new(0.0, -size * 0.1), size * 0.55, PI * 0.3, size * 0.1);
    op_subtract(op_subtract(op_subtract(face, eye_l), eye_r), mouth)
}

/// Five petals around a center disc
fn flower(p: Vec2, size: f32) -> f32 {
    let q = polar_repeat(p, 5);
    let petal = sd_circle(q - Vec2::new(size * 0.55, 0.0), size * 0.42);
    op_union(petal, sd_circle(p, size * 0.35))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_contain_their_center_region() {
        for glyph in [EmojiGlyph::Heart, EmojiGlyph::Star, EmojiGlyph::Sparkle, EmojiGlyph::Flower] {
            assert!(evaluate_glyph(glyph, Vec2::ZERO, 20.0) < 0.0, "{glyph:?}");
        }
        // The smiley's center is face, not a feature
        assert!(evaluate_glyph(EmojiGlyph::Smiley, Vec2::new(0.0, -5.0), 20.0) < 0.0);
    }

    #[test]
    fn glyphs_fit_their_size() {
        for glyph in EmojiGlyph::ALL {
            for i in 0..32 {
                let p = Vec2::from_angle(i as f32 * PI / 16.0) * 30.0;
                assert!(evaluate_glyph(glyph, p, 20.0) > 0.0, "{glyph:?} spills at {p:?}");
            }
        }
    }

    #[test]
    fn smiley_eyes_are_holes() {
        let eye = Vec2::new(-7.0, -6.0);
        assert!(evaluate_glyph(EmojiGlyph::Smiley, eye, 20.0) > 0.0);
    }

    #[test]
    fn index_and_names() {
        for glyph in EmojiGlyph::ALL {
            assert_eq!(EmojiGlyph::from_index(glyph.index()), glyph);
        }
        assert_eq!("flower".parse::<EmojiGlyph>(), Ok(EmojiGlyph::Flower));
    }
}
