//! Glowing dots laid along the cursor path that shrink and fade with age

use super::{faded, scaled, settings_value};
use crate::animation::{AnimationConfig, Lifecycle};
use crate::curves::{lerp_color, lerp_f32};
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::Instance;
use crate::spawn::{RateSpawner, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::FrameInput;
use serde::Serialize;

pub const HARD_MAX: usize = 512;

#[derive(Debug, Clone, Serialize)]
pub struct TrailConfig {
    pub max_points: usize,
    /// Points per second while the cursor moves
    pub spawn_rate: f32,
    pub lifetime: f32,
    pub size_start: f32,
    pub size_end: f32,
    #[serde(serialize_with = "hex_color")]
    pub color_start: Color,
    #[serde(serialize_with = "hex_color")]
    pub color_end: Color,
    pub glow_intensity: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_points: 400,
            spawn_rate: 90.0,
            lifetime: 0.6,
            size_start: 10.0,
            size_end: 1.5,
            color_start: Color::from_hex(0x7af0ff),
            color_end: Color::from_hex(0x6a3cff).with_alpha(0.0),
            glow_intensity: 1.0,
            animation: AnimationConfig::instant(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrailPoint {
    pub life: Lifecycle,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
}

impl Instance for TrailPoint {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `TrailInstance` in `trail.wgsl`. 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TrailGpu {
    pub pos_size: [f32; 4], // xy = position, z = size, w = lifetime
    pub color: [f32; 4],
    pub params: [f32; 4], // x = glow intensity, y = age ratio, z = pop progress
}

pub struct Trail {
    pub config: TrailConfig,
    spawner: RateSpawner,
    budget: SpawnBudget,
}

impl Default for Trail {
    fn default() -> Self {
        Self::with_config(TrailConfig::default())
    }
}

impl Trail {
    pub fn with_config(config: TrailConfig) -> Self {
        Self {
            spawner: RateSpawner::new(config.spawn_rate),
            budget: SpawnBudget::unlimited(config.max_points),
            config,
        }
    }
}

impl EffectKind for Trail {
    type Instance = TrailPoint;
    type Gpu = TrailGpu;

    const NAME: &'static str = "trail";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_points", &mut c.max_points, 1, HARD_MAX);
        r.f32_clamped("spawn_rate", &mut c.spawn_rate, 0.0, 2000.0);
        r.f32_clamped("lifetime", &mut c.lifetime, 0.01, 30.0);
        r.f32_clamped("size_start", &mut c.size_start, 0.0, 200.0);
        r.f32_clamped("size_end", &mut c.size_end, 0.0, 200.0);
        r.color("color_start", &mut c.color_start);
        r.color("color_end", &mut c.color_end);
        r.f32_clamped("glow_intensity", &mut c.glow_intensity, 0.0, 10.0);
        c.animation.apply_settings(&r);

        self.spawner.rate = c.spawn_rate;
        self.budget = SpawnBudget::unlimited(c.max_points);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, TrailPoint>) {
        let requested = self.spawner.update(input.distance_moved(), input.delta_time);
        let granted = self.budget.claim(requested, ctx.live_count());
        for i in 0..granted {
            // Spread this tick's points along the segment the cursor covered
            let t = (i + 1) as f32 / granted as f32;
            ctx.emit(TrailPoint {
                life: Lifecycle::new(self.config.lifetime, &self.config.animation),
                position: input.previous_cursor.lerp(&input.cursor, t),
                size: self.config.size_start,
                color: self.config.color_start,
            });
        }
    }

    fn integrate(&self, point: &mut TrailPoint, _input: &FrameInput) {
        let t = point.life.age_ratio();
        point.size = lerp_f32(self.config.size_start, self.config.size_end, t);
        point.color = lerp_color(self.config.color_start, self.config.color_end, t);
    }

    fn pack(&self, p: &TrailPoint) -> TrailGpu {
        TrailGpu {
            pos_size: [p.position.x, p.position.y, scaled(p.size, &p.life), p.life.lifetime],
            color: faded(p.color, &p.life),
            params: [
                self.config.glow_intensity,
                p.life.age_ratio(),
                p.life.anim.pop_progress,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    fn moving(x: f32, dt: f32) -> FrameInput {
        FrameInput {
            cursor: Vec2::new(x + 1.0, 0.0),
            previous_cursor: Vec2::new(x, 0.0),
            delta_time: dt,
            ..Default::default()
        }
    }

    #[test]
    fn trail_record_layout() {
        assert_eq!(std::mem::size_of::<TrailGpu>(), 48);
    }

    #[test]
    fn spawn_rate_matches_configuration_over_many_ticks() {
        let config = TrailConfig {
            spawn_rate: 10.0,
            ..Default::default()
        };
        let mut effect = Effect::new(Trail::with_config(config), 1);
        for tick in 0..10_000 {
            effect.update(&moving(tick as f32, 1.0 / 60.0));
        }
        let total = effect.spawned_total();
        assert!((1666..=1667).contains(&total), "{total}");
    }

    #[test]
    fn stationary_cursor_spawns_nothing() {
        let mut effect = Effect::new(Trail::default(), 2);
        for _ in 0..120 {
            effect.update(&FrameInput::at(Vec2::new(5.0, 5.0), 1.0 / 60.0));
        }
        assert_eq!(effect.spawned_total(), 0);
    }

    #[test]
    fn points_lie_on_the_cursor_segment() {
        let mut effect = Effect::new(Trail::default(), 3);
        let input = FrameInput {
            cursor: Vec2::new(100.0, 0.0),
            previous_cursor: Vec2::ZERO,
            delta_time: 0.05,
            ..Default::default()
        };
        effect.update(&input);
        assert!(effect.live_count() > 1);
        effect.pool().for_each_live(|_, p| {
            assert!(p.position.y.abs() < 1e-6);
            assert!(p.position.x > 0.0 && p.position.x <= 100.0);
        });
    }

    #[test]
    fn points_shrink_with_age() {
        let mut effect = Effect::new(Trail::default(), 4);
        effect.update(&moving(0.0, 1.0 / 60.0));
        effect.update(&moving(0.0, 1.0 / 60.0));
        let first = effect.pool().get(0).map(|p| p.size).unwrap_or_default();
        for _ in 0..10 {
            effect.update(&FrameInput::at(Vec2::ZERO, 1.0 / 60.0));
        }
        let later = effect.pool().get(0).map(|p| p.size).unwrap_or_default();
        assert!(later < first);
    }
}
