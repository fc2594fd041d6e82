//! Sacred-geometry mandalas dropped along the cursor path

use super::{faded, scaled, settings_value, tint};
use crate::animation::{AnimationConfig, AppearAnimation, DisappearAnimation, Lifecycle};
use crate::curves::advance_phase;
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::Instance;
use crate::spawn::{DistanceSpawner, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::FrameInput;
use cursorfx_sdf::SacredPattern;
use serde::Serialize;

pub const HARD_MAX: usize = 64;

/// How each new mandala picks its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Always `MandalaConfig::pattern`
    Fixed,
    #[default]
    Random,
    /// Step through the patterns in order
    Cycle,
}

impl std::str::FromStr for PatternMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(PatternMode::Fixed),
            "random" => Ok(PatternMode::Random),
            "cycle" => Ok(PatternMode::Cycle),
            other => Err(format!("unknown pattern mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MandalaConfig {
    pub max_mandalas: usize,
    pub spawn_distance: f32,
    pub spawns_per_second: u32,
    pub pattern_mode: PatternMode,
    pub pattern: SacredPattern,
    pub radius_min: f32,
    pub radius_max: f32,
    pub thickness: f32,
    /// rad/s, sign picked at random per mandala
    pub rotation_speed: f32,
    /// Breathing rate in rad/s
    pub morph_speed: f32,
    /// Blend into the next pattern over the lifetime
    pub morph_enabled: bool,
    pub lifetime: f32,
    #[serde(serialize_with = "hex_color")]
    pub color: Color,
    pub color_jitter: f32,
    pub glow_intensity: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for MandalaConfig {
    fn default() -> Self {
        Self {
            max_mandalas: 12,
            spawn_distance: 150.0,
            spawns_per_second: 6,
            pattern_mode: PatternMode::Random,
            pattern: SacredPattern::FlowerOfLife,
            radius_min: 30.0,
            radius_max: 60.0,
            thickness: 1.5,
            rotation_speed: 0.5,
            morph_speed: 1.5,
            morph_enabled: false,
            lifetime: 2.5,
            color: Color::from_hex(0xffd27a),
            color_jitter: 0.05,
            glow_intensity: 1.2,
            animation: AnimationConfig {
                appear: AppearAnimation::ZoomIn,
                appear_duration: 0.4,
                disappear: DisappearAnimation::FadeOut,
                disappear_duration: 0.6,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MandalaShape {
    pub life: Lifecycle,
    pub position: Vec2,
    pub radius: f32,
    pub pattern: u32,
    pub target_pattern: u32,
    pub rotation: f32,
    pub spin: f32,
    pub morph_phase: f32,
    pub color: Color,
}

impl Instance for MandalaShape {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `MandalaInstance` in `mandala.wgsl`. 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MandalaGpu {
    pub pos_radius: [f32; 4], // xy = position, z = radius, w = lifetime
    pub color: [f32; 4],
    pub pattern: [f32; 4], // x = pattern, y = target, z = blend, w = thickness
    pub motion: [f32; 4],  // x = rotation, y = morph phase, z = glow, w = pop progress
}

pub struct Mandala {
    pub config: MandalaConfig,
    spawner: DistanceSpawner,
    budget: SpawnBudget,
    next_pattern: SacredPattern,
}

impl Default for Mandala {
    fn default() -> Self {
        Self::with_config(MandalaConfig::default())
    }
}

impl Mandala {
    pub fn with_config(config: MandalaConfig) -> Self {
        Self {
            spawner: DistanceSpawner::fixed(config.spawn_distance),
            budget: SpawnBudget::new(config.spawns_per_second, config.max_mandalas),
            next_pattern: config.pattern,
            config,
        }
    }

    fn pick_pattern(&mut self, ctx: &mut SpawnContext<'_, MandalaShape>) -> SacredPattern {
        match self.config.pattern_mode {
            PatternMode::Fixed => self.config.pattern,
            PatternMode::Random => {
                SacredPattern::from_index(ctx.rng.index(SacredPattern::ALL.len()) as u32)
            }
            PatternMode::Cycle => {
                let pattern = self.next_pattern;
                self.next_pattern = pattern.next();
                pattern
            }
        }
    }
}

impl EffectKind for Mandala {
    type Instance = MandalaShape;
    type Gpu = MandalaGpu;

    const NAME: &'static str = "mandala";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_mandalas", &mut c.max_mandalas, 1, HARD_MAX);
        r.f32_clamped("spawn_distance", &mut c.spawn_distance, 1.0, 5000.0);
        r.u32("spawns_per_second", &mut c.spawns_per_second);
        r.parse("pattern_mode", &mut c.pattern_mode);
        r.parse("pattern", &mut c.pattern);
        r.f32_clamped("radius_min", &mut c.radius_min, 4.0, 500.0);
        r.f32_clamped("radius_max", &mut c.radius_max, 4.0, 500.0);
        r.f32_clamped("thickness", &mut c.thickness, 0.25, 20.0);
        r.f32("rotation_speed", &mut c.rotation_speed);
        r.f32("morph_speed", &mut c.morph_speed);
        r.bool("morph_enabled", &mut c.morph_enabled);
        r.f32_clamped("lifetime", &mut c.lifetime, 0.05, 30.0);
        r.color("color", &mut c.color);
        r.f32_clamped("color_jitter", &mut c.color_jitter, 0.0, 1.0);
        r.f32_clamped("glow_intensity", &mut c.glow_intensity, 0.0, 10.0);
        c.animation.apply_settings(&r);

        c.radius_max = c.radius_max.max(c.radius_min);
        self.spawner = DistanceSpawner::fixed(c.spawn_distance);
        self.budget = SpawnBudget::new(c.spawns_per_second, c.max_mandalas);
        self.next_pattern = c.pattern;
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, MandalaShape>) {
        self.budget.tick(input.delta_time);
        let requested = self
            .spawner
            .update(input.distance_moved(), input.delta_time, ctx.rng);
        let granted = self.budget.claim(requested, ctx.live_count());

        for _ in 0..granted {
            let pattern = self.pick_pattern(ctx);
            let c = &self.config;
            let rng = &mut *ctx.rng;
            let spin = if rng.chance(0.5) {
                c.rotation_speed
            } else {
                -c.rotation_speed
            };
            let shape = MandalaShape {
                life: Lifecycle::new(c.lifetime, &c.animation),
                position: input.cursor,
                radius: rng.range(c.radius_min, c.radius_max),
                pattern: pattern.index(),
                target_pattern: pattern.next().index(),
                rotation: rng.angle(),
                spin,
                morph_phase: rng.angle(),
                color: tint(rng, c.color, c.color_jitter),
            };
            ctx.emit(shape);
        }
    }

    fn integrate(&self, shape: &mut MandalaShape, input: &FrameInput) {
        let dt = input.delta_time;
        shape.rotation = advance_phase(shape.rotation, shape.spin, dt);
        shape.morph_phase = advance_phase(shape.morph_phase, self.config.morph_speed, dt);
    }

    fn pack(&self, m: &MandalaShape) -> MandalaGpu {
        let blend = if self.config.morph_enabled {
            m.life.age_ratio()
        } else {
            0.0
        };
        MandalaGpu {
            pos_radius: [m.position.x, m.position.y, scaled(m.radius, &m.life), m.life.lifetime],
            color: faded(m.color, &m.life),
            pattern: [
                m.pattern as f32,
                m.target_pattern as f32,
                blend,
                self.config.thickness,
            ],
            motion: [
                m.rotation,
                m.morph_phase,
                self.config.glow_intensity,
                m.life.anim.pop_progress,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    fn step_right(from: f32, to: f32) -> FrameInput {
        FrameInput {
            cursor: Vec2::new(to, 100.0),
            previous_cursor: Vec2::new(from, 100.0),
            delta_time: 1.0 / 60.0,
            ..Default::default()
        }
    }

    #[test]
    fn mandala_record_layout() {
        assert_eq!(std::mem::size_of::<MandalaGpu>(), 64);
    }

    #[test]
    fn cycle_mode_steps_through_patterns() {
        let config = MandalaConfig {
            pattern_mode: PatternMode::Cycle,
            pattern: SacredPattern::SeedOfLife,
            spawn_distance: 10.0,
            ..Default::default()
        };
        let mut effect = Effect::new(Mandala::with_config(config), 1);
        for i in 0..3 {
            let x = i as f32 * 10.0;
            effect.update(&step_right(x, x + 10.0));
        }
        let patterns: Vec<u32> = (0..3)
            .filter_map(|slot| effect.pool().get(slot).map(|m| m.pattern))
            .collect();
        assert_eq!(patterns, vec![0, 1, 2]);
    }

    #[test]
    fn fixed_mode_uses_the_configured_pattern() {
        let config = MandalaConfig {
            pattern_mode: PatternMode::Fixed,
            pattern: SacredPattern::Merkaba,
            spawn_distance: 5.0,
            ..Default::default()
        };
        let mut effect = Effect::new(Mandala::with_config(config), 2);
        effect.update(&step_right(0.0, 20.0));
        assert!(effect.live_count() > 0);
        effect
            .pool()
            .for_each_live(|_, m| assert_eq!(m.pattern, SacredPattern::Merkaba.index()));
    }

    #[test]
    fn morph_blend_follows_age() {
        let config = MandalaConfig {
            morph_enabled: true,
            lifetime: 1.0,
            animation: AnimationConfig::instant(),
            ..Default::default()
        };
        let mut effect = Effect::new(Mandala::with_config(config.clone()), 3);
        effect.insert(MandalaShape {
            life: Lifecycle::new(1.0, &config.animation),
            radius: 40.0,
            ..Default::default()
        });
        for _ in 0..30 {
            effect.update(&FrameInput::at(Vec2::ZERO, 1.0 / 60.0));
        }
        effect.pack();
        let blend = effect.upload().records()[0].pattern[2];
        assert!((blend - 0.5).abs() < 0.02, "{blend}");
    }

    #[test]
    fn active_cap_is_respected() {
        let config = MandalaConfig {
            max_mandalas: 3,
            spawn_distance: 1.0,
            spawns_per_second: 0,
            ..Default::default()
        };
        let mut effect = Effect::new(Mandala::with_config(config), 4);
        effect.update(&step_right(0.0, 500.0));
        assert_eq!(effect.live_count(), 3);
    }
}
