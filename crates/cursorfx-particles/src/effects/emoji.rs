//! Procedural emoji tossed up from the cursor that fall back under gravity

use super::{faded, scaled, settings_value, tint};
use crate::animation::{AnimationConfig, AppearAnimation, DisappearAnimation, Lifecycle};
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::{Instance, InstancePool};
use crate::spawn::{DistanceSpawner, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::FrameInput;
use cursorfx_sdf::EmojiGlyph;
use serde::Serialize;

pub const HARD_MAX: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphMode {
    #[default]
    Random,
    Fixed,
}

impl std::str::FromStr for GlyphMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(GlyphMode::Random),
            "fixed" => Ok(GlyphMode::Fixed),
            other => Err(format!("unknown glyph mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmojiConfig {
    pub max_emojis: usize,
    pub spawn_distance: f32,
    pub spawns_per_second: u32,
    pub glyph_mode: GlyphMode,
    pub glyph: EmojiGlyph,
    /// Upward launch speed range in px/s
    pub launch_speed_min: f32,
    pub launch_speed_max: f32,
    /// Maximum sideways launch speed in px/s
    pub horizontal_jitter: f32,
    /// px/s²
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Maximum spin in rad/s, either direction
    pub spin_speed: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub lifetime: f32,
    /// Each glyph keeps its own palette instead of `color`
    pub use_glyph_colors: bool,
    #[serde(serialize_with = "hex_color")]
    pub color: Color,
    pub color_jitter: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            max_emojis: 150,
            spawn_distance: 40.0,
            spawns_per_second: 30,
            glyph_mode: GlyphMode::Random,
            glyph: EmojiGlyph::Heart,
            launch_speed_min: 150.0,
            launch_speed_max: 300.0,
            horizontal_jitter: 80.0,
            gravity: 600.0,
            terminal_velocity: 500.0,
            spin_speed: 3.0,
            size_min: 14.0,
            size_max: 26.0,
            lifetime: 3.0,
            use_glyph_colors: true,
            color: Color::from_hex(0xffffff),
            color_jitter: 0.05,
            animation: AnimationConfig {
                appear: AppearAnimation::ZoomIn,
                appear_duration: 0.15,
                disappear: DisappearAnimation::FadeOut,
                disappear_duration: 0.4,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Emoji {
    pub life: Lifecycle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub size: f32,
    pub glyph: u32,
    pub color: Color,
}

impl Instance for Emoji {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `EmojiInstance` in `emoji.wgsl`. 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct EmojiGpu {
    pub pos_size: [f32; 4], // xy = position, z = size, w = lifetime
    pub color: [f32; 4],
    pub params: [f32; 4], // x = rotation, y = glyph, z = pop progress, w = age ratio
}

pub struct EmojiRain {
    pub config: EmojiConfig,
    spawner: DistanceSpawner,
    budget: SpawnBudget,
}

impl Default for EmojiRain {
    fn default() -> Self {
        Self::with_config(EmojiConfig::default())
    }
}

impl EmojiRain {
    pub fn with_config(config: EmojiConfig) -> Self {
        Self {
            spawner: DistanceSpawner::fixed(config.spawn_distance),
            budget: SpawnBudget::new(config.spawns_per_second, config.max_emojis),
            config,
        }
    }
}

impl EffectKind for EmojiRain {
    type Instance = Emoji;
    type Gpu = EmojiGpu;

    const NAME: &'static str = "emoji_rain";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_emojis", &mut c.max_emojis, 1, HARD_MAX);
        r.f32_clamped("spawn_distance", &mut c.spawn_distance, 1.0, 5000.0);
        r.u32("spawns_per_second", &mut c.spawns_per_second);
        r.parse("glyph_mode", &mut c.glyph_mode);
        r.parse("glyph", &mut c.glyph);
        r.f32_clamped("launch_speed_min", &mut c.launch_speed_min, 0.0, 3000.0);
        r.f32_clamped("launch_speed_max", &mut c.launch_speed_max, 0.0, 3000.0);
        r.f32_clamped("horizontal_jitter", &mut c.horizontal_jitter, 0.0, 3000.0);
        r.f32_clamped("gravity", &mut c.gravity, 0.0, 10_000.0);
        r.f32_clamped("terminal_velocity", &mut c.terminal_velocity, 1.0, 10_000.0);
        r.f32_clamped("spin_speed", &mut c.spin_speed, 0.0, 50.0);
        r.f32_clamped("size_min", &mut c.size_min, 2.0, 200.0);
        r.f32_clamped("size_max", &mut c.size_max, 2.0, 200.0);
        r.f32_clamped("lifetime", &mut c.lifetime, 0.05, 30.0);
        r.bool("use_glyph_colors", &mut c.use_glyph_colors);
        r.color("color", &mut c.color);
        r.f32_clamped("color_jitter", &mut c.color_jitter, 0.0, 1.0);
        c.animation.apply_settings(&r);

        c.launch_speed_max = c.launch_speed_max.max(c.launch_speed_min);
        c.size_max = c.size_max.max(c.size_min);
        self.spawner = DistanceSpawner::fixed(c.spawn_distance);
        self.budget = SpawnBudget::new(c.spawns_per_second, c.max_emojis);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, Emoji>) {
        self.budget.tick(input.delta_time);
        let requested = self
            .spawner
            .update(input.distance_moved(), input.delta_time, ctx.rng);
        let granted = self.budget.claim(requested, ctx.live_count());

        let c = &self.config;
        for _ in 0..granted {
            let rng = &mut *ctx.rng;
            let glyph = match c.glyph_mode {
                GlyphMode::Fixed => c.glyph,
                GlyphMode::Random => EmojiGlyph::from_index(rng.index(EmojiGlyph::ALL.len()) as u32),
            };
            let base = if c.use_glyph_colors {
                glyph.default_color()
            } else {
                c.color
            };
            let emoji = Emoji {
                life: Lifecycle::new(c.lifetime, &c.animation),
                position: input.cursor,
                velocity: Vec2::new(
                    rng.range(-c.horizontal_jitter, c.horizontal_jitter),
                    -rng.range(c.launch_speed_min, c.launch_speed_max),
                ),
                rotation: rng.angle(),
                spin: rng.range(-c.spin_speed, c.spin_speed),
                size: rng.range(c.size_min, c.size_max),
                glyph: glyph.index(),
                color: tint(rng, base, c.color_jitter),
            };
            ctx.emit(emoji);
        }
    }

    fn integrate(&self, emoji: &mut Emoji, input: &FrameInput) {
        let dt = input.delta_time;
        emoji.velocity.y = (emoji.velocity.y + self.config.gravity * dt)
            .min(self.config.terminal_velocity);
        emoji.position += emoji.velocity * dt;
        emoji.rotation += emoji.spin * dt;
    }

    /// Emojis that fell off the bottom edge are done
    fn resolve(&mut self, pool: &mut InstancePool<Emoji>, input: &FrameInput) {
        let floor = input.screen_size.y;
        for emoji in pool.iter_live_mut() {
            if emoji.position.y - emoji.size > floor {
                emoji.life.kill();
            }
        }
    }

    fn pack(&self, e: &Emoji) -> EmojiGpu {
        EmojiGpu {
            pos_size: [e.position.x, e.position.y, scaled(e.size, &e.life), e.life.lifetime],
            color: faded(e.color, &e.life),
            params: [
                e.rotation,
                e.glyph as f32,
                e.life.anim.pop_progress,
                e.life.age_ratio(),
            ],
        }
    }
}
