//! Branching lightning bolts: a burst on click, single bolts along movement

use super::{faded, scaled, settings_value, tint};
use crate::animation::{AnimationConfig, AppearAnimation, DisappearAnimation, Lifecycle};
use crate::curves::advance_phase;
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::Instance;
use crate::spawn::{
    ButtonEdges, DirectionKind, DirectionMode, DistanceSpawner, SpawnBudget, SpawnTrigger,
};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::{FrameInput, MouseButton};
use cursorfx_sdf::shapes::{MAX_BOLT_BRANCHES, MAX_BOLT_SEGMENTS};
use serde::Serialize;

pub const HARD_MAX: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct LightningConfig {
    pub max_bolts: usize,
    /// 0 means unlimited
    pub bolts_per_second: u32,
    pub click_burst: bool,
    pub burst_button: MouseButton,
    pub burst_count: u32,
    pub movement_bolts: bool,
    pub spawn_distance: f32,
    pub direction_mode: DirectionKind,
    /// Degrees, for the spread mode
    pub direction_angle: f32,
    /// Full arc in degrees
    pub direction_spread: f32,
    pub length_min: f32,
    pub length_max: f32,
    pub segments: u32,
    pub jaggedness: f32,
    pub branches: u32,
    pub thickness: f32,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    /// Flicker rate in rad/s
    pub flicker_speed: f32,
    /// Bolt origins move with the cursor
    pub follow_cursor: bool,
    #[serde(serialize_with = "hex_color")]
    pub color: Color,
    pub color_jitter: f32,
    pub glow_intensity: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            max_bolts: 48,
            bolts_per_second: 60,
            click_burst: true,
            burst_button: MouseButton::Left,
            burst_count: 8,
            movement_bolts: true,
            spawn_distance: 90.0,
            direction_mode: DirectionKind::Velocity,
            direction_angle: -90.0,
            direction_spread: 60.0,
            length_min: 60.0,
            length_max: 160.0,
            segments: 8,
            jaggedness: 0.7,
            branches: 2,
            thickness: 2.0,
            lifetime_min: 0.25,
            lifetime_max: 0.5,
            flicker_speed: 40.0,
            follow_cursor: false,
            color: Color::from_hex(0xb48cff),
            color_jitter: 0.05,
            glow_intensity: 1.4,
            animation: AnimationConfig {
                appear: AppearAnimation::None,
                disappear: DisappearAnimation::FadeOut,
                disappear_duration: 0.15,
                ..Default::default()
            },
        }
    }
}

impl LightningConfig {
    pub fn direction(&self) -> DirectionMode {
        DirectionMode::from_settings(
            self.direction_mode,
            self.direction_angle,
            self.direction_spread,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bolt {
    pub life: Lifecycle,
    pub origin: Vec2,
    /// Origin relative to the cursor at spawn, for `follow_cursor`
    pub cursor_offset: Vec2,
    pub angle: f32,
    pub length: f32,
    pub segments: u32,
    pub jaggedness: f32,
    pub seed: f32,
    pub thickness: f32,
    pub branches: u32,
    pub color: Color,
    pub flicker_phase: f32,
}

impl Instance for Bolt {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `BoltInstance` in `lightning.wgsl`. 80 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BoltGpu {
    pub origin_angle: [f32; 4], // xy = origin, z = angle, w = length
    pub color: [f32; 4],
    pub shape: [f32; 4],  // x = segments, y = jaggedness, z = seed, w = thickness
    pub motion: [f32; 4], // x = branches, y = flicker phase, z = glow, w = lifetime
    pub anim: [f32; 4],   // x = pop progress, y = age ratio
}

pub struct Lightning {
    pub config: LightningConfig,
    spawner: DistanceSpawner,
    budget: SpawnBudget,
    edges: ButtonEdges,
}

impl Default for Lightning {
    fn default() -> Self {
        Self::with_config(LightningConfig::default())
    }
}

impl Lightning {
    pub fn with_config(config: LightningConfig) -> Self {
        Self {
            spawner: DistanceSpawner::fixed(config.spawn_distance),
            budget: SpawnBudget::new(config.bolts_per_second, config.max_bolts),
            edges: ButtonEdges::default(),
            config,
        }
    }

    fn make_bolt(&self, ctx: &mut SpawnContext<'_, Bolt>, input: &FrameInput, trigger: SpawnTrigger) -> Bolt {
        let c = &self.config;
        let rng = &mut *ctx.rng;
        let angle = c.direction().sample(rng, input.velocity, trigger);
        Bolt {
            life: Lifecycle::new(rng.range(c.lifetime_min, c.lifetime_max), &c.animation),
            origin: input.cursor,
            cursor_offset: Vec2::ZERO,
            angle,
            length: rng.range(c.length_min, c.length_max),
            segments: c.segments,
            jaggedness: c.jaggedness,
            seed: rng.range(0.0, 1000.0),
            thickness: rng.jitter(c.thickness, 0.2),
            branches: c.branches,
            color: tint(rng, c.color, c.color_jitter),
            flicker_phase: rng.angle(),
        }
    }
}

impl EffectKind for Lightning {
    type Instance = Bolt;
    type Gpu = BoltGpu;

    const NAME: &'static str = "lightning";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_bolts", &mut c.max_bolts, 1, HARD_MAX);
        r.u32("bolts_per_second", &mut c.bolts_per_second);
        r.bool("click_burst", &mut c.click_burst);
        r.parse("burst_button", &mut c.burst_button);
        r.u32("burst_count", &mut c.burst_count);
        r.bool("movement_bolts", &mut c.movement_bolts);
        r.f32_clamped("spawn_distance", &mut c.spawn_distance, 1.0, 5000.0);
        r.parse("direction_mode", &mut c.direction_mode);
        r.f32("direction_angle", &mut c.direction_angle);
        r.f32_clamped("direction_spread", &mut c.direction_spread, 0.0, 360.0);
        r.f32_clamped("length_min", &mut c.length_min, 1.0, 2000.0);
        r.f32_clamped("length_max", &mut c.length_max, 1.0, 2000.0);
        r.u32("segments", &mut c.segments);
        r.f32_clamped("jaggedness", &mut c.jaggedness, 0.0, 2.0);
        r.u32("branches", &mut c.branches);
        r.f32_clamped("thickness", &mut c.thickness, 0.1, 20.0);
        r.f32_clamped("lifetime_min", &mut c.lifetime_min, 0.02, 10.0);
        r.f32_clamped("lifetime_max", &mut c.lifetime_max, 0.02, 10.0);
        r.f32("flicker_speed", &mut c.flicker_speed);
        r.bool("follow_cursor", &mut c.follow_cursor);
        r.color("color", &mut c.color);
        r.f32_clamped("color_jitter", &mut c.color_jitter, 0.0, 1.0);
        r.f32_clamped("glow_intensity", &mut c.glow_intensity, 0.0, 10.0);
        c.animation.apply_settings(&r);

        c.segments = c.segments.clamp(1, MAX_BOLT_SEGMENTS);
        c.branches = c.branches.min(MAX_BOLT_BRANCHES);
        c.length_max = c.length_max.max(c.length_min);
        c.lifetime_max = c.lifetime_max.max(c.lifetime_min);
        self.spawner = DistanceSpawner::fixed(c.spawn_distance);
        self.budget = SpawnBudget::new(c.bolts_per_second, c.max_bolts);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, Bolt>) {
        self.budget.tick(input.delta_time);
        self.edges.update(&input.buttons);

        if self.config.click_burst && self.edges.just_pressed(self.config.burst_button) {
            let granted = self.budget.claim(self.config.burst_count, ctx.live_count());
            for _ in 0..granted {
                let bolt = self.make_bolt(ctx, input, SpawnTrigger::Click);
                ctx.emit(bolt);
            }
        }

        if self.config.movement_bolts {
            let requested = self
                .spawner
                .update(input.distance_moved(), input.delta_time, ctx.rng);
            let granted = self.budget.claim(requested, ctx.live_count());
            for _ in 0..granted {
                let bolt = self.make_bolt(ctx, input, SpawnTrigger::Movement);
                ctx.emit(bolt);
            }
        }
    }

    fn integrate(&self, bolt: &mut Bolt, input: &FrameInput) {
        bolt.flicker_phase =
            advance_phase(bolt.flicker_phase, self.config.flicker_speed, input.delta_time);
        if self.config.follow_cursor {
            bolt.origin = input.cursor + bolt.cursor_offset;
        }
    }

    fn pack(&self, b: &Bolt) -> BoltGpu {
        BoltGpu {
            origin_angle: [b.origin.x, b.origin.y, b.angle, scaled(b.length, &b.life)],
            color: faded(b.color, &b.life),
            shape: [b.segments as f32, b.jaggedness, b.seed, b.thickness],
            motion: [
                b.branches as f32,
                b.flicker_phase,
                self.config.glow_intensity,
                b.life.lifetime,
            ],
            anim: [b.life.anim.pop_progress, b.life.age_ratio(), 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    fn click() -> FrameInput {
        let mut input = FrameInput::at(Vec2::new(300.0, 300.0), 1.0 / 60.0);
        input.buttons.set(MouseButton::Left, true);
        input
    }

    #[test]
    fn bolt_record_layout() {
        assert_eq!(std::mem::size_of::<BoltGpu>(), 80);
    }

    #[test]
    fn burst_is_clamped_by_active_cap() {
        let config = LightningConfig {
            max_bolts: 16,
            bolts_per_second: 1000,
            burst_count: 100,
            ..Default::default()
        };
        let animation = config.animation.clone();
        let mut effect = Effect::new(Lightning::with_config(config), 1);
        for _ in 0..10 {
            effect.insert(Bolt {
                life: Lifecycle::new(5.0, &animation),
                length: 50.0,
                ..Default::default()
            });
        }
        assert_eq!(effect.live_count(), 10);

        effect.update(&click());
        assert_eq!(effect.live_count(), 16);
        assert_eq!(effect.spawned_total(), 16);
    }

    #[test]
    fn burst_is_clamped_by_second_budget() {
        let config = LightningConfig {
            bolts_per_second: 5,
            burst_count: 8,
            ..Default::default()
        };
        let mut effect = Effect::new(Lightning::with_config(config), 2);
        effect.update(&click());
        assert_eq!(effect.live_count(), 5);
    }

    #[test]
    fn holding_the_button_does_not_repeat() {
        let mut effect = Effect::new(Lightning::default(), 3);
        effect.update(&click());
        let after_press = effect.spawned_total();
        for _ in 0..5 {
            effect.update(&click());
        }
        assert_eq!(effect.spawned_total(), after_press);
    }

    #[test]
    fn bolts_follow_cursor_when_enabled() {
        let config = LightningConfig {
            follow_cursor: true,
            ..Default::default()
        };
        let mut effect = Effect::new(Lightning::with_config(config), 4);
        effect.update(&click());
        let mut moved = FrameInput::at(Vec2::new(400.0, 350.0), 1.0 / 60.0);
        moved.previous_cursor = Vec2::new(300.0, 300.0);
        effect.update(&moved);
        effect.pool().for_each_live(|_, b| assert_eq!(b.origin, Vec2::new(400.0, 350.0)));
    }

    #[test]
    fn segments_and_branches_are_capped() {
        let table: toml::value::Table = toml::from_str("segments = 99\nbranches = 12").unwrap();
        let mut lightning = Lightning::default();
        lightning.apply_settings(&table);
        assert_eq!(lightning.config.segments, MAX_BOLT_SEGMENTS);
        assert_eq!(lightning.config.branches, MAX_BOLT_BRANCHES);
    }
}
