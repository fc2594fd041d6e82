//! Iridescent bubbles that float up from the cursor path

use super::{faded, scaled, settings_value, tint};
use crate::animation::{AnimationConfig, AppearAnimation, DisappearAnimation, Lifecycle};
use crate::curves::advance_phase;
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::Instance;
use crate::spawn::{ButtonEdges, DistanceSpawner, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::{FrameInput, MouseButton};
use serde::Serialize;

pub const HARD_MAX: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct BubbleConfig {
    pub max_bubbles: usize,
    /// Travel between spawns, re-drawn from this range once per second
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    pub bubbles_per_spawn: u32,
    /// 0 means unlimited
    pub spawns_per_second: u32,
    pub click_burst: bool,
    pub burst_button: MouseButton,
    pub burst_count: u32,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Upward speed in px/s added to every bubble
    pub float_speed: f32,
    /// Maximum random sideways launch speed in px/s
    pub drift_speed: f32,
    pub wobble_amplitude: f32,
    pub wobble_speed: f32,
    pub iridescence_speed: f32,
    pub rim_thickness: f32,
    pub transparency: f32,
    #[serde(serialize_with = "hex_color")]
    pub color: Color,
    pub color_jitter: f32,
    /// Sample the captured screen behind the bubble
    pub refraction: bool,
    pub refraction_strength: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            max_bubbles: 200,
            spawn_distance_min: 30.0,
            spawn_distance_max: 60.0,
            bubbles_per_spawn: 1,
            spawns_per_second: 40,
            click_burst: true,
            burst_button: MouseButton::Left,
            burst_count: 12,
            lifetime_min: 2.0,
            lifetime_max: 4.0,
            size_min: 8.0,
            size_max: 22.0,
            float_speed: 40.0,
            drift_speed: 20.0,
            wobble_amplitude: 0.06,
            wobble_speed: 3.0,
            iridescence_speed: 1.2,
            rim_thickness: 1.5,
            transparency: 0.75,
            color: Color::from_hex(0x9fd8ff),
            color_jitter: 0.1,
            refraction: false,
            refraction_strength: 0.02,
            animation: AnimationConfig {
                appear: AppearAnimation::ZoomIn,
                appear_duration: 0.25,
                disappear: DisappearAnimation::PopOut,
                pop_duration: 0.24,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bubble {
    pub life: Lifecycle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color,
    pub wobble_phase: f32,
    pub wobble_amplitude: f32,
    pub iridescence_phase: f32,
    pub rim: f32,
    pub transparency: f32,
}

impl Instance for Bubble {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `BubbleInstance` in `bubbles.wgsl`. 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BubbleGpu {
    pub pos_radius: [f32; 4], // xy = position, z = radius, w = lifetime
    pub color: [f32; 4],
    pub shading: [f32; 4], // x = wobble phase, y = wobble amplitude, z = iridescence phase, w = rim
    pub anim: [f32; 4],    // x = pop progress, y = transparency, z = age ratio, w = refraction
}

pub struct Bubbles {
    pub config: BubbleConfig,
    spawner: DistanceSpawner,
    budget: SpawnBudget,
    edges: ButtonEdges,
}

impl Default for Bubbles {
    fn default() -> Self {
        Self::with_config(BubbleConfig::default())
    }
}

impl Bubbles {
    pub fn with_config(config: BubbleConfig) -> Self {
        Self {
            spawner: DistanceSpawner::randomized(
                config.spawn_distance_min,
                config.spawn_distance_max,
            ),
            budget: SpawnBudget::new(config.spawns_per_second, config.max_bubbles),
            edges: ButtonEdges::default(),
            config,
        }
    }

    fn make_bubble(&self, ctx: &mut SpawnContext<'_, Bubble>, at: Vec2, speed: f32) -> Bubble {
        let c = &self.config;
        let rng = &mut *ctx.rng;
        let lifetime = rng.range(c.lifetime_min, c.lifetime_max);
        Bubble {
            life: Lifecycle::new(lifetime, &c.animation),
            position: at,
            velocity: rng.direction() * rng.range(0.0, speed),
            radius: rng.range(c.size_min, c.size_max),
            color: tint(rng, c.color, c.color_jitter),
            wobble_phase: rng.angle(),
            wobble_amplitude: rng.jitter(c.wobble_amplitude, 0.3),
            iridescence_phase: rng.angle(),
            rim: c.rim_thickness,
            transparency: c.transparency,
        }
    }
}

impl EffectKind for Bubbles {
    type Instance = Bubble;
    type Gpu = BubbleGpu;

    const NAME: &'static str = "bubbles";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_bubbles", &mut c.max_bubbles, 1, HARD_MAX);
        r.f32_clamped("spawn_distance_min", &mut c.spawn_distance_min, 1.0, 2000.0);
        r.f32_clamped("spawn_distance_max", &mut c.spawn_distance_max, 1.0, 2000.0);
        r.u32("bubbles_per_spawn", &mut c.bubbles_per_spawn);
        r.u32("spawns_per_second", &mut c.spawns_per_second);
        r.bool("click_burst", &mut c.click_burst);
        r.parse("burst_button", &mut c.burst_button);
        r.u32("burst_count", &mut c.burst_count);
        r.f32_clamped("lifetime_min", &mut c.lifetime_min, 0.05, 60.0);
        r.f32_clamped("lifetime_max", &mut c.lifetime_max, 0.05, 60.0);
        r.f32_clamped("size_min", &mut c.size_min, 1.0, 200.0);
        r.f32_clamped("size_max", &mut c.size_max, 1.0, 200.0);
        r.f32("float_speed", &mut c.float_speed);
        r.f32_clamped("drift_speed", &mut c.drift_speed, 0.0, 1000.0);
        r.f32_clamped("wobble_amplitude", &mut c.wobble_amplitude, 0.0, 0.5);
        r.f32("wobble_speed", &mut c.wobble_speed);
        r.f32("iridescence_speed", &mut c.iridescence_speed);
        r.f32_clamped("rim_thickness", &mut c.rim_thickness, 0.0, 20.0);
        r.f32_clamped("transparency", &mut c.transparency, 0.0, 1.0);
        r.color("color", &mut c.color);
        r.f32_clamped("color_jitter", &mut c.color_jitter, 0.0, 1.0);
        r.bool("refraction", &mut c.refraction);
        r.f32_clamped("refraction_strength", &mut c.refraction_strength, 0.0, 1.0);
        c.animation.apply_settings(&r);

        c.lifetime_max = c.lifetime_max.max(c.lifetime_min);
        c.size_max = c.size_max.max(c.size_min);
        self.spawner
            .set_range(c.spawn_distance_min, c.spawn_distance_max);
        self.budget = SpawnBudget::new(c.spawns_per_second, c.max_bubbles);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, Bubble>) {
        let dt = input.delta_time;
        self.budget.tick(dt);
        self.edges.update(&input.buttons);

        let trail = self
            .spawner
            .update(input.distance_moved(), dt, ctx.rng)
            .saturating_mul(self.config.bubbles_per_spawn);
        let burst = if self.config.click_burst && self.edges.just_pressed(self.config.burst_button)
        {
            self.config.burst_count
        } else {
            0
        };

        let granted = self.budget.claim(trail.saturating_add(burst), ctx.live_count());
        for i in 0..granted {
            // Burst bubbles scatter faster than trail bubbles
            let speed = if i >= trail {
                self.config.drift_speed * 3.0
            } else {
                self.config.drift_speed
            };
            let bubble = self.make_bubble(ctx, input.cursor, speed);
            ctx.emit(bubble);
        }
    }

    fn integrate(&self, bubble: &mut Bubble, input: &FrameInput) {
        let dt = input.delta_time;
        let rise = Vec2::new(0.0, -self.config.float_speed);
        bubble.position += (bubble.velocity + rise) * dt;
        bubble.wobble_phase = advance_phase(bubble.wobble_phase, self.config.wobble_speed, dt);
        bubble.iridescence_phase =
            advance_phase(bubble.iridescence_phase, self.config.iridescence_speed, dt);
    }

    fn pack(&self, b: &Bubble) -> BubbleGpu {
        let refraction = if self.config.refraction {
            self.config.refraction_strength
        } else {
            0.0
        };
        BubbleGpu {
            pos_radius: [
                b.position.x,
                b.position.y,
                scaled(b.radius, &b.life),
                b.life.lifetime,
            ],
            color: faded(b.color, &b.life),
            shading: [b.wobble_phase, b.wobble_amplitude, b.iridescence_phase, b.rim],
            anim: [
                b.life.anim.pop_progress,
                b.transparency,
                b.life.age_ratio(),
                refraction,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    fn still(dt: f32) -> FrameInput {
        FrameInput::at(Vec2::new(100.0, 100.0), dt)
    }

    #[test]
    fn bubble_record_layout() {
        assert_eq!(std::mem::size_of::<BubbleGpu>(), 64);
    }

    #[test]
    fn bubble_floats_up_at_float_speed() {
        let config = BubbleConfig {
            float_speed: 25.0,
            drift_speed: 0.0,
            click_burst: false,
            ..Default::default()
        };
        let animation = config.animation.clone();
        let mut effect = Effect::new(Bubbles::with_config(config), 1);
        effect.insert(Bubble {
            life: Lifecycle::new(10.0, &animation),
            position: Vec2::new(100.0, 100.0),
            radius: 10.0,
            ..Default::default()
        });

        let dt = 1.0 / 60.0;
        for _ in 0..60 {
            effect.update(&still(dt));
        }
        let bubble = effect.pool().iter_live().next().unwrap();
        assert!((bubble.position.y - 75.0).abs() < 1e-3, "{}", bubble.position.y);
        assert!((bubble.position.x - 100.0).abs() < 1e-6);
        assert!((bubble.life.lifetime - 9.0).abs() < 1e-4);
    }

    #[test]
    fn popped_bubble_leaves_the_upload() {
        let config = BubbleConfig {
            click_burst: false,
            ..Default::default()
        };
        let animation = config.animation.clone();
        let mut effect = Effect::new(Bubbles::with_config(config), 2);
        effect.insert(Bubble {
            life: Lifecycle::new(0.3, &animation),
            radius: 10.0,
            ..Default::default()
        });

        let mut saw_pop = false;
        for _ in 0..20 {
            effect.update(&still(0.02));
            effect.pack();
            if let Some(b) = effect.pool().iter_live().next() {
                saw_pop |= b.life.anim.pop_progress > 0.0;
                assert_eq!(effect.upload().live_records()[0].anim[0], b.life.anim.pop_progress);
            }
        }
        assert!(saw_pop);
        assert_eq!(effect.upload().count(), 0);
    }

    #[test]
    fn movement_spawns_by_distance() {
        let config = BubbleConfig {
            spawn_distance_min: 10.0,
            spawn_distance_max: 10.0,
            spawns_per_second: 0,
            ..Default::default()
        };
        let mut effect = Effect::new(Bubbles::with_config(config), 3);
        let mut input = still(1.0 / 60.0);
        input.cursor = Vec2::new(135.0, 100.0);
        effect.update(&input);
        assert_eq!(effect.live_count(), 3);
    }

    #[test]
    fn click_burst_fires_once_per_press() {
        let mut effect = Effect::new(Bubbles::default(), 4);
        let mut input = still(1.0 / 60.0);
        input.buttons.set(MouseButton::Left, true);
        effect.update(&input);
        effect.update(&input);
        assert_eq!(effect.live_count(), BubbleConfig::default().burst_count as usize);
    }

    #[test]
    fn settings_clamp_max_bubbles() {
        let table: toml::value::Table = toml::from_str("max_bubbles = 9000\nfloat_speed = 10").unwrap();
        let mut bubbles = Bubbles::default();
        bubbles.apply_settings(&table);
        assert_eq!(bubbles.config.max_bubbles, HARD_MAX);
        assert_eq!(bubbles.config.float_speed, 10.0);
    }
}
