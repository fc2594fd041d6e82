//! Rune circles summoned at the cursor on a button press

use super::{faded, scaled, settings_value, tint};
use crate::animation::{AnimationConfig, AppearAnimation, DisappearAnimation, Lifecycle};
use crate::curves::advance_phase;
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::Instance;
use crate::spawn::{EdgeTrigger, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::{FrameInput, MouseButton};
use cursorfx_sdf::shapes::MAX_SIGIL_RINGS;
use serde::Serialize;

pub const HARD_MAX: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct SigilConfig {
    pub max_sigils: usize,
    pub trigger_button: MouseButton,
    pub radius_min: f32,
    pub radius_max: f32,
    pub rings: u32,
    /// Polygon and star point count range
    pub spokes_min: u32,
    pub spokes_max: u32,
    pub runes: u32,
    pub thickness: f32,
    pub rotation_speed: f32,
    pub pulse_speed: f32,
    pub lifetime: f32,
    #[serde(serialize_with = "hex_color")]
    pub color: Color,
    pub color_jitter: f32,
    pub glow_intensity: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            max_sigils: 8,
            trigger_button: MouseButton::Right,
            radius_min: 40.0,
            radius_max: 80.0,
            rings: 3,
            spokes_min: 5,
            spokes_max: 8,
            runes: 12,
            thickness: 1.5,
            rotation_speed: 0.8,
            pulse_speed: 2.0,
            lifetime: 2.0,
            color: Color::from_hex(0xff7a3c),
            color_jitter: 0.05,
            glow_intensity: 1.5,
            animation: AnimationConfig {
                appear: AppearAnimation::ZoomIn,
                appear_duration: 0.3,
                disappear: DisappearAnimation::FadeOut,
                disappear_duration: 0.5,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sigil {
    pub life: Lifecycle,
    pub position: Vec2,
    pub radius: f32,
    pub rings: u32,
    pub spokes: u32,
    pub seed: f32,
    pub rotation: f32,
    pub spin: f32,
    pub pulse_phase: f32,
    pub color: Color,
}

impl Instance for Sigil {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `SigilInstance` in `sigils.wgsl`. 80 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SigilGpu {
    pub pos_radius: [f32; 4], // xy = position, z = radius, w = lifetime
    pub color: [f32; 4],
    pub shape: [f32; 4],  // x = rings, y = spokes, z = runes, w = seed
    pub motion: [f32; 4], // x = rotation, y = pulse phase, z = thickness, w = glow
    pub anim: [f32; 4],   // x = pop progress, y = age ratio
}

pub struct Sigils {
    pub config: SigilConfig,
    trigger: EdgeTrigger,
    budget: SpawnBudget,
}

impl Default for Sigils {
    fn default() -> Self {
        Self::with_config(SigilConfig::default())
    }
}

impl Sigils {
    pub fn with_config(config: SigilConfig) -> Self {
        Self {
            trigger: EdgeTrigger::default(),
            budget: SpawnBudget::unlimited(config.max_sigils),
            config,
        }
    }
}

impl EffectKind for Sigils {
    type Instance = Sigil;
    type Gpu = SigilGpu;

    const NAME: &'static str = "sigils";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_sigils", &mut c.max_sigils, 1, HARD_MAX);
        r.parse("trigger_button", &mut c.trigger_button);
        r.f32_clamped("radius_min", &mut c.radius_min, 8.0, 600.0);
        r.f32_clamped("radius_max", &mut c.radius_max, 8.0, 600.0);
        r.u32("rings", &mut c.rings);
        r.u32("spokes_min", &mut c.spokes_min);
        r.u32("spokes_max", &mut c.spokes_max);
        r.u32("runes", &mut c.runes);
        r.f32_clamped("thickness", &mut c.thickness, 0.25, 20.0);
        r.f32("rotation_speed", &mut c.rotation_speed);
        r.f32("pulse_speed", &mut c.pulse_speed);
        r.f32_clamped("lifetime", &mut c.lifetime, 0.05, 30.0);
        r.color("color", &mut c.color);
        r.f32_clamped("color_jitter", &mut c.color_jitter, 0.0, 1.0);
        r.f32_clamped("glow_intensity", &mut c.glow_intensity, 0.0, 10.0);
        c.animation.apply_settings(&r);

        c.rings = c.rings.clamp(1, MAX_SIGIL_RINGS);
        c.spokes_min = c.spokes_min.clamp(3, 12);
        c.spokes_max = c.spokes_max.clamp(c.spokes_min, 12);
        c.runes = c.runes.min(48);
        c.radius_max = c.radius_max.max(c.radius_min);
        self.budget = SpawnBudget::unlimited(c.max_sigils);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, Sigil>) {
        let pressed = input.is_pressed(self.config.trigger_button);
        if !self.trigger.update(pressed) || self.budget.claim(1, ctx.live_count()) == 0 {
            return;
        }

        let c = &self.config;
        let rng = &mut *ctx.rng;
        let spoke_choices = c.spokes_max.saturating_sub(c.spokes_min) as usize + 1;
        let spin = if rng.chance(0.5) {
            c.rotation_speed
        } else {
            -c.rotation_speed
        };
        let sigil = Sigil {
            life: Lifecycle::new(c.lifetime, &c.animation),
            position: input.cursor,
            radius: rng.range(c.radius_min, c.radius_max),
            rings: c.rings,
            spokes: c.spokes_min + rng.index(spoke_choices) as u32,
            seed: rng.range(0.0, 1000.0),
            rotation: rng.angle(),
            spin,
            pulse_phase: 0.0,
            color: tint(rng, c.color, c.color_jitter),
        };
        ctx.emit(sigil);
    }

    fn integrate(&self, sigil: &mut Sigil, input: &FrameInput) {
        let dt = input.delta_time;
        sigil.rotation = advance_phase(sigil.rotation, sigil.spin, dt);
        sigil.pulse_phase = advance_phase(sigil.pulse_phase, self.config.pulse_speed, dt);
    }

    fn pack(&self, s: &Sigil) -> SigilGpu {
        SigilGpu {
            pos_radius: [s.position.x, s.position.y, scaled(s.radius, &s.life), s.life.lifetime],
            color: faded(s.color, &s.life),
            shape: [
                s.rings as f32,
                s.spokes as f32,
                self.config.runes as f32,
                s.seed,
            ],
            motion: [
                s.rotation,
                s.pulse_phase,
                self.config.thickness,
                self.config.glow_intensity,
            ],
            anim: [s.life.anim.pop_progress, s.life.age_ratio(), 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    const DT: f32 = 1.0 / 60.0;

    fn with_right(pressed: bool) -> FrameInput {
        let mut input = FrameInput::at(Vec2::new(200.0, 200.0), DT);
        input.buttons.set(MouseButton::Right, pressed);
        input
    }

    #[test]
    fn sigil_record_layout() {
        assert_eq!(std::mem::size_of::<SigilGpu>(), 80);
    }

    #[test]
    fn one_sigil_per_press() {
        let mut effect = Effect::new(Sigils::default(), 1);
        for _ in 0..10 {
            effect.update(&with_right(true));
        }
        assert_eq!(effect.spawned_total(), 1);

        effect.update(&with_right(false));
        effect.update(&with_right(true));
        assert_eq!(effect.spawned_total(), 2);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut effect = Effect::new(Sigils::default(), 2);
        let mut input = FrameInput::at(Vec2::ZERO, DT);
        input.buttons.set(MouseButton::Left, true);
        effect.update(&input);
        assert_eq!(effect.live_count(), 0);
    }

    #[test]
    fn spokes_stay_in_range() {
        let mut effect = Effect::new(Sigils::default(), 3);
        for _ in 0..8 {
            effect.update(&with_right(true));
            effect.update(&with_right(false));
        }
        effect.pool().for_each_live(|_, s| assert!((5..=8).contains(&s.spokes)));
        assert_eq!(effect.live_count(), 8);
    }

    #[test]
    fn ring_count_is_capped() {
        let table: toml::value::Table = toml::from_str("rings = 10\nspokes_min = 1").unwrap();
        let mut sigils = Sigils::default();
        sigils.apply_settings(&table);
        assert_eq!(sigils.config.rings, MAX_SIGIL_RINGS);
        assert_eq!(sigils.config.spokes_min, 3);
    }
}
