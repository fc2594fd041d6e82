//! Missile-command mini-game played on top of the desktop.
//!
//! Incoming missiles fall from the top edge toward random points on the
//! ground line. Clicking launches an interceptor from the ground below the
//! cursor; when it reaches the click point it turns into an explosion that
//! grows and shrinks over `explosion_duration`. Missiles caught inside an
//! explosion pop and score. Missiles that reach the ground count as city hits
//! and leave a harmless ground explosion.

use super::{faded, settings_value};
use crate::animation::{AnimationConfig, Lifecycle};
use crate::effect::{EffectKind, SpawnContext};
use crate::instance::{Instance, InstancePool};
use crate::spawn::{ButtonEdges, RateSpawner, SpawnBudget};
use bytemuck::{Pod, Zeroable};
use cursorfx_core::settings::{hex_color, TableReader};
use cursorfx_core::{Color, Vec2};
use cursorfx_runtime::{FrameInput, MouseButton};
use serde::Serialize;
use std::f32::consts::PI;
use tracing::debug;

pub const HARD_MAX: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    #[default]
    Missile,
    Interceptor,
    Explosion,
}

impl EntityKind {
    fn shader_index(self) -> f32 {
        match self {
            EntityKind::Missile => 0.0,
            EntityKind::Interceptor => 1.0,
            EntityKind::Explosion => 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MissileConfig {
    pub max_entities: usize,
    /// Incoming missiles per second, fractional rates carry over
    pub missiles_per_second: f32,
    pub missile_speed_min: f32,
    pub missile_speed_max: f32,
    pub missile_size: f32,
    pub launch_button: MouseButton,
    pub max_interceptors: usize,
    pub interceptor_speed: f32,
    pub interceptor_size: f32,
    pub explosion_radius: f32,
    pub explosion_duration: f32,
    /// Distance of the ground line above the bottom edge
    pub ground_margin: f32,
    pub trail_length: f32,
    pub points_per_missile: u32,
    #[serde(serialize_with = "hex_color")]
    pub missile_color: Color,
    #[serde(serialize_with = "hex_color")]
    pub interceptor_color: Color,
    #[serde(serialize_with = "hex_color")]
    pub explosion_color: Color,
    pub glow_intensity: f32,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            max_entities: 96,
            missiles_per_second: 0.8,
            missile_speed_min: 60.0,
            missile_speed_max: 120.0,
            missile_size: 3.0,
            launch_button: MouseButton::Left,
            max_interceptors: 6,
            interceptor_speed: 700.0,
            interceptor_size: 3.0,
            explosion_radius: 50.0,
            explosion_duration: 0.8,
            ground_margin: 40.0,
            trail_length: 40.0,
            points_per_missile: 25,
            missile_color: Color::from_hex(0xff4d4d),
            interceptor_color: Color::from_hex(0x6dff8a),
            explosion_color: Color::from_hex(0xffe066),
            glow_intensity: 1.3,
            animation: AnimationConfig::instant(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameEntity {
    pub life: Lifecycle,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub target: Vec2,
    pub size: f32,
    pub color: Color,
    /// Ground explosions from landed missiles do not destroy anything
    pub scoring: bool,
}

impl Instance for GameEntity {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }
}

/// GPU record, matches `MissileInstance` in `missile.wgsl`. 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MissileGpu {
    pub pos_size: [f32; 4], // xy = position, z = size, w = lifetime
    pub color: [f32; 4],
    pub motion: [f32; 4], // xy = heading, z = entity kind, w = trail length
    pub extra: [f32; 4],  // x = pop progress, y = glow, z = age ratio
}

pub struct MissileCommand {
    pub config: MissileConfig,
    pub score: u64,
    pub city_hits: u32,
    pub missiles_destroyed: u32,
    spawner: RateSpawner,
    budget: SpawnBudget,
    edges: ButtonEdges,
    explosions: Vec<(Vec2, f32)>,
}

impl Default for MissileCommand {
    fn default() -> Self {
        Self::with_config(MissileConfig::default())
    }
}

impl MissileCommand {
    pub fn with_config(config: MissileConfig) -> Self {
        Self {
            spawner: RateSpawner::ungated(config.missiles_per_second),
            budget: SpawnBudget::unlimited(config.max_entities),
            edges: ButtonEdges::default(),
            explosions: Vec::new(),
            score: 0,
            city_hits: 0,
            missiles_destroyed: 0,
            config,
        }
    }

    pub fn ground_y(&self, screen_size: Vec2) -> f32 {
        (screen_size.y - self.config.ground_margin).max(0.0)
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
        self.city_hits = 0;
        self.missiles_destroyed = 0;
    }

    fn make_missile(&self, ctx: &mut SpawnContext<'_, GameEntity>, input: &FrameInput) -> GameEntity {
        let c = &self.config;
        let rng = &mut *ctx.rng;
        let width = input.screen_size.x.max(1.0);
        let start = Vec2::new(rng.range(0.0, width), -c.missile_size);
        let target = Vec2::new(rng.range(0.0, width), self.ground_y(input.screen_size));
        let speed = rng.range(c.missile_speed_min, c.missile_speed_max).max(1.0);
        let travel = start.distance(&target);
        GameEntity {
            // Outlives the fall; landing is detected in `resolve`
            life: Lifecycle::new(travel / speed + 1.0, &c.animation),
            kind: EntityKind::Missile,
            position: start,
            velocity: (target - start).normalized() * speed,
            target,
            size: c.missile_size,
            color: c.missile_color,
            scoring: false,
        }
    }

    fn make_interceptor(&self, input: &FrameInput) -> GameEntity {
        let c = &self.config;
        let start = Vec2::new(input.cursor.x, self.ground_y(input.screen_size));
        let target = input.cursor;
        let speed = c.interceptor_speed.max(1.0);
        GameEntity {
            life: Lifecycle::new(start.distance(&target) / speed + 1.0, &c.animation),
            kind: EntityKind::Interceptor,
            position: start,
            velocity: (target - start).normalized() * speed,
            target,
            size: c.interceptor_size,
            color: c.interceptor_color,
            scoring: true,
        }
    }

    /// Turn an interceptor or landed missile into an explosion in place
    fn detonate(&self, entity: &mut GameEntity, scoring: bool) {
        entity.kind = EntityKind::Explosion;
        entity.life = Lifecycle::new(self.config.explosion_duration, &self.config.animation);
        entity.velocity = Vec2::ZERO;
        entity.size = 0.0;
        entity.color = self.config.explosion_color;
        entity.scoring = scoring;
    }
}

impl EffectKind for MissileCommand {
    type Instance = GameEntity;
    type Gpu = MissileGpu;

    const NAME: &'static str = "missile_command";
    const HARD_MAX: usize = HARD_MAX;

    fn animation(&self) -> &AnimationConfig {
        &self.config.animation
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        let r = TableReader::new(table);
        let c = &mut self.config;
        r.usize_clamped("max_entities", &mut c.max_entities, 1, HARD_MAX);
        r.f32_clamped("missiles_per_second", &mut c.missiles_per_second, 0.0, 50.0);
        r.f32_clamped("missile_speed_min", &mut c.missile_speed_min, 1.0, 2000.0);
        r.f32_clamped("missile_speed_max", &mut c.missile_speed_max, 1.0, 2000.0);
        r.f32_clamped("missile_size", &mut c.missile_size, 0.5, 50.0);
        r.parse("launch_button", &mut c.launch_button);
        r.usize_clamped("max_interceptors", &mut c.max_interceptors, 1, HARD_MAX);
        r.f32_clamped("interceptor_speed", &mut c.interceptor_speed, 1.0, 5000.0);
        r.f32_clamped("interceptor_size", &mut c.interceptor_size, 0.5, 50.0);
        r.f32_clamped("explosion_radius", &mut c.explosion_radius, 1.0, 500.0);
        r.f32_clamped("explosion_duration", &mut c.explosion_duration, 0.05, 10.0);
        r.f32_clamped("ground_margin", &mut c.ground_margin, 0.0, 1000.0);
        r.f32_clamped("trail_length", &mut c.trail_length, 0.0, 500.0);
        r.u32("points_per_missile", &mut c.points_per_missile);
        r.color("missile_color", &mut c.missile_color);
        r.color("interceptor_color", &mut c.interceptor_color);
        r.color("explosion_color", &mut c.explosion_color);
        r.f32_clamped("glow_intensity", &mut c.glow_intensity, 0.0, 10.0);
        c.animation.apply_settings(&r);

        c.missile_speed_max = c.missile_speed_max.max(c.missile_speed_min);
        self.spawner.rate = c.missiles_per_second;
        self.budget = SpawnBudget::unlimited(c.max_entities);
    }

    fn settings_toml(&self) -> toml::Value {
        settings_value(&self.config)
    }

    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, GameEntity>) {
        self.edges.update(&input.buttons);

        let incoming = self.spawner.update(0.0, input.delta_time);
        let granted = self.budget.claim(incoming, ctx.live_count());
        for _ in 0..granted {
            let missile = self.make_missile(ctx, input);
            ctx.emit(missile);
        }

        if self.edges.just_pressed(self.config.launch_button) {
            let in_flight = ctx
                .pool()
                .iter_live()
                .filter(|e| e.kind == EntityKind::Interceptor)
                .count();
            if in_flight < self.config.max_interceptors
                && self.budget.claim(1, ctx.live_count()) == 1
            {
                ctx.emit(self.make_interceptor(input));
            }
        }
    }

    fn integrate(&self, entity: &mut GameEntity, input: &FrameInput) {
        let dt = input.delta_time;
        match entity.kind {
            EntityKind::Missile => {
                entity.position += entity.velocity * dt;
            }
            EntityKind::Interceptor => {
                // Stop exactly on the target so `resolve` sees the arrival
                let remaining = entity.target - entity.position;
                let step = entity.velocity.length() * dt;
                if remaining.length() <= step {
                    entity.position = entity.target;
                } else {
                    entity.position += entity.velocity * dt;
                }
            }
            EntityKind::Explosion => {
                let t = entity.life.age_ratio();
                entity.size = self.config.explosion_radius * (PI * t).sin().max(0.0);
            }
        }
    }

    fn resolve(&mut self, pool: &mut InstancePool<GameEntity>, input: &FrameInput) {
        let ground = self.ground_y(input.screen_size);

        let mut landed = 0;
        for slot in 0..pool.capacity() {
            let Some(entity) = pool.get_mut(slot) else {
                continue;
            };
            if !entity.is_alive() {
                continue;
            }
            match entity.kind {
                EntityKind::Interceptor if entity.position == entity.target => {
                    self.detonate(entity, true);
                }
                EntityKind::Missile
                    if entity.position.y >= ground && !entity.life.anim.is_disappearing() =>
                {
                    entity.position.y = ground;
                    self.detonate(entity, false);
                    landed += 1;
                }
                _ => {}
            }
        }
        if landed > 0 {
            self.city_hits += landed;
            debug!(landed, city_hits = self.city_hits, "missiles reached the ground");
        }

        self.explosions.clear();
        self.explosions.extend(
            pool.iter_live()
                .filter(|e| e.kind == EntityKind::Explosion && e.scoring && e.size > 0.0)
                .map(|e| (e.position, e.size)),
        );
        if self.explosions.is_empty() {
            return;
        }

        let anim = &self.config.animation;
        let mut destroyed = 0;
        for entity in pool.iter_live_mut() {
            if entity.kind != EntityKind::Missile || entity.life.anim.is_disappearing() {
                continue;
            }
            let hit = self.explosions.iter().any(|&(center, radius)| {
                entity.position.distance(&center) <= radius + entity.size
            });
            if hit {
                entity.life.trigger_pop(anim);
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            self.missiles_destroyed += destroyed;
            self.score += u64::from(destroyed) * u64::from(self.config.points_per_missile);
            debug!(destroyed, score = self.score, "missiles intercepted");
        }
    }

    fn pack(&self, e: &GameEntity) -> MissileGpu {
        let heading = e.velocity.normalized();
        MissileGpu {
            pos_size: [e.position.x, e.position.y, e.size.max(0.0), e.life.lifetime],
            color: faded(e.color, &e.life),
            motion: [
                heading.x,
                heading.y,
                e.kind.shader_index(),
                self.config.trail_length,
            ],
            extra: [
                e.life.anim.pop_progress,
                self.config.glow_intensity,
                e.life.age_ratio(),
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    const DT: f32 = 1.0 / 60.0;

    fn quiet() -> MissileConfig {
        MissileConfig {
            missiles_per_second: 0.0,
            ..Default::default()
        }
    }

    fn idle(cursor: Vec2) -> FrameInput {
        FrameInput::at(cursor, DT)
    }

    #[test]
    fn missile_record_layout() {
        assert_eq!(std::mem::size_of::<MissileGpu>(), 64);
    }

    #[test]
    fn missiles_arrive_on_the_game_timer() {
        let config = MissileConfig {
            missiles_per_second: 2.0,
            ..Default::default()
        };
        let mut effect = Effect::new(MissileCommand::with_config(config), 1);
        for _ in 0..75 {
            effect.update(&idle(Vec2::new(10.0, 10.0)));
        }
        assert_eq!(effect.spawned_total(), 2);
    }

    #[test]
    fn click_launches_interceptor_from_the_ground() {
        let mut effect = Effect::new(MissileCommand::with_config(quiet()), 2);
        let mut input = idle(Vec2::new(400.0, 300.0));
        input.buttons.set(MouseButton::Left, true);
        effect.update(&input);

        let ground = effect.kind.ground_y(input.screen_size);
        let interceptor = effect.pool().iter_live().next().cloned().unwrap_or_default();
        assert_eq!(interceptor.kind, EntityKind::Interceptor);
        assert_eq!(interceptor.position.x, 400.0);
        assert!(interceptor.position.y < ground);
        assert_eq!(interceptor.target, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn interceptor_becomes_explosion_and_scores() {
        let mut effect = Effect::new(MissileCommand::with_config(quiet()), 3);
        let target = Vec2::new(400.0, 300.0);
        let animation = effect.kind.config.animation.clone();
        effect.insert(GameEntity {
            life: Lifecycle::new(30.0, &animation),
            kind: EntityKind::Missile,
            position: target + Vec2::new(10.0, 0.0),
            velocity: Vec2::ZERO,
            size: 3.0,
            ..Default::default()
        });

        let mut click = idle(target);
        click.buttons.set(MouseButton::Left, true);
        effect.update(&click);
        for _ in 0..90 {
            effect.update(&idle(target));
        }

        assert_eq!(effect.kind.missiles_destroyed, 1);
        assert_eq!(effect.kind.score, 25);
        assert_eq!(effect.kind.city_hits, 0);
    }

    #[test]
    fn landed_missile_counts_as_city_hit() {
        let mut effect = Effect::new(MissileCommand::with_config(quiet()), 4);
        let screen = FrameInput::default().screen_size;
        let ground = effect.kind.ground_y(screen);
        let animation = effect.kind.config.animation.clone();
        effect.insert(GameEntity {
            life: Lifecycle::new(5.0, &animation),
            kind: EntityKind::Missile,
            position: Vec2::new(100.0, ground - 1.0),
            velocity: Vec2::new(0.0, 120.0),
            size: 3.0,
            ..Default::default()
        });
        effect.update(&idle(Vec2::ZERO));

        assert_eq!(effect.kind.city_hits, 1);
        let entity = effect.pool().get(0).cloned().unwrap_or_default();
        assert_eq!(entity.kind, EntityKind::Explosion);
        assert!(!entity.scoring);
    }

    #[test]
    fn explosion_radius_peaks_mid_life() {
        let config = MissileConfig {
            explosion_duration: 1.0,
            ..quiet()
        };
        let kind = MissileCommand::with_config(config);
        let mut explosion = GameEntity::default();
        kind.detonate(&mut explosion, true);
        explosion.life.lifetime = 0.5;
        kind.integrate(&mut explosion, &idle(Vec2::ZERO));
        assert!((explosion.size - kind.config.explosion_radius).abs() < 1e-3);
    }
}
