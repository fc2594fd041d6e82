//! Spawn controllers: when to create instances and in which direction.
//!
//! Controllers only count. The effect decides what a spawn looks like and the
//! `SpawnBudget` decides how many of the requested spawns may happen.

use crate::rand::ParticleRng;
use cursorfx_core::Vec2;
use cursorfx_runtime::{ButtonState, MouseButton};
use serde::Serialize;
use std::f32::consts::TAU;

/// Distance thresholds below this are raised to it
pub const MIN_DISTANCE_THRESHOLD: f32 = 1.0;

/// Frame displacement the cursor must exceed for a gated rate spawner to run
pub const MOVEMENT_GATE: f32 = 0.1;

/// Emits one spawn per `threshold` pixels of cursor travel, carrying the
/// overshoot so fast motion spawns several per tick without drift
#[derive(Debug, Clone)]
pub struct DistanceSpawner {
    accumulated: f32,
    threshold: f32,
    threshold_min: f32,
    threshold_max: f32,
    randomize: bool,
    reroll_timer: f32,
}

impl DistanceSpawner {
    pub fn fixed(threshold: f32) -> Self {
        let threshold = threshold.max(MIN_DISTANCE_THRESHOLD);
        Self {
            accumulated: 0.0,
            threshold,
            threshold_min: threshold,
            threshold_max: threshold,
            randomize: false,
            reroll_timer: 0.0,
        }
    }

    /// Threshold re-drawn from `[min, max]` once per second, starting at
    /// the middle of the range
    pub fn randomized(min: f32, max: f32) -> Self {
        let mut spawner = Self::fixed(min);
        spawner.set_range(min, max);
        spawner
    }

    /// Reconfigure; `min == max` gives a fixed threshold
    pub fn set_range(&mut self, min: f32, max: f32) {
        let min = min.max(MIN_DISTANCE_THRESHOLD);
        let max = max.max(min);
        self.threshold_min = min;
        self.threshold_max = max;
        self.randomize = max > min;
        self.threshold = (min + max) * 0.5;
        self.reroll_timer = 0.0;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// Feed this tick's travel; returns how many spawns crossed the threshold
    pub fn update(&mut self, distance: f32, dt: f32, rng: &mut ParticleRng) -> u32 {
        if self.randomize {
            self.reroll_timer += dt.max(0.0);
            if self.reroll_timer >= 1.0 {
                self.reroll_timer %= 1.0;
                self.threshold = rng
                    .range(self.threshold_min, self.threshold_max)
                    .max(MIN_DISTANCE_THRESHOLD);
            }
        }

        if !distance.is_finite() || distance <= 0.0 {
            return 0;
        }
        self.accumulated += distance;
        let count = (self.accumulated / self.threshold).floor();
        self.accumulated -= count * self.threshold;
        count as u32
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

/// Continuous spawning at `rate` per second with fractional carry
#[derive(Debug, Clone)]
pub struct RateSpawner {
    pub rate: f32,
    counter: f32,
    gated: bool,
}

impl RateSpawner {
    /// Runs only while the cursor moves more than `MOVEMENT_GATE` per tick
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            counter: 0.0,
            gated: true,
        }
    }

    /// Runs regardless of cursor movement (game timers)
    pub fn ungated(rate: f32) -> Self {
        Self {
            gated: false,
            ..Self::new(rate)
        }
    }

    pub fn update(&mut self, distance_moved: f32, dt: f32) -> u32 {
        if self.gated && distance_moved <= MOVEMENT_GATE {
            return 0;
        }
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.counter += dt * self.rate;
        let count = self.counter.floor();
        self.counter -= count;
        count as u32
    }
}

/// Fires once on the press transition of a level signal
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    was_pressed: bool,
}

impl EdgeTrigger {
    pub fn update(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        fired
    }
}

/// One `EdgeTrigger` per mouse button
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonEdges {
    triggers: [EdgeTrigger; 3],
    fired: [bool; 3],
}

impl ButtonEdges {
    pub fn update(&mut self, buttons: &ButtonState) {
        for button in MouseButton::ALL {
            let i = button.index();
            self.fired[i] = self.triggers[i].update(buttons.is_pressed(button));
        }
    }

    /// True on the tick `button` went down
    pub fn just_pressed(&self, button: MouseButton) -> bool {
        self.fired[button.index()]
    }
}

/// Per-second spawn budget plus a cap on live instances
#[derive(Debug, Clone)]
pub struct SpawnBudget {
    /// Spawns allowed per rolling second; 0 means unlimited
    pub per_second: u32,
    pub max_active: usize,
    spawned_this_second: u32,
    window: f32,
}

impl SpawnBudget {
    pub fn new(per_second: u32, max_active: usize) -> Self {
        Self {
            per_second,
            max_active,
            spawned_this_second: 0,
            window: 0.0,
        }
    }

    pub fn unlimited(max_active: usize) -> Self {
        Self::new(0, max_active)
    }

    /// Advance the one-second window
    pub fn tick(&mut self, dt: f32) {
        self.window += dt.max(0.0);
        if self.window >= 1.0 {
            self.window %= 1.0;
            self.spawned_this_second = 0;
        }
    }

    /// How many of `requested` may spawn with `live` instances already active
    pub fn allowance(&self, requested: u32, live: usize) -> u32 {
        let second_remaining = if self.per_second == 0 {
            u32::MAX
        } else {
            self.per_second.saturating_sub(self.spawned_this_second)
        };
        let active_remaining = self.max_active.saturating_sub(live).min(u32::MAX as usize) as u32;
        requested.min(second_remaining).min(active_remaining)
    }

    /// `allowance` that also charges the granted spawns against the budget
    pub fn claim(&mut self, requested: u32, live: usize) -> u32 {
        let granted = self.allowance(requested, live);
        self.spawned_this_second += granted;
        granted
    }

    pub fn spawned_this_second(&self) -> u32 {
        self.spawned_this_second
    }
}

/// What caused a spawn, for direction fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTrigger {
    Movement,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionKind {
    #[default]
    All,
    Spread,
    Velocity,
}

impl std::str::FromStr for DirectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DirectionKind::All),
            "spread" => Ok(DirectionKind::Spread),
            "velocity" => Ok(DirectionKind::Velocity),
            other => Err(format!("unknown direction mode '{other}'")),
        }
    }
}

/// Launch direction policy. Angles in radians, `spread` is the full arc width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectionMode {
    AllDirections,
    Spread { base_angle: f32, spread: f32 },
    VelocityBased { spread: f32 },
}

impl DirectionMode {
    /// Build from the flat settings form (angles in degrees)
    pub fn from_settings(kind: DirectionKind, base_angle_deg: f32, spread_deg: f32) -> Self {
        let spread = spread_deg.clamp(0.0, 360.0).to_radians();
        match kind {
            DirectionKind::All => DirectionMode::AllDirections,
            DirectionKind::Spread => DirectionMode::Spread {
                base_angle: base_angle_deg.to_radians(),
                spread,
            },
            DirectionKind::Velocity => DirectionMode::VelocityBased { spread },
        }
    }

    /// Sample a launch angle
    pub fn sample(&self, rng: &mut ParticleRng, velocity: Vec2, trigger: SpawnTrigger) -> f32 {
        match *self {
            DirectionMode::AllDirections => rng.angle(),
            DirectionMode::Spread { base_angle, spread } => {
                base_angle + rng.range(-spread * 0.5, spread * 0.5)
            }
            DirectionMode::VelocityBased { spread } => {
                if trigger == SpawnTrigger::Click || velocity.length_squared() < 1e-6 {
                    return rng.angle();
                }
                velocity.angle() + rng.range(-spread * 0.5, spread * 0.5)
            }
        }
    }

    pub fn sample_direction(
        &self,
        rng: &mut ParticleRng,
        velocity: Vec2,
        trigger: SpawnTrigger,
    ) -> Vec2 {
        Vec2::from_angle(self.sample(rng, velocity, trigger).rem_euclid(TAU))
    }
}
