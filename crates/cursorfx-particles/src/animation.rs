//! Appear / disappear animation state machine shared by every effect.
//!
//! Each instance carries two independent progress axes. The appear axis runs
//! from spawn; the disappear axis starts either when the remaining lifetime
//! drops to the disappear duration or when something outside the instance
//! (an explosion, a click) triggers it. Both derive an alpha and a scale
//! multiplier the GPU record multiplies into its color and size.

use crate::curves::lerp_f32;
use cursorfx_core::settings::TableReader;
use serde::Serialize;

/// Disappear progress the tick it begins, so "triggered" is observable
/// before the first full step
pub const DISAPPEAR_EPSILON: f32 = 0.001;

/// Slack on the lifetime trigger so repeated `lifetime -= dt` rounding does
/// not push the start back a whole tick
const TRIGGER_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearAnimation {
    #[default]
    None,
    FadeIn,
    ZoomIn,
}

impl std::str::FromStr for AppearAnimation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AppearAnimation::None),
            "fade_in" => Ok(AppearAnimation::FadeIn),
            "zoom_in" => Ok(AppearAnimation::ZoomIn),
            other => Err(format!("unknown appear animation '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisappearAnimation {
    #[default]
    None,
    FadeOut,
    ZoomOut,
    /// Shader-side expand-then-vanish driven by `pop_progress`
    PopOut,
}

impl std::str::FromStr for DisappearAnimation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(DisappearAnimation::None),
            "fade_out" => Ok(DisappearAnimation::FadeOut),
            "zoom_out" => Ok(DisappearAnimation::ZoomOut),
            "pop_out" => Ok(DisappearAnimation::PopOut),
            other => Err(format!("unknown disappear animation '{other}'")),
        }
    }
}

/// Animation settings for one effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationConfig {
    #[serde(rename = "appear_animation")]
    pub appear: AppearAnimation,
    pub appear_duration: f32,
    pub fade_in_start_alpha: f32,
    pub fade_in_end_alpha: f32,
    pub zoom_in_start_scale: f32,
    pub zoom_in_end_scale: f32,

    #[serde(rename = "disappear_animation")]
    pub disappear: DisappearAnimation,
    /// Duration of `FadeOut` and `ZoomOut`
    pub disappear_duration: f32,
    /// Duration of `PopOut`
    pub pop_duration: f32,
    pub fade_out_start_alpha: f32,
    pub fade_out_end_alpha: f32,
    pub zoom_out_start_scale: f32,
    pub zoom_out_end_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            appear: AppearAnimation::FadeIn,
            appear_duration: 0.2,
            fade_in_start_alpha: 0.0,
            fade_in_end_alpha: 1.0,
            zoom_in_start_scale: 0.0,
            zoom_in_end_scale: 1.0,
            disappear: DisappearAnimation::FadeOut,
            disappear_duration: 0.3,
            pop_duration: 0.24,
            fade_out_start_alpha: 1.0,
            fade_out_end_alpha: 0.0,
            zoom_out_start_scale: 1.0,
            zoom_out_end_scale: 0.0,
        }
    }
}

impl AnimationConfig {
    /// No appear or disappear animation at all
    pub fn instant() -> Self {
        Self {
            appear: AppearAnimation::None,
            disappear: DisappearAnimation::None,
            ..Default::default()
        }
    }

    /// Duration of the configured disappear variant; 0 when there is none
    pub fn disappear_duration_for(&self, variant: DisappearAnimation) -> f32 {
        match variant {
            DisappearAnimation::None => 0.0,
            DisappearAnimation::FadeOut | DisappearAnimation::ZoomOut => self.disappear_duration,
            DisappearAnimation::PopOut => self.pop_duration,
        }
    }

    pub fn apply_settings(&mut self, reader: &TableReader<'_>) {
        reader.parse("appear_animation", &mut self.appear);
        reader.f32_clamped("appear_duration", &mut self.appear_duration, 0.0, 10.0);
        reader.f32_clamped("fade_in_start_alpha", &mut self.fade_in_start_alpha, 0.0, 1.0);
        reader.f32_clamped("fade_in_end_alpha", &mut self.fade_in_end_alpha, 0.0, 1.0);
        reader.f32_clamped("zoom_in_start_scale", &mut self.zoom_in_start_scale, 0.0, 10.0);
        reader.f32_clamped("zoom_in_end_scale", &mut self.zoom_in_end_scale, 0.0, 10.0);
        reader.parse("disappear_animation", &mut self.disappear);
        reader.f32_clamped("disappear_duration", &mut self.disappear_duration, 0.0, 10.0);
        reader.f32_clamped("pop_duration", &mut self.pop_duration, 0.0, 10.0);
        reader.f32_clamped("fade_out_start_alpha", &mut self.fade_out_start_alpha, 0.0, 1.0);
        reader.f32_clamped("fade_out_end_alpha", &mut self.fade_out_end_alpha, 0.0, 1.0);
        reader.f32_clamped("zoom_out_start_scale", &mut self.zoom_out_start_scale, 0.0, 10.0);
        reader.f32_clamped("zoom_out_end_scale", &mut self.zoom_out_end_scale, 0.0, 10.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearPhase {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisappearPhase {
    Inactive,
    /// Started this tick, progress still at `DISAPPEAR_EPSILON`
    Triggered,
    InProgress,
    Complete,
}

/// Per-instance animation progress and the multipliers derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub appear_progress: f32,
    pub disappear_progress: f32,
    pub pop_progress: f32,
    /// Disappear variant currently running; `None` until triggered
    pub active_disappear: DisappearAnimation,
    pub alpha_multiplier: f32,
    pub scale_multiplier: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            appear_progress: 1.0,
            disappear_progress: 0.0,
            pop_progress: 0.0,
            active_disappear: DisappearAnimation::None,
            alpha_multiplier: 1.0,
            scale_multiplier: 1.0,
        }
    }
}

impl AnimationState {
    pub fn new(config: &AnimationConfig) -> Self {
        let mut state = Self {
            appear_progress: match config.appear {
                AppearAnimation::None => 1.0,
                _ => 0.0,
            },
            ..Default::default()
        };
        state.update_multipliers(config);
        state
    }

    pub fn is_disappearing(&self) -> bool {
        self.active_disappear != DisappearAnimation::None
    }

    /// Progress of whichever disappear axis is running
    pub fn exit_progress(&self) -> f32 {
        match self.active_disappear {
            DisappearAnimation::None => 0.0,
            DisappearAnimation::PopOut => self.pop_progress,
            _ => self.disappear_progress,
        }
    }

    pub fn appear_phase(&self) -> AppearPhase {
        match self.appear_progress {
            p if p >= 1.0 => AppearPhase::Complete,
            p if p > 0.0 => AppearPhase::InProgress,
            _ => AppearPhase::NotStarted,
        }
    }

    pub fn disappear_phase(&self) -> DisappearPhase {
        if !self.is_disappearing() {
            return DisappearPhase::Inactive;
        }
        match self.exit_progress() {
            p if p >= 1.0 => DisappearPhase::Complete,
            p if p <= DISAPPEAR_EPSILON => DisappearPhase::Triggered,
            _ => DisappearPhase::InProgress,
        }
    }

    /// Start the disappear axis. Returns true when it completed immediately.
    fn begin_disappear(&mut self, variant: DisappearAnimation, duration: f32) -> bool {
        if self.is_disappearing() || variant == DisappearAnimation::None {
            return false;
        }
        self.active_disappear = variant;
        let start = if duration <= 0.0 { 1.0 } else { DISAPPEAR_EPSILON };
        match variant {
            DisappearAnimation::PopOut => self.pop_progress = start,
            _ => self.disappear_progress = start,
        }
        start >= 1.0
    }

    /// Appear first, then disappear; a running disappear overwrites the
    /// multiplier appear wrote.
    fn update_multipliers(&mut self, config: &AnimationConfig) {
        self.alpha_multiplier = 1.0;
        self.scale_multiplier = 1.0;

        match config.appear {
            AppearAnimation::None => {}
            AppearAnimation::FadeIn => {
                self.alpha_multiplier = lerp_f32(
                    config.fade_in_start_alpha,
                    config.fade_in_end_alpha,
                    self.appear_progress,
                );
            }
            AppearAnimation::ZoomIn => {
                self.scale_multiplier = lerp_f32(
                    config.zoom_in_start_scale,
                    config.zoom_in_end_scale,
                    self.appear_progress,
                );
            }
        }

        match self.active_disappear {
            DisappearAnimation::None | DisappearAnimation::PopOut => {}
            DisappearAnimation::FadeOut => {
                self.alpha_multiplier = lerp_f32(
                    config.fade_out_start_alpha,
                    config.fade_out_end_alpha,
                    self.disappear_progress,
                );
            }
            DisappearAnimation::ZoomOut => {
                self.scale_multiplier = lerp_f32(
                    config.zoom_out_start_scale,
                    config.zoom_out_end_scale,
                    self.disappear_progress,
                );
            }
        }
    }
}

/// Advance `progress` by `dt / duration`, clamped to 1; zero duration completes at once
fn step(progress: f32, dt: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (progress + dt / duration).min(1.0)
}

/// Lifetime bookkeeping embedded in every instance record.
///
/// `lifetime > 0` is the only liveness test; a dead slot is free for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lifecycle {
    /// Seconds remaining
    pub lifetime: f32,
    /// Seconds at spawn
    pub max_lifetime: f32,
    pub anim: AnimationState,
}

impl Lifecycle {
    pub fn new(lifetime: f32, config: &AnimationConfig) -> Self {
        let lifetime = if lifetime.is_finite() { lifetime.max(0.0) } else { 0.0 };
        Self {
            lifetime,
            max_lifetime: lifetime,
            anim: AnimationState::new(config),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }

    /// Seconds since spawn
    pub fn age(&self) -> f32 {
        (self.max_lifetime - self.lifetime).max(0.0)
    }

    /// Normalized age in [0, 1]
    pub fn age_ratio(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            1.0
        } else {
            (self.age() / self.max_lifetime).clamp(0.0, 1.0)
        }
    }

    pub fn kill(&mut self) {
        self.lifetime = 0.0;
    }

    /// Start the configured disappear animation now, regardless of lifetime.
    /// With no disappear animation configured the instance dies at once.
    pub fn trigger_disappear(&mut self, config: &AnimationConfig) {
        if !self.is_alive() || self.anim.is_disappearing() {
            return;
        }
        if config.disappear == DisappearAnimation::None {
            self.kill();
            return;
        }
        let duration = config.disappear_duration_for(config.disappear);
        if self.anim.begin_disappear(config.disappear, duration) {
            self.kill();
        }
        self.anim.update_multipliers(config);
    }

    /// Pop the instance now, whatever disappear variant is configured
    pub fn trigger_pop(&mut self, config: &AnimationConfig) {
        if !self.is_alive() || self.anim.is_disappearing() {
            return;
        }
        if self
            .anim
            .begin_disappear(DisappearAnimation::PopOut, config.pop_duration)
        {
            self.kill();
        }
        self.anim.update_multipliers(config);
    }

    /// One tick of aging and animation
    pub fn advance(&mut self, dt: f32, config: &AnimationConfig) {
        if !self.is_alive() {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.lifetime = 0.0;
            return;
        }

        let anim = &mut self.anim;
        if anim.appear_progress < 1.0 {
            anim.appear_progress = step(anim.appear_progress, dt, config.appear_duration);
        }

        let running = anim.active_disappear;
        if running == DisappearAnimation::None {
            let duration = config.disappear_duration_for(config.disappear);
            if config.disappear != DisappearAnimation::None
                && self.lifetime <= duration + TRIGGER_TOLERANCE
                && anim.begin_disappear(config.disappear, duration)
            {
                self.lifetime = 0.0;
                return;
            }
        } else {
            let duration = config.disappear_duration_for(running);
            let progress = match running {
                DisappearAnimation::PopOut => &mut anim.pop_progress,
                _ => &mut anim.disappear_progress,
            };
            *progress = step(*progress, dt, duration);
            if *progress >= 1.0 {
                self.lifetime = 0.0;
                return;
            }
        }

        anim.update_multipliers(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop_config() -> AnimationConfig {
        AnimationConfig {
            appear: AppearAnimation::None,
            disappear: DisappearAnimation::PopOut,
            pop_duration: 0.24,
            ..Default::default()
        }
    }

    #[test]
    fn appear_starts_at_zero_and_rises() {
        let config = AnimationConfig::default();
        let mut life = Lifecycle::new(5.0, &config);
        assert_eq!(life.anim.appear_progress, 0.0);
        assert_eq!(life.anim.alpha_multiplier, 0.0);

        let mut last = 0.0;
        for _ in 0..20 {
            life.advance(0.02, &config);
            assert!(life.anim.appear_progress >= last);
            last = life.anim.appear_progress;
        }
        assert_eq!(life.anim.appear_progress, 1.0);
        assert!((life.anim.alpha_multiplier - 1.0).abs() < 1e-6);
    }

    #[test]
    fn no_appear_animation_starts_complete() {
        let life = Lifecycle::new(1.0, &AnimationConfig::instant());
        assert_eq!(life.anim.appear_progress, 1.0);
        assert_eq!(life.anim.alpha_multiplier, 1.0);
        assert_eq!(life.anim.scale_multiplier, 1.0);
    }

    #[test]
    fn lifetime_decreases_by_dt_until_dead() {
        let config = AnimationConfig::instant();
        let mut life = Lifecycle::new(1.0, &config);
        let dt = 1.0 / 60.0;
        let mut previous = life.lifetime;
        while life.is_alive() {
            life.advance(dt, &config);
            if life.is_alive() {
                assert!((previous - life.lifetime - dt).abs() < 1e-5);
            }
            previous = life.lifetime;
        }
        assert_eq!(life.lifetime, 0.0);
    }

    #[test]
    fn pop_triggers_at_remaining_duration() {
        let config = pop_config();
        let mut life = Lifecycle::new(0.3, &config);

        // 0.06s elapsed: lifetime 0.24, the pop begins this frame
        for _ in 0..2 {
            life.advance(0.02, &config);
            assert_eq!(life.anim.pop_progress, 0.0);
        }
        life.advance(0.02, &config);
        assert_eq!(life.anim.pop_progress, DISAPPEAR_EPSILON);
        assert_eq!(life.anim.active_disappear, DisappearAnimation::PopOut);

        let mut last = life.anim.pop_progress;
        while life.is_alive() {
            life.advance(0.02, &config);
            if life.is_alive() {
                assert!(life.anim.pop_progress > last);
                last = life.anim.pop_progress;
            }
        }
        // Pop only drives its own axis
        assert_eq!(life.anim.disappear_progress, 0.0);
    }

    #[test]
    fn disappear_completes_within_one_tick_of_duration() {
        let config = AnimationConfig {
            appear: AppearAnimation::None,
            disappear: DisappearAnimation::FadeOut,
            disappear_duration: 0.5,
            ..Default::default()
        };
        let dt = 1.0 / 60.0;
        let mut life = Lifecycle::new(2.0, &config);
        let mut elapsed = 0.0;
        let mut triggered_at = None;
        while life.is_alive() {
            life.advance(dt, &config);
            elapsed += dt;
            if triggered_at.is_none() && life.anim.is_disappearing() {
                triggered_at = Some(elapsed);
            }
        }
        let start = triggered_at.unwrap();
        let took = elapsed - start;
        assert!((took - 0.5).abs() <= dt + 1e-4, "took {took}");
    }

    #[test]
    fn external_trigger_kills_after_duration() {
        let config = AnimationConfig {
            disappear: DisappearAnimation::ZoomOut,
            disappear_duration: 0.1,
            ..Default::default()
        };
        let mut life = Lifecycle::new(10.0, &config);
        life.trigger_disappear(&config);
        assert!(life.anim.is_disappearing());
        let mut ticks = 0;
        while life.is_alive() {
            life.advance(0.01, &config);
            ticks += 1;
            assert!(ticks < 20);
        }
        assert!((9..=11).contains(&ticks));
    }

    #[test]
    fn zero_duration_disappear_is_instant() {
        let config = AnimationConfig {
            disappear: DisappearAnimation::FadeOut,
            disappear_duration: 0.0,
            ..Default::default()
        };
        let mut life = Lifecycle::new(10.0, &config);
        life.trigger_disappear(&config);
        assert!(!life.is_alive());

        let mut none = Lifecycle::new(10.0, &AnimationConfig::instant());
        none.trigger_disappear(&AnimationConfig::instant());
        assert!(!none.is_alive());
    }

    #[test]
    fn disappear_overrides_appear_multiplier() {
        let config = AnimationConfig {
            appear: AppearAnimation::FadeIn,
            appear_duration: 1.0,
            disappear: DisappearAnimation::FadeOut,
            disappear_duration: 1.0,
            ..Default::default()
        };
        let mut life = Lifecycle::new(10.0, &config);
        life.advance(0.5, &config);
        assert!((life.anim.alpha_multiplier - 0.5).abs() < 1e-5);

        // Mid fade-in, start the fade-out: its alpha (1 → 0) wins
        life.trigger_disappear(&config);
        life.advance(0.1, &config);
        let expected = 1.0 - (DISAPPEAR_EPSILON + 0.1);
        assert!((life.anim.alpha_multiplier - expected).abs() < 1e-4);
    }

    #[test]
    fn pop_trigger_ignores_configured_variant() {
        let config = AnimationConfig::default();
        let mut life = Lifecycle::new(3.0, &config);
        life.trigger_pop(&config);
        assert_eq!(life.anim.active_disappear, DisappearAnimation::PopOut);
        assert_eq!(life.anim.pop_progress, DISAPPEAR_EPSILON);
        // A second trigger does nothing
        life.trigger_disappear(&config);
        assert_eq!(life.anim.active_disappear, DisappearAnimation::PopOut);
    }

    #[test]
    fn settings_parse_variants_and_clamp() {
        let table: toml::value::Table = toml::from_str(
            "appear_animation = \"zoom_in\"\ndisappear_animation = \"pop_out\"\npop_duration = 50.0",
        )
        .unwrap();
        let mut config = AnimationConfig::default();
        config.apply_settings(&TableReader::new(&table));
        assert_eq!(config.appear, AppearAnimation::ZoomIn);
        assert_eq!(config.disappear, DisappearAnimation::PopOut);
        assert_eq!(config.pop_duration, 10.0);
    }

    #[test]
    fn phases_follow_both_axes() {
        let config = AnimationConfig::default();
        let mut life = Lifecycle::new(1.0, &config);
        assert_eq!(life.anim.appear_phase(), AppearPhase::NotStarted);
        assert_eq!(life.anim.disappear_phase(), DisappearPhase::Inactive);

        life.advance(0.05, &config);
        assert_eq!(life.anim.appear_phase(), AppearPhase::InProgress);

        while life.anim.disappear_phase() == DisappearPhase::Inactive {
            life.advance(0.05, &config);
        }
        assert_eq!(life.anim.appear_phase(), AppearPhase::Complete);
        assert_eq!(life.anim.disappear_phase(), DisappearPhase::Triggered);

        life.advance(0.05, &config);
        assert_eq!(life.anim.disappear_phase(), DisappearPhase::InProgress);
    }
}
