//! The built-in effects and the registry that creates them by name

pub mod bubbles;
pub mod emoji;
pub mod lightning;
pub mod mandala;
pub mod missile;
pub mod sigils;
pub mod trail;

use crate::animation::Lifecycle;
use crate::effect::{DynEffect, Effect};
use crate::rand::ParticleRng;
use cursorfx_core::Color;
use serde::Serialize;

pub use bubbles::Bubbles;
pub use emoji::EmojiRain;
pub use lightning::Lightning;
pub use mandala::Mandala;
pub use missile::MissileCommand;
pub use sigils::Sigils;
pub use trail::Trail;

/// Closed set of effects the overlay can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectId {
    Bubbles,
    Lightning,
    Trail,
    Mandala,
    MissileCommand,
    EmojiRain,
    Sigils,
}

impl EffectId {
    pub const ALL: [EffectId; 7] = [
        EffectId::Bubbles,
        EffectId::Lightning,
        EffectId::Trail,
        EffectId::Mandala,
        EffectId::MissileCommand,
        EffectId::EmojiRain,
        EffectId::Sigils,
    ];

    /// Settings table and shader name
    pub fn name(self) -> &'static str {
        match self {
            EffectId::Bubbles => "bubbles",
            EffectId::Lightning => "lightning",
            EffectId::Trail => "trail",
            EffectId::Mandala => "mandala",
            EffectId::MissileCommand => "missile_command",
            EffectId::EmojiRain => "emoji_rain",
            EffectId::Sigils => "sigils",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EffectId::Bubbles => "iridescent bubbles that float up from the cursor path",
            EffectId::Lightning => "branching bolts on click and along fast movement",
            EffectId::Trail => "glowing dots that shrink and fade behind the cursor",
            EffectId::Mandala => "rotating sacred-geometry patterns dropped while moving",
            EffectId::MissileCommand => "intercept falling missiles with click-launched explosions",
            EffectId::EmojiRain => "procedural emoji tossed up and pulled down by gravity",
            EffectId::Sigils => "rune circles summoned with a mouse button",
        }
    }

    /// A fresh effect with default settings
    pub fn create(self, seed: u64) -> Box<dyn DynEffect> {
        match self {
            EffectId::Bubbles => Box::new(Effect::new(Bubbles::default(), seed)),
            EffectId::Lightning => Box::new(Effect::new(Lightning::default(), seed)),
            EffectId::Trail => Box::new(Effect::new(Trail::default(), seed)),
            EffectId::Mandala => Box::new(Effect::new(Mandala::default(), seed)),
            EffectId::MissileCommand => Box::new(Effect::new(MissileCommand::default(), seed)),
            EffectId::EmojiRain => Box::new(Effect::new(EmojiRain::default(), seed)),
            EffectId::Sigils => Box::new(Effect::new(Sigils::default(), seed)),
        }
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EffectId {
    type Err = cursorfx_core::FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| cursorfx_core::FxError::UnknownEffect(s.to_string()))
    }
}

/// Serialize an effect config into a settings table
pub(crate) fn settings_value<T: Serialize>(config: &T) -> toml::Value {
    toml::Value::try_from(config)
        .unwrap_or_else(|_| toml::Value::Table(toml::value::Table::new()))
}

/// Shift each RGB channel by up to `±jitter`
pub(crate) fn tint(rng: &mut ParticleRng, color: Color, jitter: f32) -> Color {
    if jitter <= 0.0 {
        return color;
    }
    Color::new(
        color.r + rng.range(-jitter, jitter),
        color.g + rng.range(-jitter, jitter),
        color.b + rng.range(-jitter, jitter),
        color.a,
    )
    .clamped()
}

/// Color with the animation alpha applied, as a GPU row
pub(crate) fn faded(color: Color, life: &Lifecycle) -> [f32; 4] {
    let mut rgba = color.to_array();
    rgba[3] *= life.anim.alpha_multiplier.clamp(0.0, 1.0);
    rgba
}

/// Size with the animation scale applied
pub(crate) fn scaled(size: f32, life: &Lifecycle) -> f32 {
    (size * life.anim.scale_multiplier).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursorfx_runtime::FrameInput;

    #[test]
    fn names_round_trip() {
        for id in EffectId::ALL {
            assert_eq!(id.name().parse::<EffectId>().unwrap(), id);
        }
        assert!("fireworks".parse::<EffectId>().is_err());
    }

    #[test]
    fn created_effects_report_their_kind() {
        for id in EffectId::ALL {
            let mut effect = id.create(7);
            assert_eq!(effect.name(), id.name());
            assert_eq!(effect.record_size() % 16, 0);
            assert_eq!(effect.upload_bytes().len(), effect.hard_max() * effect.record_size());
            effect.update(&FrameInput::at(cursorfx_core::Vec2::new(50.0, 50.0), 1.0 / 60.0));
            effect.pack();
            assert!(effect.packed_count() <= effect.hard_max());
        }
    }

    #[test]
    fn default_settings_are_tables() {
        for id in EffectId::ALL {
            let effect = id.create(1);
            assert!(effect.settings_toml().is_table(), "{id}");
        }
    }
}
