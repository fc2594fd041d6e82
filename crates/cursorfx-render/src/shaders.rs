//! Per-effect WGSL, assembled from the shared frame/quad code, the SDF
//! library and the effect's own instance layout and entry points.

use crate::backend::BlendMode;

const COMMON: &str = include_str!("shaders/common.wgsl");
const SDF: &str = include_str!("shaders/sdf.wgsl");
const SHAPES: &str = include_str!("shaders/shapes.wgsl");
const PATTERNS: &str = include_str!("shaders/patterns.wgsl");
const GLYPHS: &str = include_str!("shaders/glyphs.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Quad vertices drawn per instance
pub const QUAD_VERTICES: u32 = 6;

pub struct EffectShader {
    /// Effect name, as reported by `DynEffect::name`
    pub name: &'static str,
    pub blend: BlendMode,
    parts: &'static [&'static str],
}

impl EffectShader {
    /// The complete shader module source
    pub fn source(&self) -> String {
        self.parts.join("\n")
    }
}

pub static EFFECT_SHADERS: [EffectShader; 7] = [
    EffectShader {
        name: "bubbles",
        blend: BlendMode::Alpha,
        parts: &[COMMON, SDF, SHAPES, include_str!("shaders/bubbles.wgsl")],
    },
    EffectShader {
        name: "lightning",
        blend: BlendMode::Additive,
        parts: &[COMMON, SDF, SHAPES, include_str!("shaders/lightning.wgsl")],
    },
    EffectShader {
        name: "trail",
        blend: BlendMode::Additive,
        parts: &[COMMON, SDF, include_str!("shaders/trail.wgsl")],
    },
    EffectShader {
        name: "mandala",
        blend: BlendMode::Additive,
        parts: &[COMMON, SDF, PATTERNS, include_str!("shaders/mandala.wgsl")],
    },
    EffectShader {
        name: "missile_command",
        blend: BlendMode::Alpha,
        parts: &[COMMON, SDF, include_str!("shaders/missile.wgsl")],
    },
    EffectShader {
        name: "emoji_rain",
        blend: BlendMode::Alpha,
        parts: &[COMMON, SDF, GLYPHS, include_str!("shaders/emoji.wgsl")],
    },
    EffectShader {
        name: "sigils",
        blend: BlendMode::Additive,
        parts: &[COMMON, SDF, SHAPES, include_str!("shaders/sigils.wgsl")],
    },
];

pub fn effect_shader(name: &str) -> Option<&'static EffectShader> {
    EFFECT_SHADERS.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursorfx_particles::EffectId;

    fn validate(label: &str, source: &str) {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => panic!("{label}: {}", err.emit_to_string(source)),
        };
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        if let Err(err) = validator.validate(&module) {
            panic!("{label}: {}", err.emit_to_string(source));
        }
        for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
            assert!(
                module.entry_points.iter().any(|e| e.name == entry),
                "{label}: missing {entry}"
            );
        }
    }

    #[test]
    fn every_effect_has_a_shader() {
        for id in EffectId::ALL {
            assert!(effect_shader(id.name()).is_some(), "{}", id.name());
        }
        assert!(effect_shader("fireworks").is_none());
    }

    #[test]
    fn effect_shaders_validate() {
        for shader in &EFFECT_SHADERS {
            validate(shader.name, &shader.source());
        }
    }

    #[test]
    fn instance_structs_match_record_sizes() {
        use cursorfx_particles::effects::{bubbles, emoji, lightning, mandala, missile, sigils, trail};
        let expected = [
            ("bubbles", std::mem::size_of::<bubbles::BubbleGpu>()),
            ("lightning", std::mem::size_of::<lightning::BoltGpu>()),
            ("trail", std::mem::size_of::<trail::TrailGpu>()),
            ("mandala", std::mem::size_of::<mandala::MandalaGpu>()),
            ("missile_command", std::mem::size_of::<missile::MissileGpu>()),
            ("emoji_rain", std::mem::size_of::<emoji::EmojiGpu>()),
            ("sigils", std::mem::size_of::<sigils::SigilGpu>()),
        ];
        for (name, size) in expected {
            let source = effect_shader(name).map(|s| s.source()).unwrap_or_default();
            let module = naga::front::wgsl::parse_str(&source).unwrap();
            let instance = module
                .types
                .iter()
                .find(|(_, ty)| {
                    ty.name
                        .as_deref()
                        .is_some_and(|n| n.ends_with("Instance"))
                })
                .map(|(_, ty)| ty.inner.size(module.to_ctx()));
            assert_eq!(instance, Some(size as u32), "{name}");
        }
    }
}
