//! List the built-in effects

use anyhow::Result;
use cursorfx_particles::EffectId;

pub fn run() -> Result<()> {
    for id in EffectId::ALL {
        let effect = id.create(0);
        println!(
            "{:<18} max {:>4}  {}",
            id.name(),
            effect.hard_max(),
            id.description()
        );
    }
    Ok(())
}
