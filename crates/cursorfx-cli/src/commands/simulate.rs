//! Headless simulation command: run effects against scripted input and report counts

use super::script::{self, SimulationArgs};
use anyhow::Result;
use cursorfx_particles::effects::MissileCommand;

pub fn run(args: SimulationArgs) -> Result<()> {
    let sim = script::run(&args)?;

    println!(
        "Simulated {} frames ({:.2}s, {} fixed steps)",
        args.frames, sim.total_time, sim.fixed_steps
    );
    println!();
    println!("{:<18} {:>8} {:>10} {:>8}", "effect", "live", "spawned", "max");
    for effect in sim.summary() {
        println!(
            "{:<18} {:>8} {:>10} {:>8}",
            effect.name, effect.live, effect.spawned, effect.capacity
        );
    }

    if let Some(game) = sim.system.stack.effect::<MissileCommand>() {
        println!();
        println!(
            "Missile command: score {}, {} missiles destroyed, {} city hits",
            game.kind.score, game.kind.missiles_destroyed, game.kind.city_hits
        );
    }

    Ok(())
}
