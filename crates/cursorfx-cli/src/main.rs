//! cursorfx CLI - run and preview cursor overlay effects headlessly

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::script::{CursorPath, Script, SimulationArgs};
use commands::{defaults, effects, render, simulate};
use cursorfx_runtime::MouseButton;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cursorfx")]
#[command(about = "Cursor-following overlay effects: simulate, render and configure", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SimulationOpts {
    /// Settings file (TOML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Effect to enable; repeat for several. Overrides the settings file
    #[arg(short, long = "effect")]
    effects: Vec<String>,

    /// Random seed override
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(long, default_value = "300")]
    frames: u32,

    /// Frames per second of the scripted run
    #[arg(long, default_value = "60")]
    fps: f32,

    /// Scripted cursor movement
    #[arg(long, value_enum, default_value = "circle")]
    path: CursorPath,

    /// Click every N frames
    #[arg(long)]
    click_every: Option<u32>,

    /// Button used for scripted clicks (left, right or middle)
    #[arg(long, default_value = "left", value_parser = parse_button)]
    button: MouseButton,

    /// Screen width in pixels
    #[arg(long, default_value = "1920")]
    width: u32,

    /// Screen height in pixels
    #[arg(long, default_value = "1080")]
    height: u32,
}

impl SimulationOpts {
    fn into_args(self) -> SimulationArgs {
        SimulationArgs {
            settings: self.settings,
            effects: self.effects,
            seed: self.seed,
            frames: self.frames,
            script: Script {
                path: self.path,
                width: self.width.max(1) as f32,
                height: self.height.max(1) as f32,
                fps: self.fps,
                click_every: self.click_every,
                button: self.button,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run effects against scripted cursor input and print counts
    Simulate(SimulationOpts),

    /// Simulate, then render the final frame to a PNG image (headless)
    Render {
        #[command(flatten)]
        simulation: SimulationOpts,

        /// Output image path
        #[arg(short, long, default_value = "overlay.png")]
        output: PathBuf,

        /// Background image, also used as the screen capture for refraction
        #[arg(long)]
        background: Option<PathBuf>,
    },

    /// Print a settings file with every effect at its defaults
    Defaults {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the built-in effects
    Effects,
}

fn parse_button(s: &str) -> Result<MouseButton, String> {
    s.parse()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(opts) => simulate::run(opts.into_args()),
        Commands::Render {
            simulation,
            output,
            background,
        } => render::run(render::RenderArgs {
            simulation: simulation.into_args(),
            output,
            background,
        }),
        Commands::Defaults { output } => defaults::run(output.as_deref()),
        Commands::Effects => effects::run(),
    }
}
