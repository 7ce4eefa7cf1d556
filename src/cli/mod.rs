//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod render;
mod seasons;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::season::SeasonSelector;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Seasonfall - Render falling leaves and snow over seasonal scenery
#[derive(Parser)]
#[command(name = "seasonfall")]
#[command(about = "Seasonfall - Render falling leaves and snow over seasonal scenery")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that runs the simulation
#[derive(Args, Debug, Clone)]
pub struct SceneArgs {
    /// Season to show: auto, spring, summer, autumn or winter.
    /// Defaults to `[scene] season` from the config, then auto.
    #[arg(short, long)]
    pub season: Option<SeasonSelector>,

    /// Logical viewport width in CSS pixels (minimum 320)
    #[arg(long, default_value = "960")]
    pub width: u32,

    /// Logical viewport height in CSS pixels (minimum 320)
    #[arg(long, default_value = "540")]
    pub height: u32,

    /// Device pixel ratio, clamped to 1..=2
    #[arg(long, default_value = "1")]
    pub dpr: f64,

    /// Seed for the particle randomness. Random if omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "120", value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub frames: u32,

    /// Milliseconds between frames (default: `[scene] frame_interval_ms`)
    #[arg(long)]
    pub interval: Option<f64>,

    /// Directory the season image paths are resolved against
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Config file (default: seasonfall.toml discovered from the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide the leaves (snow still falls in winter)
    #[arg(long)]
    pub no_leaves: bool,

    /// Frame indices at which a pointer gust fires (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub gust_at: Vec<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the scene and write it as an animated GIF
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file or directory (ends with /).
        /// If omitted: {season}.gif
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Play the animation once instead of looping
        #[arg(long)]
        no_loop: bool,
    },

    /// Simulate the scene and write the final frame as PNG
    Snapshot {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file or directory (ends with /).
        /// If omitted: {season}.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the season table after config overrides
    Seasons {
        /// Config file (default: seasonfall.toml discovered from the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Install the fmt subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; ignore that case.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render { scene, output, no_loop } => render::run_render(&scene, output.as_deref(), !no_loop),
        Commands::Snapshot { scene, output } => render::run_snapshot(&scene, output.as_deref()),
        Commands::Seasons { config, json } => seasons::run_seasons(config.as_deref(), json),
    }
}
