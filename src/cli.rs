use std::path::PathBuf;

use clap::Parser;

/// Command line options for the wheel trajectory renderer.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cycloid trajectory of a point on a rolling wheel")]
pub struct CliOptions {
    /// Path to the simulation TOML configuration file.
    #[arg(long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Override the wheel radius from the configuration, in meters.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Override the wheel velocity from the configuration, in m/s.
    #[arg(long, allow_negative_numbers = true)]
    pub velocity: Option<f64>,

    /// Override the animation duration from the configuration, in seconds.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Display configuration summary without running the animation.
    #[arg(long)]
    pub dry_run: bool,
}
