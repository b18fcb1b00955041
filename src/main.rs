use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

use anyhow::{Result, anyhow};
use clap::Parser;

use wheel_trajectory::cli::CliOptions;
use wheel_trajectory::config::{self, SimulationConfig};
use wheel_trajectory::driver::AnimationDriver;
use wheel_trajectory::output::{
    RunMetadata, ensure_directory, frame_path, resolve_artifacts, write_csv, write_json,
};
use wheel_trajectory::plotting::{render_frame, render_trajectory};
use wheel_trajectory::sampler::TrajectorySampler;

fn main() -> Result<()> {
    let cli = CliOptions::parse();

    let config_path = normalize_config_path(&cli.config)?;
    let mut config = config::load_from_file(&config_path)?;
    apply_overrides(&cli, &mut config)?;

    println!("Configuration summary:");
    for line in config.summary_lines() {
        println!("  - {line}");
    }

    if cli.dry_run {
        println!("Dry-run requested; exiting without running the animation.");
        return Ok(());
    }

    let artifacts = resolve_artifacts(&config.output);
    ensure_directory(&artifacts.directory)?;
    if artifacts.frames_enabled {
        ensure_directory(&artifacts.frames_directory)?;
    }

    let expected_ticks = (config.params.animation_duration / config.params.time_step).ceil() as usize;
    let schedule = if artifacts.frames_enabled {
        build_frame_schedule(expected_ticks, artifacts.frame_count)
    } else {
        Vec::new()
    };
    let mut pending_frames: VecDeque<usize> = schedule.into_iter().collect();
    if !pending_frames.is_empty() {
        println!(
            "Animation: ~{expected_ticks} ticks, {} frames scheduled",
            pending_frames.len()
        );
    }

    let start = Instant::now();
    let sampler = TrajectorySampler::new(config.params);
    let mut driver = AnimationDriver::new(sampler, config.tick_interval_ms);

    let frames_directory = artifacts.frames_directory.clone();
    let ticks = driver.run(|tick, state| {
        if let Some(&target) = pending_frames.front() {
            if tick == target {
                render_frame(state, &frame_path(&frames_directory, tick))?;
                pending_frames.pop_front();
            }
        }
        Ok(())
    })?;

    let sampler = driver.into_sampler();
    let metadata = RunMetadata {
        params: *sampler.params(),
        final_time: sampler.current_time(),
        tick_count: ticks,
        viewport: sampler.viewport(),
    };

    if artifacts.toggles.csv {
        write_csv(&artifacts.data_csv, sampler.points(), &artifacts.data.csv)?;
    }
    if artifacts.toggles.json {
        write_json(
            &artifacts.data_json,
            &metadata,
            sampler.points(),
            &artifacts.data.json,
        )?;
    }
    render_trajectory(&sampler, &artifacts)?;

    println!(
        "Animation finished in {:.3?}: {} ticks, {} points retained (t = {:.3} s).",
        start.elapsed(),
        ticks,
        sampler.points().len(),
        sampler.current_time()
    );
    println!("Results stored in {}", artifacts.directory.display());

    Ok(())
}

fn normalize_config_path(path: &Path) -> Result<std::path::PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    Err(anyhow!(
        "configuration file {} does not exist",
        path.display()
    ))
}

fn apply_overrides(cli: &CliOptions, config: &mut SimulationConfig) -> Result<()> {
    if let Some(radius) = cli.radius {
        config.params.radius = radius;
    }
    if let Some(velocity) = cli.velocity {
        config.params.velocity = velocity;
    }
    if let Some(duration) = cli.duration {
        if duration < 0.0 {
            return Err(anyhow!("Animation duration override must be non-negative"));
        }
        config.params.animation_duration = duration;
    }
    Ok(())
}

fn build_frame_schedule(total_ticks: usize, frames: usize) -> Vec<usize> {
    if frames == 0 || total_ticks == 0 {
        return Vec::new();
    }
    if frames == 1 {
        return vec![total_ticks];
    }

    let mut schedule = Vec::with_capacity(frames);
    let denom = (frames - 1) as f64;
    for i in 0..frames {
        let tick = 1 + ((i as f64 / denom) * (total_ticks - 1) as f64).round() as usize;
        if schedule.last().copied() != Some(tick) {
            schedule.push(tick);
        }
    }
    schedule
}
