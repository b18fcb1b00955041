use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::sampler::WheelParameters;

#[derive(Debug, Deserialize)]
struct ConfigRoot {
    #[serde(default)]
    experiment: Option<String>,
    #[serde(default)]
    wheel: WheelSection,
    animation: AnimationSection,
    output: OutputSection,
}

#[derive(Debug, Deserialize)]
struct WheelSection {
    #[serde(default = "default_radius")]
    radius: f64,
    #[serde(default = "default_velocity")]
    velocity: f64,
}

impl Default for WheelSection {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            velocity: default_velocity(),
        }
    }
}

// Fallbacks mirror what the interactive reference substitutes for blank or
// unparseable inputs.
fn default_radius() -> f64 {
    1.0
}

fn default_velocity() -> f64 {
    1.0
}

fn default_duration() -> f64 {
    10.0
}

#[derive(Debug, Deserialize)]
struct AnimationSection {
    time_step: f64,
    max_points: usize,
    #[serde(default = "default_duration")]
    duration: f64,
    #[serde(default)]
    tick_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    directory: PathBuf,
    trajectory_png: PathBuf,
    trajectory_svg: PathBuf,
    data_csv: PathBuf,
    data_json: PathBuf,
    #[serde(default)]
    frames: FramesSection,
    #[serde(default)]
    toggles: TogglesSection,
    #[serde(default)]
    data: DataSection,
}

#[derive(Debug, Deserialize)]
struct FramesSection {
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_frames_directory")]
    directory: PathBuf,
    #[serde(default = "default_frame_count")]
    count: usize,
}

impl Default for FramesSection {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_frames_directory(),
            count: default_frame_count(),
        }
    }
}

fn default_frames_directory() -> PathBuf {
    PathBuf::from("frames")
}

fn default_frame_count() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct TogglesSection {
    #[serde(default = "default_true")]
    png: bool,
    #[serde(default = "default_true")]
    svg: bool,
    #[serde(default = "default_true")]
    csv: bool,
    #[serde(default = "default_true")]
    json: bool,
}

impl Default for TogglesSection {
    fn default() -> Self {
        Self {
            png: true,
            svg: true,
            csv: true,
            json: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Default)]
struct DataSection {
    #[serde(default)]
    csv: CsvDataSection,
    #[serde(default)]
    json: JsonDataSection,
}

#[derive(Debug, Deserialize)]
struct CsvDataSection {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_sample_fields")]
    fields: Vec<String>,
}

impl Default for CsvDataSection {
    fn default() -> Self {
        Self {
            enabled: true,
            fields: default_sample_fields(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonDataSection {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_true")]
    include_metadata: bool,
    #[serde(default = "default_true")]
    include_samples: bool,
    #[serde(default = "default_sample_fields")]
    sample_fields: Vec<String>,
}

impl Default for JsonDataSection {
    fn default() -> Self {
        Self {
            enabled: true,
            include_metadata: true,
            include_samples: true,
            sample_fields: default_sample_fields(),
        }
    }
}

fn default_sample_fields() -> Vec<String> {
    vec!["x".into(), "y".into()]
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub experiment: Option<String>,
    pub params: WheelParameters,
    /// Wall-clock delay between ticks; zero runs the loop flat out.
    pub tick_interval_ms: u64,
    pub output: OutputPaths,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub directory: PathBuf,
    pub trajectory_png: PathBuf,
    pub trajectory_svg: PathBuf,
    pub data_csv: PathBuf,
    pub data_json: PathBuf,
    pub frames: FramesConfig,
    pub toggles: OutputToggles,
    pub data: DataConfig,
}

#[derive(Debug, Clone)]
pub struct FramesConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputToggles {
    pub png: bool,
    pub svg: bool,
    pub csv: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub csv: CsvExportConfig,
    pub json: JsonExportConfig,
}

#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    pub enabled: bool,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JsonExportConfig {
    pub enabled: bool,
    pub include_metadata: bool,
    pub include_samples: bool,
    pub sample_fields: Vec<String>,
}

impl SimulationConfig {
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(tag) = &self.experiment {
            lines.push(format!("experiment: {tag}"));
        }
        lines.push(format!(
            "wheel: radius = {:.3} m, velocity = {:.3} m/s",
            self.params.radius, self.params.velocity
        ));
        lines.push(format!(
            "animation: dt = {:.3} s, duration = {:.3} s, window = {} points",
            self.params.time_step, self.params.animation_duration, self.params.max_points
        ));
        lines.push(format!("output: {}", self.output.directory.display()));
        lines
    }
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<SimulationConfig> {
    let raw = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
    load_from_str(&raw)
}

pub fn load_from_str(raw: &str) -> Result<SimulationConfig> {
    let parsed: ConfigRoot =
        toml::from_str(raw).context("Failed to parse simulation configuration")?;

    if parsed.animation.time_step <= 0.0 {
        return Err(anyhow!("Time step must be positive"));
    }
    if parsed.animation.max_points == 0 {
        return Err(anyhow!("The point window must hold at least one sample"));
    }
    if parsed.animation.duration < 0.0 {
        return Err(anyhow!("Animation duration must be non-negative"));
    }

    Ok(SimulationConfig {
        experiment: parsed.experiment,
        params: WheelParameters {
            radius: parsed.wheel.radius,
            velocity: parsed.wheel.velocity,
            time_step: parsed.animation.time_step,
            max_points: parsed.animation.max_points,
            animation_duration: parsed.animation.duration,
        },
        tick_interval_ms: parsed.animation.tick_interval_ms,
        output: OutputPaths {
            directory: parsed.output.directory,
            trajectory_png: parsed.output.trajectory_png,
            trajectory_svg: parsed.output.trajectory_svg,
            data_csv: parsed.output.data_csv,
            data_json: parsed.output.data_json,
            frames: FramesConfig {
                enabled: parsed.output.frames.enabled,
                directory: parsed.output.frames.directory,
                count: parsed.output.frames.count,
            },
            toggles: OutputToggles {
                png: parsed.output.toggles.png,
                svg: parsed.output.toggles.svg,
                csv: parsed.output.toggles.csv,
                json: parsed.output.toggles.json,
            },
            data: DataConfig {
                csv: CsvExportConfig {
                    enabled: parsed.output.data.csv.enabled,
                    fields: parsed.output.data.csv.fields,
                },
                json: JsonExportConfig {
                    enabled: parsed.output.data.json.enabled,
                    include_metadata: parsed.output.data.json.include_metadata,
                    include_samples: parsed.output.data.json.include_samples,
                    sample_fields: parsed.output.data.json.sample_fields,
                },
            },
        },
    })
}
