use std::collections::VecDeque;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::config::{CsvExportConfig, DataConfig, JsonExportConfig, OutputPaths, OutputToggles};
use crate::sampler::{TrajectoryPoint, Viewport, WheelParameters};

/// Fully resolved destinations for one run.
#[derive(Debug, Clone)]
pub struct OutputArtifacts {
    pub directory: PathBuf,
    pub trajectory_png: PathBuf,
    pub trajectory_svg: PathBuf,
    pub data_csv: PathBuf,
    pub data_json: PathBuf,
    pub frames_enabled: bool,
    pub frames_directory: PathBuf,
    pub frame_count: usize,
    pub toggles: OutputToggles,
    pub data: DataConfig,
}

pub fn resolve_artifacts(paths: &OutputPaths) -> OutputArtifacts {
    let directory = paths.directory.clone();

    OutputArtifacts {
        directory: directory.clone(),
        trajectory_png: resolve_path(&directory, &paths.trajectory_png),
        trajectory_svg: resolve_path(&directory, &paths.trajectory_svg),
        data_csv: resolve_path(&directory, &paths.data_csv),
        data_json: resolve_path(&directory, &paths.data_json),
        frames_enabled: paths.frames.enabled,
        frames_directory: resolve_path(&directory, &paths.frames.directory),
        frame_count: paths.frames.count,
        toggles: paths.toggles,
        data: paths.data.clone(),
    }
}

fn resolve_path(base: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base.join(relative)
    }
}

pub fn frame_path(frames_directory: &Path, tick: usize) -> PathBuf {
    frames_directory.join(format!("frame_{tick:04}.png"))
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create output directory {}", path.display()))?;
    }
    Ok(())
}

/// Metadata block written alongside the samples in the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub params: WheelParameters,
    pub final_time: f64,
    pub tick_count: usize,
    pub viewport: Viewport,
}

pub fn write_csv(
    path: &Path,
    points: &VecDeque<TrajectoryPoint>,
    config: &CsvExportConfig,
) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let fields = parse_sample_fields(&config.fields)?;
    if fields.is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create CSV file {}", path.display()))?;

    writer.write_record(fields.iter().map(|field| field.header()))?;

    for point in points {
        let row: Vec<String> = fields.iter().map(|field| field.format(point)).collect();
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write sample at x={:.6}", point.x))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV writer for {}", path.display()))
}

pub fn write_json(
    path: &Path,
    metadata: &RunMetadata,
    points: &VecDeque<TrajectoryPoint>,
    config: &JsonExportConfig,
) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let sample_fields = if config.include_samples {
        parse_sample_fields(&config.sample_fields)?
    } else {
        Vec::new()
    };

    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut root = serde_json::Map::new();

    if config.include_metadata {
        root.insert(
            "metadata".into(),
            serde_json::to_value(metadata)
                .context("Failed to serialize metadata for JSON export")?,
        );
    }

    if config.include_samples {
        if sample_fields.is_empty() {
            root.insert(
                "samples".into(),
                serde_json::to_value(points)
                    .context("Failed to serialize samples for JSON export")?,
            );
        } else {
            let mut json_samples = Vec::with_capacity(points.len());
            for point in points {
                let mut map = serde_json::Map::new();
                for field in &sample_fields {
                    map.insert(
                        field.header().into(),
                        serde_json::Number::from_f64(field.value(point))
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                    );
                }
                json_samples.push(serde_json::Value::Object(map));
            }
            root.insert("samples".into(), serde_json::Value::Array(json_samples));
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Unable to create JSON file {}", path.display()))?;

    serde_json::to_writer_pretty(file, &serde_json::Value::Object(root))
        .with_context(|| format!("Failed to write JSON payload to {}", path.display()))
}

#[derive(Debug, Clone, Copy)]
enum SampleField {
    X,
    Y,
}

impl SampleField {
    fn from_str(field: &str) -> Option<Self> {
        match field {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            _ => None,
        }
    }

    fn header(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }

    fn value(&self, point: &TrajectoryPoint) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }

    fn format(&self, point: &TrajectoryPoint) -> String {
        format!("{:.12e}", self.value(point))
    }
}

fn parse_sample_fields(fields: &[String]) -> Result<Vec<SampleField>> {
    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let trimmed = field.trim();
        let sample_field = SampleField::from_str(trimmed)
            .ok_or_else(|| anyhow!("Unsupported sample field '{}' in export config", trimmed))?;
        parsed.push(sample_field);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_export_field_is_rejected() {
        let fields = vec!["x".to_string(), "theta".to_string()];
        assert!(parse_sample_fields(&fields).is_err());
    }

    #[test]
    fn known_fields_keep_their_order() {
        let fields = vec!["y".to_string(), " x ".to_string()];
        let parsed = parse_sample_fields(&fields).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].header(), "y");
        assert_eq!(parsed[1].header(), "x");
    }

    #[test]
    fn frame_paths_are_zero_padded() {
        let path = frame_path(Path::new("frames"), 7);
        assert_eq!(path, Path::new("frames").join("frame_0007.png"));
    }
}
