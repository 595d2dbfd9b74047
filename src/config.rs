use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub band: BandConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

#[derive(Debug, Deserialize)]
pub struct BandConfig {
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            smoothing: default_smoothing(),
            threshold: default_threshold(),
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            min_frequency: default_min_frequency(),
            max_frequency: default_max_frequency(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            format: OutputFormat::default(),
        }
    }
}

fn default_resolution() -> u32 { pitchscope::audio::analyzer::DEFAULT_RESOLUTION }
fn default_smoothing() -> f32 { pitchscope::audio::analyzer::DEFAULT_SMOOTHING }
fn default_threshold() -> f32 { pitchscope::audio::peaks::DEFAULT_PEAK_THRESHOLD }
fn default_min_frequency() -> f64 { pitchscope::audio::scale::MIN_FREQUENCY }
fn default_max_frequency() -> f64 { pitchscope::audio::scale::MAX_FREQUENCY }
fn default_fps() -> u32 { 30 }

/// `pitchscope.toml` in the working directory, then the per-user config.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("pitchscope.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("pitchscope").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("pitchscope").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::debug!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.resolution, 12);
        assert_eq!(config.analysis.smoothing, 0.8);
        assert_eq!(config.analysis.threshold, 0.1);
        assert_eq!(config.band.min_frequency, 27.5);
        assert_eq!(config.band.max_frequency, 4200.0);
        assert_eq!(config.output.fps, 30);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            resolution = 14

            [band]
            max_frequency = 2000.0

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.resolution, 14);
        assert_eq!(config.analysis.smoothing, 0.8);
        assert_eq!(config.band.min_frequency, 27.5);
        assert_eq!(config.band.max_frequency, 2000.0);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn missing_or_invalid_file() {
        assert!(load_config(Path::new("/nonexistent/pitchscope.toml")).is_none());

        let path = std::env::temp_dir().join("pitchscope-invalid-config.toml");
        std::fs::write(&path, "[analysis]\nresolution = \"high\"\n").unwrap();
        assert!(load_config(&path).is_none());
        let _ = std::fs::remove_file(&path);
    }
}
