use cepstra::{FramingParams, MelNorm, PipelineConfig};
use serde::Deserialize;
use std::path::Path;

use crate::cli::OutputFormat;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub framing: FramingConfig,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct FramingConfig {
    #[serde(default = "default_frame_ms")]
    pub frame_duration_ms: f64,
    #[serde(default = "default_overlap")]
    pub overlap_percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_nfft")]
    pub nfft: usize,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
    #[serde(default = "default_num_ceps")]
    pub num_ceps: usize,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub mel_norm: MelNorm,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioConfig {
    /// Target rate in Hz; absent keeps the file's own rate
    #[serde(default)]
    pub resample_rate: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub spectrogram: bool,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: default_frame_ms(),
            overlap_percent: default_overlap(),
        }
    }
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            nfft: default_nfft(),
            n_mels: default_n_mels(),
            num_ceps: default_num_ceps(),
            epsilon: default_epsilon(),
            mel_norm: MelNorm::default(),
        }
    }
}

impl From<&FramingConfig> for FramingParams {
    fn from(cfg: &FramingConfig) -> Self {
        FramingParams {
            frame_duration_ms: cfg.frame_duration_ms,
            overlap_percent: cfg.overlap_percent,
        }
    }
}

impl From<&PipelineSection> for PipelineConfig {
    fn from(cfg: &PipelineSection) -> Self {
        PipelineConfig {
            nfft: cfg.nfft,
            n_mels: cfg.n_mels,
            num_ceps: cfg.num_ceps,
            epsilon: cfg.epsilon,
            mel_norm: cfg.mel_norm,
        }
    }
}

fn default_frame_ms() -> f64 { FramingParams::default().frame_duration_ms }
fn default_overlap() -> f64 { FramingParams::default().overlap_percent }
fn default_nfft() -> usize { PipelineConfig::default().nfft }
fn default_n_mels() -> usize { PipelineConfig::default().n_mels }
fn default_num_ceps() -> usize { PipelineConfig::default().num_ceps }
fn default_epsilon() -> f64 { PipelineConfig::default().epsilon }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::debug!("Config parse error in {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(FramingParams::from(&cfg.framing), FramingParams::default());
        assert_eq!(PipelineConfig::from(&cfg.pipeline), PipelineConfig::default());
        assert_eq!(cfg.audio.resample_rate, None);
        assert_eq!(cfg.output.format, OutputFormat::Summary);
        assert!(!cfg.output.spectrogram);
    }

    #[test]
    fn test_partial_sections_fill_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [framing]
            frame_duration_ms = 30

            [pipeline]
            n_mels = 40
            mel_norm = "area"

            [audio]
            resample_rate = 16000

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.framing.frame_duration_ms, 30.0);
        assert_eq!(cfg.framing.overlap_percent, 50.0);
        assert_eq!(cfg.pipeline.n_mels, 40);
        assert_eq!(cfg.pipeline.num_ceps, 13);
        assert_eq!(cfg.pipeline.mel_norm, MelNorm::Area);
        assert_eq!(cfg.audio.resample_rate, Some(16000));
        assert_eq!(cfg.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_file_yields_none() {
        assert!(load_config(Path::new("/nonexistent/cepstra.toml")).is_none());
    }
}
