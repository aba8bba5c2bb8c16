use cepstra::MelNorm;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "cepstra", about = "MFCC feature extraction for speech and audio files")]
pub struct Cli {
    /// Input audio files (WAV, FLAC, MP3, OGG); several files are processed in parallel
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (defaults to ./cepstra.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frame duration in milliseconds
    #[arg(long)]
    pub frame_ms: Option<f64>,

    /// Overlap between consecutive frames in percent (0-100, exclusive)
    #[arg(long)]
    pub overlap: Option<f64>,

    /// Number of mel filters
    #[arg(long)]
    pub n_mels: Option<usize>,

    /// Number of cepstral coefficients (1..n_mels)
    #[arg(long)]
    pub num_ceps: Option<usize>,

    /// FFT size
    #[arg(long)]
    pub nfft: Option<usize>,

    /// Offset added to mel energies before the log
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Resample before analysis: a rate in Hz, or "original"
    #[arg(long)]
    pub resample: Option<ResampleTarget>,

    /// Mel filter row normalization
    #[arg(long, value_enum)]
    pub mel_norm: Option<MelNorm>,

    /// Output rendering on stdout
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Include the dB spectrogram in the output
    #[arg(long)]
    pub spectrogram: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResampleTarget {
    Original,
    Rate(u32),
}

impl ResampleTarget {
    pub fn rate(self) -> Option<u32> {
        match self {
            ResampleTarget::Original => None,
            ResampleTarget::Rate(rate) => Some(rate),
        }
    }
}

impl FromStr for ResampleTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("original") {
            return Ok(ResampleTarget::Original);
        }
        s.parse::<u32>()
            .map(ResampleTarget::Rate)
            .map_err(|_| format!("expected a sample rate in Hz or \"original\", got '{}'", s))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable shape and statistics
    #[default]
    Summary,
    /// Every numeric artifact as JSON
    Json,
}
