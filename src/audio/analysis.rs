use serde::{Deserialize, Serialize};

use super::cepstrum::compute_mfcc;
use super::features::{FramingParams, Waveform};
use super::framing::frame_blocking;
use super::mel::{MelFilterBank, MelNorm};
use super::spectrum::{apply_window, compute_power_spectrum, frequency_axis};
use crate::error::{Error, Result};

/// Numeric settings shared by the spectral, mel and cepstral stages
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub nfft: usize,
    pub n_mels: usize,
    pub num_ceps: usize,
    pub epsilon: f64,
    pub mel_norm: MelNorm,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            nfft: 512,
            n_mels: 20,
            num_ceps: 13,
            epsilon: 1e-9,
            mel_norm: MelNorm::Peak,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.nfft == 0 {
            return Err(Error::InvalidConfig("nfft must be positive".into()));
        }
        if self.n_mels == 0 {
            return Err(Error::InvalidConfig("n_mels must be positive".into()));
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if self.num_ceps == 0 || self.num_ceps >= self.n_mels {
            return Err(Error::InvalidCoefficientCount {
                num_ceps: self.num_ceps,
                n_mels: self.n_mels,
            });
        }
        Ok(())
    }
}

/// Everything one pipeline run produces, for display by an external shell
#[derive(Clone, Debug, Serialize)]
pub struct MfccAnalysis {
    pub sample_rate: u32,
    pub frame_size: usize,
    pub hop_size: usize,
    pub num_frames: usize,
    /// Normalized amplitude, one value per sample
    pub waveform: Vec<f64>,
    /// Time in seconds of each waveform sample, 0 to `len / sample_rate`
    pub time_axis: Vec<f64>,
    /// Power of the first frame, `nfft/2 + 1` bins
    pub first_frame_power: Vec<f64>,
    /// Frequency in Hz of each power bin
    pub frequency_axis: Vec<f64>,
    /// Filter weights, `n_mels x (nfft/2 + 1)`
    pub mel_filters: MelFilterBank,
    /// Log mel energies, `num_frames x n_mels`
    pub mel_energy: Vec<Vec<f64>>,
    /// Cepstral coefficients 1..=num_ceps, `num_frames x num_ceps`
    pub mfcc: Vec<Vec<f64>>,
}

impl MfccAnalysis {
    pub fn num_ceps(&self) -> usize {
        self.mfcc.first().map_or(0, |row| row.len())
    }
}

/// Run framing, windowing, power spectrum, mel projection and DCT over one waveform.
pub fn analyze(
    waveform: &Waveform,
    framing: &FramingParams,
    config: &PipelineConfig,
) -> Result<MfccAnalysis> {
    config.validate()?;
    if waveform.sample_rate == 0 {
        return Err(Error::InvalidSampleRate(waveform.sample_rate));
    }

    let sr = waveform.sample_rate;
    let (frame_size, hop_size) = framing.sizes(sr)?;

    log::info!(
        "Framing: {}ms / {}% overlap -> frame_size={}, hop_size={}",
        framing.frame_duration_ms,
        framing.overlap_percent,
        frame_size,
        hop_size
    );
    let frames = frame_blocking(&waveform.samples, frame_size, hop_size)?;
    let num_frames = frames.len();
    if frame_size > config.nfft {
        log::warn!(
            "frame_size {} exceeds nfft {}, frames are truncated before the FFT",
            frame_size,
            config.nfft
        );
    }

    log::debug!("Windowing and FFT ({} frames, nfft={})...", num_frames, config.nfft);
    let windowed = apply_window(&frames);
    let power = compute_power_spectrum(&windowed, config.nfft)?;

    log::debug!("Mel filtering ({} bands)...", config.n_mels);
    let mel_filters = MelFilterBank::new(sr, config.nfft, config.n_mels, config.mel_norm)?;
    let mel_energy = mel_filters.apply(&power, config.epsilon)?;

    log::debug!("DCT ({} coefficients)...", config.num_ceps);
    let mfcc = compute_mfcc(&mel_energy, config.n_mels, config.num_ceps)?;

    log::info!("MFCC matrix: {} frames x {} coefficients", num_frames, config.num_ceps);

    Ok(MfccAnalysis {
        sample_rate: sr,
        frame_size,
        hop_size,
        num_frames,
        waveform: waveform.samples.clone(),
        time_axis: waveform.time_axis(),
        first_frame_power: power.into_iter().next().unwrap_or_default(),
        frequency_axis: frequency_axis(sr, config.nfft),
        mel_filters,
        mel_energy,
        mfcc,
    })
}
