//! Triangular mel filter bank over the one-sided FFT bins.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Row scaling of the triangular filters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MelNorm {
    /// Every row peaks at exactly 1.0 on its center bin
    #[default]
    Peak,
    /// Rows scaled by `2 / (right_hz - left_hz)` so each band carries equal area
    Area,
}

/// Mel filter matrix of shape `n_mels x (nfft / 2 + 1)`
#[derive(Clone, Debug, Serialize)]
pub struct MelFilterBank {
    weights: Vec<Vec<f64>>,
    /// `n_mels + 2` band edges in Hz, from 0 to Nyquist
    hz_points: Vec<f64>,
    /// FFT bin of every band edge
    bins: Vec<usize>,
    sample_rate: u32,
    nfft: usize,
    norm: MelNorm,
}

pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, nfft: usize, n_mels: usize, norm: MelNorm) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if nfft == 0 {
            return Err(Error::InvalidConfig("nfft must be positive".into()));
        }
        if n_mels == 0 {
            return Err(Error::InvalidConfig("n_mels must be positive".into()));
        }

        let num_bins = nfft / 2 + 1;
        let nyquist = sample_rate as f64 / 2.0;

        let mel_max = hz_to_mel(nyquist);
        let hz_points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let bins: Vec<usize> = hz_points
            .iter()
            .map(|&hz| {
                let bin = ((nfft as f64 + 1.0) * hz / sample_rate as f64).floor() as usize;
                bin.min(num_bins - 1)
            })
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (bins[m], bins[m + 1], bins[m + 2]);
                let mut row = vec![0.0; num_bins];

                for (k, w) in row.iter_mut().enumerate().take(center).skip(left) {
                    *w = (k - left) as f64 / (center - left) as f64;
                }
                row[center] = 1.0;
                for (k, w) in row.iter_mut().enumerate().take(right + 1).skip(center + 1) {
                    *w = (right - k) as f64 / (right - center) as f64;
                }

                if norm == MelNorm::Area {
                    let scale = 2.0 / (hz_points[m + 2] - hz_points[m]);
                    row.iter_mut().for_each(|w| *w *= scale);
                }
                row
            })
            .collect();

        log::debug!(
            "Mel filter bank: {} bands x {} bins, {}Hz, {:?} norm",
            n_mels,
            num_bins,
            sample_rate,
            norm
        );

        Ok(Self {
            weights,
            hz_points,
            bins,
            sample_rate,
            nfft,
            norm,
        })
    }

    pub fn n_mels(&self) -> usize {
        self.weights.len()
    }

    pub fn num_bins(&self) -> usize {
        self.nfft / 2 + 1
    }

    pub fn norm(&self) -> MelNorm {
        self.norm
    }

    /// Filter weights, one row per mel band
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// `(left, center, right)` FFT bins of band `m`
    pub fn band_bins(&self, m: usize) -> (usize, usize, usize) {
        (self.bins[m], self.bins[m + 1], self.bins[m + 2])
    }

    /// Center frequency of every band in Hz
    pub fn center_frequencies(&self) -> &[f64] {
        &self.hz_points[1..self.hz_points.len() - 1]
    }

    /// Project each power spectrum onto the bank and log-compress: `ln(P . F^T + epsilon)`.
    ///
    /// NaN or infinite power values are carried through, not sanitized.
    pub fn apply(&self, power_spectra: &[Vec<f64>], epsilon: f64) -> Result<Vec<Vec<f64>>> {
        let num_bins = self.num_bins();
        if let Some(bad) = power_spectra.iter().find(|p| p.len() != num_bins) {
            return Err(Error::ShapeMismatch(format!(
                "power spectrum has {} bins, filter bank expects {}",
                bad.len(),
                num_bins
            )));
        }

        Ok(power_spectra
            .iter()
            .map(|power| {
                self.weights
                    .iter()
                    .map(|row| {
                        let energy: f64 = row.iter().zip(power).map(|(w, p)| w * p).sum();
                        (energy + epsilon).ln()
                    })
                    .collect()
            })
            .collect())
    }
}
