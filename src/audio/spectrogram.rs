use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{Error, Result};

pub const DEFAULT_N_FFT: usize = 2048;
pub const DEFAULT_HOP: usize = 512;

const AMIN: f64 = 1e-5;
const TOP_DB: f64 = 80.0;

/// Magnitude spectrogram in dB relative to its loudest cell, shape `(frames, n_fft/2 + 1)`.
///
/// Frames are centered: the signal is zero-padded by `n_fft/2` on both sides, so there
/// are `1 + len / hop` of them. Values are floored `TOP_DB` below the maximum.
pub fn spectrogram_db(samples: &[f64], n_fft: usize, hop: usize) -> Result<Vec<Vec<f64>>> {
    if n_fft == 0 || hop == 0 {
        return Err(Error::InvalidConfig(format!(
            "spectrogram needs positive n_fft and hop, got {} and {}",
            n_fft, hop
        )));
    }

    let pad = n_fft / 2;
    let mut padded = vec![0.0; pad];
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + 2 * pad, 0.0);

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let num_bins = n_fft / 2 + 1;
    let num_frames = 1 + samples.len() / hop;

    let magnitudes: Vec<Vec<f64>> = (0..num_frames)
        .map(|i| {
            let start = i * hop;
            let mut buffer: Vec<Complex<f64>> = (0..n_fft)
                .map(|j| Complex::new(padded.get(start + j).copied().unwrap_or(0.0) * window[j], 0.0))
                .collect();
            fft.process(&mut buffer);
            buffer[..num_bins].iter().map(|c| c.norm()).collect()
        })
        .collect();

    let peak = magnitudes
        .iter()
        .flatten()
        .copied()
        .fold(0.0f64, f64::max);
    let reference = 20.0 * peak.max(AMIN).log10();

    let mut db: Vec<Vec<f64>> = magnitudes
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|m| 20.0 * m.max(AMIN).log10() - reference)
                .collect()
        })
        .collect();

    let top = db.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let floor = top - TOP_DB;
    for value in db.iter_mut().flatten() {
        *value = value.max(floor);
    }

    Ok(db)
}

/// Periodic Hann window, as used for STFT analysis
fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()))
        .collect()
}
