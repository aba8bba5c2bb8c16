use rustfft::{num_complex::Complex, FftPlanner};
use std::collections::HashMap;

use super::features::{linspace, Frame};
use crate::error::{Error, Result};

/// Symmetric Hamming window: `0.54 - 0.46 * cos(2*pi*n / (L - 1))`
pub fn hamming_window(size: usize) -> Vec<f64> {
    match size {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..size)
            .map(|n| {
                0.54 - 0.46 * (2.0 * std::f64::consts::PI * n as f64 / (size - 1) as f64).cos()
            })
            .collect(),
    }
}

/// Hamming windows memoized by length
#[derive(Debug, Default)]
pub struct HammingCache {
    windows: HashMap<usize, Vec<f64>>,
}

impl HammingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, size: usize) -> &[f64] {
        self.windows
            .entry(size)
            .or_insert_with(|| hamming_window(size))
    }
}

/// Multiply every frame element-wise by a Hamming window of its own length.
pub fn apply_window(frames: &[Frame]) -> Vec<Vec<f64>> {
    let mut cache = HammingCache::new();
    frames
        .iter()
        .map(|frame| {
            let window = cache.get(frame.len());
            frame
                .values
                .iter()
                .zip(window)
                .map(|(x, w)| x * w)
                .collect::<Vec<f64>>()
        })
        .collect()
}

/// One-sided power spectrum `|X_k|^2, k = 0..=nfft/2` of each row.
///
/// Rows shorter than `nfft` are zero-padded; longer rows are truncated to their
/// first `nfft` samples.
pub fn compute_power_spectrum(windowed: &[Vec<f64>], nfft: usize) -> Result<Vec<Vec<f64>>> {
    if nfft == 0 {
        return Err(Error::InvalidConfig("nfft must be positive".into()));
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nfft);
    let num_bins = nfft / 2 + 1;

    let spectra: Vec<Vec<f64>> = windowed
        .iter()
        .map(|row| {
            let mut buffer = vec![Complex::new(0.0, 0.0); nfft];
            for (slot, &x) in buffer.iter_mut().zip(row.iter()) {
                slot.re = x;
            }
            fft.process(&mut buffer);
            buffer[..num_bins].iter().map(|c| c.norm_sqr()).collect()
        })
        .collect();

    Ok(spectra)
}

/// Center frequency in Hz of every power spectrum bin
pub fn frequency_axis(sample_rate: u32, nfft: usize) -> Vec<f64> {
    linspace(0.0, sample_rate as f64 / 2.0, nfft / 2 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn frame(values: Vec<f64>) -> Frame {
        Frame { offset: 0, values }
    }

    #[test]
    fn test_hamming_endpoints_and_center() {
        let w = hamming_window(5);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!((w[4] - 0.08).abs() < 1e-12);
        assert_eq!(hamming_window(1), vec![1.0]);
        assert!(hamming_window(0).is_empty());
    }

    #[test]
    fn test_window_is_deterministic() {
        let frames = vec![frame((0..400).map(|i| (i as f64 * 0.37).sin()).collect())];
        let a = apply_window(&frames);
        let b = apply_window(&frames);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_returns_same_window() {
        let mut cache = HammingCache::new();
        let first = cache.get(256).to_vec();
        assert_eq!(cache.get(256), first.as_slice());
        assert_eq!(cache.get(3).len(), 3);
    }

    #[test]
    fn test_power_spectrum_shape_and_sign() {
        let windowed = apply_window(&[
            frame((0..480).map(|i| (i as f64 * 0.11).cos() - 0.3).collect()),
            frame(vec![0.0; 480]),
        ]);
        let power = compute_power_spectrum(&windowed, 512).unwrap();
        assert_eq!(power.len(), 2);
        for row in &power {
            assert_eq!(row.len(), 257);
            assert!(row.iter().all(|&p| p >= 0.0));
        }
        assert!(power[1].iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_dc_power_is_squared_sum() {
        let power = compute_power_spectrum(&[vec![1.0, 2.0, 3.0]], 8).unwrap();
        assert_eq!(power[0].len(), 5);
        assert!((power[0][0] - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_frames_longer_than_nfft_are_truncated() {
        let long: Vec<f64> = (0..600).map(|i| ((i * 7) % 13) as f64).collect();
        let truncated = long[..512].to_vec();
        let a = compute_power_spectrum(&[long], 512).unwrap();
        let b = compute_power_spectrum(&[truncated], 512).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sine_peaks_at_nearest_bin() {
        let sr = 16000.0;
        let signal: Vec<f64> = (0..480).map(|i| (2.0 * PI * 1000.0 * i as f64 / sr).sin()).collect();
        let power = compute_power_spectrum(&apply_window(&[frame(signal)]), 512).unwrap();
        let peak_bin = power[0]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // 1000 Hz / (16000 / 512) = 32
        assert_eq!(peak_bin, 32);
    }

    #[test]
    fn test_zero_nfft_is_rejected() {
        assert!(matches!(
            compute_power_spectrum(&[vec![1.0]], 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_frequency_axis_ends_at_nyquist() {
        let axis = frequency_axis(16000, 512);
        assert_eq!(axis.len(), 257);
        assert_eq!(axis[0], 0.0);
        assert_eq!(axis[256], 8000.0);
    }
}
