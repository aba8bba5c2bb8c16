use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Orthonormal DCT-II basis for vectors of a fixed length.
///
/// `X_k = s_k * sum_n x_n * cos(pi * k * (2n + 1) / 2N)`, `s_0 = sqrt(1/N)`, `s_k = sqrt(2/N)`.
pub struct Dct2 {
    basis: Vec<Vec<f64>>,
}

impl Dct2 {
    pub fn new(len: usize) -> Self {
        let n = len as f64;
        let basis = (0..len)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..len)
                    .map(|i| scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
                    .collect()
            })
            .collect();
        Self { basis }
    }

    /// Coefficient `k` of `input`
    pub fn coefficient(&self, input: &[f64], k: usize) -> f64 {
        self.basis[k].iter().zip(input).map(|(b, x)| b * x).sum()
    }

    pub fn transform(&self, input: &[f64]) -> Vec<f64> {
        (0..self.basis.len()).map(|k| self.coefficient(input, k)).collect()
    }
}

/// Cepstral coefficients `1..=num_ceps` of every log-mel frame.
///
/// Coefficient 0 (overall log energy) is always discarded.
pub fn compute_mfcc(log_mel: &[Vec<f64>], n_mels: usize, num_ceps: usize) -> Result<Vec<Vec<f64>>> {
    if num_ceps == 0 || num_ceps >= n_mels {
        return Err(Error::InvalidCoefficientCount { num_ceps, n_mels });
    }
    if let Some(bad) = log_mel.iter().find(|f| f.len() != n_mels) {
        return Err(Error::ShapeMismatch(format!(
            "log-mel frame has {} bands, expected {}",
            bad.len(),
            n_mels
        )));
    }

    let dct = Dct2::new(n_mels);
    Ok(log_mel
        .iter()
        .map(|frame| (1..=num_ceps).map(|k| dct.coefficient(frame, k)).collect())
        .collect())
}
