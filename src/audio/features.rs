use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Decoded mono signal, peak-normalized to [-1, 1]
#[derive(Clone, Debug, Serialize)]
pub struct Waveform {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Sample timestamps, evenly spaced from 0 to `duration()` inclusive
    pub fn time_axis(&self) -> Vec<f64> {
        linspace(0.0, self.duration(), self.samples.len())
    }
}

/// A fixed-length slice of the signal starting at `offset`
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub offset: usize,
    pub values: Vec<f64>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Frame length and overlap in time units; converted to samples per sample rate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FramingParams {
    pub frame_duration_ms: f64,
    pub overlap_percent: f64,
}

impl Default for FramingParams {
    fn default() -> Self {
        Self {
            frame_duration_ms: 25.0,
            overlap_percent: 50.0,
        }
    }
}

impl FramingParams {
    /// Returns `(frame_size, hop_size)` in samples.
    ///
    /// `frame_size = round(sr * ms / 1000)`, `hop_size = round(frame_size * (1 - overlap / 100))`.
    /// A zero result is left for the framer to reject against the actual signal.
    pub fn sizes(&self, sample_rate: u32) -> Result<(usize, usize)> {
        if !(self.frame_duration_ms.is_finite() && self.frame_duration_ms > 0.0) {
            return Err(Error::InvalidFramingParameters(format!(
                "frame duration must be positive, got {} ms",
                self.frame_duration_ms
            )));
        }
        if !(0.0..100.0).contains(&self.overlap_percent) {
            return Err(Error::InvalidFramingParameters(format!(
                "overlap must be in [0, 100), got {}%",
                self.overlap_percent
            )));
        }

        let frame_size = (sample_rate as f64 * self.frame_duration_ms / 1000.0).round() as usize;
        let hop_size = (frame_size as f64 * (1.0 - self.overlap_percent / 100.0)).round() as usize;
        Ok((frame_size, hop_size))
    }
}

/// `n` evenly spaced points over `[start, end]`, endpoints included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
