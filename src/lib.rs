//! MFCC extraction: decode, frame, window, power spectrum, mel filter bank,
//! cepstral transform. Every stage is a pure function over `f64` arrays.

pub mod audio;
pub mod error;

pub use audio::analysis::{analyze, MfccAnalysis, PipelineConfig};
pub use audio::features::{Frame, FramingParams, Waveform};
pub use audio::mel::{MelFilterBank, MelNorm};
pub use error::{Error, Result};
