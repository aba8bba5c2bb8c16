use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Signal is silent (peak amplitude is zero), cannot normalize")]
    DegenerateSignal,

    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("Invalid framing parameters: {0}")]
    InvalidFramingParameters(String),

    #[error("Invalid coefficient count: num_ceps={num_ceps} must be at least 1 and below n_mels={n_mels}")]
    InvalidCoefficientCount { num_ceps: usize, n_mels: usize },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Decoder error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("Resampler error: {0}")]
    Resample(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
