pub mod analysis;
pub mod cepstrum;
pub mod decode;
pub mod features;
pub mod framing;
pub mod mel;
pub mod resample;
pub mod spectrogram;
pub mod spectrum;
