use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::features::Waveform;
use crate::error::{Error, Result};

/// Decode an audio file into a normalized mono waveform.
pub fn decode_file(path: &Path) -> Result<Waveform> {
    let file = std::fs::File::open(path)?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let waveform = decode_source(Box::new(file), hint)?;
    log::info!(
        "Decoded {}: {} samples, {}Hz, {:.2}s",
        path.display(),
        waveform.len(),
        waveform.sample_rate,
        waveform.duration()
    );
    Ok(waveform)
}

/// Decode an in-memory container (e.g. an uploaded WAV body).
///
/// `extension` is only a probing hint; the container is detected from its contents.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<Waveform> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }
    decode_source(Box::new(Cursor::new(bytes)), hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<Waveform> {
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or(SymphoniaError::Unsupported("no audio tracks found"))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count()).max(1);
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(SymphoniaError::Unsupported("unknown sample rate"))?;
    if sample_rate == 0 {
        return Err(Error::InvalidSampleRate(sample_rate));
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut first_channel: Vec<f64> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f64>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // Keep channel 0 only; no mixing
        let stride = spec.channels.count().max(1);
        first_channel.extend(sample_buf.samples().iter().step_by(stride).copied());
    }

    if channels > 1 {
        log::debug!("Selected channel 0 of {}", channels);
    }

    let samples = normalize_peak(&first_channel)?;
    Ok(Waveform::new(samples, sample_rate))
}

/// Divide every sample by the global maximum absolute sample value.
///
/// NaN samples do not take part in the peak search and stay NaN in the output.
pub fn normalize_peak(samples: &[f64]) -> Result<Vec<f64>> {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
    if peak == 0.0 {
        return Err(Error::DegenerateSignal);
    }
    Ok(samples.iter().map(|s| s / peak).collect())
}
