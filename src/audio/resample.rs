use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::features::Waveform;
use crate::error::{Error, Result};

const SINC_LEN: usize = 256;
const MAX_FLUSHES: usize = 64;

/// Resample a waveform to `target_rate` with a windowed-sinc interpolator.
///
/// The output holds `round(N * target / source)` samples, aligned in time with the
/// input (the filter delay is trimmed off). Amplitudes are not renormalized.
pub fn resample(waveform: &Waveform, target_rate: u32) -> Result<Waveform> {
    if target_rate == 0 {
        return Err(Error::InvalidSampleRate(target_rate));
    }
    if waveform.sample_rate == 0 {
        return Err(Error::InvalidSampleRate(waveform.sample_rate));
    }
    if waveform.sample_rate == target_rate || waveform.is_empty() {
        return Ok(Waveform::new(waveform.samples.clone(), target_rate));
    }

    let ratio = target_rate as f64 / waveform.sample_rate as f64;
    let expected_len = (waveform.len() as f64 * ratio).round() as usize;

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    // Short inputs are zero-padded to a full filter span; the padding lands past `expected_len`
    let chunk_size = waveform.len().max(2 * SINC_LEN);
    let mut padded = waveform.samples.clone();
    padded.resize(chunk_size, 0.0);

    let mut resampler = SincFixedIn::<f64>::new(
        ratio,
        2.0, // max relative ratio
        params,
        chunk_size,
        1, // mono
    )
    .map_err(|e| Error::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let needed = delay + expected_len;

    let input = vec![padded];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| Error::Resample(e.to_string()))?
        .into_iter()
        .next()
        .unwrap_or_default();

    // Flush the filter tail with silent chunks; an empty flush is not end-of-stream
    let mut flushes = 0;
    while output.len() < needed && flushes < MAX_FLUSHES {
        let tail = resampler
            .process_partial::<Vec<f64>>(None, None)
            .map_err(|e| Error::Resample(e.to_string()))?
            .into_iter()
            .next()
            .unwrap_or_default();
        output.extend(tail);
        flushes += 1;
    }

    if output.len() < needed {
        return Err(Error::Resample(format!(
            "filter produced {} of {} samples after {} flushes",
            output.len(),
            needed,
            flushes
        )));
    }

    let samples: Vec<f64> = output.into_iter().skip(delay).take(expected_len).collect();

    log::info!(
        "Resampled {}Hz -> {}Hz: {} -> {} samples",
        waveform.sample_rate,
        target_rate,
        waveform.len(),
        samples.len()
    );

    Ok(Waveform::new(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> Waveform {
        let samples = (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
            .collect();
        Waveform::new(samples, sample_rate)
    }

    #[test]
    fn test_rejects_zero_target_rate() {
        let wave = sine(440.0, 16000, 1600);
        assert!(matches!(
            resample(&wave, 0),
            Err(Error::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn test_same_rate_is_identity() {
        let wave = sine(440.0, 16000, 1600);
        let out = resample(&wave, 16000).unwrap();
        assert_eq!(out.samples, wave.samples);
        assert_eq!(out.sample_rate, 16000);
    }

    #[test]
    fn test_downsample_length_and_amplitude() {
        let wave = sine(440.0, 16000, 16000);
        let out = resample(&wave, 8000).unwrap();
        assert_eq!(out.sample_rate, 8000);
        assert_eq!(out.len(), 8000);

        // Away from the edges the band-limited sine keeps its unit amplitude
        let peak = out.samples[1000..7000]
            .iter()
            .map(|s| s.abs())
            .fold(0.0f64, f64::max);
        assert!((peak - 1.0).abs() < 0.05, "peak = {}", peak);
    }

    #[test]
    fn test_short_signals_keep_expected_length() {
        let cases = [
            (16000, 8000, 5),
            (16000, 8000, 50),
            (8000, 16000, 5),
            (8000, 16000, 50),
            (8000, 22050, 50),
            (44100, 16000, 50),
        ];
        for (from, to, n) in cases {
            let wave = Waveform::new((0..n).map(|i| (0.3 * i as f64).sin()).collect(), from);
            let out = resample(&wave, to).unwrap();
            let expected = (n as f64 * to as f64 / from as f64).round() as usize;
            assert_eq!(out.len(), expected, "{}Hz -> {}Hz, n = {}", from, to, n);
            assert!(out.samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_upsample_stays_time_aligned() {
        let wave = sine(440.0, 8000, 8000);
        let out = resample(&wave, 16000).unwrap();
        assert_eq!(out.len(), 16000);

        // Compare against the analytic sine at the new rate, mid-signal
        let max_err = (4000..12000)
            .map(|i| {
                let expected = (2.0 * PI * 440.0 * i as f64 / 16000.0).sin();
                (out.samples[i] - expected).abs()
            })
            .fold(0.0f64, f64::max);
        assert!(max_err < 0.2, "max_err = {}", max_err);
    }
}
