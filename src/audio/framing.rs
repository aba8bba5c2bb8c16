use super::features::Frame;
use crate::error::{Error, Result};

/// Slice `signal` into frames of `frame_size` samples, `hop_size` apart.
///
/// Yields `1 + (len - frame_size) / hop_size` frames; a trailing remainder shorter
/// than `frame_size` is dropped. `hop_size > frame_size` leaves gaps between frames.
pub fn frame_blocking(signal: &[f64], frame_size: usize, hop_size: usize) -> Result<Vec<Frame>> {
    if frame_size == 0 || hop_size == 0 || frame_size > signal.len() {
        return Err(Error::InvalidFramingParameters(format!(
            "frame_size={}, hop_size={}, signal length={}",
            frame_size,
            hop_size,
            signal.len()
        )));
    }

    let num_frames = 1 + (signal.len() - frame_size) / hop_size;
    let frames = (0..num_frames)
        .map(|i| {
            let offset = i * hop_size;
            Frame {
                offset,
                values: signal[offset..offset + frame_size].to_vec(),
            }
        })
        .collect();

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_frame_count_and_length() {
        let signal = ramp(16000);
        for &(frame_size, hop_size) in &[(480, 240), (400, 160), (256, 100), (320, 320)] {
            let frames = frame_blocking(&signal, frame_size, hop_size).unwrap();
            assert_eq!(frames.len(), 1 + (16000 - frame_size) / hop_size);
            assert!(frames.iter().all(|f| f.len() == frame_size));
        }
    }

    #[test]
    fn test_overlapping_frames_share_samples() {
        let frames = frame_blocking(&ramp(10), 4, 2).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[1].offset, 2);
        assert_eq!(frames[1].values, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(frames[3].values, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_gapped_frames_and_dropped_tail() {
        // hop > frame: samples 3 and 4 fall in the gap, samples 8..12 are a short tail
        let frames = frame_blocking(&ramp(12), 3, 5).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].values, vec![0.0, 1.0, 2.0]);
        assert_eq!(frames[1].values, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_single_frame_when_signal_equals_frame() {
        let frames = frame_blocking(&ramp(8), 8, 3).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].offset, 0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let signal = ramp(100);
        for &(frame_size, hop_size) in &[(0, 10), (10, 0), (101, 10)] {
            assert!(matches!(
                frame_blocking(&signal, frame_size, hop_size),
                Err(Error::InvalidFramingParameters(_))
            ));
        }
    }
}
