//! Onset-strength envelope
//!
//! Computes a per-hop onset-strength envelope as spectral flux: the mean
//! positive change in STFT magnitude between consecutive frames. Transients
//! (metronome clicks, bow/string articulations) show up as sharp peaks.
//!
//! Frames are taken from a center-padded signal (half a window of zeros on
//! each side), so envelope index `t` corresponds to the signal around time
//! `t * hop_length / sample_rate`. The envelope is normalized to a maximum
//! of 1.0 so peak-picking deltas act as relative thresholds.

use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Compute the onset-strength envelope of a signal
///
/// # Arguments
///
/// * `samples` - Audio samples (mono)
/// * `frame_size` - STFT window size in samples (typically 2048)
/// * `hop_length` - Hop between frames in samples (typically 512)
///
/// # Returns
///
/// Envelope values, one per hop, normalized to a maximum of 1.0.
/// An empty input or an all-silent signal yields an all-zero envelope.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `frame_size` or `hop_length`
/// is zero.
pub fn onset_strength(
    samples: &[f32],
    frame_size: usize,
    hop_length: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_length == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop length must be > 0".to_string(),
        ));
    }

    if samples.is_empty() {
        return Ok(Vec::new());
    }

    log::debug!(
        "Computing onset strength: {} samples, frame={}, hop={}",
        samples.len(),
        frame_size,
        hop_length
    );

    // Center-pad so the first frame is centered on t=0
    let pad = frame_size / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let num_frames = (padded.len() - frame_size) / hop_length + 1;
    let num_bins = frame_size / 2 + 1;

    // Hann window
    let window: Vec<f32> = (0..frame_size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / frame_size as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);

    let mut envelope = Vec::with_capacity(num_frames);
    let mut prev_magnitudes = vec![0.0f32; num_bins];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];

    for t in 0..num_frames {
        let start = t * hop_length;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);

        // Mean positive magnitude change over the non-redundant bins
        let mut flux = 0.0f32;
        for (k, value) in buffer.iter().take(num_bins).enumerate() {
            let magnitude = value.norm();
            if t > 0 {
                flux += (magnitude - prev_magnitudes[k]).max(0.0);
            }
            prev_magnitudes[k] = magnitude;
        }

        envelope.push(if t > 0 { flux / num_bins as f32 } else { 0.0 });
    }

    // Normalize so delta thresholds are relative to the strongest transient
    let max_flux = envelope.iter().copied().fold(0.0f32, f32::max);
    if max_flux > EPSILON {
        for value in envelope.iter_mut() {
            *value /= max_flux;
        }
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onset_strength_empty() {
        let envelope = onset_strength(&[], 2048, 512).unwrap();
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_onset_strength_invalid_parameters() {
        let samples = vec![0.5f32; 4096];
        assert!(onset_strength(&samples, 0, 512).is_err());
        assert!(onset_strength(&samples, 2048, 0).is_err());
    }

    #[test]
    fn test_onset_strength_silence_is_zero() {
        let samples = vec![0.0f32; 44100];
        let envelope = onset_strength(&samples, 2048, 512).unwrap();
        assert!(!envelope.is_empty());
        assert!(envelope.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_onset_strength_peaks_at_transient() {
        // One second of silence with a short burst at t=0.5s
        let sample_rate = 44100.0;
        let mut samples = vec![0.0f32; 44100];
        let burst_start = 22050;
        for (i, sample) in samples[burst_start..burst_start + 1024].iter_mut().enumerate() {
            *sample = (2.0 * std::f32::consts::PI * 2000.0 * i as f32 / sample_rate).sin() * 0.8;
        }

        let hop = 512;
        let envelope = onset_strength(&samples, 2048, hop).unwrap();

        let peak_frame = envelope
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let peak_time = peak_frame as f32 * hop as f32 / sample_rate;

        assert!(
            (peak_time - 0.5).abs() < 0.05,
            "Envelope peak should fall near the burst at 0.5s, got {:.3}s",
            peak_time
        );
        assert!((envelope[peak_frame] - 1.0).abs() < 1e-6, "Envelope is normalized to 1.0");
    }
}
