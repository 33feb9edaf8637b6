//! Metronome beat detection
//!
//! Finds mechanical metronome clicks and estimates their tempo:
//!
//! 1. Band-limit the signal to the click band (default 800-4000 Hz)
//! 2. Compute an onset-strength envelope over fixed hops
//! 3. Peak-pick leniently to get a superset of click candidates
//! 4. Estimate the dominant inter-onset interval from a histogram
//! 5. Walk the candidates, keeping those that fit the periodic pattern
//! 6. Recompute tempo as 60 / median(interval) over the kept beats
//!
//! The median makes the final tempo robust to the occasional double-fire or
//! missed click that survives the periodic filter.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::{onset_strength, peak_pick};
use crate::preprocessing::bandpass::band_pass;

/// Detected metronome beat sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatSequence {
    /// Beat times in seconds, strictly increasing
    pub beat_times: Vec<f32>,

    /// Estimated tempo in BPM; 0.0 when fewer than 3 candidates were found
    pub tempo_bpm: f32,

    /// The lenient candidate superset before periodic filtering, kept for
    /// diagnostics
    pub all_onsets: Vec<f32>,
}

impl BeatSequence {
    /// Number of beats kept after periodic filtering
    pub fn num_beats(&self) -> usize {
        self.beat_times.len()
    }
}

/// Detect metronome beats and tempo
///
/// # Arguments
///
/// * `samples` - Audio samples (mono, normalized to [-1.0, 1.0])
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration
///
/// # Returns
///
/// A [`BeatSequence`]. Fewer than 3 onset candidates is a degenerate but
/// successful outcome: tempo 0.0 with whatever candidates exist.
///
/// # Errors
///
/// * `InvalidInput` - empty waveform or zero sample rate
/// * `NumericalError` - band edges invalid for the sample rate
pub fn detect_beats(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<BeatSequence, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    log::debug!(
        "Detecting beats: {} samples at {} Hz, band [{:.0}, {:.0}] Hz",
        samples.len(),
        sample_rate,
        config.band_low_hz,
        config.band_high_hz
    );

    // Step 1: isolate the click band
    let filtered = band_pass(samples, sample_rate, config.band_low_hz, config.band_high_hz)?;

    // Step 2+3: onset envelope, lenient candidate picking
    let envelope = onset_strength(&filtered, config.frame_size, config.hop_length)?;
    let wait = config
        .beat_picking
        .wait_frames(sample_rate, config.hop_length);
    let candidate_frames = peak_pick(&envelope, &config.beat_picking, wait);

    let frame_duration = config.hop_length as f32 / sample_rate as f32;
    let onset_times: Vec<f32> = candidate_frames
        .iter()
        .map(|&f| f as f32 * frame_duration)
        .collect();

    // Too few candidates to fit a period: degenerate success, not an error
    if onset_times.len() < 3 {
        log::warn!(
            "Only {} onset candidates, cannot estimate tempo",
            onset_times.len()
        );
        return Ok(BeatSequence {
            beat_times: onset_times.clone(),
            tempo_bpm: 0.0,
            all_onsets: onset_times,
        });
    }

    // Step 4: dominant inter-onset interval from a histogram
    let intervals: Vec<f32> = onset_times.windows(2).map(|w| w[1] - w[0]).collect();
    let dominant_interval = dominant_interval(&intervals, config.interval_histogram_bins);

    let mut tempo = if dominant_interval > 0.0 {
        60.0 / dominant_interval
    } else {
        0.0
    };

    // Step 5: keep candidates that fit the periodic pattern. A candidate far
    // beyond the expected beat is accepted anyway and resets the expectation
    // (a click we missed, then recovered).
    let tolerance = dominant_interval * config.beat_tolerance;
    let mut beat_times = vec![onset_times[0]];
    let mut expected_next = onset_times[0] + dominant_interval;

    for &t in &onset_times[1..] {
        if (t - expected_next).abs() <= tolerance {
            beat_times.push(t);
            expected_next = t + dominant_interval;
        } else if t > expected_next + tolerance {
            beat_times.push(t);
            expected_next = t + dominant_interval;
        }
    }

    // Step 6: robust tempo over the kept beats
    if beat_times.len() > 1 {
        let kept_intervals: Vec<f32> = beat_times.windows(2).map(|w| w[1] - w[0]).collect();
        let median_interval = median(&kept_intervals);
        tempo = if median_interval > 0.0 {
            60.0 / median_interval
        } else {
            0.0
        };
    }

    log::debug!(
        "Beats: {} kept of {} candidates, tempo {:.1} BPM",
        beat_times.len(),
        onset_times.len(),
        tempo
    );

    Ok(BeatSequence {
        beat_times,
        tempo_bpm: tempo,
        all_onsets: onset_times,
    })
}

/// Modal bin center of the interval histogram
fn dominant_interval(intervals: &[f32], bins: usize) -> f32 {
    let min = intervals.iter().copied().fold(f32::INFINITY, f32::min);
    let max = intervals.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    // Perfectly regular candidates collapse the histogram to a point
    if max - min < 1e-6 || bins == 0 {
        return intervals[0];
    }

    let width = (max - min) / bins as f32;
    let mut counts = vec![0usize; bins];
    for &v in intervals {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let modal_bin = counts
        .iter()
        .enumerate()
        .max_by_key(|(_, &c)| c)
        .map(|(i, _)| i)
        .unwrap_or(0);

    min + (modal_bin as f32 + 0.5) * width
}

/// Median of a non-empty slice; even lengths average the two middle values
fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
