//! Continuous pitch tracking
//!
//! Estimates fundamental frequency per fixed hop over the whole signal with
//! YIN, then gap-fills unvoiced frames by linear interpolation so downstream
//! note identification always sees a defined frequency.
//!
//! Edge policy: unvoiced runs at the very start or end of the recording have
//! a voiced neighbor on one side only; those frames hold the nearest voiced
//! value. This matches endpoint clamping in linear interpolation and is the
//! documented boundary behavior.

pub mod yin;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use yin::YinEstimator;

/// One pitch analysis frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchFrame {
    /// Frame center time in seconds
    pub time: f32,

    /// Raw f0 estimate in Hz; `None` for unvoiced frames
    pub f0_raw: Option<f32>,

    /// Gap-filled f0 in Hz; `Some` for every frame as long as at least one
    /// frame in the recording was voiced
    pub f0_filled: Option<f32>,
}

/// Pitch trace over the whole recording, with voicing diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchTrack {
    /// Frames in time order, one per hop
    pub frames: Vec<PitchFrame>,

    /// Number of unvoiced frames before gap filling
    pub unvoiced_count: usize,

    /// Unvoiced frames as a percentage of all frames
    pub unvoiced_percentage: f32,

    /// (min, max) over the voiced raw frequencies; `None` when nothing was
    /// voiced
    pub frequency_range: Option<(f32, f32)>,
}

impl PitchTrack {
    /// Number of analysis frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}

/// Extract the fundamental frequency trace of a recording
///
/// Frames are spaced `config.pitch_hop_seconds` apart (default 50 ms) and
/// analyzed over `config.frame_size` samples. A recording shorter than one
/// analysis window yields an empty track.
///
/// # Errors
///
/// * `InvalidInput` - empty waveform, zero sample rate, or degenerate hop
/// * `NumericalError` - pitch range invalid for the sample rate
pub fn extract_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<PitchTrack, AnalysisError> {
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

    let hop = (config.pitch_hop_seconds * sample_rate as f32).round() as usize;
    if hop == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Pitch hop of {:.4}s is shorter than one sample",
            config.pitch_hop_seconds
        )));
    }

    let window = config.frame_size;
    let mut yin = YinEstimator::new(
        sample_rate,
        window,
        config.fmin,
        config.fmax,
        config.yin_threshold,
    )?;

    log::debug!(
        "Extracting pitch: {} samples, hop={} ({:.0} ms), window={}, range [{:.0}, {:.0}] Hz",
        samples.len(),
        hop,
        config.pitch_hop_seconds * 1000.0,
        window,
        config.fmin,
        config.fmax
    );

    let mut raw = Vec::new();
    let mut times = Vec::new();
    let mut pos = 0usize;
    while pos + window <= samples.len() {
        raw.push(yin.estimate(&samples[pos..pos + window]));
        times.push((pos + window / 2) as f32 / sample_rate as f32);
        pos += hop;
    }

    let filled = fill_gaps(&raw);

    let unvoiced_count = raw.iter().filter(|f| f.is_none()).count();
    let unvoiced_percentage = if raw.is_empty() {
        0.0
    } else {
        unvoiced_count as f32 / raw.len() as f32 * 100.0
    };

    let mut frequency_range: Option<(f32, f32)> = None;
    for f0 in raw.iter().flatten() {
        frequency_range = Some(match frequency_range {
            Some((lo, hi)) => (lo.min(*f0), hi.max(*f0)),
            None => (*f0, *f0),
        });
    }

    if unvoiced_count > 0 {
        log::debug!(
            "Pitch: {}/{} frames unvoiced ({:.1}%)",
            unvoiced_count,
            raw.len(),
            unvoiced_percentage
        );
    }

    let frames = times
        .into_iter()
        .zip(raw.into_iter().zip(filled))
        .map(|(time, (f0_raw, f0_filled))| PitchFrame {
            time,
            f0_raw,
            f0_filled,
        })
        .collect();

    Ok(PitchTrack {
        frames,
        unvoiced_count,
        unvoiced_percentage,
        frequency_range,
    })
}

/// Linearly interpolate unvoiced runs between their voiced neighbors.
/// Runs touching an edge hold the nearest voiced value. An all-unvoiced
/// input stays all-`None`.
fn fill_gaps(raw: &[Option<f32>]) -> Vec<Option<f32>> {
    if !raw.iter().any(|f| f.is_some()) {
        return raw.to_vec();
    }

    let mut filled = raw.to_vec();
    let n = raw.len();

    let mut i = 0;
    while i < n {
        if filled[i].is_some() {
            i += 1;
            continue;
        }

        // Extent of the unvoiced run [i, j)
        let mut j = i;
        while j < n && filled[j].is_none() {
            j += 1;
        }

        let prev = if i > 0 { filled[i - 1] } else { None };
        let next = if j < n { filled[j] } else { None };

        for (offset, slot) in filled[i..j].iter_mut().enumerate() {
            *slot = match (prev, next) {
                (Some(a), Some(b)) => {
                    // Interpolate by frame index between the two neighbors
                    let span = (j - i + 1) as f32;
                    let t = (offset + 1) as f32 / span;
                    Some(a + (b - a) * t)
                }
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            };
        }

        i = j;
    }

    filled
}
