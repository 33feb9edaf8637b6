//! Note segmentation
//!
//! Partitions the continuous per-frame note stream into discrete note
//! events with a hybrid boundary rule:
//!
//! - a permissive onset pass over the raw waveform catches articulations
//!   (bow changes, tongued attacks), snapped to the nearest pitch frame
//! - a rounded-pitch jump of more than one semitone between consecutive
//!   frames flags a pitch-change boundary
//! - a frame starts a new note when EITHER condition holds
//!
//! The OR deliberately over-segments on ambiguous vibrato or slides rather
//! than merging distinct notes. The first frame always opens the first run
//! and the trailing partial run is always emitted.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::{onset_strength, peak_pick};

use super::NoteFrame;

/// Per-frame boundary annotations produced by the segmenter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundaryFlags {
    /// An articulation onset snapped to this frame
    pub is_onset: bool,

    /// Rounded pitch jumped by more than the configured threshold
    pub is_pitch_change: bool,

    /// This frame starts a new note (onset OR pitch change)
    pub is_note_start: bool,
}

/// One discrete note event covering a run of consecutive frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Time of the first frame in the run, seconds
    pub start_time: f32,

    /// Time of the last frame in the run, seconds
    pub end_time: f32,

    /// `end_time - start_time`
    pub duration: f32,

    /// Dominant note name: mode over the run, ties broken by the value that
    /// first reaches the winning count
    pub note_name: String,

    /// Median of the rounded MIDI values in the run, truncated toward zero
    pub midi_number: i32,

    /// Mean f0 over the run, Hz
    pub avg_frequency: f32,

    /// Mean ideal frequency over the run, Hz
    pub ideal_frequency: f32,

    /// Mean signed cents deviation over the run
    pub avg_cents_off: f32,

    /// Mean absolute cents deviation over the run
    pub abs_avg_cents_off: f32,

    /// Index of the first frame in the run
    pub first_frame: usize,

    /// Index of the last frame in the run (inclusive)
    pub last_frame: usize,
}

/// Segmentation result: events plus the per-frame annotations and the raw
/// articulation onsets that informed them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segmentation {
    /// One entry per input frame
    pub boundaries: Vec<BoundaryFlags>,

    /// Note events in time order
    pub events: Vec<NoteEvent>,

    /// Articulation onset times detected on the raw waveform, seconds
    pub onset_times: Vec<f32>,
}

impl Segmentation {
    /// Number of articulation onsets detected
    pub fn num_onsets(&self) -> usize {
        self.onset_times.len()
    }
}

/// Segment the note-frame stream into discrete note events
///
/// # Arguments
///
/// * `frames` - Quantized note frames in time order
/// * `samples` - The raw waveform the frames were extracted from
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration
///
/// # Errors
///
/// * `InvalidInput` - zero sample rate or degenerate hop
pub fn segment_notes(
    frames: &[NoteFrame],
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<Segmentation, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    if frames.is_empty() {
        return Ok(Segmentation {
            boundaries: Vec::new(),
            events: Vec::new(),
            onset_times: Vec::new(),
        });
    }

    let hop = (config.pitch_hop_seconds * sample_rate as f32).round() as usize;
    if hop == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Pitch hop of {:.4}s is shorter than one sample",
            config.pitch_hop_seconds
        )));
    }

    log::debug!(
        "Segmenting {} note frames, onset delta {:.3}, pitch-change threshold {} semitones",
        frames.len(),
        config.note_picking.delta,
        config.pitch_change_semitones
    );

    // Permissive onset pass on the raw, unfiltered waveform
    let envelope = onset_strength(samples, config.frame_size, hop)?;
    let wait = config.note_picking.wait_frames(sample_rate, hop);
    let onset_frames = peak_pick(&envelope, &config.note_picking, wait);
    let frame_duration = hop as f32 / sample_rate as f32;
    let onset_times: Vec<f32> = onset_frames
        .iter()
        .map(|&f| f as f32 * frame_duration)
        .collect();

    let mut boundaries = vec![BoundaryFlags::default(); frames.len()];

    // Snap each onset to the nearest pitch frame by absolute time difference
    for &onset_time in &onset_times {
        let mut best = 0usize;
        let mut best_diff = f32::INFINITY;
        for (i, frame) in frames.iter().enumerate() {
            let diff = (frame.time - onset_time).abs();
            if diff < best_diff {
                best_diff = diff;
                best = i;
            }
        }
        boundaries[best].is_onset = true;
    }

    // Pitch-change boundaries
    for i in 1..frames.len() {
        let jump = (frames[i].midi_rounded - frames[i - 1].midi_rounded).abs();
        boundaries[i].is_pitch_change = jump > config.pitch_change_semitones;
    }

    for flags in boundaries.iter_mut() {
        flags.is_note_start = flags.is_onset || flags.is_pitch_change;
    }

    // Walk the frames; each run between note starts becomes one event. The
    // first frame opens the first run regardless of its own flags, and the
    // trailing partial run is always emitted.
    let mut events = Vec::new();
    let mut run_start = 0usize;

    for i in 1..frames.len() {
        if boundaries[i].is_note_start {
            events.push(build_event(frames, run_start, i - 1));
            run_start = i;
        }
    }
    events.push(build_event(frames, run_start, frames.len() - 1));

    log::debug!(
        "Segmentation: {} events from {} onsets over {} frames",
        events.len(),
        onset_times.len(),
        frames.len()
    );

    Ok(Segmentation {
        boundaries,
        events,
        onset_times,
    })
}

/// Aggregate one frame run `[lo, hi]` (inclusive) into a note event
fn build_event(frames: &[NoteFrame], lo: usize, hi: usize) -> NoteEvent {
    let run = &frames[lo..=hi];
    let len = run.len() as f32;

    // Mode over note names; on ties the name that first reached the winning
    // count wins
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    let mut dominant = run[0].note_name.as_str();
    let mut dominant_count = 0usize;
    for frame in run {
        let count = counts.entry(frame.note_name.as_str()).or_insert(0);
        *count += 1;
        if *count > dominant_count {
            dominant_count = *count;
            dominant = frame.note_name.as_str();
        }
    }

    let mut midis: Vec<i32> = run.iter().map(|f| f.midi_rounded).collect();
    midis.sort_unstable();
    let mid = midis.len() / 2;
    let median_midi = if midis.len() % 2 == 0 {
        // Truncation toward zero after averaging the middle pair
        ((midis[mid - 1] + midis[mid]) as f32 / 2.0) as i32
    } else {
        midis[mid]
    };

    NoteEvent {
        start_time: run[0].time,
        end_time: run[run.len() - 1].time,
        duration: run[run.len() - 1].time - run[0].time,
        note_name: dominant.to_string(),
        midi_number: median_midi,
        avg_frequency: run.iter().map(|f| f.f0).sum::<f32>() / len,
        ideal_frequency: run.iter().map(|f| f.ideal_freq).sum::<f32>() / len,
        avg_cents_off: run.iter().map(|f| f.cents_off).sum::<f32>() / len,
        abs_avg_cents_off: run.iter().map(|f| f.cents_off.abs()).sum::<f32>() / len,
        first_frame: lo,
        last_frame: hi,
    }
}
