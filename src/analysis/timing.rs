//! Timing accuracy scoring
//!
//! Scores each note event's start time against the metronome beat grid:
//! nearest beat by minimum absolute difference, signed offset in
//! milliseconds (positive = late), and an on-beat flag under a configurable
//! tolerance. Aggregates mean absolute error and on-beat percentage.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::beats::BeatSequence;
use crate::features::notes::segmentation::NoteEvent;

/// Tolerance under which a note start counts as on-beat
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OnBeatTolerance {
    /// Absolute tolerance in milliseconds
    Milliseconds(f32),

    /// Fraction of the beat interval (requires a non-zero tempo)
    BeatFraction(f32),
}

/// Timing annotation for one note event, parallel to the event list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteTiming {
    /// Time of the nearest beat, seconds
    pub nearest_beat: f32,

    /// Signed offset from that beat in milliseconds; positive = late
    pub offset_ms: f32,

    /// Offset magnitude within the configured tolerance
    pub on_beat: bool,
}

/// Aggregate timing score for a performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingReport {
    /// Per-event annotations, same order as the input events
    pub notes: Vec<NoteTiming>,

    /// Mean absolute offset in milliseconds
    pub avg_timing_error_ms: f32,

    /// Percentage of events within tolerance
    pub on_beat_percentage: f32,
}

/// Score note-event timing against the beat grid
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientData` when the beat sequence is
/// empty, or when `BeatFraction` tolerance is configured and no tempo could
/// be estimated. Callers treat this as a missing score, not a fatal
/// pipeline failure.
pub fn score_timing(
    events: &[NoteEvent],
    beats: &BeatSequence,
    config: &AnalysisConfig,
) -> Result<TimingReport, AnalysisError> {
    if beats.beat_times.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "No metronome beats to score against".to_string(),
        ));
    }

    let tolerance_ms = match config.on_beat_tolerance {
        OnBeatTolerance::Milliseconds(ms) => ms,
        OnBeatTolerance::BeatFraction(fraction) => {
            if beats.tempo_bpm <= 0.0 {
                return Err(AnalysisError::InsufficientData(
                    "Beat-fraction tolerance needs an estimated tempo".to_string(),
                ));
            }
            fraction * 60_000.0 / beats.tempo_bpm
        }
    };

    log::debug!(
        "Scoring {} events against {} beats, tolerance {:.1} ms",
        events.len(),
        beats.beat_times.len(),
        tolerance_ms
    );

    let mut notes = Vec::with_capacity(events.len());
    let mut abs_error_sum = 0.0f32;
    let mut on_beat_count = 0usize;

    for event in events {
        let nearest_beat = beats
            .beat_times
            .iter()
            .copied()
            .min_by(|a, b| {
                (a - event.start_time)
                    .abs()
                    .partial_cmp(&(b - event.start_time).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0.0);

        let offset_ms = (event.start_time - nearest_beat) * 1000.0;
        let on_beat = offset_ms.abs() <= tolerance_ms;

        abs_error_sum += offset_ms.abs();
        if on_beat {
            on_beat_count += 1;
        }

        notes.push(NoteTiming {
            nearest_beat,
            offset_ms,
            on_beat,
        });
    }

    let (avg_timing_error_ms, on_beat_percentage) = if notes.is_empty() {
        (0.0, 0.0)
    } else {
        (
            abs_error_sum / notes.len() as f32,
            on_beat_count as f32 / notes.len() as f32 * 100.0,
        )
    };

    Ok(TimingReport {
        notes,
        avg_timing_error_ms,
        on_beat_percentage,
    })
}
