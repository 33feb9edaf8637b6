//! Analysis report types

use serde::{Deserialize, Serialize};

use super::timing::TimingReport;
use crate::features::beats::BeatSequence;
use crate::features::notes::segmentation::{BoundaryFlags, NoteEvent};
use crate::features::notes::NoteFrame;

/// Complete analysis report for one practice session
///
/// The rendering collaborator consumes `frames`, `events` and `beats`; the
/// delivery collaborator consumes `summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Metronome beats and tempo
    pub beats: BeatSequence,

    /// Quantized per-frame note stream
    pub frames: Vec<NoteFrame>,

    /// Per-frame boundary annotations from the segmenter
    pub boundaries: Vec<BoundaryFlags>,

    /// Discrete note events
    pub events: Vec<NoteEvent>,

    /// Timing score; `None` when no beats were available to score against
    pub timing: Option<TimingReport>,

    /// Summary scalars for presentation
    pub summary: PerformanceSummary,
}

/// Summary scalars for the delivery collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Recording duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Estimated tempo in BPM; 0.0 when undetectable
    pub tempo_bpm: f32,

    /// Number of metronome beats kept
    pub num_beats: usize,

    /// Number of pitch analysis frames
    pub num_frames: usize,

    /// (min, max) of the voiced raw frequencies in Hz
    pub frequency_range: Option<(f32, f32)>,

    /// Percentage of frames with no confident pitch
    pub unvoiced_percentage: f32,

    /// Number of distinct note names played
    pub unique_notes: usize,

    /// Mean absolute tuning deviation in cents
    pub avg_cents_off: f32,

    /// Number of discrete note events
    pub num_notes: usize,

    /// Number of articulation onsets found by the segmenter
    pub num_onsets: usize,

    /// Mean absolute timing error in milliseconds, when scored
    pub avg_timing_error_ms: Option<f32>,

    /// Percentage of notes on the beat, when scored
    pub on_beat_percentage: Option<f32>,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,

    /// Crate version that produced this report
    pub algorithm_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = PerformanceSummary {
            duration_seconds: 12.5,
            sample_rate: 44100,
            tempo_bpm: 120.2,
            num_beats: 24,
            num_frames: 250,
            frequency_range: Some((196.3, 884.1)),
            unvoiced_percentage: 4.2,
            unique_notes: 7,
            avg_cents_off: 11.3,
            num_notes: 31,
            num_onsets: 28,
            avg_timing_error_ms: Some(38.5),
            on_beat_percentage: Some(77.4),
            processing_time_ms: 412.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        let json = serde_json::to_string(&summary).unwrap();
        let back: PerformanceSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_beats, 24);
        assert_eq!(back.avg_timing_error_ms, Some(38.5));
        assert_eq!(back.frequency_range, Some((196.3, 884.1)));
    }
}
