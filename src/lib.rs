//! # Cadenza DSP
//!
//! An audio analysis engine for scoring recorded practice sessions against
//! a mechanical metronome: click/tempo detection, continuous pitch
//! tracking, note segmentation, and per-note tuning and timing accuracy.
//!
//! ## Features
//!
//! - **Beat Detection**: band-limited onset detection with interval-histogram
//!   tempo estimation and periodic click filtering
//! - **Pitch Tracking**: YIN fundamental frequency estimation with gap-filled
//!   output
//! - **Note Identification**: equal-tempered quantization with cents
//!   deviation diagnostics
//! - **Note Segmentation**: hybrid onset/pitch-change boundaries producing
//!   discrete note events
//! - **Timing Scoring**: per-note offset against the nearest metronome beat
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadenza_dsp::{analyze_performance, AnalysisConfig};
//!
//! // Decoded audio (mono, f32, normalized)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! let report = analyze_performance(&samples, sample_rate, &AnalysisConfig::default())?;
//!
//! println!("Tempo: {:.1} BPM over {} beats", report.summary.tempo_bpm, report.summary.num_beats);
//! println!("Notes: {} events, avg {:.1} cents off", report.summary.num_notes, report.summary.avg_cents_off);
//! # Ok::<(), cadenza_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! Stages run strictly in sequence, each a pure function of its inputs:
//!
//! ```text
//! waveform -> beats
//! waveform -> pitch frames -> note frames -> note events -> timing score
//! ```
//!
//! The driver short-circuits on the first fatal stage error. A failed
//! timing score (no beats detected) downgrades to a missing score rather
//! than failing the whole analysis. Audio decoding, rendering and message
//! delivery are the caller's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod preprocessing;

// Re-export main types
pub use analysis::result::{PerformanceReport, PerformanceSummary};
pub use analysis::timing::{score_timing, NoteTiming, OnBeatTolerance, TimingReport};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::beats::{detect_beats, BeatSequence};
pub use features::notes::segmentation::{segment_notes, BoundaryFlags, NoteEvent, Segmentation};
pub use features::notes::{identify_notes, NoteFrame, NoteTrack};
pub use features::pitch::{extract_pitch, PitchFrame, PitchTrack};

/// Run the full analysis pipeline over one recording
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// A [`PerformanceReport`] with beats, note frames, note events, an
/// optional timing score and presentation-ready summary scalars.
///
/// # Errors
///
/// Returns `AnalysisError` if any stage other than timing scoring fails
/// (empty input, invalid configuration, numerical failure).
///
/// # Example
///
/// ```no_run
/// use cadenza_dsp::{analyze_performance, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 10];
/// let report = analyze_performance(&samples, 44100, &AnalysisConfig::default())?;
/// # Ok::<(), cadenza_dsp::AnalysisError>(())
/// ```
pub fn analyze_performance(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<PerformanceReport, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting performance analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

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

    // Stage 1: metronome beats
    let beats = detect_beats(samples, sample_rate, config)?;
    log::debug!(
        "Beats: {} at {:.1} BPM",
        beats.num_beats(),
        beats.tempo_bpm
    );

    // Stage 2: pitch trace
    let pitch = extract_pitch(samples, sample_rate, config)?;
    log::debug!(
        "Pitch: {} frames, {:.1}% unvoiced",
        pitch.num_frames(),
        pitch.unvoiced_percentage
    );

    // Stage 3: note quantization
    let notes = identify_notes(&pitch)?;

    // Stage 4: note events
    let segmentation = segment_notes(&notes.frames, samples, sample_rate, config)?;
    log::debug!(
        "Segmentation: {} events from {} onsets",
        segmentation.events.len(),
        segmentation.num_onsets()
    );

    // Stage 5: timing score; missing beats degrade to a missing score
    let timing = match score_timing(&segmentation.events, &beats, config) {
        Ok(report) => Some(report),
        Err(AnalysisError::InsufficientData(msg)) => {
            log::warn!("Timing score unavailable: {}", msg);
            None
        }
        Err(e) => return Err(e),
    };

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    let summary = PerformanceSummary {
        duration_seconds: samples.len() as f32 / sample_rate as f32,
        sample_rate,
        tempo_bpm: beats.tempo_bpm,
        num_beats: beats.num_beats(),
        num_frames: pitch.num_frames(),
        frequency_range: pitch.frequency_range,
        unvoiced_percentage: pitch.unvoiced_percentage,
        unique_notes: notes.unique_notes,
        avg_cents_off: notes.avg_abs_cents,
        num_notes: segmentation.events.len(),
        num_onsets: segmentation.num_onsets(),
        avg_timing_error_ms: timing.as_ref().map(|t| t.avg_timing_error_ms),
        on_beat_percentage: timing.as_ref().map(|t| t.on_beat_percentage),
        processing_time_ms,
        algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    log::debug!(
        "Analysis complete in {:.1} ms: {} beats, {} notes",
        processing_time_ms,
        summary.num_beats,
        summary.num_notes
    );

    Ok(PerformanceReport {
        beats,
        frames: notes.frames,
        boundaries: segmentation.boundaries,
        events: segmentation.events,
        timing,
        summary,
    })
}
