//! Configuration parameters for practice-session analysis

use crate::analysis::timing::OnBeatTolerance;
use crate::features::onset::peak_picking::PeakPickingParams;

/// Analysis configuration parameters
///
/// One immutable configuration is passed into every stage call; the pipeline
/// keeps no process-wide state.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // STFT parameters
    /// Analysis window size in samples for STFT and pitch estimation (default: 2048)
    pub frame_size: usize,

    /// Hop size in samples for the metronome onset envelope (default: 512)
    pub hop_length: usize,

    // Beat detection
    /// Lower edge of the metronome band-pass in Hz (default: 800.0)
    pub band_low_hz: f32,

    /// Upper edge of the metronome band-pass in Hz (default: 4000.0)
    pub band_high_hz: f32,

    /// Peak-picking parameters for metronome click candidates.
    /// Deliberately lenient so faint clicks are not missed; the periodic
    /// filter walk removes spurious candidates afterwards.
    pub beat_picking: PeakPickingParams,

    /// Number of bins in the onset-interval histogram (default: 50)
    pub interval_histogram_bins: usize,

    /// Beat-matching tolerance as a fraction of the dominant interval (default: 0.15)
    pub beat_tolerance: f32,

    // Pitch tracking
    /// Minimum fundamental frequency in Hz (default: 196.0, G3)
    pub fmin: f32,

    /// Maximum fundamental frequency in Hz (default: 1760.0, A6)
    pub fmax: f32,

    /// Hop between pitch analysis frames in seconds (default: 0.05)
    pub pitch_hop_seconds: f32,

    /// YIN cumulative mean normalized difference threshold (default: 0.15)
    pub yin_threshold: f32,

    // Note segmentation
    /// Peak-picking parameters for articulation onsets on the raw waveform.
    /// More permissive than beat picking to catch soft string/bow onsets.
    pub note_picking: PeakPickingParams,

    /// Rounded-MIDI jump (in semitones) that starts a new note (default: 1)
    pub pitch_change_semitones: i32,

    // Timing scoring
    /// Tolerance under which a note start counts as on-beat
    /// (default: 100 ms absolute)
    pub on_beat_tolerance: OnBeatTolerance,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_length: 512,
            band_low_hz: 800.0,
            band_high_hz: 4000.0,
            beat_picking: PeakPickingParams {
                pre_max: 10,
                post_max: 10,
                pre_avg: 50,
                post_avg: 50,
                delta: 0.15,
                wait_seconds: 0.3,
            },
            interval_histogram_bins: 50,
            beat_tolerance: 0.15,
            fmin: 196.0,
            fmax: 1760.0,
            pitch_hop_seconds: 0.05,
            yin_threshold: 0.15,
            note_picking: PeakPickingParams {
                pre_max: 20,
                post_max: 20,
                pre_avg: 100,
                post_avg: 100,
                delta: 0.07,
                wait_seconds: 0.1,
            },
            pitch_change_semitones: 1,
            on_beat_tolerance: OnBeatTolerance::Milliseconds(100.0),
        }
    }
}
