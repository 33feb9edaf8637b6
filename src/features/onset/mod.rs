//! Onset detection modules
//!
//! Shared machinery for both onset passes in the pipeline:
//! - Onset-strength envelope (spectral flux over an STFT)
//! - Lenient peak picking with pre/post max and average windows
//!
//! The beat detector runs these on the band-limited signal to find metronome
//! clicks; the note segmenter runs them on the raw waveform to find
//! articulation onsets.

pub mod envelope;
pub mod peak_picking;

pub use envelope::onset_strength;
pub use peak_picking::{peak_pick, PeakPickingParams};
