//! Feature extraction modules
//!
//! The four analysis stages of the pipeline:
//! - Onset detection (shared envelope + peak picking)
//! - Metronome beat detection
//! - Pitch tracking
//! - Note identification and segmentation

pub mod beats;
pub mod notes;
pub mod onset;
pub mod pitch;
