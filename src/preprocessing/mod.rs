//! Audio preprocessing modules
//!
//! Utilities for preparing audio for analysis:
//! - Band-pass filtering (metronome click isolation)

pub mod bandpass;
