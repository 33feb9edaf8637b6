//! Note identification
//!
//! Quantizes each gap-filled pitch frame to the nearest equal-tempered
//! semitone (A4 = 440 Hz = MIDI 69) and derives note name, cents deviation
//! and the ideal frequency of the rounded pitch.
//!
//! Rounding rule: half-up for positive MIDI values (`f64::round`, half away
//! from zero). A frequency exactly halfway between two semitones therefore
//! rounds to the upper note with a cents deviation of -50.

pub mod segmentation;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::pitch::PitchTrack;

/// Chromatic pitch-class names, indexed by `midi mod 12`
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One pitch frame quantized to the equal-tempered grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteFrame {
    /// Frame center time in seconds
    pub time: f32,

    /// Gap-filled f0 in Hz
    pub f0: f32,

    /// Continuous MIDI pitch number
    pub midi_float: f32,

    /// Nearest integer MIDI pitch
    pub midi_rounded: i32,

    /// Deviation from the rounded pitch in cents, nominally [-50, 50)
    pub cents_off: f32,

    /// Note name with octave, e.g. "A4"
    pub note_name: String,

    /// Frequency of the rounded pitch in Hz
    pub ideal_freq: f32,
}

/// Quantized frames plus aggregate tuning diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteTrack {
    /// Frames in time order
    pub frames: Vec<NoteFrame>,

    /// Frame count per note name
    pub note_counts: HashMap<String, usize>,

    /// Number of distinct note names
    pub unique_notes: usize,

    /// Mean absolute cents deviation over all frames
    pub avg_abs_cents: f32,
}

/// Continuous MIDI pitch for a frequency (A4 = 440 Hz = MIDI 69)
pub fn frequency_to_midi(freq: f64) -> f64 {
    69.0 + 12.0 * (freq / 440.0).log2()
}

/// Ideal frequency of an integer MIDI pitch
pub fn midi_to_frequency(midi: i32) -> f32 {
    (440.0 * 2.0f64.powf((midi - 69) as f64 / 12.0)) as f32
}

/// Note name with octave for an integer MIDI pitch (MIDI 69 -> "A4")
pub fn midi_to_note_name(midi: i32) -> String {
    let pitch_class = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", pitch_class, octave)
}

/// Quantize a pitch track to the equal-tempered grid
///
/// Upstream gap filling guarantees a defined, positive frequency per frame;
/// an undefined or non-positive value reaching this stage is an invariant
/// violation and fails with `DomainError` rather than producing NaN.
///
/// An all-unvoiced track (every `f0_filled` still `None`) yields an empty
/// `NoteTrack`.
pub fn identify_notes(track: &PitchTrack) -> Result<NoteTrack, AnalysisError> {
    log::debug!("Identifying notes over {} pitch frames", track.num_frames());

    // Nothing voiced anywhere: no notes to identify
    if track.frequency_range.is_none() {
        return Ok(NoteTrack {
            frames: Vec::new(),
            note_counts: HashMap::new(),
            unique_notes: 0,
            avg_abs_cents: 0.0,
        });
    }

    let mut frames = Vec::with_capacity(track.num_frames());
    let mut note_counts: HashMap<String, usize> = HashMap::new();
    let mut abs_cents_sum = 0.0f64;

    for (i, frame) in track.frames.iter().enumerate() {
        let f0 = frame.f0_filled.ok_or_else(|| {
            AnalysisError::DomainError(format!("Undefined frequency at frame {}", i))
        })?;

        if f0 <= 0.0 {
            return Err(AnalysisError::DomainError(format!(
                "Non-positive frequency {:.3} Hz at frame {}",
                f0, i
            )));
        }

        // MIDI math in f64 so cents at semitone boundaries stay exact enough
        let midi_float = frequency_to_midi(f0 as f64);
        let midi_rounded = midi_float.round() as i32;
        let cents_off = (midi_float - midi_rounded as f64) * 100.0;

        let note_name = midi_to_note_name(midi_rounded);
        *note_counts.entry(note_name.clone()).or_insert(0) += 1;
        abs_cents_sum += cents_off.abs();

        frames.push(NoteFrame {
            time: frame.time,
            f0,
            midi_float: midi_float as f32,
            midi_rounded,
            cents_off: cents_off as f32,
            note_name,
            ideal_freq: midi_to_frequency(midi_rounded),
        });
    }

    let unique_notes = note_counts.len();
    let avg_abs_cents = if frames.is_empty() {
        0.0
    } else {
        (abs_cents_sum / frames.len() as f64) as f32
    };

    log::debug!(
        "Notes: {} unique over {} frames, avg |cents| {:.1}",
        unique_notes,
        frames.len(),
        avg_abs_cents
    );

    Ok(NoteTrack {
        frames,
        note_counts,
        unique_notes,
        avg_abs_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pitch::PitchFrame;

    fn track_from_freqs(freqs: &[f32]) -> PitchTrack {
        let frames: Vec<PitchFrame> = freqs
            .iter()
            .enumerate()
            .map(|(i, &f0)| PitchFrame {
                time: i as f32 * 0.05,
                f0_raw: Some(f0),
                f0_filled: Some(f0),
            })
            .collect();
        let range = freqs
            .iter()
            .fold(None, |acc: Option<(f32, f32)>, &f| match acc {
                Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
                None => Some((f, f)),
            });
        PitchTrack {
            unvoiced_count: 0,
            unvoiced_percentage: 0.0,
            frequency_range: range,
            frames,
        }
    }

    #[test]
    fn test_identify_440_is_a4() {
        let track = track_from_freqs(&[440.0; 10]);
        let notes = identify_notes(&track).unwrap();

        assert_eq!(notes.frames.len(), 10);
        for frame in &notes.frames {
            assert_eq!(frame.note_name, "A4");
            assert_eq!(frame.midi_rounded, 69);
            assert!(frame.cents_off.abs() < 0.01);
            assert!((frame.ideal_freq - 440.0).abs() < 0.01);
        }
        assert_eq!(notes.unique_notes, 1);
        assert_eq!(notes.note_counts["A4"], 10);
    }

    #[test]
    fn test_midi_note_names() {
        assert_eq!(midi_to_note_name(60), "C4");
        assert_eq!(midi_to_note_name(69), "A4");
        assert_eq!(midi_to_note_name(61), "C#4");
        assert_eq!(midi_to_note_name(59), "B3");
        assert_eq!(midi_to_note_name(21), "A0");
        assert_eq!(midi_to_note_name(108), "C8");
    }

    #[test]
    fn test_midi_roundtrip() {
        // Ideal frequency of m re-derives m for the whole piano range
        for m in 21..=108 {
            let freq = midi_to_frequency(m);
            let back = frequency_to_midi(freq as f64).round() as i32;
            assert_eq!(back, m, "Round-trip failed for MIDI {}", m);
        }
    }

    #[test]
    fn test_cents_at_semitone_midpoint() {
        // Geometric midpoint between A4 and A#4: a quarter tone above 440
        let midpoint = 440.0 * 2.0f64.powf(0.5 / 12.0);
        let track = track_from_freqs(&[midpoint as f32]);
        let notes = identify_notes(&track).unwrap();

        let frame = &notes.frames[0];
        assert!(
            frame.cents_off.abs() > 49.9 && frame.cents_off.abs() <= 50.1,
            "Midpoint should sit 50 cents from the rounded note, got {:.3}",
            frame.cents_off
        );
        assert!(
            frame.midi_rounded == 69 || frame.midi_rounded == 70,
            "Midpoint rounds to one of the two adjacent semitones"
        );
        // cents_off and midi_rounded must agree in sign convention
        if frame.midi_rounded == 70 {
            assert!(frame.cents_off < 0.0);
        } else {
            assert!(frame.cents_off > 0.0);
        }
    }

    #[test]
    fn test_identify_rejects_non_positive_frequency() {
        let mut track = track_from_freqs(&[440.0, 440.0]);
        track.frames[1].f0_filled = Some(0.0);
        assert!(matches!(
            identify_notes(&track),
            Err(AnalysisError::DomainError(_))
        ));
    }

    #[test]
    fn test_identify_rejects_undefined_frequency() {
        let mut track = track_from_freqs(&[440.0, 440.0]);
        track.frames[1].f0_filled = None;
        assert!(matches!(
            identify_notes(&track),
            Err(AnalysisError::DomainError(_))
        ));
    }

    #[test]
    fn test_identify_all_unvoiced_track_is_empty() {
        let track = PitchTrack {
            frames: vec![
                PitchFrame {
                    time: 0.0,
                    f0_raw: None,
                    f0_filled: None,
                };
                4
            ],
            unvoiced_count: 4,
            unvoiced_percentage: 100.0,
            frequency_range: None,
        };
        let notes = identify_notes(&track).unwrap();
        assert!(notes.frames.is_empty());
        assert_eq!(notes.unique_notes, 0);
    }

    #[test]
    fn test_note_diagnostics() {
        // 440 Hz (A4) and 261.63 Hz (C4), slightly detuned
        let track = track_from_freqs(&[442.0, 442.0, 262.0, 442.0]);
        let notes = identify_notes(&track).unwrap();

        assert_eq!(notes.unique_notes, 2);
        assert_eq!(notes.note_counts["A4"], 3);
        assert_eq!(notes.note_counts["C4"], 1);
        assert!(notes.avg_abs_cents > 0.0 && notes.avg_abs_cents < 20.0);
    }
}
