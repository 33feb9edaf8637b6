//! Integration tests for the practice-session analysis pipeline
//!
//! All fixtures are synthesized: click tracks with band-limited energy at
//! 2 kHz stand in for a mechanical metronome, sine tones stand in for the
//! played instrument.

use cadenza_dsp::{analyze_performance, AnalysisConfig, AnalysisError};

const SAMPLE_RATE: u32 = 44100;

/// Add 2 kHz clicks with exponential decay every `interval` seconds
fn add_clicks(samples: &mut [f32], first_click: f32, interval: f32, num_clicks: usize) {
    let sr = SAMPLE_RATE as f32;
    let click_len = (0.03 * sr) as usize;

    for k in 0..num_clicks {
        let start = ((first_click + k as f32 * interval) * sr) as usize;
        for i in 0..click_len {
            if start + i < samples.len() {
                let t = i as f32 / sr;
                samples[start + i] +=
                    (2.0 * std::f32::consts::PI * 2000.0 * t).sin() * (-t * 200.0).exp() * 0.8;
            }
        }
    }
}

/// Add a constant sine tone over the whole buffer
fn add_tone(samples: &mut [f32], freq: f32, amplitude: f32) {
    let sr = SAMPLE_RATE as f32;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample += (2.0 * std::f32::consts::PI * freq * i as f32 / sr).sin() * amplitude;
    }
}

#[test]
fn test_full_pipeline_click_track_with_tone() {
    // Six seconds: 440 Hz tone over a 120 BPM click track
    let mut samples = vec![0.0f32; SAMPLE_RATE as usize * 6];
    add_tone(&mut samples, 440.0, 0.4);
    add_clicks(&mut samples, 0.25, 0.5, 11);

    let report = analyze_performance(&samples, SAMPLE_RATE, &AnalysisConfig::default())
        .expect("Analysis should succeed");

    // Beat grid
    assert!(
        report.summary.num_beats >= 8,
        "Expected most of the 11 clicks, got {}",
        report.summary.num_beats
    );
    assert!(
        (report.summary.tempo_bpm - 120.0).abs() < 3.0,
        "Tempo should be near 120 BPM, got {:.2}",
        report.summary.tempo_bpm
    );
    for w in report.beats.beat_times.windows(2) {
        assert!(w[1] > w[0], "Beat times must be strictly increasing");
    }

    // Pitch and notes
    assert!(report.summary.num_frames > 50);
    let a4_frames = report
        .frames
        .iter()
        .filter(|f| f.note_name == "A4")
        .count();
    assert!(
        a4_frames * 2 > report.frames.len(),
        "A 440 Hz tone should dominate the frame stream: {}/{}",
        a4_frames,
        report.frames.len()
    );

    // Segmentation covers every frame exactly once, in order
    let mut expected_next = 0usize;
    for event in &report.events {
        assert_eq!(event.first_frame, expected_next);
        expected_next = event.last_frame + 1;
    }
    assert_eq!(expected_next, report.frames.len());
    assert_eq!(report.boundaries.len(), report.frames.len());

    // Timing score exists and is sane
    let timing = report.timing.as_ref().expect("Beats found, so timing should be scored");
    assert_eq!(timing.notes.len(), report.events.len());
    assert!(timing.avg_timing_error_ms >= 0.0);
    assert!((0.0..=100.0).contains(&timing.on_beat_percentage));

    // Summary consistency
    assert_eq!(report.summary.num_notes, report.events.len());
    assert!((report.summary.duration_seconds - 6.0).abs() < 0.01);
    assert_eq!(report.summary.sample_rate, SAMPLE_RATE);
    assert!(report.summary.processing_time_ms > 0.0);
}

#[test]
fn test_pipeline_tone_only_has_no_timing_score() {
    // Pure tone, no clicks: beat detection degenerates, timing is absent
    let mut samples = vec![0.0f32; SAMPLE_RATE as usize * 2];
    add_tone(&mut samples, 440.0, 0.5);

    let report = analyze_performance(&samples, SAMPLE_RATE, &AnalysisConfig::default())
        .expect("Analysis should succeed without a metronome");

    assert!(
        report.summary.num_beats < 3,
        "A steady tone should not produce a beat grid, got {}",
        report.summary.num_beats
    );
    assert_eq!(report.summary.tempo_bpm, 0.0);

    // 440 Hz should register as A4 with tight tuning
    let a4_frames = report
        .frames
        .iter()
        .filter(|f| f.note_name == "A4" && f.cents_off.abs() < 5.0)
        .count();
    assert!(
        a4_frames as f32 >= report.frames.len() as f32 * 0.95,
        "At least 95% of frames should be a well-tuned A4: {}/{}",
        a4_frames,
        report.frames.len()
    );

    if report.summary.num_beats == 0 {
        assert!(report.timing.is_none());
        assert!(report.summary.avg_timing_error_ms.is_none());
    }
}

#[test]
fn test_pipeline_empty_input_fails() {
    let result = analyze_performance(&[], SAMPLE_RATE, &AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
}

#[test]
fn test_pipeline_zero_sample_rate_fails() {
    let samples = vec![0.0f32; 44100];
    let result = analyze_performance(&samples, 0, &AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
}

#[test]
fn test_pipeline_invalid_band_edges_fail() {
    // 6 kHz upper edge is above Nyquist at an 8 kHz sample rate
    let samples = vec![0.0f32; 8000];
    let mut config = AnalysisConfig::default();
    config.band_high_hz = 6000.0;
    config.fmax = 1760.0; // valid; the band edge should fail first

    let result = analyze_performance(&samples, 8000, &config);
    assert!(matches!(result, Err(AnalysisError::NumericalError(_))));
}

#[test]
fn test_report_round_trips_through_json() {
    let mut samples = vec![0.0f32; SAMPLE_RATE as usize * 3];
    add_tone(&mut samples, 440.0, 0.4);
    add_clicks(&mut samples, 0.25, 0.5, 5);

    let report = analyze_performance(&samples, SAMPLE_RATE, &AnalysisConfig::default()).unwrap();

    let json = serde_json::to_string(&report).expect("Report should serialize");
    let back: cadenza_dsp::PerformanceReport =
        serde_json::from_str(&json).expect("Report should deserialize");

    assert_eq!(back.summary.num_beats, report.summary.num_beats);
    assert_eq!(back.events.len(), report.events.len());
    assert_eq!(back.frames.len(), report.frames.len());
}
