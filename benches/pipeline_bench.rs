//! Performance benchmarks for the analysis pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cadenza_dsp::{analyze_performance, AnalysisConfig};

/// Synthesize 30 seconds of practice audio: a 440 Hz tone over a 120 BPM
/// click track
fn practice_session(seconds: usize) -> Vec<f32> {
    let sample_rate = 44100.0;
    let mut samples: Vec<f32> = (0..44100 * seconds)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate).sin() * 0.4)
        .collect();

    let click_len = (0.03 * sample_rate) as usize;
    let mut start = (0.25 * sample_rate) as usize;
    while start + click_len < samples.len() {
        for i in 0..click_len {
            let t = i as f32 / sample_rate;
            samples[start + i] +=
                (2.0 * std::f32::consts::PI * 2000.0 * t).sin() * (-t * 200.0).exp() * 0.8;
        }
        start += (0.5 * sample_rate) as usize;
    }

    samples
}

fn bench_analyze_performance(c: &mut Criterion) {
    let samples = practice_session(30);
    let config = AnalysisConfig::default();

    c.bench_function("analyze_performance_30s", |b| {
        b.iter(|| {
            let _ = analyze_performance(black_box(&samples), black_box(44100), black_box(&config));
        });
    });
}

criterion_group!(benches, bench_analyze_performance);
criterion_main!(benches);
