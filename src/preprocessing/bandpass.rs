//! Band-pass filtering for metronome click isolation
//!
//! Implements a 4th-order Butterworth band-pass as a cascade of biquad
//! sections: two second-order high-pass stages at the lower band edge
//! followed by two second-order low-pass stages at the upper edge. Section Q
//! values follow the standard Butterworth pole pairing, so each skirt rolls
//! off at 24 dB/octave.
//!
//! Coefficients use the RBJ audio EQ cookbook formulas; the filter runs
//! forward in transposed direct form II.

use crate::error::AnalysisError;

/// Butterworth section Q values for a 4th-order cascade
const BUTTERWORTH_Q: [f32; 2] = [0.541_196_1, 1.306_563];

/// One second-order IIR section (transposed direct form II)
#[derive(Debug, Clone)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// RBJ low-pass section
    fn low_pass(cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        let w0 = 2.0 * std::f32::consts::PI * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// RBJ high-pass section
    fn high_pass(cutoff_hz: f32, sample_rate: f32, q: f32) -> Self {
        let w0 = 2.0 * std::f32::consts::PI * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 + cos_w0) / 2.0) / a0,
            b1: (-(1.0 + cos_w0)) / a0,
            b2: ((1.0 + cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// Band-limit a signal to the given frequency band
///
/// # Arguments
///
/// * `samples` - Audio samples (mono, normalized to [-1.0, 1.0])
/// * `sample_rate` - Sample rate in Hz
/// * `low_hz` - Lower band edge in Hz
/// * `high_hz` - Upper band edge in Hz
///
/// # Returns
///
/// Filtered samples, same length as the input
///
/// # Errors
///
/// Returns `AnalysisError::NumericalError` if the band edges are invalid
/// for the given sample rate (non-positive, inverted, or at/above Nyquist).
pub fn band_pass(
    samples: &[f32],
    sample_rate: u32,
    low_hz: f32,
    high_hz: f32,
) -> Result<Vec<f32>, AnalysisError> {
    let nyquist = sample_rate as f32 / 2.0;

    if low_hz <= 0.0 || high_hz <= low_hz {
        return Err(AnalysisError::NumericalError(format!(
            "Invalid band edges: [{:.1}, {:.1}] Hz",
            low_hz, high_hz
        )));
    }

    if high_hz >= nyquist {
        return Err(AnalysisError::NumericalError(format!(
            "Upper band edge {:.1} Hz at or above Nyquist ({:.1} Hz)",
            high_hz, nyquist
        )));
    }

    log::debug!(
        "Band-pass filtering {} samples to [{:.0}, {:.0}] Hz at {} Hz",
        samples.len(),
        low_hz,
        high_hz,
        sample_rate
    );

    let sr = sample_rate as f32;
    let mut sections = vec![
        Biquad::high_pass(low_hz, sr, BUTTERWORTH_Q[0]),
        Biquad::high_pass(low_hz, sr, BUTTERWORTH_Q[1]),
        Biquad::low_pass(high_hz, sr, BUTTERWORTH_Q[0]),
        Biquad::low_pass(high_hz, sr, BUTTERWORTH_Q[1]),
    ];

    let filtered = samples
        .iter()
        .map(|&x| sections.iter_mut().fold(x, |acc, s| s.process(acc)))
        .collect();

    Ok(filtered)
}
