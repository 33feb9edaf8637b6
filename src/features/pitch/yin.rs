//! YIN fundamental frequency estimation
//!
//! Implements the YIN algorithm (de Cheveigné & Kawahara, 2002) over a
//! single analysis window: squared difference function, cumulative mean
//! normalized difference (CMNDF), absolute threshold with a local-minimum
//! check, and parabolic interpolation for sub-sample lag precision.
//!
//! # Reference
//!
//! de Cheveigné, A., & Kawahara, H. (2002). YIN, a fundamental frequency
//! estimator for speech and music.
//! *The Journal of the Acoustical Society of America*, 111(4), 1917-1930.

use crate::error::AnalysisError;

/// Per-frame YIN estimator with reusable lag buffers
#[derive(Debug)]
pub struct YinEstimator {
    sample_rate: f32,
    window_size: usize,
    tau_min: usize,
    tau_max: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
    diff: Vec<f32>,
    cmndf: Vec<f32>,
}

impl YinEstimator {
    /// Create an estimator for the given window and frequency range
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::NumericalError` when the frequency range is
    /// invalid or the window is too short to hold a full period of `fmin`.
    pub fn new(
        sample_rate: u32,
        window_size: usize,
        fmin: f32,
        fmax: f32,
        threshold: f32,
    ) -> Result<Self, AnalysisError> {
        if fmin <= 0.0 || fmax <= fmin {
            return Err(AnalysisError::NumericalError(format!(
                "Invalid pitch range: [{:.1}, {:.1}] Hz",
                fmin, fmax
            )));
        }

        if fmax >= sample_rate as f32 / 2.0 {
            return Err(AnalysisError::NumericalError(format!(
                "fmax {:.1} Hz at or above Nyquist for {} Hz",
                fmax, sample_rate
            )));
        }

        let sr = sample_rate as f32;
        let tau_min = ((sr / fmax) as usize).max(1);
        let tau_max = ((sr / fmin).ceil() as usize).min(window_size / 2);

        if tau_min >= tau_max {
            return Err(AnalysisError::NumericalError(format!(
                "Window of {} samples too short for fmin {:.1} Hz at {} Hz",
                window_size, fmin, sample_rate
            )));
        }

        Ok(Self {
            sample_rate: sr,
            window_size,
            tau_min,
            tau_max,
            fmin,
            fmax,
            threshold,
            diff: vec![0.0; window_size / 2],
            cmndf: vec![0.0; window_size / 2],
        })
    }

    /// Estimate f0 for one analysis frame
    ///
    /// Returns `None` for unvoiced frames: no lag clears the threshold and
    /// the best CMNDF minimum is weak, or the refined frequency falls
    /// outside the configured range.
    pub fn estimate(&mut self, frame: &[f32]) -> Option<f32> {
        if frame.len() < self.window_size {
            return None;
        }

        self.difference(frame);
        self.cumulative_mean_normalized();

        let tau = self.best_tau()?;
        let tau_refined = self.parabolic_refine(tau);
        let frequency = self.sample_rate / tau_refined;

        if frequency < self.fmin || frequency > self.fmax {
            return None;
        }

        Some(frequency)
    }

    /// Squared difference function over the lag range
    fn difference(&mut self, frame: &[f32]) {
        let half = self.diff.len();
        for tau in 0..half {
            let mut sum = 0.0f32;
            for j in 0..half {
                let d = frame[j] - frame[j + tau];
                sum += d * d;
            }
            self.diff[tau] = sum;
        }
    }

    /// Cumulative mean normalized difference function
    fn cumulative_mean_normalized(&mut self) {
        self.cmndf[0] = 1.0;
        let mut running_sum = 0.0f32;

        for tau in 1..self.cmndf.len() {
            running_sum += self.diff[tau];
            self.cmndf[tau] = if running_sum > 0.0 {
                self.diff[tau] * tau as f32 / running_sum
            } else {
                1.0
            };
        }
    }

    /// First lag under the threshold at a local minimum; falls back to the
    /// global minimum when it is reasonably strong
    fn best_tau(&self) -> Option<usize> {
        for tau in self.tau_min..self.tau_max {
            if self.cmndf[tau] < self.threshold
                && tau + 1 < self.cmndf.len()
                && self.cmndf[tau] < self.cmndf[tau + 1]
            {
                return Some(tau);
            }
        }

        let mut best = self.tau_min;
        let mut best_value = self.cmndf[self.tau_min];
        for tau in self.tau_min..self.tau_max {
            if self.cmndf[tau] < best_value {
                best_value = self.cmndf[tau];
                best = tau;
            }
        }

        if best_value < 0.5 {
            Some(best)
        } else {
            None
        }
    }

    /// Parabolic interpolation around the chosen lag
    fn parabolic_refine(&self, tau: usize) -> f32 {
        if tau == 0 || tau + 1 >= self.cmndf.len() {
            return tau as f32;
        }

        let s0 = self.cmndf[tau - 1];
        let s1 = self.cmndf[tau];
        let s2 = self.cmndf[tau + 1];

        let denom = 2.0 * (s0 - 2.0 * s1 + s2);
        if denom.abs() < 1e-12 {
            return tau as f32;
        }

        let adjustment = (s0 - s2) / denom;
        if adjustment.is_finite() && adjustment.abs() < 1.0 {
            tau as f32 + adjustment
        } else {
            tau as f32
        }
    }
}
