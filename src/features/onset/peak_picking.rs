//! Lenient onset peak picking
//!
//! Picks peaks from an onset-strength envelope using local-max and
//! local-mean windows plus a minimum wait between picks. A frame `n` is
//! selected when all three hold:
//!
//! 1. `env[n]` equals the maximum over `[n - pre_max, n + post_max]`
//! 2. `env[n] >= mean(env[n - pre_avg ..= n + post_avg]) + delta`
//! 3. at least `wait` frames have passed since the previous pick
//!
//! Windows are clamped at the envelope boundaries. With a small `delta` and
//! wide averaging windows this is deliberately over-inclusive; downstream
//! consumers filter the candidate set.

/// Peak-picking parameters for one onset detection pass
#[derive(Debug, Clone)]
pub struct PeakPickingParams {
    /// Frames before `n` included in the local-max window
    pub pre_max: usize,

    /// Frames after `n` included in the local-max window
    pub post_max: usize,

    /// Frames before `n` included in the local-mean window
    pub pre_avg: usize,

    /// Frames after `n` included in the local-mean window
    pub post_avg: usize,

    /// Threshold above the local mean
    pub delta: f32,

    /// Minimum spacing between picks, in seconds
    pub wait_seconds: f32,
}

impl PeakPickingParams {
    /// Convert the wait time to a frame count for the given hop rate
    pub fn wait_frames(&self, sample_rate: u32, hop_length: usize) -> usize {
        (self.wait_seconds * sample_rate as f32 / hop_length as f32) as usize
    }
}

/// Pick onset peaks from an envelope
///
/// # Arguments
///
/// * `envelope` - Onset-strength envelope
/// * `params` - Window sizes and threshold
/// * `wait_frames` - Minimum frames between consecutive picks
///
/// # Returns
///
/// Envelope frame indices of the selected peaks, in increasing order
pub fn peak_pick(envelope: &[f32], params: &PeakPickingParams, wait_frames: usize) -> Vec<usize> {
    let n = envelope.len();
    let mut picks = Vec::new();
    let mut last_pick: Option<usize> = None;

    for i in 0..n {
        // Wait condition first, it is the cheapest
        if let Some(last) = last_pick {
            if i - last <= wait_frames {
                continue;
            }
        }

        let max_lo = i.saturating_sub(params.pre_max);
        let max_hi = (i + params.post_max).min(n - 1);
        let local_max = envelope[max_lo..=max_hi]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if envelope[i] < local_max {
            continue;
        }

        let avg_lo = i.saturating_sub(params.pre_avg);
        let avg_hi = (i + params.post_avg).min(n - 1);
        let local_mean = envelope[avg_lo..=avg_hi].iter().sum::<f32>()
            / (avg_hi - avg_lo + 1) as f32;
        if envelope[i] < local_mean + params.delta {
            continue;
        }

        picks.push(i);
        last_pick = Some(i);
    }

    log::debug!(
        "Peak picking: {} frames, delta={:.3}, wait={} -> {} picks",
        n,
        params.delta,
        wait_frames,
        picks.len()
    );

    picks
}
