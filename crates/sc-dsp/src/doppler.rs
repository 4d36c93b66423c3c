//! Doppler frequency shift
//!
//! Moving sources shift pitch by `c / (c + v_r)` where `v_r` is the
//! radial velocity along the source direction (positive receding). The
//! shift is realized by resampling the block to `round(N * factor)`
//! samples and truncating or zero-padding back to N. Factors within
//! 1e-3 of unity pass the block through untouched.

use sc_core::Sample;

/// Speed of sound in m/s
pub const SPEED_OF_SOUND: f32 = 343.0;

/// Resample-based Doppler shifter with preallocated scratch
#[derive(Debug, Clone)]
pub struct DopplerShifter {
    scratch: Vec<Sample>,
}

impl DopplerShifter {
    /// Create a shifter for blocks of `block_size` frames. The scratch
    /// holds two blocks, bounding the supported down-shift factor.
    pub fn new(block_size: usize) -> Self {
        Self {
            scratch: vec![0.0; 2 * block_size],
        }
    }

    /// Shift factor for a radial velocity in m/s
    pub fn factor(radial_velocity: f32) -> f32 {
        SPEED_OF_SOUND / (SPEED_OF_SOUND + radial_velocity)
    }

    /// Apply the shift for the given radial velocity in place.
    ///
    /// Identity (bit-exact) when the factor is within 1e-3 of unity.
    pub fn process_block(&mut self, block: &mut [Sample], radial_velocity: f32) {
        let factor = Self::factor(radial_velocity);
        if (factor - 1.0).abs() < 1e-3 {
            return;
        }

        let n = block.len();
        let resampled = ((n as f32 * factor).round() as usize).clamp(1, self.scratch.len());

        // Linear-interpolation resample into scratch.
        let step = if resampled > 1 {
            (n - 1) as f32 / (resampled - 1) as f32
        } else {
            0.0
        };
        for i in 0..resampled {
            let pos = i as f32 * step;
            let i0 = (pos as usize).min(n - 1);
            let i1 = (i0 + 1).min(n - 1);
            let frac = pos - i0 as f32;
            self.scratch[i] = block[i0] + (block[i1] - block[i0]) * frac;
        }

        // Truncate or zero-pad back to the block length.
        let copied = resampled.min(n);
        block[..copied].copy_from_slice(&self.scratch[..copied]);
        block[copied..].fill(0.0);
    }
}
