//! Speaker crosstalk cancellation
//!
//! Instantaneous 2x2 cross-feed removal with a slight direct-path boost,
//! followed by block-local peak normalization. A delay-line canceller
//! modeling the cross-ear propagation time is a possible extension; the
//! pipeline exercises the instantaneous matrix.

use sc_core::Sample;

/// Direct-path boost compensating the cancelled cross-feed energy
const DIRECT_GAIN: f32 = 1.1;

/// Weight of the attenuation factor in the cross-feed term
const CROSS_WEIGHT: f32 = 0.5;

/// Instantaneous crosstalk canceller
#[derive(Debug, Clone)]
pub struct CrosstalkCanceller {
    alpha: f32,
}

impl CrosstalkCanceller {
    /// Create a canceller with the given crosstalk attenuation factor
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    /// Process a stereo block in place.
    ///
    /// Applies the cancellation matrix, then rescales both channels by
    /// the joint peak when it exceeds 1.0. No state is carried between
    /// blocks.
    pub fn process_block(&self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        let cross = CROSS_WEIGHT * self.alpha;

        let mut peak = 0.0f32;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (dry_l, dry_r) = (*l, *r);
            *l = DIRECT_GAIN * dry_l - cross * dry_r;
            *r = DIRECT_GAIN * dry_r - cross * dry_l;
            peak = peak.max(l.abs()).max(r.abs());
        }

        if peak > 1.0 {
            let inv = 1.0 / peak;
            for sample in left.iter_mut() {
                *sample *= inv;
            }
            for sample in right.iter_mut() {
                *sample *= inv;
            }
        }
    }
}
