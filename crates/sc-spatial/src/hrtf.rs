//! Synthetic HRTF database
//!
//! A full-sphere grid of left/right filter spectra, generated once from
//! a parametric head model rather than measured responses:
//!
//! - Woodworth's interaural time difference, split across the ears
//!   around a causal base offset
//! - A cosine interaural level difference on the far ear
//! - A damped 7 kHz sinusoid on both ears standing in for pinna
//!   coloration
//!
//! The database is immutable after construction and can be shared
//! across threads behind an `Arc`.

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use sc_core::HrtfConfig;
use sc_dsp::doppler::SPEED_OF_SOUND;

/// Head radius in meters for the ITD model
const HEAD_RADIUS: f32 = 0.0875;

/// Impulse offset in samples keeping the ITD shift causal
const BASE_OFFSET: usize = 100;

/// Frequency of the pinna coloration component in Hz
const COLORATION_HZ: f32 = 7000.0;

/// Left/right filter spectra for one grid direction
#[derive(Clone)]
pub struct DirectionFilter {
    /// Left ear spectrum, `fft_size` bins
    pub left: Vec<Complex32>,
    /// Right ear spectrum, `fft_size` bins
    pub right: Vec<Complex32>,
}

/// Synthetic HRTF database over an azimuth x elevation grid
pub struct HrtfDatabase {
    /// Filters indexed by `el_idx * num_azimuth + az_idx`
    filters: Vec<DirectionFilter>,
    config: HrtfConfig,
    sample_rate: u32,
}

impl HrtfDatabase {
    /// Generate the synthetic database for the given grid and rate.
    pub fn synthetic(config: &HrtfConfig, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let mut scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let mut filters = Vec::with_capacity(config.num_directions());
        for _el_idx in 0..config.num_elevation {
            for az_idx in 0..config.num_azimuth {
                let azimuth = az_idx as f32 * config.azimuth_step();
                filters.push(build_filter(
                    config,
                    sample_rate,
                    azimuth,
                    fft.as_ref(),
                    &mut scratch,
                ));
            }
        }

        Self {
            filters,
            config: *config,
            sample_rate,
        }
    }

    /// Filter for the grid point nearest to the requested direction.
    ///
    /// Azimuth wraps into [0, 360) and snaps modulo the grid; elevation
    /// clamps to the grid. The snapped point is within half a grid step
    /// of the request on both axes.
    pub fn nearest(&self, azimuth: f32, elevation: f32) -> &DirectionFilter {
        let (az_idx, el_idx) = self.snap_indices(azimuth, elevation);
        &self.filters[el_idx * self.config.num_azimuth + az_idx]
    }

    /// Grid direction the given request snaps to, in degrees
    pub fn nearest_direction(&self, azimuth: f32, elevation: f32) -> (f32, f32) {
        let (az_idx, el_idx) = self.snap_indices(azimuth, elevation);
        (
            az_idx as f32 * self.config.azimuth_step(),
            el_idx as f32 * self.config.elevation_step() - 90.0,
        )
    }

    fn snap_indices(&self, azimuth: f32, elevation: f32) -> (usize, usize) {
        let az = azimuth.rem_euclid(360.0);
        let az_idx = ((az / self.config.azimuth_step()).round() as usize) % self.config.num_azimuth;
        let el_steps = ((elevation + 90.0) / self.config.elevation_step()).round();
        let el_idx = el_steps.clamp(0.0, (self.config.num_elevation - 1) as f32) as usize;
        (az_idx, el_idx)
    }

    /// Number of grid directions
    pub fn num_directions(&self) -> usize {
        self.filters.len()
    }

    /// Spectrum length in bins
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Sample rate the impulse responses were synthesized for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Synthesize the impulse-response pair for one azimuth and transform it
/// to spectra. The synthetic model has no elevation dependence; every
/// elevation row shares the same azimuth ring.
fn build_filter(
    config: &HrtfConfig,
    sample_rate: u32,
    azimuth: f32,
    fft: &dyn Fft<f32>,
    scratch: &mut [Complex32],
) -> DirectionFilter {
    let filter_len = config.filter_length;
    let mut ir_left = vec![0.0f32; filter_len];
    let mut ir_right = vec![0.0f32; filter_len];

    // Woodworth's model: itd = (r/c) * (theta + sin theta), measured
    // from the midline and mirrored past 180 degrees.
    let theta = (azimuth % 180.0).to_radians();
    let mut itd_sec = (HEAD_RADIUS / SPEED_OF_SOUND) * (theta + theta.sin());
    if azimuth > 180.0 {
        itd_sec = -itd_sec;
    }
    let itd_samples = (itd_sec * sample_rate as f32).round() as i64;

    // Cosine level difference: 1.0 at the midline, 0.0 at 180 degrees.
    let ild = 0.5 + 0.5 * azimuth.to_radians().cos();

    // The leading ear carries the unit impulse; the far ear is delayed
    // by the ITD around the causal base offset and scaled by the ILD.
    // On the midline (ITD of zero) neither ear leads and both carry the
    // full impulse.
    let half_shift = (itd_samples.unsigned_abs() / 2) as usize;
    let (left_idx, left_amp, right_idx, right_amp) = if itd_samples > 0 {
        (BASE_OFFSET + half_shift, ild, BASE_OFFSET, 1.0)
    } else if itd_samples < 0 {
        (BASE_OFFSET, 1.0, BASE_OFFSET + half_shift, ild)
    } else {
        (BASE_OFFSET, 1.0, BASE_OFFSET, 1.0)
    };
    if left_idx < filter_len {
        ir_left[left_idx] = left_amp;
    }
    if right_idx < filter_len {
        ir_right[right_idx] = right_amp;
    }

    // High-frequency coloration shared by both ears.
    for t in 0..filter_len {
        let tf = t as f32;
        let color = 0.05
            * (-tf / 100.0).exp()
            * (std::f32::consts::TAU * COLORATION_HZ * tf / sample_rate as f32).sin();
        ir_left[t] += color;
        ir_right[t] += color;
    }

    DirectionFilter {
        left: spectrum(&ir_left, config.fft_size, fft, scratch),
        right: spectrum(&ir_right, config.fft_size, fft, scratch),
    }
}

/// Zero-pad an impulse response to the FFT size and transform it
fn spectrum(
    ir: &[f32],
    fft_size: usize,
    fft: &dyn Fft<f32>,
    scratch: &mut [Complex32],
) -> Vec<Complex32> {
    let mut buffer: Vec<Complex32> = ir
        .iter()
        .map(|&x| Complex32::new(x, 0.0))
        .chain(std::iter::repeat(Complex32::new(0.0, 0.0)))
        .take(fft_size)
        .collect();
    fft.process_with_scratch(&mut buffer, scratch);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> HrtfDatabase {
        HrtfDatabase::synthetic(&HrtfConfig::default(), 96_000)
    }

    #[test]
    fn test_grid_size_and_spectrum_length() {
        let db = test_db();
        assert_eq!(db.num_directions(), 288);
        let filter = db.nearest(0.0, 0.0);
        assert_eq!(filter.left.len(), 2048);
        assert_eq!(filter.right.len(), 2048);
    }

    #[test]
    fn test_nearest_within_half_step() {
        let db = test_db();
        for az in [0.0f32, 7.4, 13.0, 93.2, 181.0, 270.0, 352.6, -90.0, 359.9] {
            for el in [-90.0f32, -42.0, -7.4, 0.0, 7.5, 33.0, 88.0, 90.0] {
                let (snap_az, snap_el) = db.nearest_direction(az, el);
                let az_err = {
                    let diff = (az.rem_euclid(360.0) - snap_az).abs();
                    diff.min(360.0 - diff)
                };
                assert!(az_err <= 7.5 + 1e-3, "azimuth {az} snapped to {snap_az}");
                assert!(
                    (el - snap_el).abs() <= 7.5 + 1e-3,
                    "elevation {el} snapped to {snap_el}"
                );
            }
        }
    }

    #[test]
    fn test_elevation_clamps_outside_grid() {
        // The top elevation bin is 75 degrees; everything above clamps.
        let db = test_db();
        let (_, el) = db.nearest_direction(0.0, 90.0);
        assert!((el - 75.0).abs() < 1e-3);
        let (_, el) = db.nearest_direction(0.0, -90.0);
        assert!((el + 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_front_is_symmetric() {
        let db = test_db();
        let filter = db.nearest(0.0, 0.0);
        for (l, r) in filter.left.iter().zip(filter.right.iter()) {
            assert_eq!(l, r);
        }
    }

    #[test]
    fn test_rear_is_symmetric() {
        let db = test_db();
        let filter = db.nearest(180.0, 0.0);
        for (l, r) in filter.left.iter().zip(filter.right.iter()) {
            assert_eq!(l, r);
        }
    }

    #[test]
    fn test_left_right_mirror() {
        // 90 and 270 degrees are mirror images: the leading ear swaps.
        let db = test_db();
        let right_side = db.nearest(90.0, 0.0);
        let left_side = db.nearest(270.0, 0.0);
        for (a, b) in right_side.right.iter().zip(left_side.left.iter()) {
            assert!((a - b).norm() < 1e-5);
        }
        for (a, b) in right_side.left.iter().zip(left_side.right.iter()) {
            assert!((a - b).norm() < 1e-5);
        }
    }

    #[test]
    fn test_side_filters_favor_near_ear() {
        // DC bin magnitude reflects the impulse amplitudes: at 90
        // degrees the right ear leads with the unit impulse.
        let db = test_db();
        let filter = db.nearest(90.0, 0.0);
        assert!(filter.right[0].norm() > filter.left[0].norm());
        let filter = db.nearest(270.0, 0.0);
        assert!(filter.left[0].norm() > filter.right[0].norm());
    }
}
