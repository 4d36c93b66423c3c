//! Configuration error types

use thiserror::Error;

/// Startup configuration errors. These are fatal; everything past
/// initialization degrades instead of failing.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Reverb buffer too short: need at least {needed} samples, got {got}")]
    ReverbBufferTooShort { needed: usize, got: usize },

    #[error("Reverb decay out of range [0, 1): {0}")]
    InvalidReverbDecay(f32),

    #[error(
        "FFT size {fft_size} too short for block size {block_size} / filter length {filter_length}"
    )]
    FftTooShort {
        fft_size: usize,
        block_size: usize,
        filter_length: usize,
    },

    #[error("HRTF grid is empty: {num_azimuth} x {num_elevation}")]
    EmptyHrtfGrid {
        num_azimuth: usize,
        num_elevation: usize,
    },

    #[error("Kalman step must be positive and finite: {0}")]
    InvalidKalmanStep(f32),

    #[error("Orientation smoothing factor out of range [0, 1]: {0}")]
    InvalidOrientationAlpha(f32),
}
