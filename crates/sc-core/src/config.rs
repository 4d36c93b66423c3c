//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// HRTF database configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrtfConfig {
    /// FFT size for spectra and block convolution
    pub fft_size: usize,
    /// Synthetic impulse response length in samples
    pub filter_length: usize,
    /// Number of azimuth bins (full circle)
    pub num_azimuth: usize,
    /// Number of elevation bins (-90 deg to +90 deg)
    pub num_elevation: usize,
}

impl Default for HrtfConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            filter_length: 1024,
            num_azimuth: 24,
            num_elevation: 12,
        }
    }
}

impl HrtfConfig {
    /// Azimuth grid step in degrees
    pub fn azimuth_step(&self) -> f32 {
        360.0 / self.num_azimuth as f32
    }

    /// Elevation grid step in degrees
    pub fn elevation_step(&self) -> f32 {
        180.0 / self.num_elevation as f32
    }

    /// Total number of grid directions
    pub fn num_directions(&self) -> usize {
        self.num_azimuth * self.num_elevation
    }
}

/// Reverb configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbConfig {
    /// Feedback decay applied to the delayed signal
    pub decay: f32,
    /// Circular buffer length in seconds
    pub buffer_seconds: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            decay: 0.4,
            buffer_seconds: 0.5,
        }
    }
}

impl ReverbConfig {
    /// Circular buffer length in samples at the given rate
    pub fn buffer_len(&self, sample_rate: u32) -> usize {
        (sample_rate as f32 * self.buffer_seconds) as usize
    }
}

/// Crosstalk cancellation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CtcConfig {
    /// Crosstalk path attenuation factor
    pub alpha: f32,
}

impl Default for CtcConfig {
    fn default() -> Self {
        Self { alpha: 0.7 }
    }
}

/// Position Kalman filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Filter step in seconds (control tick period)
    pub dt: f32,
    /// Process noise variance (diagonal of Q)
    pub process_noise: f32,
    /// Measurement noise standard deviation (R diagonal is the square)
    pub measurement_noise: f32,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            process_noise: 0.01,
            measurement_noise: 0.15,
        }
    }
}

/// Orientation fusion configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Complementary filter weight kept from the previous orientation.
    /// Each measurement pulls the estimate `1 - alpha` of the way over.
    pub orientation_alpha: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            orientation_alpha: 0.9,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Frames per rendered block
    pub block_size: usize,
    pub hrtf: HrtfConfig,
    pub reverb: ReverbConfig,
    pub ctc: CtcConfig,
    pub kalman: KalmanConfig,
    pub fusion: FusionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 96_000,
            block_size: 1024,
            hrtf: HrtfConfig::default(),
            reverb: ReverbConfig::default(),
            ctc: CtcConfig::default(),
            kalman: KalmanConfig::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration at startup.
    ///
    /// The reverb cursor arithmetic requires the circular buffer to hold
    /// at least two blocks; the HRTF convolution requires the FFT to hold
    /// a full block and a full filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        let reverb_len = self.reverb.buffer_len(self.sample_rate);
        if reverb_len < 2 * self.block_size {
            return Err(ConfigError::ReverbBufferTooShort {
                needed: 2 * self.block_size,
                got: reverb_len,
            });
        }
        if !(0.0..1.0).contains(&self.reverb.decay) {
            return Err(ConfigError::InvalidReverbDecay(self.reverb.decay));
        }
        if self.hrtf.fft_size < self.block_size || self.hrtf.fft_size < self.hrtf.filter_length {
            return Err(ConfigError::FftTooShort {
                fft_size: self.hrtf.fft_size,
                block_size: self.block_size,
                filter_length: self.hrtf.filter_length,
            });
        }
        if self.hrtf.num_azimuth == 0 || self.hrtf.num_elevation == 0 {
            return Err(ConfigError::EmptyHrtfGrid {
                num_azimuth: self.hrtf.num_azimuth,
                num_elevation: self.hrtf.num_elevation,
            });
        }
        if self.kalman.dt <= 0.0 || !self.kalman.dt.is_finite() {
            return Err(ConfigError::InvalidKalmanStep(self.kalman.dt));
        }
        if !(0.0..=1.0).contains(&self.fusion.orientation_alpha) {
            return Err(ConfigError::InvalidOrientationAlpha(
                self.fusion.orientation_alpha,
            ));
        }
        Ok(())
    }
}
