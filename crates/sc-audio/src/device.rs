//! Output device selection

use cpal::traits::HostTrait;
use cpal::Device;

use crate::{AudioError, AudioResult};

/// Default output device of the default host
pub fn default_output_device() -> AudioResult<Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoDevice)
}
