//! sc-audio: Audio output for the SoundScape engine
//!
//! Thin wrapper over the host audio driver: default-device selection
//! and an f32 stereo output stream that feeds a planar block callback.
//! The driver owns the callback thread; everything upstream of it
//! treats this crate as the external output sink.

mod device;
mod error;
mod stream;

pub use device::default_output_device;
pub use error::{AudioError, AudioResult};
pub use stream::{BlockCallback, OutputStream};
