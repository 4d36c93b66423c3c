//! sc-engine: The SoundScape engine
//!
//! Wires the pieces into a running system: a bank of looping world-space
//! sources, the binaural renderer driven by the audio device callback,
//! and a 100 Hz control loop fusing raw sensor samples into the shared
//! listener pose.
//!
//! Decoding, input handling, and the sensor itself stay outside; sources
//! arrive as PCM and the sensor is anything implementing
//! [`SensorSource`].

mod engine;
mod error;
mod sensor;
mod sources;

pub use engine::Engine;
pub use error::EngineError;
pub use sensor::SensorSource;
pub use sources::{AudioSource, SourceBank, SourceInput};
