//! Engine error types

use thiserror::Error;

/// Fatal engine errors. Only startup can fail; once running, faults
/// degrade to silence or the last-known pose instead of propagating.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] sc_core::ConfigError),

    #[error("Audio device error: {0}")]
    Audio(#[from] sc_audio::AudioError),
}
