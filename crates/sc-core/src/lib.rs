//! sc-core: Shared types for the SoundScape engine
//!
//! This crate provides the foundational types used across all SoundScape
//! crates: the engine configuration (with validation), the listener pose,
//! and the raw sensor sample delivered to the fusion loop.

mod config;
mod error;
mod pose;

pub use config::*;
pub use error::*;
pub use pose::*;

/// Audio sample type used throughout the engine.
pub type Sample = f32;
