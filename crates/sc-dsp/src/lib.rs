//! sc-dsp: Block DSP processors for the SoundScape pipeline
//!
//! All processors here run inside the audio callback: they are
//! preallocated at construction and perform no heap allocation while
//! processing.
//!
//! - `eq` - three-band scalar EQ
//! - `reverb` - single-tap circular-buffer block reverb
//! - `doppler` - resample-based radial-velocity frequency shift

pub mod doppler;
pub mod eq;
pub mod reverb;

pub use doppler::DopplerShifter;
pub use eq::ThreeBandEq;
pub use reverb::BlockReverb;

use sc_core::Sample;

/// Base trait for DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);
}

/// Processor operating in place on one mono block
pub trait BlockProcessor: Processor {
    /// Process a block of samples in place
    fn process_block(&mut self, block: &mut [Sample]);
}
