//! sc-spatial: SoundScape binaural spatializer
//!
//! Renders mono world-space sources into a stereo block from the
//! listener's moving frame of reference:
//!
//! - Head-frame direction geometry (azimuth/elevation/distance)
//! - Synthetic HRTF database (ITD/ILD model + pinna coloration)
//! - FFT-domain HRTF convolution per source
//! - Post-mix EQ, reverb, and speaker crosstalk cancellation
//!
//! The renderer is built once with every buffer preallocated and then
//! runs allocation-free inside the audio callback.

mod crosstalk;
mod direction;
mod hrtf;
mod renderer;

pub use crosstalk::CrosstalkCanceller;
pub use direction::{Direction, MIN_DISTANCE};
pub use hrtf::{DirectionFilter, HrtfDatabase};
pub use renderer::{Renderer, SourceFrame};
