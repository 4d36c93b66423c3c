//! sc-fusion: Head-tracking fusion for the SoundScape engine
//!
//! Consumes raw ranging/IMU samples at the control rate and maintains a
//! smoothed listener pose:
//!
//! - `kalman` - six-state linear Kalman filter for position
//! - `fusion` - Kalman + complementary quaternion filter -> `Pose`
//! - `shared` - torn-free pose snapshot shared with the audio task
//! - `timer` - 100 Hz control thread with jitter diagnostics

mod fusion;
mod kalman;
mod shared;
mod timer;

pub use fusion::PoseFusion;
pub use kalman::PositionFilter;
pub use shared::SharedPose;
pub use timer::{ControlTimer, TimerDiagnostics};
