//! Pose fusion
//!
//! Position runs through the Kalman filter; orientation runs through a
//! complementary filter (slerp toward each measurement) which is cheap
//! enough for the control tick and smooths sensor jitter well at the
//! configured weight.

use nalgebra::UnitQuaternion;

use sc_core::{FusionConfig, KalmanConfig, Pose, RawSample};

use crate::PositionFilter;

/// Sensor fusion producing the listener pose at the control rate
pub struct PoseFusion {
    filter: PositionFilter,
    orientation: UnitQuaternion<f32>,
    /// Slerp weight toward each new measurement (`1 - alpha`)
    blend: f32,
}

impl PoseFusion {
    pub fn new(kalman: &KalmanConfig, fusion: &FusionConfig) -> Self {
        Self {
            filter: PositionFilter::new(kalman),
            orientation: UnitQuaternion::identity(),
            blend: 1.0 - fusion.orientation_alpha,
        }
    }

    /// Fold one raw sensor sample into the pose estimate.
    ///
    /// `accel` and `gyro` are accepted for interface stability but not
    /// read by the current filters.
    pub fn update(&mut self, raw: &RawSample) -> Pose {
        self.filter.predict();
        self.filter.update(&raw.position);

        // Antipodal measurements have no unique interpolation path;
        // adopt the measurement instead of panicking mid-tick.
        let mut orientation = self
            .orientation
            .try_slerp(&raw.orientation, self.blend, 1.0e-6)
            .unwrap_or(raw.orientation);
        orientation.renormalize();
        self.orientation = orientation;

        Pose::new(self.filter.position(), self.orientation)
    }

    /// Latest fused pose
    pub fn pose(&self) -> Pose {
        Pose::new(self.filter.position(), self.orientation)
    }

    /// Position sub-filter (diagnostics)
    pub fn position_filter(&self) -> &PositionFilter {
        &self.filter
    }
}
