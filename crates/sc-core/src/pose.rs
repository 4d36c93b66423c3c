//! Listener pose and raw sensor sample types

use nalgebra::{UnitQuaternion, Vector3};

/// Listener head pose: world-space position in meters and head
/// orientation relative to world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity orientation at the given position
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

/// One raw sensor sample delivered to the fusion loop on each control
/// tick. `accel` and `gyro` are carried through for future use; the
/// current fusion reads only `position` and `orientation`.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    /// Ranging position measurement in meters
    pub position: Vector3<f32>,
    /// Orientation measurement
    pub orientation: UnitQuaternion<f32>,
    /// Accelerometer reading in m/s^2
    pub accel: Vector3<f32>,
    /// Gyroscope reading in rad/s
    pub gyro: Vector3<f32>,
}

impl RawSample {
    /// Sample carrying only a pose measurement
    pub fn from_pose(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let pose = Pose::default();
        assert_eq!(pose.position, Vector3::zeros());
        assert_eq!(pose.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn test_pose_at() {
        let pose = Pose::at(0.0, 0.0, 1.6);
        assert!((pose.position.z - 1.6).abs() < 1e-6);
    }
}
