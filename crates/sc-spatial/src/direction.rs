//! Head-frame direction geometry

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Distance clamp preventing the singularity at the listener's head
pub const MIN_DISTANCE: f32 = 0.1;

/// Source direction in the listener's head frame.
///
/// The head frame has +y forward, +x right and +z up, so azimuth is
/// `atan2(x, y)`: 0 degrees straight ahead, 90 degrees to the right,
/// 270 degrees (equivalently -90) to the left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Azimuth in degrees
    pub azimuth: f32,
    /// Elevation in degrees (-90 to 90)
    pub elevation: f32,
    /// Distance in meters, at least `MIN_DISTANCE`
    pub distance: f32,
}

impl Direction {
    /// Direction of a world-space source as seen from the listener.
    ///
    /// The inverse listener rotation moves the source into the head
    /// frame before the angles are extracted.
    pub fn from_world(
        source: &Vector3<f32>,
        listener_pos: &Vector3<f32>,
        listener_orient: &UnitQuaternion<f32>,
    ) -> Self {
        let local = listener_orient.inverse_transform_vector(&(source - listener_pos));
        let distance = local.norm().max(MIN_DISTANCE);
        let azimuth = local.x.atan2(local.y).to_degrees();
        let elevation = (local.z / distance).clamp(-1.0, 1.0).asin().to_degrees();
        Self {
            azimuth,
            elevation,
            distance,
        }
    }

    /// Inverse-distance attenuation `1 / (d + 1)`
    pub fn attenuation(&self) -> f32 {
        1.0 / (self.distance + 1.0)
    }
}
