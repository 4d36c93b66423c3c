//! Linear Kalman filter for listener position
//!
//! State is `[x, y, z, vx, vy, vz]` under a constant-velocity model;
//! the ranging sensor observes the first three components. Process and
//! measurement noise are constant diagonals from the configuration.

use nalgebra::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};

use sc_core::KalmanConfig;

/// Six-state position/velocity Kalman filter
pub struct PositionFilter {
    state: Vector6<f32>,
    covariance: Matrix6<f32>,
    transition: Matrix6<f32>,
    process_noise: Matrix6<f32>,
    measurement_noise: Matrix3<f32>,
    observation: Matrix3x6<f32>,
}

impl PositionFilter {
    pub fn new(config: &KalmanConfig) -> Self {
        let mut transition = Matrix6::identity();
        transition[(0, 3)] = config.dt;
        transition[(1, 4)] = config.dt;
        transition[(2, 5)] = config.dt;

        let mut observation = Matrix3x6::zeros();
        observation[(0, 0)] = 1.0;
        observation[(1, 1)] = 1.0;
        observation[(2, 2)] = 1.0;

        let r = config.measurement_noise * config.measurement_noise;

        Self {
            state: Vector6::zeros(),
            covariance: Matrix6::identity(),
            transition,
            process_noise: Matrix6::identity() * config.process_noise,
            measurement_noise: Matrix3::identity() * r,
            observation,
        }
    }

    /// Propagate the state one step forward
    pub fn predict(&mut self) {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
    }

    /// Fold one position measurement into the estimate
    pub fn update(&mut self, measurement: &Vector3<f32>) {
        let innovation = measurement - self.observation * self.state;
        let s = self.observation * self.covariance * self.observation.transpose()
            + self.measurement_noise;
        let Some(s_inv) = s.try_inverse() else {
            // Singular innovation covariance: drop the measurement.
            return;
        };
        let gain = self.covariance * self.observation.transpose() * s_inv;

        self.state += gain * innovation;
        self.covariance = (Matrix6::identity() - gain * self.observation) * self.covariance;
        // Symmetrize against roundoff so the covariance stays PSD.
        self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
    }

    /// Current position estimate
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.state[0], self.state[1], self.state[2])
    }

    /// Current velocity estimate
    pub fn velocity(&self) -> Vector3<f32> {
        Vector3::new(self.state[3], self.state[4], self.state[5])
    }

    /// State covariance
    pub fn covariance(&self) -> &Matrix6<f32> {
        &self.covariance
    }
}
