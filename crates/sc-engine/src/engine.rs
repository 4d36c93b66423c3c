//! Engine lifecycle and task wiring
//!
//! Two tasks touch shared state: the control timer writes the fused pose
//! at 100 Hz, the audio callback reads one snapshot per block. Shutdown
//! stops the timer first (no more pose writes), then the stream (no more
//! callbacks).

use std::sync::Arc;
use std::time::Duration;

use sc_audio::{BlockCallback, OutputStream};
use sc_core::{EngineConfig, Pose};
use sc_fusion::{ControlTimer, PoseFusion, SharedPose, TimerDiagnostics};
use sc_spatial::{HrtfDatabase, Renderer};

use crate::{EngineError, SensorSource, SourceBank, SourceInput};

/// Components handed off to the running tasks on `start`
struct Parts {
    bank: SourceBank,
    renderer: Renderer,
    fusion: PoseFusion,
    sensor: Box<dyn SensorSource>,
}

/// The assembled SoundScape engine
pub struct Engine {
    config: EngineConfig,
    shared_pose: Arc<SharedPose>,
    timer: ControlTimer,
    stream: Option<OutputStream>,
    parts: Option<Parts>,
}

impl Engine {
    /// Validate the configuration and build every component, including
    /// the synthetic HRTF database. Sources are fixed from here on.
    pub fn new(
        config: EngineConfig,
        sources: Vec<SourceInput>,
        sensor: Box<dyn SensorSource>,
        initial_pose: Pose,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let hrtf = Arc::new(HrtfDatabase::synthetic(&config.hrtf, config.sample_rate));
        log::info!(
            "HRTF database ready: {} directions at {} Hz",
            hrtf.num_directions(),
            config.sample_rate
        );

        let renderer = Renderer::new(&config, hrtf);
        let bank = SourceBank::new(sources, config.block_size, config.sample_rate);
        log::info!("Source bank holds {} sources", bank.len());

        let fusion = PoseFusion::new(&config.kalman, &config.fusion);
        let shared_pose = Arc::new(SharedPose::new(initial_pose));
        let timer = ControlTimer::new(Duration::from_secs_f32(config.kalman.dt));

        Ok(Self {
            config,
            shared_pose,
            timer,
            stream: None,
            parts: Some(Parts {
                bank,
                renderer,
                fusion,
                sensor,
            }),
        })
    }

    /// Start the control loop, then the audio stream.
    ///
    /// Starting an already started engine is a no-op. If the audio
    /// device cannot be opened the timer is stopped again and the error
    /// is returned; the engine stays stopped.
    pub fn start(&mut self) -> Result<(), EngineError> {
        let Some(parts) = self.parts.take() else {
            return Ok(());
        };
        let Parts {
            mut bank,
            mut renderer,
            mut fusion,
            mut sensor,
        } = parts;

        let pose_writer = Arc::clone(&self.shared_pose);
        self.timer.start(move || {
            let raw = sensor.sample();
            let pose = fusion.update(&raw);
            pose_writer.publish(pose);
        });

        let pose_reader = Arc::clone(&self.shared_pose);
        let mut last_pose = pose_reader.get();
        let callback: BlockCallback = Box::new(move |left, right| {
            // One torn-free pose snapshot per block, read at the start;
            // under writer contention the previous snapshot is reused.
            pose_reader.load(&mut last_pose);
            bank.advance();
            renderer.render(bank.frames(), &last_pose, left, right);
        });

        let stream_result = sc_audio::default_output_device().and_then(|device| {
            OutputStream::new(
                &device,
                self.config.sample_rate,
                self.config.block_size,
                callback,
            )
        });
        let stream = match stream_result {
            Ok(stream) => stream,
            Err(err) => {
                self.timer.stop();
                return Err(err.into());
            }
        };
        if let Err(err) = stream.start() {
            self.timer.stop();
            return Err(err.into());
        }

        log::info!(
            "Engine started: {} Hz, {}-frame blocks",
            self.config.sample_rate,
            self.config.block_size
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop the control timer first, then the audio stream. Idempotent.
    pub fn stop(&mut self) {
        self.timer.stop();
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.stop() {
                log::error!("Failed to stop audio stream: {err}");
            }
            log::info!("Engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.stream.as_ref().is_some_and(OutputStream::is_running)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest fused pose snapshot
    pub fn pose(&self) -> Pose {
        self.shared_pose.get()
    }

    /// Control timer jitter diagnostics
    pub fn timer_diagnostics(&self) -> Arc<TimerDiagnostics> {
        self.timer.diagnostics()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};
    use sc_core::RawSample;

    fn still_sensor() -> Box<dyn SensorSource> {
        Box::new(|| RawSample::from_pose(Vector3::new(0.0, 0.0, 1.6), UnitQuaternion::identity()))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.block_size = 0;
        let result = Engine::new(config, Vec::new(), still_sensor(), Pose::default());
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_new_builds_with_defaults() {
        let sources = vec![SourceInput::new(
            "ahead",
            Vector3::new(0.0, 1.0, 0.0),
            vec![0.1; 4096],
        )];
        let engine = Engine::new(
            EngineConfig::default(),
            sources,
            still_sensor(),
            Pose::at(0.0, 0.0, 1.6),
        )
        .expect("default config must build");
        assert!(!engine.is_running());
        assert!((engine.pose().position.z - 1.6).abs() < 1e-6);
    }
}
