//! Binaural block renderer
//!
//! Runs the full per-block pipeline:
//! geometry -> Doppler -> HRTF convolution -> mix -> EQ -> reverb -> CTC.
//!
//! Every buffer (FFT workspaces, per-source chunk, mix, reverb lines) is
//! sized at construction; `render` performs no heap allocation and never
//! fails. Between blocks the only carried state is the reverb buffers.

use std::sync::Arc;

use nalgebra::Vector3;
use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use sc_core::{EngineConfig, Pose, Sample};
use sc_dsp::{BlockProcessor, BlockReverb, DopplerShifter, Processor, ThreeBandEq};

use crate::{CrosstalkCanceller, Direction, HrtfDatabase};

/// One source's contribution to a block: a mono chunk and its
/// world-space position.
#[derive(Debug, Clone, Copy)]
pub struct SourceFrame<'a> {
    pub samples: &'a [Sample],
    pub position: Vector3<f32>,
}

/// The DSP pipeline for one output stream
pub struct Renderer {
    block_size: usize,
    fft_size: usize,
    hrtf: Arc<HrtfDatabase>,

    fft_forward: Arc<dyn Fft<f32>>,
    fft_inverse: Arc<dyn Fft<f32>>,
    fft_scratch: Vec<Complex32>,
    freq: Vec<Complex32>,
    left_freq: Vec<Complex32>,
    right_freq: Vec<Complex32>,

    chunk: Vec<Sample>,
    mix_left: Vec<Sample>,
    mix_right: Vec<Sample>,

    doppler: DopplerShifter,
    eq: ThreeBandEq,
    reverb_left: BlockReverb,
    reverb_right: BlockReverb,
    ctc: CrosstalkCanceller,
}

impl Renderer {
    /// Build a renderer for the given configuration and HRTF database.
    ///
    /// The configuration is assumed validated (`EngineConfig::validate`).
    pub fn new(config: &EngineConfig, hrtf: Arc<HrtfDatabase>) -> Self {
        let block_size = config.block_size;
        let fft_size = config.hrtf.fft_size;

        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(fft_size);
        let fft_inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = fft_forward
            .get_inplace_scratch_len()
            .max(fft_inverse.get_inplace_scratch_len());

        let reverb_len = config.reverb.buffer_len(config.sample_rate);

        Self {
            block_size,
            fft_size,
            hrtf,
            fft_forward,
            fft_inverse,
            fft_scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
            freq: vec![Complex32::new(0.0, 0.0); fft_size],
            left_freq: vec![Complex32::new(0.0, 0.0); fft_size],
            right_freq: vec![Complex32::new(0.0, 0.0); fft_size],
            chunk: vec![0.0; block_size],
            mix_left: vec![0.0; block_size],
            mix_right: vec![0.0; block_size],
            doppler: DopplerShifter::new(block_size),
            eq: ThreeBandEq::new(),
            reverb_left: BlockReverb::new(reverb_len, config.reverb.decay),
            reverb_right: BlockReverb::new(reverb_len, config.reverb.decay),
            ctc: CrosstalkCanceller::new(config.ctc.alpha),
        }
    }

    /// Frames per rendered block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Set the room EQ band gains
    pub fn set_eq_gains(&mut self, low: f32, mid: f32, high: f32) {
        self.eq.set_gains(low, mid, high);
    }

    /// Clear the carried reverb state
    pub fn reset(&mut self) {
        self.reverb_left.reset();
        self.reverb_right.reset();
    }

    /// Render one block from the listener's frame of reference.
    ///
    /// `out_left` and `out_right` must each hold exactly one block. The
    /// pose is read by the caller once per block and passed in by value;
    /// this method has no failure path.
    pub fn render<'a, I>(
        &mut self,
        sources: I,
        pose: &Pose,
        out_left: &mut [Sample],
        out_right: &mut [Sample],
    ) where
        I: IntoIterator<Item = SourceFrame<'a>>,
    {
        debug_assert_eq!(out_left.len(), self.block_size);
        debug_assert_eq!(out_right.len(), self.block_size);

        self.mix_left.fill(0.0);
        self.mix_right.fill(0.0);

        for frame in sources {
            self.spatialize(&frame, pose);
        }

        self.eq.process_block(&mut self.mix_left);
        self.eq.process_block(&mut self.mix_right);
        self.reverb_left.process_block(&mut self.mix_left);
        self.reverb_right.process_block(&mut self.mix_right);

        out_left.copy_from_slice(&self.mix_left);
        out_right.copy_from_slice(&self.mix_right);
        self.ctc.process_block(out_left, out_right);
    }

    /// Spatialize one source and accumulate it into the mix
    fn spatialize(&mut self, frame: &SourceFrame, pose: &Pose) {
        let n = self.block_size;
        let direction = Direction::from_world(&frame.position, &pose.position, &pose.orientation);
        let gain = direction.attenuation();

        let available = frame.samples.len().min(n);
        for i in 0..available {
            self.chunk[i] = frame.samples[i] * gain;
        }
        self.chunk[available..n].fill(0.0);

        // Sources are fixed in world space; the radial-velocity hook
        // stays at zero and the shifter passes the chunk through.
        self.doppler.process_block(&mut self.chunk, 0.0);

        for i in 0..n {
            self.freq[i] = Complex32::new(self.chunk[i], 0.0);
        }
        for bin in self.freq[n..].iter_mut() {
            *bin = Complex32::new(0.0, 0.0);
        }
        self.fft_forward
            .process_with_scratch(&mut self.freq, &mut self.fft_scratch);

        let filter = self.hrtf.nearest(direction.azimuth, direction.elevation);
        for i in 0..self.fft_size {
            self.left_freq[i] = self.freq[i] * filter.left[i];
            self.right_freq[i] = self.freq[i] * filter.right[i];
        }
        self.fft_inverse
            .process_with_scratch(&mut self.left_freq, &mut self.fft_scratch);
        self.fft_inverse
            .process_with_scratch(&mut self.right_freq, &mut self.fft_scratch);

        // The inverse transform is unscaled; keep the first block of
        // real samples (the tail is discarded, not overlap-saved).
        let norm = 1.0 / self.fft_size as f32;
        for i in 0..n {
            self.mix_left[i] += self.left_freq[i].re * norm;
            self.mix_right[i] += self.right_freq[i].re * norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;
    use std::f32::consts::FRAC_PI_2;

    fn test_renderer() -> Renderer {
        let config = EngineConfig::default();
        let hrtf = Arc::new(HrtfDatabase::synthetic(&config.hrtf, config.sample_rate));
        Renderer::new(&config, hrtf)
    }

    fn impulse_chunk(n: usize) -> Vec<f32> {
        let mut chunk = vec![0.0f32; n];
        chunk[0] = 1.0;
        chunk
    }

    fn peak(block: &[f32]) -> f32 {
        block.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    fn rms(block: &[f32]) -> f32 {
        (block.iter().map(|s| s * s).sum::<f32>() / block.len() as f32).sqrt()
    }

    fn render_once(
        renderer: &mut Renderer,
        chunk: &[f32],
        source_pos: Vector3<f32>,
        pose: &Pose,
    ) -> (Vec<f32>, Vec<f32>) {
        let n = renderer.block_size();
        let mut left = vec![0.0f32; n];
        let mut right = vec![0.0f32; n];
        let frame = SourceFrame {
            samples: chunk,
            position: source_pos,
        };
        renderer.render([frame], pose, &mut left, &mut right);
        (left, right)
    }

    #[test]
    fn test_dead_ahead_is_symmetric() {
        let mut renderer = test_renderer();
        let chunk = impulse_chunk(1024);
        let (left, right) = render_once(
            &mut renderer,
            &chunk,
            Vector3::new(0.0, 1.0, 0.0),
            &Pose::default(),
        );

        let (peak_l, peak_r) = (peak(&left), peak(&right));
        assert!(peak_l > 0.0);
        assert!((peak_l - peak_r).abs() <= 0.01 * peak_l);
    }

    #[test]
    fn test_full_left_source_favors_left_channel() {
        let mut renderer = test_renderer();
        let chunk = impulse_chunk(1024);
        let (left, right) = render_once(
            &mut renderer,
            &chunk,
            Vector3::new(-1.0, 0.0, 0.0),
            &Pose::default(),
        );
        assert!(peak(&left) > peak(&right));
    }

    #[test]
    fn test_yaw_left_moves_source_to_right_channel() {
        // Source dead ahead, listener turned 90 degrees left around z:
        // in the head frame the source sits on the right.
        let mut renderer = test_renderer();
        let chunk = impulse_chunk(1024);
        let pose = Pose::new(
            Vector3::zeros(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let (left, right) =
            render_once(&mut renderer, &chunk, Vector3::new(0.0, 1.0, 0.0), &pose);
        assert!(peak(&right) > peak(&left));
    }

    #[test]
    fn test_distance_attenuation_ratio() {
        let chunk: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        let mut near = test_renderer();
        let (near_l, near_r) =
            render_once(&mut near, &chunk, Vector3::new(0.0, 1.0, 0.0), &Pose::default());

        let mut far = test_renderer();
        let (far_l, far_r) =
            render_once(&mut far, &chunk, Vector3::new(0.0, 10.0, 0.0), &Pose::default());

        // Same direction, same filter; only 1/(d+1) differs.
        let expected = 2.0 / 11.0;
        let ratio_l = rms(&far_l) / rms(&near_l);
        let ratio_r = rms(&far_r) / rms(&near_r);
        approx::assert_abs_diff_eq!(ratio_l, expected, epsilon = 1e-3);
        approx::assert_abs_diff_eq!(ratio_r, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_silence_propagates() {
        let mut renderer = test_renderer();
        let chunk = vec![0.0f32; 1024];
        for _ in 0..4 {
            let (left, right) = render_once(
                &mut renderer,
                &chunk,
                Vector3::new(1.0, 2.0, 0.5),
                &Pose::default(),
            );
            assert!(left.iter().chain(right.iter()).all(|s| *s == 0.0));
        }
    }

    #[test]
    fn test_no_sources_renders_silence() {
        let mut renderer = test_renderer();
        let mut left = vec![1.0f32; 1024];
        let mut right = vec![1.0f32; 1024];
        renderer.render(std::iter::empty(), &Pose::default(), &mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|s| *s == 0.0));
    }

    #[test]
    fn test_multiple_sources_accumulate() {
        let mut renderer = test_renderer();
        let chunk = impulse_chunk(1024);
        let n = renderer.block_size();

        let mut left = vec![0.0f32; n];
        let mut right = vec![0.0f32; n];
        let frames = [
            SourceFrame {
                samples: &chunk,
                position: Vector3::new(0.0, 1.0, 0.0),
            },
            SourceFrame {
                samples: &chunk,
                position: Vector3::new(0.0, 1.0, 0.0),
            },
        ];
        renderer.render(frames, &Pose::default(), &mut left, &mut right);
        let doubled = peak(&left);

        let mut single = test_renderer();
        let (one_l, _) = render_once(
            &mut single,
            &chunk,
            Vector3::new(0.0, 1.0, 0.0),
            &Pose::default(),
        );
        assert!((doubled - 2.0 * peak(&one_l)).abs() < 1e-3);
    }
}
