//! Audio output stream
//!
//! Wraps a cpal output stream around a planar block callback: the
//! renderer fills `(left, right)` blocks and the wrapper interleaves
//! them into the driver buffer. Driver errors are logged and never
//! surface into the render path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfig,
};
use parking_lot::Mutex;

use sc_core::Sample;

use crate::{AudioError, AudioResult};

/// Planar block callback: fills one left and one right block
pub type BlockCallback = Box<dyn FnMut(&mut [Sample], &mut [Sample]) + Send + 'static>;

struct StreamState {
    callback: Mutex<BlockCallback>,
    running: AtomicBool,
}

/// Output stream wrapper
pub struct OutputStream {
    _stream: Stream,
    state: Arc<StreamState>,
    sample_rate: u32,
    block_size: usize,
}

impl OutputStream {
    /// Build an f32 output stream on `device` at the given rate and
    /// block size. The stream is created paused; call `start`.
    pub fn new(
        device: &Device,
        sample_rate: u32,
        block_size: usize,
        callback: BlockCallback,
    ) -> AudioResult<Self> {
        let state = Arc::new(StreamState {
            callback: Mutex::new(callback),
            running: AtomicBool::new(false),
        });

        let supported = output_stream_config(device, sample_rate)?;
        let stream = build_output_stream(device, &supported, block_size, Arc::clone(&state))?;

        Ok(Self {
            _stream: stream,
            state,
            sample_rate,
            block_size,
        })
    }

    /// Start the audio stream
    pub fn start(&self) -> AudioResult<()> {
        self._stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;
        self.state.running.store(true, Ordering::Release);
        Ok(())
    }

    /// Stop the audio stream. No callbacks run after this returns.
    pub fn stop(&self) -> AudioResult<()> {
        self._stream
            .pause()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;
        self.state.running.store(false, Ordering::Release);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

fn output_stream_config(
    device: &Device,
    sample_rate: u32,
) -> AudioResult<SupportedStreamConfig> {
    let rate: SampleRate = sample_rate;

    let configs = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?;

    for supported in configs {
        if supported.channels() >= 2
            && supported.min_sample_rate() <= rate
            && supported.max_sample_rate() >= rate
            && supported.sample_format() == SampleFormat::F32
        {
            return Ok(supported.with_sample_rate(rate));
        }
    }

    Err(AudioError::ConfigError(format!(
        "No stereo f32 output config at {sample_rate}Hz"
    )))
}

fn build_output_stream(
    device: &Device,
    supported_config: &SupportedStreamConfig,
    block_size: usize,
    state: Arc<StreamState>,
) -> AudioResult<Stream> {
    let channels = supported_config.channels() as usize;

    let config = StreamConfig {
        channels: supported_config.channels(),
        sample_rate: supported_config.sample_rate(),
        buffer_size: BufferSize::Fixed(block_size as u32),
    };

    // Planar blocks filled by the render callback, interleaved here.
    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut callback = state.callback.lock();
                for chunk in data.chunks_mut(block_size * channels) {
                    let frames = chunk.len() / channels;
                    if frames == block_size {
                        (*callback)(&mut left, &mut right);
                        interleave_into(chunk, &left, &right, channels);
                    } else {
                        // Ragged driver tail: never render a partial
                        // block, emit silence instead.
                        chunk.fill(0.0);
                    }
                }
            },
            move |err| {
                log::error!("Audio output stream error: {err}");
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

    Ok(stream)
}

/// Interleave planar stereo into the driver buffer; channels past the
/// first two are zeroed.
fn interleave_into(out: &mut [f32], left: &[f32], right: &[f32], channels: usize) {
    for (i, frame) in out.chunks_mut(channels).enumerate() {
        frame[0] = left[i];
        if channels > 1 {
            frame[1] = right[i];
        }
        for extra in frame.iter_mut().skip(2) {
            *extra = 0.0;
        }
    }
}
