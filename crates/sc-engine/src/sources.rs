//! Source bank
//!
//! Owns the decoded per-source sample buffers and a looping read cursor
//! per source. Chunk buffers are preallocated; refilling them each block
//! is the only work done on the audio thread.

use nalgebra::Vector3;

use sc_core::Sample;
use sc_spatial::SourceFrame;

/// Seconds of silence substituted for a source that failed to load
const FALLBACK_SECS: usize = 5;

/// One decoded source handed to the engine: a name, a fixed world-space
/// position in meters, and mono PCM at the engine sample rate.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub name: String,
    pub position: Vector3<f32>,
    pub samples: Vec<Sample>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, position: Vector3<f32>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            position,
            samples,
        }
    }
}

/// A playing source: immutable samples, a looping cursor, and the chunk
/// buffer refilled once per block.
pub struct AudioSource {
    name: String,
    position: Vector3<f32>,
    samples: Vec<Sample>,
    cursor: usize,
    chunk: Vec<Sample>,
}

impl AudioSource {
    fn new(input: SourceInput, block_size: usize, sample_rate: u32) -> Self {
        let samples = if input.samples.is_empty() {
            // Upstream decode failed; keep the source audible-silent so
            // the rest of the scene renders normally.
            log::warn!(
                "Source '{}' supplied no samples, substituting {FALLBACK_SECS}s of silence",
                input.name
            );
            vec![0.0; sample_rate as usize * FALLBACK_SECS]
        } else {
            input.samples
        };

        Self {
            name: input.name,
            position: input.position,
            samples,
            cursor: 0,
            chunk: vec![0.0; block_size],
        }
    }

    /// Copy the next block into the chunk buffer and advance the cursor.
    ///
    /// A ragged tail is padded with silence (the audible loop seam) and
    /// the cursor restarts from the top; an exactly consumed buffer
    /// restarts without a seam.
    fn fill_next_chunk(&mut self) {
        let n = self.chunk.len();
        let len = self.samples.len();

        if self.cursor + n <= len {
            self.chunk
                .copy_from_slice(&self.samples[self.cursor..self.cursor + n]);
            self.cursor += n;
            if self.cursor == len {
                self.cursor = 0;
            }
        } else {
            let available = len - self.cursor;
            self.chunk[..available].copy_from_slice(&self.samples[self.cursor..]);
            self.chunk[available..].fill(0.0);
            self.cursor = 0;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Read cursor, always within `[0, samples.len())`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently filled chunk
    pub fn chunk(&self) -> &[Sample] {
        &self.chunk
    }
}

/// The fixed set of sources feeding the renderer
pub struct SourceBank {
    sources: Vec<AudioSource>,
}

impl SourceBank {
    /// Build the bank from decoded inputs. The set is fixed afterwards.
    pub fn new(inputs: Vec<SourceInput>, block_size: usize, sample_rate: u32) -> Self {
        let sources = inputs
            .into_iter()
            .map(|input| AudioSource::new(input, block_size, sample_rate))
            .collect();
        Self { sources }
    }

    /// Advance every source by one block, refilling its chunk buffer
    pub fn advance(&mut self) {
        for source in &mut self.sources {
            source.fill_next_chunk();
        }
    }

    /// Per-source frames for the renderer, in stable insertion order
    pub fn frames(&self) -> impl Iterator<Item = SourceFrame<'_>> {
        self.sources.iter().map(|source| SourceFrame {
            samples: source.chunk(),
            position: source.position(),
        })
    }

    pub fn sources(&self) -> &[AudioSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
