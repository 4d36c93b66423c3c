//! Block reverb
//!
//! Single-tap circular-buffer reverb: each output sample adds the decayed
//! buffer content one full buffer lap behind the write window, then the
//! dry block overwrites the window. The write cursor advances modulo
//! `B - N` so the window `[p, p + N)` never straddles the wrap; this
//! requires the buffer to hold at least two blocks.

use sc_core::Sample;

use crate::{BlockProcessor, Processor};

/// Single-channel delay-line reverb processed one block at a time
#[derive(Debug, Clone)]
pub struct BlockReverb {
    buffer: Vec<Sample>,
    write_pos: usize,
    decay: f32,
}

impl BlockReverb {
    /// Create a reverb over a circular buffer of `buffer_len` samples.
    ///
    /// `buffer_len` must be at least twice the block size this processor
    /// will be fed (enforced by config validation upstream).
    pub fn new(buffer_len: usize, decay: f32) -> Self {
        Self {
            buffer: vec![0.0; buffer_len],
            write_pos: 0,
            decay,
        }
    }

    /// Current write cursor (for invariant checks and diagnostics)
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Buffer length in samples
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Processor for BlockReverb {
    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl BlockProcessor for BlockReverb {
    fn process_block(&mut self, block: &mut [Sample]) {
        let n = block.len();
        debug_assert!(self.buffer.len() >= 2 * n);
        debug_assert!(self.write_pos + n <= self.buffer.len());

        for (i, sample) in block.iter_mut().enumerate() {
            let idx = self.write_pos + i;
            let dry = *sample;
            *sample = dry + self.buffer[idx] * self.decay;
            self.buffer[idx] = dry;
        }
        self.write_pos = (self.write_pos + n) % (self.buffer.len() - n);
    }
}
