//! Shared pose snapshot
//!
//! The control task publishes a fused pose at 100 Hz; the audio task
//! copies the latest snapshot once per block. The critical section is a
//! single small copy, so a mutex is sufficient; the audio-side reader
//! never blocks - if the writer holds the lock, the previous snapshot
//! is reused.

use parking_lot::Mutex;

use sc_core::Pose;

/// Latest fused pose, shared between the control and audio tasks
pub struct SharedPose {
    inner: Mutex<Pose>,
}

impl SharedPose {
    pub fn new(initial: Pose) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Publish a new snapshot (control task)
    pub fn publish(&self, pose: Pose) {
        *self.inner.lock() = pose;
    }

    /// Copy the latest snapshot into `out` without blocking.
    ///
    /// When the lock is contended, `out` is left holding the caller's
    /// previous snapshot - the permitted one-tick-stale degraded mode.
    pub fn load(&self, out: &mut Pose) {
        if let Some(guard) = self.inner.try_lock() {
            *out = *guard;
        }
    }

    /// Blocking read for non-real-time callers
    pub fn get(&self) -> Pose {
        *self.inner.lock()
    }
}
