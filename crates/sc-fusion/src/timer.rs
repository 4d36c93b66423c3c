//! Control timer
//!
//! A dedicated thread waking on an absolute 10 ms schedule to drive the
//! fusion update. Actual period jitter is recorded lock-free for
//! diagnostics. Start and stop are idempotent; after `stop` returns no
//! further callbacks fire.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lock-free timer diagnostics (seconds stored as f64 bits)
#[derive(Debug, Default)]
pub struct TimerDiagnostics {
    last_jitter: AtomicU64,
    max_jitter: AtomicU64,
    ticks: AtomicU64,
}

impl TimerDiagnostics {
    /// Jitter of the most recent tick in seconds
    pub fn last_jitter_secs(&self) -> f64 {
        f64::from_bits(self.last_jitter.load(Ordering::Relaxed))
    }

    /// Worst observed jitter in seconds
    pub fn max_jitter_secs(&self) -> f64 {
        f64::from_bits(self.max_jitter.load(Ordering::Relaxed))
    }

    /// Total ticks fired
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn record(&self, jitter_secs: f64) {
        self.last_jitter
            .store(jitter_secs.to_bits(), Ordering::Relaxed);
        // Single writer thread: a read-compare-store max is race-free.
        if jitter_secs > self.max_jitter_secs() {
            self.max_jitter
                .store(jitter_secs.to_bits(), Ordering::Relaxed);
        }
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fixed-rate control timer
pub struct ControlTimer {
    period: Duration,
    running: Arc<AtomicBool>,
    diagnostics: Arc<TimerDiagnostics>,
    handle: Option<JoinHandle<()>>,
}

impl ControlTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: Arc::new(AtomicBool::new(false)),
            diagnostics: Arc::new(TimerDiagnostics::default()),
            handle: None,
        }
    }

    /// Shared handle to the jitter diagnostics
    pub fn diagnostics(&self) -> Arc<TimerDiagnostics> {
        Arc::clone(&self.diagnostics)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the timer thread. Starting a running timer is a no-op.
    pub fn start<F>(&mut self, mut callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.handle.is_some() {
            return;
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let diagnostics = Arc::clone(&self.diagnostics);
        let period = self.period;

        let spawned = thread::Builder::new()
            .name("sc-control-timer".into())
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                while running.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < deadline {
                        thread::sleep(deadline - now);
                    }
                    if !running.load(Ordering::Acquire) {
                        break;
                    }

                    let fired = Instant::now();
                    diagnostics.record(fired.saturating_duration_since(deadline).as_secs_f64());
                    callback();

                    // Absolute schedule; resynchronize after an overrun
                    // instead of firing a burst of catch-up ticks.
                    deadline += period;
                    if deadline < fired {
                        deadline = fired + period;
                    }
                }
            });

        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => {
                self.running.store(false, Ordering::Release);
                log::error!("Failed to spawn control timer thread: {err}");
            }
        }
    }

    /// Stop the timer and wait for the thread to exit. Stopping a
    /// stopped timer is a no-op.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ControlTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
