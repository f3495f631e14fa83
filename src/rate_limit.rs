use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum-interval pacer for the generation API. One instance is shared
/// process-wide: the interval applies across all callers, not per user.
/// The timestamp is stamped *before* dispatch so the interval covers the
/// request itself, and it resets on restart.
pub struct CallPacer {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl CallPacer {
    pub fn new(min_interval: Duration) -> Self {
        CallPacer {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    /// Block until at least `min_interval` has passed since the last
    /// recorded call. First call never waits.
    pub fn wait_if_needed(&self) {
        let since_last = {
            let last = self.last_call.lock().unwrap();
            last.map(|t| t.elapsed())
        };

        if let Some(elapsed) = since_last {
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::info!("Pacing generation call: waiting {:.2}s", wait.as_secs_f64());
                std::thread::sleep(wait);
            }
        }
    }

    /// Stamp the current time as the last call. Call immediately before
    /// dispatching a request.
    pub fn record_call(&self) {
        let mut last = self.last_call.lock().unwrap();
        *last = Some(Instant::now());
    }
}
