use std::time::{Duration, Instant};

/// Timer utility for measuring execution time
///
/// Reports through `tracing` at debug level when enabled (debug builds, or
/// `GIT_RECONCILE_PROFILE` set).
///
/// # Example
///
/// ```
/// use git_reconcile::utils::Timer;
///
/// let end = Timer::default().start("fingerprint from side");
/// // ... do work ...
/// let elapsed = end();
/// assert!(elapsed.as_secs() < 60);
/// ```
pub struct Timer {
    enabled: bool,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            enabled: cfg!(debug_assertions) || std::env::var("GIT_RECONCILE_PROFILE").is_ok(),
        }
    }

    /// Start timing an operation
    ///
    /// Returns a closure that logs the elapsed time and returns the duration.
    pub fn start(self, label: &str) -> impl FnOnce() -> Duration {
        let start_time = Instant::now();
        let enabled = self.enabled;
        let label = label.to_string();

        move || {
            let duration = start_time.elapsed();
            if enabled {
                tracing::debug!(label = %label, elapsed_ms = duration.as_millis() as u64, "timer");
            }
            duration
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
