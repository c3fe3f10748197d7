//! Trailing-edge debounce for query input.
//!
//! Each call to [`Debouncer::settle`] restarts the window. Only the call that
//! is still the latest when its window elapses reports `true`; earlier calls
//! in the burst report `false` and their caller skips the request.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

/// Debounce window applied to search input.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    latest: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Debouncer {
    /// Debouncer waiting `window` after each call.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Configured quiet period.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait out the window; `true` if no newer call arrived meanwhile.
    pub async fn settle(&self) -> bool {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.window.is_zero() {
            tokio::time::sleep(self.window).await;
        }
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
