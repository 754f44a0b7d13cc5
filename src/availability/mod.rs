//! Network availability gate -- holds uploads until the allowed hour window.
//!
//! Some connections are metered or throttled outside certain hours. Before
//! every upload attempt a worker calls [`NetworkGate::ensure_available`],
//! which returns immediately inside the window and otherwise sleeps a fixed
//! interval and checks again until the window opens. The gate never fails,
//! it only delays.
//!
//! # Example
//!
//! ```rust
//! use photo_uploader::availability::HourWindow;
//!
//! // Uploads allowed from 02:00 to 13:59
//! let window = HourWindow::new(2, 14);
//! assert!(window.contains(2));
//! assert!(!window.contains(14));
//!
//! // Midnight crossing: 22:00 to 05:59
//! let night = HourWindow::new(22, 6);
//! assert!(night.contains(23));
//! assert!(night.contains(3));
//! assert!(!night.contains(12));
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;

use crate::config::AvailabilityConfig;

/// Source of the current local hour
pub trait Clock: Send + Sync {
    /// Current hour of the day (0-23)
    fn hour(&self) -> u32;
}

/// [`Clock`] backed by the system's local time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Half-open range of allowed hours `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourWindow {
    start: u32,
    end: u32,
}

impl HourWindow {
    /// Window from `start` (inclusive) to `end` (exclusive)
    ///
    /// `start == end` means the window is always open.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `hour` falls inside the window
    pub fn contains(&self, hour: u32) -> bool {
        if self.start == self.end {
            return true;
        }
        if self.start < self.end {
            hour >= self.start && hour < self.end
        } else {
            // Midnight crossing: start > end (e.g., 22 to 6)
            hour >= self.start || hour < self.end
        }
    }
}

/// Gate consulted by upload workers before every upload
#[derive(Clone)]
pub struct NetworkGate {
    window: Option<HourWindow>,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl NetworkGate {
    /// Gate enforcing `window`, re-checking every `poll_interval`
    pub fn new(window: HourWindow, poll_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window: Some(window),
            poll_interval,
            clock,
        }
    }

    /// Gate that never blocks
    pub fn always_open() -> Self {
        Self {
            window: None,
            poll_interval: Duration::ZERO,
            clock: Arc::new(SystemClock),
        }
    }

    /// Gate described by the availability section of the configuration
    pub fn from_config(config: &AvailabilityConfig) -> Self {
        if !config.enabled {
            return Self::always_open();
        }
        Self::new(
            HourWindow::new(config.start_hour, config.end_hour),
            config.poll_interval,
            Arc::new(SystemClock),
        )
    }

    /// Whether uploads are allowed right now
    pub fn is_open(&self) -> bool {
        match self.window {
            Some(window) => window.contains(self.clock.hour()),
            None => true,
        }
    }

    /// Wait until the current hour is inside the window
    pub async fn ensure_available(&self) {
        let Some(window) = self.window else {
            return;
        };
        loop {
            let hour = self.clock.hour();
            if window.contains(hour) {
                return;
            }
            tracing::warn!(
                hour,
                sleep_secs = self.poll_interval.as_secs(),
                "outside the upload window, sleeping"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl std::fmt::Debug for NetworkGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkGate")
            .field("window", &self.window)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
