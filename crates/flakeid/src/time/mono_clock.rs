use crate::{FLAKE_EPOCH, TimeSource};
use core::time::Duration;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP corrections) and the coarse
/// resolution of some system clocks, while still aligning timestamps to a
/// fixed origin.
///
/// The wall clock is read exactly once, at construction, to compute how many
/// milliseconds separate the epoch from "now". Every later reading adds the
/// `Instant` elapsed since construction to that offset, so readings never go
/// backward for the lifetime of the clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`FLAKE_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FLAKE_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// If the system clock reads earlier than `epoch`, the offset saturates to
    /// zero and timestamps count from construction instead.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use flakeid::{MonotonicClock, TimeSource, UNIX_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(UNIX_EPOCH);
    /// let a = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(2));
    /// let b = clock.current_millis();
    /// assert!(b >= a + 2);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let start = Instant::now();
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let epoch_offset = match system_now.checked_sub(epoch) {
            Some(offset) => offset.as_millis() as u64,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    epoch_ms = epoch.as_millis() as u64,
                    system_ms = system_now.as_millis() as u64,
                    "system clock is before the epoch, counting from zero"
                );
                0
            }
        };

        Self {
            start,
            epoch_offset,
        }
    }

    /// Returns the wall-clock offset captured at construction, in
    /// milliseconds since the epoch.
    pub const fn epoch_offset(&self) -> u64 {
        self.epoch_offset
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.start.elapsed().as_millis() as u64
    }
}
