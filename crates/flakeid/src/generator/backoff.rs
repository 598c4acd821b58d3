use core::time::Duration;

/// How long [`Backoff::Sleep`] parks the thread between clock reads.
pub const SLEEP_INTERVAL: Duration = Duration::from_micros(100);

/// Backoff strategies for waiting out an exhausted millisecond.
///
/// When 2048 IDs have been issued within one millisecond, the generator holds
/// its lock and re-reads the clock until it advances, invoking the strategy
/// between reads. The wait is normally well under a millisecond.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-waits in a tight loop.
    ///
    /// Offers the lowest latency at the cost of high CPU usage.
    Spin,

    /// Yields to the OS scheduler to allow other threads to run.
    Yield,

    /// Sleeps for [`SLEEP_INTERVAL`] between reads.
    ///
    /// Lowest CPU usage, but may oversleep depending on platform-specific
    /// scheduler resolution.
    #[default]
    Sleep,
}

impl Backoff {
    /// Pauses the calling thread once according to the strategy.
    pub fn pause(self) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep => std::thread::sleep(SLEEP_INTERVAL),
        }
    }
}
