use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Backoff, Error, Flake, FlakeSource, IdGenStatus, MonotonicClock, Result,
    TimeSource,
    generator::{Mutex, MutexGuard},
};

/// A lock-based Flake generator suitable for multi-threaded environments.
///
/// The last issued Flake is kept behind an [`Arc<Mutex<_>>`]. Reading the
/// clock, choosing the sequence and recording the new state all happen while
/// the lock is held, so concurrent callers observe a single total order:
/// whichever call completes later receives the strictly greater ID.
///
/// Cloning the generator yields another handle to the same state, not an
/// independent generator.
///
/// ## Sequence exhaustion
///
/// When all 2048 sequence numbers of a millisecond have been used,
/// [`FlakeGenerator::next_id`] keeps the lock and re-reads the clock, pausing
/// with the configured [`Backoff`] between reads, until the millisecond
/// advances. Other callers queue on the lock in the meantime.
/// [`FlakeGenerator::poll_id`] reports [`IdGenStatus::Pending`] instead.
///
/// ## Clock regression
///
/// If the time source reports a timestamp earlier than the last issued one,
/// the call fails with [`Error::ClockRegression`] and the state is left
/// untouched. Such readings are never retried internally.
pub struct FlakeGenerator<T = MonotonicClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<Flake>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<Flake>>,
    machine_id: i64,
    backoff: Backoff,
    time: T,
}

impl FlakeGenerator {
    /// Creates a generator for `machine_id` backed by a [`MonotonicClock`]
    /// aligned to [`FLAKE_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `machine_id` is outside `0..=15`.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::FlakeGenerator;
    ///
    /// let generator = FlakeGenerator::new(3).unwrap();
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    /// assert_eq!(b.machine_id(), 3);
    ///
    /// assert!(FlakeGenerator::new(16).is_err());
    /// ```
    ///
    /// [`FLAKE_EPOCH`]: crate::FLAKE_EPOCH
    pub fn new(machine_id: i64) -> Result<Self> {
        Self::with_clock(machine_id, MonotonicClock::default())
    }
}

impl<T> FlakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for `machine_id` that reads time from `time`.
    ///
    /// The generator starts with no issued IDs: its last timestamp and
    /// sequence are both zero. The clock is not read here, so the first ID
    /// always takes sequence 0, even when it is issued in the same
    /// millisecond the generator was built. Seed the state with
    /// [`FlakeGenerator::from_components`] to start from a known reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `machine_id` is outside `0..=15`.
    pub fn with_clock(machine_id: i64, time: T) -> Result<Self> {
        Self::from_components(0, machine_id, 0, time)
    }

    /// Creates a generator preloaded with explicit state.
    ///
    /// Useful for resuming after a restart: pass the timestamp and sequence
    /// of the last ID issued so far, and the next ID will be strictly greater
    /// than it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `machine_id` is outside `0..=15`
    /// or `sequence` is outside `0..=2047`.
    pub fn from_components(
        timestamp: u64,
        machine_id: i64,
        sequence: i64,
        time: T,
    ) -> Result<Self> {
        let last = Flake::from_components(timestamp as i64, machine_id, sequence)?;
        Ok(Self::from_parts(last, machine_id, time))
    }

    pub(crate) fn from_parts(last: Flake, machine_id: i64, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(last))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(last)),
            machine_id,
            backoff: Backoff::default(),
            time,
        }
    }

    /// Sets the strategy used while waiting out an exhausted millisecond.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// The machine ID encoded into every issued Flake.
    pub const fn machine_id(&self) -> i64 {
        self.machine_id
    }

    /// The configured exhaustion backoff.
    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Issues the next Flake.
    ///
    /// Blocks while the current millisecond's sequence is exhausted. The wait
    /// is bounded by the clock advancing, typically less than a millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the time source went backward
    /// - [`Error::LockPoisoned`] if a thread panicked while holding the lock
    ///   (std mutex only)
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::FlakeGenerator;
    ///
    /// let generator = FlakeGenerator::new(1).unwrap();
    /// let ids: Vec<_> = (0..5_000).map(|_| generator.next_id().unwrap()).collect();
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// ```
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<Flake> {
        let mut last = self.lock()?;
        let mut now = self.time.current_millis();
        let sequence = match Self::next_sequence(&last, now)? {
            Some(sequence) => sequence,
            None => {
                now = self.cold_wait_past(last.timestamp() as u64);
                0
            }
        };
        Ok(self.commit(&mut last, now, sequence))
    }

    /// Attempts to issue the next Flake without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_until })`: the sequence is exhausted;
    ///   retry once the clock reaches `yield_until`
    ///
    /// # Errors
    ///
    /// Same as [`FlakeGenerator::next_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{FlakeGenerator, IdGenStatus};
    ///
    /// let generator = FlakeGenerator::new(0).unwrap();
    /// let id = loop {
    ///     match generator.poll_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.machine_id(), 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        let mut last = self.lock()?;
        let now = self.time.current_millis();
        match Self::next_sequence(&last, now)? {
            Some(sequence) => Ok(IdGenStatus::Ready {
                id: self.commit(&mut last, now, sequence),
            }),
            None => Ok(IdGenStatus::Pending {
                yield_until: last.timestamp() as u64 + 1,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Flake>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Returns the sequence for a reading of `now`, or `None` if the current
    /// millisecond is exhausted.
    fn next_sequence(last: &Flake, now: u64) -> Result<Option<i64>> {
        let last_ts = last.timestamp() as u64;
        match now.cmp(&last_ts) {
            Ordering::Greater => Ok(Some(0)),
            Ordering::Equal if last.sequence() < Flake::MAX_SEQUENCE => {
                Ok(Some(last.sequence() + 1))
            }
            Ordering::Equal => Ok(None),
            Ordering::Less => Err(Self::cold_clock_behind(now, last_ts)),
        }
    }

    fn commit(&self, last: &mut Flake, now: u64, sequence: i64) -> Flake {
        debug_assert!(now as i64 <= Flake::MAX_TIMESTAMP, "timestamp overflow");
        *last = Flake::pack(now as i64, self.machine_id, sequence);
        *last
    }

    /// Re-reads the clock until it passes `last_ts`, holding the caller's lock.
    #[cold]
    #[inline(never)]
    fn cold_wait_past(&self, last_ts: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            timestamp = last_ts,
            machine_id = self.machine_id,
            "sequence exhausted, waiting for the next millisecond"
        );
        loop {
            let now = self.time.current_millis();
            if now > last_ts {
                return now;
            }
            self.backoff.pause();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards, refusing to issue");
        Error::ClockRegression { now, last }
    }
}

impl<T> Clone for FlakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            machine_id: self.machine_id,
            backoff: self.backoff,
            time: self.time.clone(),
        }
    }
}

impl<T> core::fmt::Debug for FlakeGenerator<T>
where
    T: TimeSource + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlakeGenerator")
            .field("machine_id", &self.machine_id)
            .field("backoff", &self.backoff)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

impl<T> FlakeSource for FlakeGenerator<T>
where
    T: TimeSource,
{
    fn machine_id(&self) -> i64 {
        self.machine_id
    }

    fn next_id(&self) -> Result<Flake> {
        self.next_id()
    }

    fn poll_id(&self) -> Result<IdGenStatus> {
        self.poll_id()
    }
}
