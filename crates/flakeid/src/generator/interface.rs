use crate::{Flake, IdGenStatus, Result};

/// A minimal interface for anything that issues Flakes.
///
/// Lets callers be generic over a concrete generator, a shared handle to one,
/// or the process-wide default.
pub trait FlakeSource {
    /// The machine ID encoded into every issued Flake.
    fn machine_id(&self) -> i64;

    /// Issues the next Flake, waiting out an exhausted millisecond if needed.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the time source moved backward
    /// - [`Error::LockPoisoned`] if a std mutex was poisoned
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::LockPoisoned`]: crate::Error
    fn next_id(&self) -> Result<Flake>;

    /// Attempts to issue the next Flake without waiting.
    ///
    /// # Errors
    ///
    /// Same as [`FlakeSource::next_id`].
    fn poll_id(&self) -> Result<IdGenStatus>;
}

impl<S: FlakeSource + ?Sized> FlakeSource for &S {
    fn machine_id(&self) -> i64 {
        (**self).machine_id()
    }

    fn next_id(&self) -> Result<Flake> {
        (**self).next_id()
    }

    fn poll_id(&self) -> Result<IdGenStatus> {
        (**self).poll_id()
    }
}
