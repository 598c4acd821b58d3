use crate::Flake;

/// Represents the result of polling a generator for a new Flake.
///
/// This type models the outcome of [`FlakeGenerator::poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence for the current millisecond
///   is exhausted and no ID can be produced until the clock reaches
///   `yield_until`.
///
/// This allows non-blocking generation loops and custom backoff strategies.
///
/// # Example
///
/// ```
/// use flakeid::{FlakeGenerator, IdGenStatus};
///
/// let generator = FlakeGenerator::new(1).unwrap();
/// match generator.poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_until } => println!("Back off until: {yield_until}"),
/// }
/// ```
///
/// [`FlakeGenerator::poll_id`]: crate::FlakeGenerator::poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Flake.
        id: Flake,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    ///
    /// Wait until the clock reaches or exceeds `yield_until` before polling
    /// again.
    Pending {
        /// The next timestamp (inclusive), in milliseconds since the epoch, at
        /// which generation may resume.
        yield_until: u64,
    },
}
