use std::sync::LazyLock;

use crate::{Flake, FlakeGenerator, MonotonicClock, Result};

static DEFAULT_GENERATOR: LazyLock<FlakeGenerator> =
    LazyLock::new(|| FlakeGenerator::from_parts(Flake::EMPTY, 0, MonotonicClock::default()));

/// Returns the process-wide generator, creating it on first use.
///
/// It issues IDs with machine ID 0 and is shared by every caller in the
/// process, so IDs from it are unique and ordered process-wide. Processes that
/// run concurrently on different hosts should build their own
/// [`FlakeGenerator`] with a distinct machine ID instead.
///
/// # Example
///
/// ```
/// use flakeid::default_generator;
///
/// let generator = default_generator();
/// assert_eq!(generator.machine_id(), 0);
/// assert!(core::ptr::eq(generator, default_generator()));
/// ```
pub fn default_generator() -> &'static FlakeGenerator {
    &DEFAULT_GENERATOR
}

/// Issues a Flake from the [`default_generator`].
///
/// # Errors
///
/// Same as [`FlakeGenerator::next_id`].
///
/// # Example
///
/// ```
/// let a = flakeid::next_flake().unwrap();
/// let b = flakeid::next_flake().unwrap();
/// assert!(a < b);
/// ```
pub fn next_flake() -> Result<Flake> {
    DEFAULT_GENERATOR.next_id()
}
