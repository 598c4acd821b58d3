mod backoff;
mod global;
mod interface;
mod lock;
mod status;
#[cfg(test)]
mod tests;

pub use backoff::*;
pub use global::*;
pub use interface::*;
pub use lock::*;
pub use status::*;

// Poisoning only exists for the std mutex.
#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard, PoisonError};
