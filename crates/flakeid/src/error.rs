use core::fmt;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// Callers are expected to branch on the class of failure rather than the
/// exact variant: [`Error::InvalidArgument`] means "reject and re-supply
/// input", while [`Error::ClockRegression`] means the generator that produced
/// it can no longer guarantee ordered output and must be rebuilt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An input was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// The time source reported a timestamp earlier than the last one the
    /// generator issued.
    ///
    /// This is fatal for the generator instance. It is never retried
    /// internally.
    #[error("clock moved backwards: now {now}ms is behind last issued {last}ms")]
    ClockRegression {
        /// The offending clock reading, in milliseconds since the epoch.
        now: u64,
        /// The timestamp of the last issued ID.
        last: u64,
    },

    /// The operation failed because the generator lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` if this error was caused by bad caller input.
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` if this error reports a clock moving backwards.
    pub const fn is_clock_regression(&self) -> bool {
        matches!(self, Self::ClockRegression { .. })
    }
}

/// The reason an input was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ArgumentError {
    /// The sequence number is outside `0..=2047`.
    SequenceOutOfRange(i64),
    /// The machine ID is outside `0..=15`.
    MachineIdOutOfRange(i64),
    /// A raw value had the reserved sign bit set.
    NegativeRaw(i64),
    /// A byte buffer was not exactly 8 bytes long.
    InvalidByteLength(usize),
    /// A string could not be parsed as a decimal integer.
    InvalidDecimal(String),
    /// The radix is outside `2..=62`.
    BaseOutOfRange(u8),
    /// A character is not a digit of the requested radix.
    InvalidDigit {
        /// The rejected character.
        digit: char,
        /// The radix being decoded.
        base: u8,
    },
    /// An empty string was given where digits were expected.
    EmptyInput,
    /// The decoded value does not fit in 63 bits.
    Overflow,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequenceOutOfRange(seq) => {
                write!(f, "sequence number {seq} is outside 0..=2047")
            }
            Self::MachineIdOutOfRange(id) => write!(f, "machine id {id} is outside 0..=15"),
            Self::NegativeRaw(raw) => write!(f, "raw id {raw} must be greater than or equal to 0"),
            Self::InvalidByteLength(len) => {
                write!(f, "expected a buffer of 8 bytes, got {len}")
            }
            Self::InvalidDecimal(s) => write!(f, "{s:?} is not a decimal integer"),
            Self::BaseOutOfRange(base) => write!(f, "base {base} is outside 2..=62"),
            Self::InvalidDigit { digit, base } => {
                write!(f, "{digit:?} is not a valid base {base} digit")
            }
            Self::EmptyInput => f.write_str("input is empty"),
            Self::Overflow => f.write_str("value does not fit in 63 bits"),
        }
    }
}

impl core::error::Error for ArgumentError {}

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
