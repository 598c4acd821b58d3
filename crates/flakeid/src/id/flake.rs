use crate::{
    ArgumentError, Error, FLAKE_EPOCH, Result,
    radix::{self, BUF_SIZE},
};
use core::{fmt, str::FromStr, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

/// A 63-bit, time-ordered Flake ID.
///
/// - 1 bit reserved (always zero)
/// - 48 bits timestamp (ms since [`FLAKE_EPOCH`])
/// - 4 bits machine ID
/// - 11 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            15 14             11 10             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (48) | machine ID (4)  | sequence (11) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Equality, ordering and hashing use the raw value only. Because the
/// timestamp occupies the high bits, ordering by raw value is the same as
/// ordering by `(timestamp, machine_id, sequence)`.
///
/// # Example
///
/// ```
/// use flakeid::Flake;
///
/// let id = Flake::from_components(1, 2, 3).unwrap();
/// assert_eq!(id.raw(), 36867);
/// assert_eq!(id.to_string(), "36867");
/// assert_eq!(id.machine_id(), 2);
/// assert_eq!(id.sequence(), 3);
/// ```
///
/// [`FLAKE_EPOCH`]: crate::FLAKE_EPOCH
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flake {
    id: i64,
}

impl Flake {
    /// The all-zero ID.
    pub const EMPTY: Self = Self { id: 0 };

    /// Bitmask for extracting the 48-bit timestamp field. Occupies bits 15
    /// through 62.
    pub const TIMESTAMP_MASK: i64 = (1 << 48) - 1;

    /// Bitmask for extracting the 4-bit machine ID field. Occupies bits 11
    /// through 14.
    pub const MACHINE_ID_MASK: i64 = (1 << 4) - 1;

    /// Bitmask for extracting the 11-bit sequence field. Occupies bits 0
    /// through 10.
    pub const SEQUENCE_MASK: i64 = (1 << 11) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 15).
    pub const TIMESTAMP_SHIFT: u32 = 15;

    /// Number of bits to shift the machine ID to its correct position (bit 11).
    pub const MACHINE_ID_SHIFT: u32 = 11;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Largest timestamp the layout can hold, roughly 8900 years.
    pub const MAX_TIMESTAMP: i64 = Self::TIMESTAMP_MASK;

    /// Largest machine ID.
    pub const MAX_MACHINE_ID: i64 = Self::MACHINE_ID_MASK;

    /// Largest sequence number within one millisecond.
    pub const MAX_SEQUENCE: i64 = Self::SEQUENCE_MASK;

    /// Packs already validated components.
    ///
    /// Fields wider than their slot are masked off.
    pub(crate) const fn pack(timestamp: i64, machine_id: i64, sequence: i64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | machine_id | sequence,
        }
    }

    /// Constructs a Flake from its components.
    ///
    /// `timestamp` is trusted to fit in 48 bits; a wider value trips a debug
    /// assertion and is masked in release builds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sequence` is outside `0..=2047`
    /// or `machine_id` is outside `0..=15`.
    pub fn from_components(timestamp: i64, machine_id: i64, sequence: i64) -> Result<Self> {
        if !(0..=Self::MAX_SEQUENCE).contains(&sequence) {
            return Err(ArgumentError::SequenceOutOfRange(sequence).into());
        }
        if !(0..=Self::MAX_MACHINE_ID).contains(&machine_id) {
            return Err(ArgumentError::MachineIdOutOfRange(machine_id).into());
        }
        debug_assert!(
            (0..=Self::MAX_TIMESTAMP).contains(&timestamp),
            "timestamp overflow"
        );
        Ok(Self::pack(timestamp, machine_id, sequence))
    }

    /// Wraps a pre-packed raw value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `raw` is negative, i.e. the
    /// reserved bit is set.
    pub const fn from_raw(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(Error::InvalidArgument(ArgumentError::NegativeRaw(raw)));
        }
        Ok(Self { id: raw })
    }

    /// Decodes an 8-byte big-endian buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `bytes` is not exactly 8 bytes
    /// long or the decoded value has the reserved bit set.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let array = <[u8; 8]>::try_from(bytes)
            .map_err(|_| ArgumentError::InvalidByteLength(bytes.len()))?;
        Self::from_be_array(array)
    }

    /// Decodes an 8-byte big-endian array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the reserved bit is set.
    pub const fn from_be_array(bytes: [u8; 8]) -> Result<Self> {
        Self::from_raw(i64::from_be_bytes(bytes))
    }

    /// Decodes a string of `base` digits, padded or not.
    ///
    /// This is the inverse of [`Flake::to_base`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base` is outside `2..=62`, the
    /// input is empty, contains a character that is not a `base` digit, or
    /// encodes a value wider than 63 bits.
    pub fn from_base(encoded: &str, base: u8) -> Result<Self> {
        let raw = radix::decode(encoded, base)?;
        Ok(Self { id: raw as i64 })
    }

    /// Returns the raw 63-bit value.
    pub const fn raw(&self) -> i64 {
        self.id
    }

    /// Extracts the timestamp, in milliseconds since [`FLAKE_EPOCH`].
    pub const fn timestamp(&self) -> i64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> i64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> i64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the absolute instant this ID was issued at.
    pub fn time(&self) -> SystemTime {
        UNIX_EPOCH + FLAKE_EPOCH + Duration::from_millis(self.timestamp() as u64)
    }

    /// Encodes the raw value as 8 big-endian bytes.
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.id.to_be_bytes()
    }

    /// Encodes the raw value in `base` using the `0-9a-zA-Z` alphabet.
    ///
    /// With `padded`, the output is left-filled with `'0'` to
    /// [`radix::max_width`]. For bases up to 36, padded strings of one base
    /// compare byte-wise in numeric order. Above 36 they do not, because
    /// `'A'..='Z'` precede `'a'..='z'` in ASCII.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base` is outside `2..=62`.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::Flake;
    ///
    /// let id = Flake::from_raw(36867).unwrap();
    /// assert_eq!(id.to_base(16, false).unwrap(), "9003");
    /// assert_eq!(id.to_base(62, true).unwrap(), "0000000009AD");
    /// ```
    pub fn to_base(&self, base: u8, padded: bool) -> Result<String> {
        let mut buf = [0_u8; BUF_SIZE];
        Ok(self.encode_base_to_buf(base, padded, &mut buf)?.to_owned())
    }

    /// Encodes into the provided buffer without heap allocation.
    ///
    /// This is the zero-allocation alternative to [`Flake::to_base`]; the
    /// returned string borrows from `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base` is outside `2..=62`.
    pub fn encode_base_to_buf<'a>(
        &self,
        base: u8,
        padded: bool,
        buf: &'a mut [u8; BUF_SIZE],
    ) -> Result<&'a str> {
        Ok(radix::encode_to_buf(self.id as u64, base, padded, buf)?)
    }

    /// Encodes the raw value in base 62.
    pub fn to_base62(&self, padded: bool) -> String {
        let mut buf = [0_u8; BUF_SIZE];
        radix::write_digits(self.id as u64, 62, padded, &mut buf).to_owned()
    }

    /// Encodes the raw value in base 36.
    pub fn to_base36(&self, padded: bool) -> String {
        let mut buf = [0_u8; BUF_SIZE];
        radix::write_digits(self.id as u64, 36, padded, &mut buf).to_owned()
    }
}

impl fmt::Display for Flake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Flake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flake")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for Flake {
    type Err = Error;

    /// Parses the decimal form produced by [`Display`](fmt::Display).
    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .parse::<i64>()
            .map_err(|_| ArgumentError::InvalidDecimal(s.to_owned()))?;
        Self::from_raw(raw)
    }
}

impl TryFrom<i64> for Flake {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl TryFrom<&[u8]> for Flake {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_be_bytes(bytes)
    }
}

impl From<Flake> for i64 {
    fn from(id: Flake) -> Self {
        id.raw()
    }
}

impl From<Flake> for [u8; 8] {
    fn from(id: Flake) -> Self {
        id.to_be_bytes()
    }
}
