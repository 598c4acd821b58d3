use crate::ArgumentError;

/// Digit alphabet shared by every radix: `0-9`, then `a-z`, then `A-Z`.
///
/// Digit value 10 is `'a'`, 35 is `'z'`, 36 is `'A'` and 61 is `'Z'`.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Smallest supported radix.
pub const MIN_BASE: u8 = 2;

/// Largest supported radix.
pub const MAX_BASE: u8 = 62;

/// Capacity of the encode buffer: the widest padded form, base 2.
pub const BUF_SIZE: usize = 70;

/// Largest value representable in 63 bits.
const MAX_VALUE: u64 = i64::MAX as u64;

const NO_VALUE: u8 = 255;

/// Lookup table for decoding. Case matters: `'a'` and `'A'` are different
/// digits.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < MAX_BASE {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// Padded widths, indexed by radix.
///
/// Each width leaves headroom over the digit count of `2^63 - 1`. The values
/// are fixed so that padded strings stay compatible with IDs already stored
/// in this form.
#[rustfmt::skip]
const WIDTHS: [u8; MAX_BASE as usize + 1] = [
    0, 0,
    70, 45, 35, 31, 27, 25, 24, 23,
    21, 21, 20, 19, 19, 18, 18, 18,
    17, 17, 17, 16, 16, 16, 16, 16,
    15, 15, 15, 15, 15, 15, 14, 14,
    14, 14, 14, 14, 14, 14, 14, 14,
    13, 13, 13, 13, 13, 13, 13, 13,
    13, 13, 13, 13, 13, 13, 13, 12,
    12, 12, 12, 12, 12,
];

/// Returns the padded width for `base`.
///
/// Padded encodings are left-filled with `'0'` to this width, so every padded
/// string of one radix has the same length. The width is never smaller than
/// the digit count of `2^63 - 1`.
///
/// Returns `0` for radices outside `2..=62`.
pub const fn max_width(base: u8) -> usize {
    if base < MIN_BASE || base > MAX_BASE {
        return 0;
    }
    WIDTHS[base as usize] as usize
}

const fn check_base(base: u8) -> Result<u64, ArgumentError> {
    if base < MIN_BASE || base > MAX_BASE {
        return Err(ArgumentError::BaseOutOfRange(base));
    }
    Ok(base as u64)
}

/// Encodes `value` in `base`, writing into the tail of `buf` and returning the
/// written digits.
///
/// Digits are produced least significant first by repeated division, so the
/// buffer is filled from the end backward and the result is the trailing
/// slice. No allocation happens.
///
/// # Errors
///
/// Returns [`ArgumentError::BaseOutOfRange`] if `base` is outside `2..=62`.
pub fn encode_to_buf(
    value: u64,
    base: u8,
    padded: bool,
    buf: &mut [u8; BUF_SIZE],
) -> Result<&str, ArgumentError> {
    check_base(base)?;
    Ok(write_digits(value, base, padded, buf))
}

/// Infallible core of [`encode_to_buf`]. `base` must already be in
/// `2..=62`.
pub(crate) fn write_digits(
    value: u64,
    base: u8,
    padded: bool,
    buf: &mut [u8; BUF_SIZE],
) -> &str {
    debug_assert!((MIN_BASE..=MAX_BASE).contains(&base), "base out of range");
    debug_assert!(value <= MAX_VALUE, "value exceeds 63 bits");
    let radix = u64::from(base);

    let mut v = value;
    let mut pos = BUF_SIZE;
    loop {
        pos -= 1;
        buf[pos] = ALPHABET[(v % radix) as usize];
        v /= radix;
        if v == 0 {
            break;
        }
    }

    if padded {
        let start = BUF_SIZE - max_width(base);
        if pos > start {
            buf[start..pos].fill(b'0');
            pos = start;
        }
    }

    // SAFETY: every byte in `buf[pos..]` was copied from `ALPHABET` or is
    // `b'0'`, all of which are ASCII.
    unsafe { core::str::from_utf8_unchecked(&buf[pos..]) }
}

/// Decodes a string of `base` digits, padded or not, into a 63-bit value.
///
/// # Errors
///
/// - [`ArgumentError::BaseOutOfRange`] if `base` is outside `2..=62`
/// - [`ArgumentError::EmptyInput`] if `encoded` is empty
/// - [`ArgumentError::InvalidDigit`] if a character is not a `base` digit
/// - [`ArgumentError::Overflow`] if the value exceeds `2^63 - 1`
pub fn decode(encoded: &str, base: u8) -> Result<u64, ArgumentError> {
    let radix = check_base(base)?;
    if encoded.is_empty() {
        return Err(ArgumentError::EmptyInput);
    }

    let mut acc = 0_u64;
    for c in encoded.chars() {
        let digit = u8::try_from(c)
            .map(|b| LOOKUP[b as usize])
            .ok()
            .filter(|&d| d < base)
            .ok_or(ArgumentError::InvalidDigit { digit: c, base })?;
        acc = acc
            .checked_mul(radix)
            .and_then(|a| a.checked_add(u64::from(digit)))
            .filter(|&a| a <= MAX_VALUE)
            .ok_or(ArgumentError::Overflow)?;
    }
    Ok(acc)
}
