//! Radix 2-62 encoding for 63-bit values.
//!
//! Encodings use the `0-9a-zA-Z` alphabet. Unpadded output is the shortest
//! representation; padded output is left-filled with `'0'` to a fixed width
//! per radix, see [`max_width`].
//!
//! For radices up to 36 the alphabet is in ASCII order, so padded strings
//! compare byte-wise in the same order as the values they encode. Above 36
//! the uppercase digits (36 and up) compare below the lowercase ones
//! (10 to 35), and byte-wise order no longer follows numeric order.
mod codec;

pub use codec::*;
