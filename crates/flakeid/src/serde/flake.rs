use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Flake};

fn into_de_error<E: serde::de::Error>(err: Error) -> E {
    match err {
        Error::InvalidArgument(reason) => E::custom(reason),
        other => E::custom(other),
    }
}

impl Serialize for Flake {
    /// Serializes as the native signed 64-bit integer.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Flake {
    /// Deserializes from the native integer, rejecting negative values.
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(d)?;
        Self::from_raw(raw).map_err(into_de_error)
    }
}

/// Field adapter storing a [`Flake`] as its native integer.
///
/// Equivalent to the default impls; provided for symmetry with the string
/// adapters.
pub mod as_native_flake {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::Flake;

    /// Serialize a Flake as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Flake, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.serialize(s)
    }

    /// Deserialize a Flake from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value is negative
    pub fn deserialize<'de, D>(d: D) -> Result<Flake, D::Error>
    where
        D: Deserializer<'de>,
    {
        Flake::deserialize(d)
    }
}

/// Field adapter storing a [`Flake`] as a decimal string, e.g. `"36867"`.
pub mod as_decimal_flake {
    use super::{Deserializer, Serializer, into_de_error};
    use crate::Flake;

    /// Serialize a Flake as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Flake, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize a Flake from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a decimal integer
    /// - The value is negative
    pub fn deserialize<'de, D>(d: D) -> Result<Flake, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = Flake;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a non-negative decimal integer string")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(into_de_error)
            }
        }

        d.deserialize_str(DecimalVisitor)
    }
}

/// Field adapter storing a [`Flake`] as a padded base-62 string, e.g.
/// `"0000000009AD"`.
///
/// The strings are compact but do not compare byte-wise in ID order. Use
/// [`as_native_flake`](crate::as_native_flake) or
/// [`as_decimal_flake`](crate::as_decimal_flake) where stored order matters.
pub mod as_base62_flake {
    use super::{Deserializer, Serializer, into_de_error};
    use crate::Flake;

    /// Serialize a Flake as a 12 character base-62 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Flake, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_base62(true))
    }

    /// Deserialize a Flake from a base-62 string, padded or not.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string contains a non base-62 character
    /// - The value does not fit in 63 bits
    pub fn deserialize<'de, D>(d: D) -> Result<Flake, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Base62Visitor;

        impl serde::de::Visitor<'_> for Base62Visitor {
            type Value = Flake;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a base-62 encoded string")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Flake::from_base(v, 62).map_err(into_de_error)
            }
        }

        d.deserialize_str(Base62Visitor)
    }
}
