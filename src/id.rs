#[cfg(not(feature = "std"))]
use core as std;

use crate::{ENCODED_LEN, MAX_COUNTER, RAW_LEN};
use fstr::FStr;
use std::{cmp, error, fmt, str};

/// Digit characters used in the Base32 "extended hex" notation.
const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// An O(1) map from ASCII code points to Base32hex digit values. Uppercase letters are not
/// mapped.
const DECODE_MAP: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
    0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Represents an xid and provides converters, field accessors, and comparison operators.
///
/// The 12-byte big-endian layout is: 32-bit `timestamp` (Unix seconds), 24-bit `machine`,
/// 16-bit `pid`, and 24-bit `counter`. Comparing two objects compares these fields in that
/// order.
///
/// # Examples
///
/// ```rust
/// use xid::Xid;
///
/// let x = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
/// assert_eq!(x.to_string(), "9m4e2mr0ui3e8a215n4g");
///
/// let y = Xid::from_fields(1300816219, [0x60, 0xf4, 0x86], 0xe428, 4271561);
/// assert_eq!(x, y);
/// # Ok::<(), xid::InvalidIdError>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Xid([u8; RAW_LEN]);

impl Xid {
    /// The nil identifier, consisting of twelve zero bytes.
    pub const NIL: Self = Self([0; RAW_LEN]);

    /// Creates an object from a 12-byte big-endian byte array.
    pub const fn from_bytes(array_value: [u8; RAW_LEN]) -> Self {
        Self(array_value)
    }

    /// Creates an object from a byte slice, which must be exactly 12 bytes long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let bytes = [0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9];
    /// assert!(Xid::from_slice(&bytes).is_ok());
    /// assert!(Xid::from_slice(&bytes[..11]).is_err());
    /// ```
    pub const fn from_slice(slice_value: &[u8]) -> Result<Self, InvalidIdError> {
        if slice_value.len() != RAW_LEN {
            return Err(InvalidIdError::new());
        }

        let mut dst = [0u8; RAW_LEN];
        let mut i = 0;
        while i < RAW_LEN {
            dst[i] = slice_value[i];
            i += 1;
        }
        Ok(Self(dst))
    }

    /// Returns the big-endian byte array representation.
    pub const fn to_bytes(self) -> [u8; RAW_LEN] {
        self.0
    }

    /// Returns a reference to the big-endian byte array representation.
    pub const fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// Creates an object from field values.
    ///
    /// # Panics
    ///
    /// Panics if `counter` does not fit in 24 bits.
    pub const fn from_fields(timestamp: u32, machine: [u8; 3], pid: u16, counter: u32) -> Self {
        if counter > MAX_COUNTER {
            panic!("invalid field value");
        }

        let ts = timestamp.to_be_bytes();
        let pid = pid.to_be_bytes();
        let ctr = counter.to_be_bytes();
        Self([
            ts[0], ts[1], ts[2], ts[3], machine[0], machine[1], machine[2], pid[0], pid[1], ctr[1],
            ctr[2], ctr[3],
        ])
    }

    /// Returns `true` if this is the nil identifier.
    pub const fn is_nil(&self) -> bool {
        let mut i = 0;
        while i < RAW_LEN {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns the 32-bit `timestamp` field value in seconds since the Unix epoch.
    pub const fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns the 24-bit `machine` field value.
    pub const fn machine(&self) -> [u8; 3] {
        [self.0[4], self.0[5], self.0[6]]
    }

    /// Returns the 16-bit `pid` field value.
    pub const fn pid(&self) -> u16 {
        u16::from_be_bytes([self.0[7], self.0[8]])
    }

    /// Returns the 24-bit `counter` field value.
    pub const fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Compares two objects, which is equivalent to comparing their canonical string
    /// representations.
    pub fn compare(&self, other: &Self) -> cmp::Ordering {
        self.cmp(other)
    }

    /// Sorts a slice of objects in ascending order, i.e., roughly in the order of creation.
    pub fn sort(ids: &mut [Self]) {
        ids.sort_unstable();
    }

    /// Returns the 96-bit unsigned integer value held in the lower bits of `u128`.
    const fn to_u128(self) -> u128 {
        let b = self.0;
        u128::from_be_bytes([
            0, 0, 0, 0, b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11],
        ])
    }

    /// Creates an object from the lower 96 bits of `u128`.
    const fn from_u128(int_value: u128) -> Self {
        let b = int_value.to_be_bytes();
        Self([
            b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15],
        ])
    }

    /// Creates an object from a 20-digit string representation.
    ///
    /// Only lowercase digits are accepted, and the last digit must not carry bits beyond the
    /// 96-bit value, so every accepted string is the canonical encoding of its result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = Xid::try_from_str("9m4e2mr0ui3e8a215n4g")?;
    /// let y = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
    /// assert_eq!(x, y);
    ///
    /// assert!(Xid::try_from_str("9M4E2MR0UI3E8A215N4G").is_err());
    /// assert!(Xid::try_from_str("9m4e2mr0ui3e8a215n4h").is_err());
    /// # Ok::<(), xid::InvalidIdError>(())
    /// ```
    pub const fn try_from_str(str_value: &str) -> Result<Self, InvalidIdError> {
        if str_value.len() != ENCODED_LEN {
            return Err(InvalidIdError::new());
        }

        let src = str_value.as_bytes();
        let mut int_value = 0u128;
        let mut i = 0;
        while i < ENCODED_LEN {
            let n = DECODE_MAP[src[i] as usize];
            if n == 0xff {
                return Err(InvalidIdError::new());
            }
            int_value = (int_value << 5) | n as u128;
            i += 1;
        }

        // 20 digits hold 100 bits; the trailing 4 must be zero padding
        if int_value & 0xf != 0 {
            return Err(InvalidIdError::new());
        }
        Ok(Self::from_u128(int_value >> 4))
    }

    /// Returns the 20-digit string representation stored in a stack-allocated string-like type
    /// that can be handled like [`String`] through common traits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = Xid::from_bytes([0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9]);
    /// let y = x.encode();
    /// assert_eq!(y, "9m4e2mr0ui3e8a215n4g");
    /// assert_eq!(format!("{}", y), "9m4e2mr0ui3e8a215n4g");
    /// ```
    pub const fn encode(&self) -> FStr<ENCODED_LEN> {
        let int_value = self.to_u128() << 4;

        let mut dst = [0u8; ENCODED_LEN];
        let mut i = 0;
        while i < ENCODED_LEN {
            let shift = 5 * (ENCODED_LEN - 1 - i);
            dst[i] = DIGITS[((int_value >> shift) & 0x1f) as usize];
            i += 1;
        }

        // SAFETY: All bytes in `dst` are valid ASCII characters.
        unsafe { FStr::from_bytes_unchecked(dst) }
    }
}

impl From<[u8; RAW_LEN]> for Xid {
    /// Creates an object from a 12-byte big-endian byte array.
    fn from(value: [u8; RAW_LEN]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<Xid> for [u8; RAW_LEN] {
    /// Returns the big-endian byte array representation.
    fn from(object: Xid) -> Self {
        object.to_bytes()
    }
}

impl TryFrom<&[u8]> for Xid {
    type Error = InvalidIdError;

    /// Creates an object from a byte slice, which must be exactly 12 bytes long.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(value)
    }
}

impl TryFrom<&str> for Xid {
    type Error = InvalidIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from_str(value)
    }
}

impl AsRef<[u8]> for Xid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl str::FromStr for Xid {
    type Err = InvalidIdError;

    /// Creates an object from a 20-digit string representation.
    fn from_str(str_value: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(str_value)
    }
}

impl fmt::Display for Xid {
    /// Returns the 20-digit canonical string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
    /// assert_eq!(format!("{}", x), "9m4e2mr0ui3e8a215n4g");
    /// assert_eq!(format!("{:24}", x), "9m4e2mr0ui3e8a215n4g    ");
    /// assert_eq!(format!("{:->24}", x), "----9m4e2mr0ui3e8a215n4g");
    /// assert_eq!(format!("{:.^7.5}", x), ".9m4e2.");
    /// # Ok::<(), xid::InvalidIdError>(())
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.encode().as_str(), f)
    }
}

/// An error converting an invalid string or byte representation into an xid.
///
/// The error does not tell which check failed; inspect the input to diagnose it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InvalidIdError {
    _private: (),
}

impl InvalidIdError {
    const fn new() -> Self {
        Self { _private: () }
    }
}

impl fmt::Display for InvalidIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid ID")
    }
}

impl error::Error for InvalidIdError {}

#[cfg(feature = "std")]
mod with_std {
    use super::{InvalidIdError, Xid};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    impl Xid {
        /// Returns the `timestamp` field value as a [`SystemTime`].
        #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
        pub fn time(&self) -> SystemTime {
            UNIX_EPOCH + Duration::from_secs(self.timestamp().into())
        }
    }

    impl TryFrom<String> for Xid {
        type Error = InvalidIdError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_from_str(&value)
        }
    }

    impl From<Xid> for String {
        fn from(object: Xid) -> Self {
            object.encode().into()
        }
    }
}


#[cfg(feature = "serde")]
mod with_serde {
    use super::{fmt, str, Xid, RAW_LEN};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Xid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Xid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = Xid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "an xid representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Self::Value::try_from_str(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            if value.len() == RAW_LEN {
                Self::Value::from_slice(value).map_err(de::Error::custom)
            } else {
                match str::from_utf8(value) {
                    Ok(str_value) => self.visit_str(str_value),
                    _ => Err(de::Error::custom(super::InvalidIdError::new())),
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::Xid;
        use serde_test::{Configure, Token};

        /// Serializes and deserializes prepared cases correctly
        #[test]
        fn serializes_and_deserializes_prepared_cases_correctly() {
            let cases = [
                (
                    "9m4e2mr0ui3e8a215n4g",
                    &[
                        0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9,
                    ],
                ),
                ("00000000000000000000", &[0; 12]),
                (
                    "0000005anf6drrg0000g",
                    &[0, 0, 0, 0, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0, 0, 1],
                ),
                ("vvvvvvvvvvvvvvvvvvvg", &[0xff; 12]),
            ];

            for (text, bytes) in cases {
                let e = text.parse::<Xid>().unwrap();
                serde_test::assert_tokens(&e.readable(), &[Token::Str(text)]);
                serde_test::assert_tokens(&e.compact(), &[Token::Bytes(bytes)]);

                // deserialize the other format regardless of human-readability configuration
                serde_test::assert_de_tokens(&e.readable(), &[Token::Bytes(bytes)]);
                serde_test::assert_de_tokens(&e.compact(), &[Token::Str(text)]);

                // deserialize textual representation even if passed as byte slice
                serde_test::assert_de_tokens(&e.readable(), &[Token::Bytes(text.as_bytes())]);
                serde_test::assert_de_tokens(&e.compact(), &[Token::Bytes(text.as_bytes())]);
            }
        }

        /// Reports invalid representations as invalid ID
        #[test]
        fn reports_invalid_representations_as_invalid_id() {
            serde_test::assert_de_tokens_error::<serde_test::Readable<Xid>>(
                &[Token::Str("9M4E2MR0UI3E8A215N4G")],
                "invalid ID",
            );
            serde_test::assert_de_tokens_error::<serde_test::Readable<Xid>>(
                &[Token::Str("TYjhW2D0huQoQS")],
                "invalid ID",
            );
            serde_test::assert_de_tokens_error::<serde_test::Compact<Xid>>(
                &[Token::Bytes(&[0; 11])],
                "invalid ID",
            );
            serde_test::assert_de_tokens_error::<serde_test::Compact<Xid>>(
                &[Token::Bytes(&[0xff; 13])],
                "invalid ID",
            );
        }
    }
}
