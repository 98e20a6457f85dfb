/*!
 Integers as they are stored in a property list.
*/

use std::{
    fmt::{Display, Formatter, Result},
    hash::{Hash, Hasher},
};

/// An integer leaf, kept in the width it was encoded with
///
/// The binary format stores integers as 1, 2, 4, 8, or 16 big-endian bytes:
///
/// - 1, 2, and 4 byte payloads are unsigned magnitudes
/// - 8 byte payloads are two's complement when `signed`
/// - 16 byte payloads are unsigned
///
/// Two integers are equal when they hold the same mathematical value, so `-1` stored in
/// 8 bytes and [`u64::MAX`] stored in 16 bytes are different even though their low 64 bits match.
#[derive(Debug, Clone, Copy)]
pub struct Integer {
    width: u8,
    signed: bool,
    bits: u128,
}

impl Integer {
    /// Build an integer from its encoded width and big-endian payload bits
    ///
    /// Returns `None` if the width is not a valid integer width or the bits do not fit in it.
    pub fn from_parts(width: u8, signed: bool, bits: u128) -> Option<Self> {
        if !matches!(width, 1 | 2 | 4 | 8 | 16) {
            return None;
        }
        if width < 16 && bits >> (u32::from(width) * 8) != 0 {
            return None;
        }
        Some(Self {
            width,
            // Only 8 byte payloads carry a sign
            signed: signed && width <= 8,
            bits,
        })
    }

    /// The number of bytes this integer was encoded with
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The raw payload, zero-extended to 128 bits
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Whether the payload is an 8 byte two's complement value with the sign bit set
    pub fn is_negative(&self) -> bool {
        self.signed && self.width == 8 && self.bits & (1 << 63) != 0
    }

    /// The mathematical value, if it fits in an [`i128`]
    pub fn as_i128(&self) -> Option<i128> {
        if self.is_negative() {
            return Some(i128::from(self.bits as u64 as i64));
        }
        i128::try_from(self.bits).ok()
    }

    /// The smallest of the 1, 2, 4, or 8 byte widths that holds `value`
    pub(crate) fn minimal_width(value: u64) -> u8 {
        if value <= u64::from(u8::MAX) {
            1
        } else if value <= u64::from(u16::MAX) {
            2
        } else if value <= u64::from(u32::MAX) {
            4
        } else {
            8
        }
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        // Negative payloads are exactly 64 bits wide, everything else is a magnitude
        self.is_negative() == other.is_negative() && self.bits == other.bits
    }
}

impl Eq for Integer {}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_negative().hash(state);
        self.bits.hash(state);
    }
}

impl Display for Integer {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        if self.is_negative() {
            write!(fmt, "{}", self.bits as u64 as i64)
        } else {
            write!(fmt, "{}", self.bits)
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self {
                width: 8,
                signed: true,
                bits: u128::from(value as u64),
            }
        } else {
            Self {
                width: Self::minimal_width(value as u64),
                signed: true,
                bits: value as u128,
            }
        }
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(signed) => Self::from(signed),
            Err(_) => Self {
                width: 16,
                signed: false,
                bits: u128::from(value),
            },
        }
    }
}

macro_rules! integer_from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Integer {
                fn from(value: $ty) -> Self {
                    Self::from(i64::from(value))
                }
            }
        )*
    };
}

macro_rules! integer_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Integer {
                fn from(value: $ty) -> Self {
                    Self::from(u64::from(value))
                }
            }
        )*
    };
}

integer_from_signed!(i8, i16, i32);
integer_from_unsigned!(u8, u16, u32);
