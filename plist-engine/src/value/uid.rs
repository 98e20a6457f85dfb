/*!
 Opaque object references used by keyed archives.
*/

use std::fmt::{Display, Formatter, Result};

/// A reference marker written by keyed archivers
///
/// A [`Uid`] is never treated as a number, even though its payload is an unsigned integer.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Uid {
    width: u8,
    bits: u128,
}

impl Uid {
    pub fn new(value: u64) -> Self {
        Self {
            width: Self::minimal_width(u128::from(value)),
            bits: u128::from(value),
        }
    }

    /// Build a [`Uid`] from the payload of a binary UID object, which is 1 to 16 bytes wide
    pub(crate) fn from_parts(width: u8, bits: u128) -> Option<Self> {
        if !(1..=16).contains(&width) || (width < 16 && bits >> (u32::from(width) * 8) != 0) {
            return None;
        }
        Some(Self { width, bits })
    }

    pub fn get(&self) -> u128 {
        self.bits
    }

    /// The number of bytes the reference was encoded with
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The fewest bytes needed to store `value`, at least one
    pub(crate) fn minimal_width(value: u128) -> u8 {
        let significant_bits = 128 - value.leading_zeros();
        significant_bits.div_ceil(8).max(1) as u8
    }
}

impl PartialEq for Uid {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Display for Uid {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        write!(fmt, "UID({})", self.bits)
    }
}
