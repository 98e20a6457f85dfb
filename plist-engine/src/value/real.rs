/*!
 Floating point numbers as they are stored in a property list.
*/

use std::fmt::{Display, Formatter, Result};

/// A real leaf, kept in the precision it was encoded with
#[derive(Debug, Clone, Copy)]
pub enum Real {
    /// A 4 byte IEEE 754 value
    F32(f32),
    /// An 8 byte IEEE 754 value
    F64(f64),
}

impl Real {
    /// The value widened to double precision
    pub fn as_f64(&self) -> f64 {
        match self {
            Real::F32(value) => f64::from(*value),
            Real::F64(value) => *value,
        }
    }

    /// The number of bytes this value is encoded with
    pub fn width(&self) -> u8 {
        match self {
            Real::F32(_) => 4,
            Real::F64(_) => 8,
        }
    }

    pub fn is_nan(&self) -> bool {
        self.as_f64().is_nan()
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Real::F32(lhs), Real::F32(rhs)) => lhs == rhs,
            (Real::F64(lhs), Real::F64(rhs)) => lhs == rhs,
            // Text formats have no notion of width, so compare at the narrower precision
            (Real::F32(narrow), Real::F64(wide)) | (Real::F64(wide), Real::F32(narrow)) => {
                *wide as f32 == *narrow
            }
        }
    }
}

impl Display for Real {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            Real::F32(value) => write!(fmt, "{value}"),
            Real::F64(value) => write!(fmt, "{value}"),
        }
    }
}

impl From<f32> for Real {
    fn from(value: f32) -> Self {
        Real::F32(value)
    }
}

impl From<f64> for Real {
    fn from(value: f64) -> Self {
        Real::F64(value)
    }
}
