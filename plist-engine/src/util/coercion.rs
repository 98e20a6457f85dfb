/*!
 Extraction of booleans and numbers from property list leaves.

 Text formats do not record how wide a number was, so a leaf may be requested as any numeric
 type that can hold it exactly. Booleans and [`Uid`](crate::value::uid::Uid)s never take part
 in numeric coercion.
*/

use crate::{
    error::plist::PlistError,
    value::{integer::Integer, real::Real, Value},
};

/// `2^127`, the first magnitude that does not fit in an [`i128`]
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Rust numeric types that can be read from an [`Integer`] or [`Real`] leaf
pub trait FromPlistNumber: Sized {
    /// The name of the type used in error messages
    const NAME: &'static str;

    fn from_integer(integer: &Integer) -> Option<Self>;
    fn from_real(real: &Real) -> Option<Self>;
}

/// Convert a real to an integer only when no information is lost
fn integral_value(real: &Real) -> Option<i128> {
    let value = real.as_f64();
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= I128_LIMIT {
        return None;
    }
    Some(value as i128)
}

macro_rules! from_plist_signed {
    ($($ty:ty),*) => {
        $(
            impl FromPlistNumber for $ty {
                const NAME: &'static str = stringify!($ty);

                fn from_integer(integer: &Integer) -> Option<Self> {
                    integer.as_i128().and_then(|value| <$ty>::try_from(value).ok())
                }

                fn from_real(real: &Real) -> Option<Self> {
                    integral_value(real).and_then(|value| <$ty>::try_from(value).ok())
                }
            }
        )*
    };
}

macro_rules! from_plist_unsigned {
    ($($ty:ty),*) => {
        $(
            impl FromPlistNumber for $ty {
                const NAME: &'static str = stringify!($ty);

                fn from_integer(integer: &Integer) -> Option<Self> {
                    // The stored bit pattern is the value, so a signed 8 byte payload reads as its
                    // unsigned reinterpretation
                    <$ty>::try_from(integer.bits()).ok()
                }

                fn from_real(real: &Real) -> Option<Self> {
                    integral_value(real).and_then(|value| <$ty>::try_from(value).ok())
                }
            }
        )*
    };
}

from_plist_signed!(i8, i16, i32, i64);
from_plist_unsigned!(u8, u16, u32, u64);

fn integer_as_f64(integer: &Integer) -> f64 {
    match integer.as_i128() {
        Some(value) => value as f64,
        None => integer.bits() as f64,
    }
}

impl FromPlistNumber for f64 {
    const NAME: &'static str = "f64";

    fn from_integer(integer: &Integer) -> Option<Self> {
        Some(integer_as_f64(integer))
    }

    fn from_real(real: &Real) -> Option<Self> {
        Some(real.as_f64())
    }
}

impl FromPlistNumber for f32 {
    const NAME: &'static str = "f32";

    fn from_integer(integer: &Integer) -> Option<Self> {
        Some(integer_as_f64(integer) as f32)
    }

    fn from_real(real: &Real) -> Option<Self> {
        match real {
            Real::F32(value) => Some(*value),
            Real::F64(value) if value.is_nan() => Some(f32::NAN),
            Real::F64(value) => {
                let narrow = *value as f32;
                (f64::from(narrow) == *value).then_some(narrow)
            }
        }
    }
}

impl Value {
    pub fn as_bool(&self) -> Result<bool, PlistError> {
        match self {
            Value::Boolean(value) => Ok(*value),
            other => Err(PlistError::type_mismatch(format!(
                "Expected to decode bool but found {} instead",
                other.kind_name()
            ))),
        }
    }

    /// Read a numeric leaf as `T`, failing if the stored number cannot be represented exactly
    pub fn as_number<T: FromPlistNumber>(&self) -> Result<T, PlistError> {
        let converted = match self {
            Value::Integer(integer) => T::from_integer(integer).ok_or_else(|| {
                PlistError::type_mismatch(format!(
                    "Parsed number <{integer}> does not fit in {}",
                    T::NAME
                ))
            })?,
            Value::Real(real) => T::from_real(real).ok_or_else(|| {
                PlistError::type_mismatch(format!(
                    "Parsed number <{real}> does not fit in {}",
                    T::NAME
                ))
            })?,
            other => {
                return Err(PlistError::type_mismatch(format!(
                    "Expected to decode {} but found {} instead",
                    T::NAME,
                    other.kind_name()
                )))
            }
        };
        Ok(converted)
    }

    pub fn as_i8(&self) -> Result<i8, PlistError> {
        self.as_number()
    }

    pub fn as_i16(&self) -> Result<i16, PlistError> {
        self.as_number()
    }

    pub fn as_i32(&self) -> Result<i32, PlistError> {
        self.as_number()
    }

    pub fn as_i64(&self) -> Result<i64, PlistError> {
        self.as_number()
    }

    pub fn as_u8(&self) -> Result<u8, PlistError> {
        self.as_number()
    }

    pub fn as_u16(&self) -> Result<u16, PlistError> {
        self.as_number()
    }

    pub fn as_u32(&self) -> Result<u32, PlistError> {
        self.as_number()
    }

    pub fn as_u64(&self) -> Result<u64, PlistError> {
        self.as_number()
    }

    pub fn as_f32(&self) -> Result<f32, PlistError> {
        self.as_number()
    }

    pub fn as_f64(&self) -> Result<f64, PlistError> {
        self.as_number()
    }
}
