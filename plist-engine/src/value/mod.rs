/*!
 The in-memory property list tree shared by every format.

 A [`Value`] is produced by decoding any of the supported formats, or built directly by
 application code, and is consumed by an encoder or read through the accessors here and in
 [`crate::util::coercion`].
*/

pub mod date;
pub mod dictionary;
pub mod integer;
pub mod real;
pub mod uid;

use crate::{
    error::plist::{CodingKey, CodingPath, PlistError},
    value::{date::Date, dictionary::Dictionary, integer::Integer, real::Real, uid::Uid},
};

/// A node in a property list tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Array(Vec<Value>),
    Dictionary(Dictionary),
    Boolean(bool),
    Data(Vec<u8>),
    Date(Date),
    Real(Real),
    Integer(Integer),
    String(String),
    Uid(Uid),
}

impl Value {
    /// A short description of the kind of value, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Array(_) => "an array",
            Value::Dictionary(_) => "a dictionary",
            Value::Boolean(_) => "a boolean",
            Value::Data(_) => "a data value",
            Value::Date(_) => "a date",
            Value::Real(_) => "a real number",
            Value::Integer(_) => "an integer",
            Value::String(_) => "a string",
            Value::Uid(_) => "a UID",
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dictionary) => Some(dictionary),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Value::Integer(integer) => Some(integer),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&Real> {
        match self {
            Value::Real(real) => Some(real),
            _ => None,
        }
    }

    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            Value::Uid(uid) => Some(*uid),
            _ => None,
        }
    }

    /// Walk a sequence of array indexes and dictionary keys down from this value
    ///
    /// A missing key or index is [`PlistError::ValueNotFound`] and stepping into a value that
    /// is not a container is [`PlistError::TypeMismatch`]. Both carry the path walked so far.
    pub fn lookup(&self, keys: &[CodingKey]) -> Result<&Value, PlistError> {
        let mut current = self;
        let mut path = CodingPath::root();
        for key in keys {
            current = match (current, key) {
                (Value::Array(items), CodingKey::Index(idx)) => {
                    items.get(*idx).ok_or_else(|| {
                        PlistError::ValueNotFound(
                            path.clone(),
                            format!("Index {idx} is outside of an array of {}", items.len()),
                        )
                    })?
                }
                (Value::Dictionary(dictionary), CodingKey::Key(name)) => {
                    dictionary.get(name).ok_or_else(|| {
                        PlistError::ValueNotFound(path.clone(), format!("No value for key {name}"))
                    })?
                }
                (other, CodingKey::Index(_)) => {
                    return Err(PlistError::TypeMismatch(
                        path,
                        format!("Expected an array but found {} instead", other.kind_name()),
                    ));
                }
                (other, CodingKey::Key(_)) => {
                    return Err(PlistError::TypeMismatch(
                        path,
                        format!(
                            "Expected a dictionary but found {} instead",
                            other.kind_name()
                        ),
                    ));
                }
            };
            path.push(key.clone());
        }
        Ok(current)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Data(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Value::Dictionary(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Uid> for Value {
    fn from(value: Uid) -> Self {
        Value::Uid(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<Real> for Value {
    fn from(value: Real) -> Self {
        Value::Real(value)
    }
}

macro_rules! value_from_number {
    ($variant:ident, $inner:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant($inner::from(value))
                }
            }
        )*
    };
}

value_from_number!(Integer, Integer: i8, i16, i32, i64, u8, u16, u32, u64);
value_from_number!(Real, Real: f32, f64);
