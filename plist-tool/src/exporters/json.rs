use base64::{prelude::BASE64_STANDARD, Engine};
use json::{object::Object, JsonValue};

use plist_engine::{Integer, Real, Value};

use crate::{app::error::RuntimeError, exporters::exporter::Exporter};

/// The key that holds the reference of a UID, as keyed archives write it in XML
const UID_KEY: &str = "CF$UID";
/// Spaces used for each level of indentation
const INDENT: u16 = 2;

/// Writes the tree as JSON
///
/// JSON has no data, date, or UID types, so the export is lossy:
///
/// - Data is written as a base64 string
/// - Dates are written as ISO 8601 strings
/// - UIDs are written as `{"CF$UID": n}`
/// - Reals that are not finite are written as `null`
pub struct JSON;

impl JSON {
    fn format_integer(integer: &Integer) -> JsonValue {
        match integer.as_i128() {
            Some(value) => match (i64::try_from(value), u64::try_from(value)) {
                (Ok(signed), _) => JsonValue::from(signed),
                (_, Ok(unsigned)) => JsonValue::from(unsigned),
                _ => JsonValue::from(integer.to_string()),
            },
            None => JsonValue::from(integer.to_string()),
        }
    }

    fn format_real(real: &Real) -> JsonValue {
        let value = real.as_f64();
        if value.is_finite() {
            JsonValue::from(value)
        } else {
            JsonValue::Null
        }
    }

    fn format_value(value: &Value) -> JsonValue {
        match value {
            Value::Boolean(flag) => JsonValue::Boolean(*flag),
            Value::Integer(integer) => Self::format_integer(integer),
            Value::Real(real) => Self::format_real(real),
            Value::String(text) => JsonValue::from(text.as_str()),
            Value::Data(bytes) => JsonValue::from(BASE64_STANDARD.encode(bytes)),
            Value::Date(date) => JsonValue::from(date.to_string()),
            Value::Uid(uid) => {
                let mut reference = Object::new();
                reference.insert(
                    UID_KEY,
                    match u64::try_from(uid.get()) {
                        Ok(small) => JsonValue::from(small),
                        Err(_) => JsonValue::from(uid.get().to_string()),
                    },
                );
                JsonValue::Object(reference)
            }
            Value::Array(items) => JsonValue::Array(items.iter().map(Self::format_value).collect()),
            Value::Dictionary(dictionary) => {
                let mut object = Object::with_capacity(dictionary.len());
                for (key, item) in dictionary.iter() {
                    object.insert(key, Self::format_value(item));
                }
                JsonValue::Object(object)
            }
        }
    }
}

impl Exporter for JSON {
    fn export(&self, value: &Value) -> Result<Vec<u8>, RuntimeError> {
        let mut out = Self::format_value(value).pretty(INDENT);
        out.push('\n');
        Ok(out.into_bytes())
    }
}
