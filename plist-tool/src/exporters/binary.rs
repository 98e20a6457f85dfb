use plist_engine::{encode, Format, Value};

use crate::{app::error::RuntimeError, exporters::exporter::Exporter};

/// Writes the tree as a binary property list
pub struct Binary;

impl Exporter for Binary {
    fn export(&self, value: &Value) -> Result<Vec<u8>, RuntimeError> {
        Ok(encode(value, Format::Binary)?)
    }
}

#[cfg(test)]
mod tests {
    use plist_engine::{decode, Dictionary, Value};

    use crate::exporters::{Binary, Exporter};

    #[test]
    fn can_export_binary() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("answer", Value::from(42));
        let value = Value::from(dictionary);

        let bytes = Binary.export(&value).unwrap();

        assert!(bytes.starts_with(b"bplist00"));
        assert_eq!(decode(&bytes).unwrap(), value);
    }
}
