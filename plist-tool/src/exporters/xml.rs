use plist_engine::{encode, Format, Value};

use crate::{app::error::RuntimeError, exporters::exporter::Exporter};

/// Writes the tree as an XML property list
pub struct XML;

impl Exporter for XML {
    fn export(&self, value: &Value) -> Result<Vec<u8>, RuntimeError> {
        Ok(encode(value, Format::Xml)?)
    }
}

#[cfg(test)]
mod tests {
    use plist_engine::{Date, Value};

    use crate::{
        app::error::RuntimeError,
        exporters::{Exporter, XML},
    };

    #[test]
    fn can_export_xml() {
        let value = Value::Array(vec![Value::from("a & b")]);

        let text = String::from_utf8(XML.export(&value).unwrap()).unwrap();

        assert!(text.contains("<string>a &amp; b</string>"));
        assert!(text.ends_with("</plist>\n"));
    }

    #[test]
    fn cant_export_unrepresentable_date() {
        let value = Value::from(Date::from_seconds_since_reference(f64::NAN));

        assert!(matches!(
            XML.export(&value),
            Err(RuntimeError::PlistError(_))
        ));
    }
}
