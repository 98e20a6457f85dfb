use plist_engine::Value;

use crate::{app::error::RuntimeError, exporters::exporter::Exporter};

/// Indentation added for each level of nesting
const INDENT: &str = "    ";
/// Data longer than this is summarized instead of written out in full
const MAX_DATA_PREVIEW: usize = 32;

/// Writes the tree as an indented, human readable outline
pub struct TXT;

impl TXT {
    fn add_line(&self, string: &mut String, part: &str, indent: &str) {
        string.push_str(indent);
        string.push_str(part);
        string.push('\n');
    }

    fn count(count: usize, singular: &str, plural: &str) -> String {
        match count {
            1 => format!("1 {singular}"),
            _ => format!("{count} {plural}"),
        }
    }

    /// Format a value that does not contain other values
    fn format_leaf(value: &Value) -> String {
        match value {
            Value::Boolean(flag) => flag.to_string(),
            Value::Integer(integer) => integer.to_string(),
            Value::Real(real) => real.to_string(),
            Value::String(text) => format!("{text:?}"),
            Value::Data(bytes) => {
                let preview: String = bytes
                    .iter()
                    .take(MAX_DATA_PREVIEW)
                    .map(|byte| format!("{byte:02x}"))
                    .collect();
                let ellipsis = if bytes.len() > MAX_DATA_PREVIEW { "..." } else { "" };
                format!("<{preview}{ellipsis}> ({})", Self::count(bytes.len(), "byte", "bytes"))
            }
            Value::Date(date) => date.to_string(),
            Value::Uid(uid) => format!("uid({})", uid.get()),
            Value::Array(items) => format!("array ({})", Self::count(items.len(), "item", "items")),
            Value::Dictionary(dictionary) => {
                format!("dict ({})", Self::count(dictionary.len(), "entry", "entries"))
            }
        }
    }

    /// Format `value` on the line that starts with `label`, followed by its children
    fn format_value(&self, out: &mut String, label: &str, value: &Value, depth: usize) {
        let indent = INDENT.repeat(depth);
        self.add_line(out, &format!("{label}{}", Self::format_leaf(value)), &indent);

        match value {
            Value::Array(items) => {
                for (position, item) in items.iter().enumerate() {
                    self.format_value(out, &format!("[{position}] "), item, depth + 1);
                }
            }
            Value::Dictionary(dictionary) => {
                for (key, item) in dictionary.iter() {
                    self.format_value(out, &format!("{key}: "), item, depth + 1);
                }
            }
            _ => {}
        }
    }
}

impl Exporter for TXT {
    fn export(&self, value: &Value) -> Result<Vec<u8>, RuntimeError> {
        let mut out = String::new();
        self.format_value(&mut out, "", value, 0);
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use plist_engine::{Date, Dictionary, Uid, Value};

    use crate::exporters::{Exporter, TXT};

    fn export(value: &Value) -> String {
        String::from_utf8(TXT.export(value).unwrap()).unwrap()
    }

    #[test]
    fn can_format_leaf() {
        assert_eq!(export(&Value::from("say \"hi\"")), "\"say \\\"hi\\\"\"\n");
        assert_eq!(export(&Value::from(-3)), "-3\n");
        assert_eq!(export(&Value::from(Uid::new(9))), "uid(9)\n");
        assert_eq!(
            export(&Value::from(Date::from_seconds_since_reference(0.0))),
            "2001-01-01T00:00:00Z\n"
        );
    }

    #[test]
    fn can_format_data() {
        assert_eq!(export(&Value::from(vec![0xFEu8, 0xED])), "<feed> (2 bytes)\n");
        assert_eq!(export(&Value::from(vec![0x01u8])), "<01> (1 byte)\n");

        let long = export(&Value::from(vec![0xAAu8; 40]));
        assert!(long.starts_with(&format!("<{}...>", "aa".repeat(32))));
        assert!(long.ends_with("(40 bytes)\n"));
    }

    #[test]
    fn can_format_nested() {
        let mut inner = Dictionary::new();
        inner.insert("flag", Value::from(false));
        let mut root = Dictionary::new();
        root.insert("name", Value::from("plist"));
        root.insert(
            "items",
            Value::Array(vec![Value::from(1), Value::from(inner)]),
        );
        root.insert("empty", Value::Array(vec![]));

        assert_eq!(
            export(&Value::from(root)),
            concat!(
                "dict (3 entries)\n",
                "    name: \"plist\"\n",
                "    items: array (2 items)\n",
                "        [0] 1\n",
                "        [1] dict (1 entry)\n",
                "            flag: false\n",
                "    empty: array (0 items)\n",
            )
        );
    }
}
