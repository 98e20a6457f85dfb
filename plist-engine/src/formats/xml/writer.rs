/*!
 Contains logic to serialize a [`Value`] tree as an XML property list.
*/

use base64::{prelude::BASE64_STANDARD, Engine};

use crate::{
    error::plist::{CodingPath, PlistError},
    formats::xml::{Tag, UID_KEY},
    util::options::DEFAULT_MAX_DEPTH,
    value::{date::Date, real::Real, Value},
};

/// Everything before the root value
const PREAMBLE: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);
/// Everything after the root value
const CLOSING: &str = "</plist>\n";

/// Width of a base64 line in `<data>` at the top level, including its indentation
const DATA_LINE_WIDTH: usize = 76;
/// Indentation deeper than this is not applied to base64 lines
const MAX_DATA_INDENT: usize = 8;
/// Columns a tab is counted as when wrapping base64 lines
const TAB_WIDTH: usize = 8;
/// The narrowest a base64 line may get
const MIN_DATA_LINE: usize = 4;

/// Format a real the way the reader expects it, with special values spelled out
fn format_real(real: &Real) -> String {
    let value = real.as_f64();
    if value.is_nan() {
        return String::from("nan");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "+infinity" } else { "-infinity" });
    }
    let text = match real {
        Real::F32(narrow) => format!("{narrow:?}"),
        Real::F64(wide) => format!("{wide:?}"),
    };
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// Escape the characters that would start markup
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Contains logic and data used to serialize a [`Value`] tree into an XML property list
#[derive(Debug)]
pub struct XmlPlistWriter {
    /// The document written so far
    out: String,
    /// Location of the value being written
    path: CodingPath,
    /// The deepest nesting of containers that may be written
    max_depth: usize,
}

impl Default for XmlPlistWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlPlistWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            path: CodingPath::root(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    fn indent(&mut self, depth: usize) {
        self.out.extend(std::iter::repeat('\t').take(depth));
    }

    /// Write `<tag>content</tag>` on its own line
    fn leaf(&mut self, tag: Tag, content: &str, depth: usize) {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(tag.name());
        self.out.push('>');
        self.out.push_str(content);
        self.out.push_str("</");
        self.out.push_str(tag.name());
        self.out.push_str(">\n");
    }

    fn open(&mut self, tag: Tag, depth: usize) {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(tag.name());
        self.out.push_str(">\n");
    }

    fn close(&mut self, tag: Tag, depth: usize) {
        self.indent(depth);
        self.out.push_str("</");
        self.out.push_str(tag.name());
        self.out.push_str(">\n");
    }

    fn empty(&mut self, tag: Tag, depth: usize) {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(tag.name());
        self.out.push_str("/>\n");
    }

    fn data(&mut self, bytes: &[u8], depth: usize) {
        let line_indent = depth.min(MAX_DATA_INDENT);
        let width = DATA_LINE_WIDTH
            .saturating_sub(TAB_WIDTH * line_indent)
            .max(MIN_DATA_LINE);

        self.open(Tag::Data, depth);
        let encoded = BASE64_STANDARD.encode(bytes);
        for line in encoded.as_bytes().chunks(width) {
            self.indent(line_indent);
            self.out.extend(line.iter().map(|byte| char::from(*byte)));
            self.out.push('\n');
        }
        self.close(Tag::Data, depth);
    }

    fn date(&mut self, date: &Date, depth: usize) -> Result<(), PlistError> {
        let datetime = date.to_datetime().ok_or_else(|| {
            PlistError::InvalidValue(
                self.path.clone(),
                format!(
                    "Date {} cannot be written as a calendar date",
                    date.seconds_since_reference()
                ),
            )
        })?;
        let formatted = datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        self.leaf(Tag::Date, &formatted, depth);
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<(), PlistError> {
        if depth >= self.max_depth {
            return Err(PlistError::InvalidValue(
                self.path.clone(),
                format!(
                    "Too many nested arrays or dictionaries (more than {})",
                    self.max_depth
                ),
            ));
        }
        Ok(())
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<(), PlistError> {
        match value {
            Value::Boolean(true) => self.empty(Tag::True, depth),
            Value::Boolean(false) => self.empty(Tag::False, depth),
            Value::Integer(integer) => self.leaf(Tag::Integer, &integer.to_string(), depth),
            Value::Real(real) => self.leaf(Tag::Real, &format_real(real), depth),
            Value::String(text) => self.leaf(Tag::String, &escape(text), depth),
            Value::Data(bytes) => self.data(bytes, depth),
            Value::Date(date) => self.date(date, depth)?,
            Value::Uid(uid) => {
                self.open(Tag::Dict, depth);
                self.leaf(Tag::Key, UID_KEY, depth + 1);
                self.leaf(Tag::Integer, &uid.get().to_string(), depth + 1);
                self.close(Tag::Dict, depth);
            }
            Value::Array(items) if items.is_empty() => self.empty(Tag::Array, depth),
            Value::Array(items) => {
                self.check_depth(depth)?;
                self.open(Tag::Array, depth);
                for (position, item) in items.iter().enumerate() {
                    self.path.push(position);
                    self.write_value(item, depth + 1)?;
                    self.path.pop();
                }
                self.close(Tag::Array, depth);
            }
            Value::Dictionary(dictionary) if dictionary.is_empty() => {
                self.empty(Tag::Dict, depth)
            }
            Value::Dictionary(dictionary) => {
                self.check_depth(depth)?;
                self.open(Tag::Dict, depth);
                for (key, item) in dictionary.iter() {
                    self.leaf(Tag::Key, &escape(key), depth + 1);
                    self.path.push(key.as_str());
                    self.write_value(item, depth + 1)?;
                    self.path.pop();
                }
                self.close(Tag::Dict, depth);
            }
        }
        Ok(())
    }

    /// Serialize `value` as a complete UTF-8 XML document
    pub fn write(mut self, value: &Value) -> Result<Vec<u8>, PlistError> {
        self.out.push_str(PREAMBLE);
        self.write_value(value, 0)?;
        self.out.push_str(CLOSING);
        Ok(self.out.into_bytes())
    }
}

/// Serialize a [`Value`] tree as an XML property list
pub fn write(value: &Value) -> Result<Vec<u8>, PlistError> {
    XmlPlistWriter::new().write(value)
}

#[cfg(test)]
mod tests {
    use crate::{formats::xml::writer::format_real, value::real::Real};

    #[test]
    fn can_format_reals() {
        assert_eq!(format_real(&Real::F64(2.0)), "2");
        assert_eq!(format_real(&Real::F64(-0.5)), "-0.5");
        assert_eq!(format_real(&Real::F64(0.1)), "0.1");
        assert_eq!(format_real(&Real::F64(1e16)), "1e16");
        assert_eq!(format_real(&Real::F32(0.1)), "0.1");
    }

    #[test]
    fn can_format_special_reals() {
        assert_eq!(format_real(&Real::F64(f64::NAN)), "nan");
        assert_eq!(format_real(&Real::F64(f64::INFINITY)), "+infinity");
        assert_eq!(format_real(&Real::F32(f32::NEG_INFINITY)), "-infinity");
    }
}
