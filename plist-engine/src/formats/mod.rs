/*!
 Wire formats for property lists, and the logic used to pick one for a given document.
*/

use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::debug;

use crate::{
    error::{openstep::OpenStepError, plist::PlistError},
    formats::xml::{encoding::transcode, XmlPlistReader},
    util::options::DecodeOptions,
    value::Value,
};

pub mod binary;
pub mod openstep;
pub mod xml;

/// The property list formats this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `bplist00`, readable and writable
    Binary,
    /// `PropertyList-1.0.dtd` XML, readable and writable
    Xml,
    /// The ASCII format from OpenStep and NeXTSTEP, readable only
    OpenStep,
}

impl Format {
    /// Parse a format name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "binary" | "binary1" | "bplist" => Some(Format::Binary),
            "xml" | "xml1" => Some(Format::Xml),
            "openstep" | "ascii" | "ascii1" => Some(Format::OpenStep),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Binary => "binary",
            Format::Xml => "xml",
            Format::OpenStep => "openstep",
        }
    }
}

impl Display for Format {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}", self.name())
    }
}

/// Whitespace that may precede the first tag of an XML document
fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn looks_like_xml(text: &str) -> bool {
    text.trim_start_matches(is_xml_whitespace).starts_with('<')
}

/// Reinterpret `stream` as UTF-16, honoring a byte order mark and assuming little endian without one
fn utf16_units(stream: &[u8]) -> Option<Vec<u16>> {
    let (big_endian, body) = match stream {
        [0xFE, 0xFF, rest @ ..] => (true, rest),
        [0xFF, 0xFE, rest @ ..] => (false, rest),
        _ => (false, stream),
    };
    if body.len() % 2 != 0 {
        return None;
    }
    Some(
        body.chunks_exact(2)
            .map(|pair| {
                let pair = [pair[0], pair[1]];
                if big_endian {
                    u16::from_be_bytes(pair)
                } else {
                    u16::from_le_bytes(pair)
                }
            })
            .collect(),
    )
}

fn empty_input() -> PlistError {
    PlistError::data_corrupted(OpenStepError::Empty.to_string())
}

/// Report which codec [`decode`] would use for `stream`, or `None` if `stream` is empty
///
/// Text that cannot be transcoded is reported as [`Format::OpenStep`], since that is the codec
/// [`decode`] falls back to.
pub fn detect_format(stream: &[u8]) -> Option<Format> {
    if stream.is_empty() {
        return None;
    }
    if stream.starts_with(binary::MAGIC) {
        return Some(Format::Binary);
    }
    match transcode(stream) {
        Ok((text, _)) if looks_like_xml(&text) => Some(Format::Xml),
        _ => Some(Format::OpenStep),
    }
}

/// Decode a property list in any supported format with the default [`DecodeOptions`]
pub fn decode(stream: &[u8]) -> Result<Value, PlistError> {
    decode_with_options(stream, DecodeOptions::default())
}

/// Decode a property list in any supported format, bounded by `options`
pub fn decode_with_options(stream: &[u8], options: DecodeOptions) -> Result<Value, PlistError> {
    if stream.is_empty() {
        return Err(empty_input());
    }

    if stream.starts_with(binary::MAGIC) {
        debug!("Decoding binary property list of {} bytes", stream.len());
        return binary::BinaryPlistReader::new(stream, options).parse();
    }

    match transcode(stream) {
        Ok((text, encoding)) => {
            if looks_like_xml(&text) {
                debug!("Decoding XML property list encoded as {encoding}");
                XmlPlistReader::new(&text, options).parse()
            } else {
                debug!("Decoding OpenStep property list encoded as {encoding}");
                let units: Vec<u16> = text.encode_utf16().collect();
                openstep::OpenStepReader::new(&units, options).parse()
            }
        }
        Err(why) if why.is_encoding_error() => {
            debug!("Cannot read text encoding ({why}), retrying as UTF-16 OpenStep");
            let original = why.at(Default::default());
            match utf16_units(stream) {
                Some(units) => openstep::OpenStepReader::new(&units, options)
                    .parse()
                    .map_err(|_| original),
                None => Err(original),
            }
        }
        Err(why) => Err(why.at(Default::default())),
    }
}

/// Encode a [`Value`] tree in `format`
pub fn encode(value: &Value, format: Format) -> Result<Vec<u8>, PlistError> {
    debug!("Encoding {} property list", format);
    match format {
        Format::Binary => binary::writer::write(value),
        Format::Xml => xml::writer::write(value),
        Format::OpenStep => Err(PlistError::Unsupported(format!(
            "Writing {format} property lists is not supported"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        formats::{decode, decode_with_options, detect_format, encode, Format},
        util::options::DecodeOptions,
        value::{dictionary::Dictionary, Value},
    };

    fn sample() -> Value {
        let mut dictionary = Dictionary::new();
        dictionary.insert("name", Value::from("plist"));
        dictionary.insert("count", Value::from(3));
        dictionary.insert("items", Value::Array(vec![Value::from(true), Value::from(1.5)]));
        Value::from(dictionary)
    }

    fn utf16_le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn can_parse_format_names() {
        assert_eq!(Format::from_name("XML1"), Some(Format::Xml));
        assert_eq!(Format::from_name("binary"), Some(Format::Binary));
        assert_eq!(Format::from_name("openstep"), Some(Format::OpenStep));
        assert_eq!(Format::from_name("json"), None);
        assert_eq!(Format::OpenStep.to_string(), "openstep");
    }

    #[test]
    fn can_detect_formats() {
        assert_eq!(detect_format(b""), None);
        assert_eq!(detect_format(b"bplist00"), Some(Format::Binary));
        assert_eq!(detect_format(b"\n  <plist/>"), Some(Format::Xml));
        assert_eq!(detect_format(b"{ a = b; }"), Some(Format::OpenStep));
        assert_eq!(detect_format(&[0xFF, 0xFE, 0x28, 0x00]), Some(Format::OpenStep));
    }

    #[test]
    fn can_round_trip_through_each_writable_format() {
        let value = sample();

        for format in [Format::Binary, Format::Xml] {
            let bytes = encode(&value, format).unwrap();
            assert_eq!(detect_format(&bytes), Some(format));
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn cant_encode_openstep() {
        let error = encode(&sample(), Format::OpenStep).unwrap_err();

        assert!(error.path().is_none());
        assert_eq!(
            error.message(),
            "Writing openstep property lists is not supported"
        );
    }

    #[test]
    fn cant_decode_empty() {
        let error = decode(&[]).unwrap_err();

        assert!(error.is_data_corrupted());
        assert_eq!(error.message(), "The given data was not a valid property list");
    }

    #[test]
    fn can_decode_openstep_text() {
        let parsed = decode(b"{ name = plist; }").unwrap();

        assert_eq!(
            parsed.as_dictionary().unwrap().get("name").unwrap().as_string(),
            Some("plist")
        );
    }

    #[test]
    fn can_decode_utf16_openstep_with_bom() {
        // Unquoted strings only allow ASCII
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(utf16_le("(\u{e9}t\u{e9}, hiver)"));
        let mut quoted = vec![0xFF, 0xFE];
        quoted.extend(utf16_le("(\"\u{e9}t\u{e9}\", hiver)"));

        assert!(decode(&bytes).is_err());
        let parsed = decode(&quoted).unwrap();
        assert_eq!(
            parsed,
            Value::Array(vec![Value::from("\u{e9}t\u{e9}"), Value::from("hiver")])
        );
    }

    #[test]
    fn can_fall_back_to_utf16_without_bom() {
        // Without a byte order mark the text is not UTF-8, so only the UTF-16 retry can read it
        let bytes = utf16_le("greeting = \"\u{e9}t\u{e9}\";");

        let parsed = decode(&bytes).unwrap();
        assert_eq!(
            parsed.as_dictionary().unwrap().get("greeting").unwrap().as_string(),
            Some("\u{e9}t\u{e9}")
        );
    }

    #[test]
    fn can_report_encoding_error_when_fallback_fails() {
        let error = decode(&[b'(', 0xFF, b')']).unwrap_err();

        assert!(error.is_data_corrupted());
        assert_eq!(error.message(), "Cannot convert input to UTF-16");
    }

    #[test]
    fn cant_fall_back_on_grammar_errors() {
        let error = decode(b"<plist><integer>x</integer></plist>").unwrap_err();

        assert_eq!(error.message(), "Invalid <integer> value on line 1");
    }

    #[test]
    fn can_apply_options_to_every_format() {
        let nested = Value::Array(vec![Value::Array(vec![Value::Array(vec![Value::from(1)])])]);
        let options = DecodeOptions::new().with_max_depth(2);

        for format in [Format::Binary, Format::Xml] {
            let bytes = encode(&nested, format).unwrap();
            assert!(decode_with_options(&bytes, options).is_err());
            assert_eq!(decode_with_options(&bytes, options.with_max_depth(3)).unwrap(), nested);
        }

        assert!(decode_with_options(b"(((a)))", options).is_err());
    }
}
