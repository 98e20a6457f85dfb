/*!
 Detects the character encoding of a text property list and converts it to UTF-8.

 The encoding is taken from a byte order mark if there is one, otherwise from the
 `encoding` attribute of the `<?xml ... ?>` declaration, otherwise UTF-8 is assumed.
*/

use std::fmt::{self, Display, Formatter};

use crate::error::xml::XmlPlistError;

/// The opening of an XML declaration
const XML_DECLARATION: &[u8] = b"<?xml";
/// The attribute that names the document encoding
const ENCODING_ATTRIBUTE: &[u8] = b"encoding=";

/// Mac OS Roman code points for bytes `0x80` through `0xFF`
const MAC_ROMAN: [u16; 128] = [
    0x00C4, 0x00C5, 0x00C7, 0x00C9, 0x00D1, 0x00D6, 0x00DC, 0x00E1, 0x00E0, 0x00E2, 0x00E4, 0x00E3,
    0x00E5, 0x00E7, 0x00E9, 0x00E8, 0x00EA, 0x00EB, 0x00ED, 0x00EC, 0x00EE, 0x00EF, 0x00F1, 0x00F3,
    0x00F2, 0x00F4, 0x00F6, 0x00F5, 0x00FA, 0x00F9, 0x00FB, 0x00FC, 0x2020, 0x00B0, 0x00A2, 0x00A3,
    0x00A7, 0x2022, 0x00B6, 0x00DF, 0x00AE, 0x00A9, 0x2122, 0x00B4, 0x00A8, 0x2260, 0x00C6, 0x00D8,
    0x221E, 0x00B1, 0x2264, 0x2265, 0x00A5, 0x00B5, 0x2202, 0x2211, 0x220F, 0x03C0, 0x222B, 0x00AA,
    0x00BA, 0x03A9, 0x00E6, 0x00F8, 0x00BF, 0x00A1, 0x00AC, 0x221A, 0x0192, 0x2248, 0x2206, 0x00AB,
    0x00BB, 0x2026, 0x00A0, 0x00C0, 0x00C3, 0x00D5, 0x0152, 0x0153, 0x2013, 0x2014, 0x201C, 0x201D,
    0x2018, 0x2019, 0x00F7, 0x25CA, 0x00FF, 0x0178, 0x2044, 0x20AC, 0x2039, 0x203A, 0xFB01, 0xFB02,
    0x2021, 0x00B7, 0x201A, 0x201E, 0x2030, 0x00C2, 0x00CA, 0x00C1, 0x00CB, 0x00C8, 0x00CD, 0x00CE,
    0x00CF, 0x00CC, 0x00D3, 0x00D4, 0xF8FF, 0x00D2, 0x00DA, 0x00DB, 0x00D9, 0x0131, 0x02C6, 0x02DC,
    0x00AF, 0x02D8, 0x02D9, 0x02DA, 0x00B8, 0x02DD, 0x02DB, 0x02C7,
];

/// Windows-1252 code points for bytes `0x80` through `0x9F`, `0` where the byte is undefined
///
/// Bytes `0xA0` and above match Latin-1.
const WINDOWS_1252: [u16; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC, 0x2122,
    0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

/// Text encodings a property list may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16BigEndian,
    Utf16LittleEndian,
    Utf32BigEndian,
    Utf32LittleEndian,
    MacRoman,
    Windows1252,
}

impl TextEncoding {
    /// Look up an encoding by its IANA name or a common alias, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::Ascii),
            "iso-8859-1" | "latin1" => Some(Self::Latin1),
            "utf-16" | "utf-16be" => Some(Self::Utf16BigEndian),
            "utf-16le" => Some(Self::Utf16LittleEndian),
            "utf-32" | "utf-32be" => Some(Self::Utf32BigEndian),
            "utf-32le" => Some(Self::Utf32LittleEndian),
            "macintosh" | "macroman" | "x-mac-roman" => Some(Self::MacRoman),
            "windows-1252" | "cp1252" => Some(Self::Windows1252),
            _ => None,
        }
    }

    /// Convert `bytes` in this encoding to a [`String`]
    ///
    /// Returns `None` if the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Ascii => bytes
                .iter()
                .map(|byte| byte.is_ascii().then_some(char::from(*byte)))
                .collect(),
            Self::Latin1 => Some(bytes.iter().map(|byte| char::from(*byte)).collect()),
            Self::Utf16BigEndian => decode_utf16(bytes, u16::from_be_bytes),
            Self::Utf16LittleEndian => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf32BigEndian => decode_utf32(bytes, u32::from_be_bytes),
            Self::Utf32LittleEndian => decode_utf32(bytes, u32::from_le_bytes),
            Self::MacRoman => bytes
                .iter()
                .map(|byte| match byte {
                    0..=0x7F => Some(char::from(*byte)),
                    _ => char::from_u32(u32::from(MAC_ROMAN[usize::from(byte - 0x80)])),
                })
                .collect(),
            Self::Windows1252 => bytes
                .iter()
                .map(|byte| match byte {
                    0x80..=0x9F => match WINDOWS_1252[usize::from(byte - 0x80)] {
                        0 => None,
                        point => char::from_u32(u32::from(point)),
                    },
                    _ => Some(char::from(*byte)),
                })
                .collect(),
        }
    }
}

impl Display for TextEncoding {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(fmt, "UTF-8"),
            Self::Ascii => write!(fmt, "US-ASCII"),
            Self::Latin1 => write!(fmt, "ISO-8859-1"),
            Self::Utf16BigEndian => write!(fmt, "UTF-16BE"),
            Self::Utf16LittleEndian => write!(fmt, "UTF-16LE"),
            Self::Utf32BigEndian => write!(fmt, "UTF-32BE"),
            Self::Utf32LittleEndian => write!(fmt, "UTF-32LE"),
            Self::MacRoman => write!(fmt, "macintosh"),
            Self::Windows1252 => write!(fmt, "windows-1252"),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|quad| char::from_u32(unit([quad[0], quad[1], quad[2], quad[3]])))
        .collect()
}

/// Determine the encoding of `stream` and the length of its byte order mark, if any
pub fn detect_encoding(stream: &[u8]) -> Result<(TextEncoding, usize), XmlPlistError> {
    let bom = match stream {
        [0x00, 0x00, 0xFE, 0xFF, ..] => Some((TextEncoding::Utf32BigEndian, 4)),
        [0xFF, 0xFE, 0x00, 0x00, ..] => Some((TextEncoding::Utf32LittleEndian, 4)),
        [0xFE, 0xFF, ..] => Some((TextEncoding::Utf16BigEndian, 2)),
        [0xFF, 0xFE, ..] => Some((TextEncoding::Utf16LittleEndian, 2)),
        [0xEF, 0xBB, 0xBF, ..] => Some((TextEncoding::Utf8, 3)),
        _ => None,
    };
    match bom {
        Some(found) => Ok(found),
        None => Ok((declared_encoding(stream)?, 0)),
    }
}

/// Read the `encoding` attribute of the XML declaration at the start of `stream`
fn declared_encoding(stream: &[u8]) -> Result<TextEncoding, XmlPlistError> {
    if !stream.starts_with(XML_DECLARATION) {
        return Ok(TextEncoding::Utf8);
    }

    let mut idx = XML_DECLARATION.len();
    while idx < stream.len() {
        // End of the declaration without an encoding attribute
        if matches!(stream[idx], b'?' | b'>') {
            return Ok(TextEncoding::Utf8);
        }
        let rest = &stream[idx..];
        if rest.len() <= ENCODING_ATTRIBUTE.len() {
            return Err(XmlPlistError::EndOfBufferInEncoding);
        }
        if rest.starts_with(ENCODING_ATTRIBUTE) {
            return quoted_encoding(&rest[ENCODING_ATTRIBUTE.len()..]);
        }
        idx += 1;
    }
    Ok(TextEncoding::Utf8)
}

fn quoted_encoding(stream: &[u8]) -> Result<TextEncoding, XmlPlistError> {
    let quote = match stream.first() {
        Some(quote @ (b'"' | b'\'')) => *quote,
        _ => return Ok(TextEncoding::Utf8),
    };
    let name_bytes: Vec<u8> = stream[1..]
        .iter()
        .take_while(|byte| **byte != quote)
        .copied()
        .collect();
    let name: String = name_bytes.iter().map(|byte| char::from(*byte)).collect();
    TextEncoding::from_name(&name).ok_or(XmlPlistError::UnknownEncoding(name))
}

/// Detect the encoding of `stream` and convert the text after any byte order mark to UTF-8
pub fn transcode(stream: &[u8]) -> Result<(String, TextEncoding), XmlPlistError> {
    let (encoding, bom_length) = detect_encoding(stream)?;
    let text = encoding
        .decode(&stream[bom_length..])
        .ok_or(XmlPlistError::CannotConvert)?;
    Ok((text, encoding))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::xml::XmlPlistError,
        formats::xml::encoding::{detect_encoding, transcode, TextEncoding},
    };

    #[test]
    fn can_detect_byte_order_marks() {
        assert_eq!(
            detect_encoding(&[0x00, 0x00, 0xFE, 0xFF, 0x00]),
            Ok((TextEncoding::Utf32BigEndian, 4))
        );
        assert_eq!(
            detect_encoding(&[0xFF, 0xFE, 0x00, 0x00]),
            Ok((TextEncoding::Utf32LittleEndian, 4))
        );
        assert_eq!(
            detect_encoding(&[0xFE, 0xFF, 0x00, 0x3C]),
            Ok((TextEncoding::Utf16BigEndian, 2))
        );
        assert_eq!(
            detect_encoding(&[0xFF, 0xFE, 0x3C, 0x00]),
            Ok((TextEncoding::Utf16LittleEndian, 2))
        );
        assert_eq!(
            detect_encoding(&[0xEF, 0xBB, 0xBF, b'<']),
            Ok((TextEncoding::Utf8, 3))
        );
    }

    #[test]
    fn can_default_to_utf8() {
        assert_eq!(detect_encoding(b"<plist/>"), Ok((TextEncoding::Utf8, 0)));
        assert_eq!(
            detect_encoding(b"<?xml version=\"1.0\"?><plist/>"),
            Ok((TextEncoding::Utf8, 0))
        );
        assert_eq!(detect_encoding(b""), Ok((TextEncoding::Utf8, 0)));
    }

    #[test]
    fn can_read_declared_encoding() {
        assert_eq!(
            detect_encoding(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><string/>"),
            Ok((TextEncoding::Latin1, 0))
        );
        assert_eq!(
            detect_encoding(b"<?xml version='1.0' encoding='MacRoman'?><string/>"),
            Ok((TextEncoding::MacRoman, 0))
        );
    }

    #[test]
    fn cant_read_unknown_encoding() {
        assert_eq!(
            detect_encoding(b"<?xml version=\"1.0\" encoding=\"ebcdic\"?><string/>"),
            Err(XmlPlistError::UnknownEncoding("ebcdic".to_string()))
        );
    }

    #[test]
    fn cant_read_truncated_declaration() {
        assert_eq!(
            detect_encoding(b"<?xml version"),
            Err(XmlPlistError::EndOfBufferInEncoding)
        );
    }

    #[test]
    fn can_transcode_single_byte_encodings() {
        assert_eq!(TextEncoding::Latin1.decode(&[0x63, 0xE9]).unwrap(), "cé");
        assert_eq!(TextEncoding::MacRoman.decode(&[0x8E, 0xA5]).unwrap(), "é•");
        assert_eq!(TextEncoding::Windows1252.decode(&[0x80]).unwrap(), "€");
        assert!(TextEncoding::Windows1252.decode(&[0x81]).is_none());
        assert!(TextEncoding::Ascii.decode(&[0xE9]).is_none());
    }

    #[test]
    fn can_transcode_after_bom() {
        let stream = [0xFF, 0xFE, 0x00, 0x00, 0x3C, 0x00, 0x00, 0x00];
        let (text, encoding) = transcode(&stream).unwrap();

        assert_eq!(text, "<");
        assert_eq!(encoding, TextEncoding::Utf32LittleEndian);
    }

    #[test]
    fn cant_transcode_invalid_utf8() {
        assert_eq!(transcode(&[b'<', 0xFF]), Err(XmlPlistError::CannotConvert));
    }

    #[test]
    fn cant_transcode_unpaired_surrogate() {
        assert_eq!(
            transcode(&[0xFE, 0xFF, 0xD8, 0x00]),
            Err(XmlPlistError::CannotConvert)
        );
    }
}
