/*!
 Errors that can happen when parsing XML property list data.
*/

use std::fmt::{Display, Formatter, Result};

use crate::error::plist::{CodingPath, PlistError};

/// Errors that can happen when parsing XML property list data
#[derive(Debug, PartialEq, Eq)]
pub enum XmlPlistError {
    UnexpectedEndOfFile(Option<&'static str>),
    MalformedTag(usize),
    UnexpectedEmptyTag(&'static str, usize),
    UnexpectedCharacter(char, usize, &'static str),
    UnknownTag(String, usize),
    MismatchedCloseTag(&'static str, usize),
    UnknownEscape(usize),
    InvalidCharacterReference(usize, &'static str),
    UnterminatedComment(usize),
    InvalidDocumentType(usize),
    InvalidCdata(usize),
    NonKeyInDictionary(usize),
    MissingValue(usize),
    ExtraElement(usize),
    JunkAfterPlist(usize),
    NoContent,
    InvalidInteger(usize),
    InvalidReal(usize),
    InvalidDate(usize),
    InvalidData(usize),
    TooDeep(usize),
    EndOfBufferInEncoding,
    UnknownEncoding(String),
    CannotConvert,
}

impl XmlPlistError {
    /// Attach the location of the value being read when this error happened
    pub(crate) fn at(self, path: CodingPath) -> PlistError {
        match self {
            XmlPlistError::MissingValue(_) => PlistError::ValueNotFound(path, self.to_string()),
            _ => PlistError::DataCorrupted(path, self.to_string()),
        }
    }

    /// Whether the text of the document could not be decoded at all, as opposed to
    /// decoded text that does not follow the XML property list grammar
    pub(crate) fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            XmlPlistError::EndOfBufferInEncoding
                | XmlPlistError::UnknownEncoding(_)
                | XmlPlistError::CannotConvert
        )
    }
}

impl Display for XmlPlistError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            XmlPlistError::UnexpectedEndOfFile(context) => match context {
                Some(context) => write!(fmt, "Encountered unexpected EOF {context}"),
                None => write!(fmt, "Encountered unexpected EOF"),
            },
            XmlPlistError::MalformedTag(line) => write!(fmt, "Malformed tag on line {line}"),
            XmlPlistError::UnexpectedEmptyTag(tag, line) => {
                write!(fmt, "Encountered empty <{tag}> on line {line}")
            }
            XmlPlistError::UnexpectedCharacter(ch, line, context) => {
                write!(
                    fmt,
                    "Encountered unexpected character {ch} on line {line} {context}"
                )
            }
            XmlPlistError::UnknownTag(tag, line) => {
                write!(fmt, "Encountered unknown tag {tag} on line {line}")
            }
            XmlPlistError::MismatchedCloseTag(tag, line) => {
                write!(fmt, "Close tag on line {line} does not match open tag {tag}")
            }
            XmlPlistError::UnknownEscape(line) => {
                write!(
                    fmt,
                    "Encountered unknown ampersand-escape sequence at line {line}"
                )
            }
            XmlPlistError::InvalidCharacterReference(line, why) => {
                write!(
                    fmt,
                    "Encountered unparseable Unicode sequence at line {line} ({why})"
                )
            }
            XmlPlistError::UnterminatedComment(line) => {
                write!(fmt, "Unterminated comment started on line {line}")
            }
            XmlPlistError::InvalidDocumentType(line) => {
                write!(fmt, "Malformed DTD on line {line}")
            }
            XmlPlistError::InvalidCdata(line) => {
                write!(fmt, "Encountered improper CDATA opening at line {line}")
            }
            XmlPlistError::NonKeyInDictionary(line) => {
                write!(fmt, "Non key string used as key in dictionary on line {line}")
            }
            XmlPlistError::MissingValue(line) => {
                write!(fmt, "Value missing for key inside <dict> at line {line}")
            }
            XmlPlistError::ExtraElement(line) => write!(
                fmt,
                "Encountered unexpected element at line {line} (plist can only include one object)"
            ),
            XmlPlistError::JunkAfterPlist(line) => write!(fmt, "Junk after plist at line {line}"),
            XmlPlistError::NoContent => write!(fmt, "No XML content found"),
            XmlPlistError::InvalidInteger(line) => {
                write!(fmt, "Invalid <integer> value on line {line}")
            }
            XmlPlistError::InvalidReal(line) => {
                write!(fmt, "Encountered misformatted real on line {line}")
            }
            XmlPlistError::InvalidDate(line) => {
                write!(fmt, "Could not interpret <date> at line {line}")
            }
            XmlPlistError::InvalidData(line) => {
                write!(fmt, "Could not interpret <data> at line {line}")
            }
            XmlPlistError::TooDeep(line) => {
                write!(fmt, "Too many nested arrays or dictionaries at line {line}")
            }
            XmlPlistError::EndOfBufferInEncoding => {
                write!(fmt, "End of buffer while looking for encoding name")
            }
            XmlPlistError::UnknownEncoding(name) => {
                write!(fmt, "Encountered unknown encoding {name}")
            }
            XmlPlistError::CannotConvert => write!(fmt, "Cannot convert input to UTF-16"),
        }
    }
}
