/*!
 Errors that can happen when parsing OpenStep (ASCII) property list data.
*/

use std::fmt::{Display, Formatter, Result};

use crate::error::plist::{CodingPath, PlistError};

/// Errors that can happen when parsing OpenStep property list data
#[derive(Debug, PartialEq, Eq)]
pub enum OpenStepError {
    Empty,
    UnexpectedEof(&'static str),
    UnexpectedCharacter(u16, usize),
    MissingSemicolon(usize),
    ExpectedSeparator(usize),
    UnterminatedDictionary(usize),
    UnterminatedArray(usize),
    UnterminatedString(usize),
    UnterminatedEscape(usize),
    InvalidEscape(usize),
    UnterminatedComment(usize),
    UnevenData(usize),
    InvalidHex(usize),
    UnterminatedData(usize),
    JunkAfterPlist(usize),
    TooDeep(usize),
}

impl OpenStepError {
    /// Attach the location of the value being read when this error happened
    pub(crate) fn at(self, path: CodingPath) -> PlistError {
        PlistError::DataCorrupted(path, self.to_string())
    }
}

impl Display for OpenStepError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            OpenStepError::Empty => write!(fmt, "The given data was not a valid property list"),
            OpenStepError::UnexpectedEof(context) => {
                write!(fmt, "Unexpected EOF while parsing {context}")
            }
            OpenStepError::UnexpectedCharacter(ch, line) => {
                write!(fmt, "Unexpected character '0x{ch:x}' at line {line}")
            }
            OpenStepError::MissingSemicolon(line) => write!(fmt, "Missing ';' on line {line}"),
            OpenStepError::ExpectedSeparator(line) => {
                write!(fmt, "Expected ';' or '=' at line {line}")
            }
            OpenStepError::UnterminatedDictionary(line) => {
                write!(fmt, "Expected terminating '}}' for dictionary at line {line}")
            }
            OpenStepError::UnterminatedArray(line) => {
                write!(fmt, "Expected terminating ')' for array at line {line}")
            }
            OpenStepError::UnterminatedString(line) => {
                write!(fmt, "Unterminated quoted string starting on line {line}")
            }
            OpenStepError::UnterminatedEscape(line) => {
                write!(fmt, "Unterminated backslash sequence on line {line}")
            }
            OpenStepError::InvalidEscape(line) => write!(fmt, "Invalid character on line {line}"),
            OpenStepError::UnterminatedComment(line) => {
                write!(fmt, "Unterminated comment starting on line {line}")
            }
            OpenStepError::UnevenData(line) => {
                write!(fmt, "Malformed data byte group at line {line}; uneven length")
            }
            OpenStepError::InvalidHex(line) => {
                write!(fmt, "Malformed data byte group at line {line}; invalid hex")
            }
            OpenStepError::UnterminatedData(line) => {
                write!(fmt, "Expected terminating '>' for data at line {line}")
            }
            OpenStepError::JunkAfterPlist(line) => write!(fmt, "Junk after plist at line {line}"),
            OpenStepError::TooDeep(line) => {
                write!(fmt, "Too many nested arrays or dictionaries at line {line}")
            }
        }
    }
}
