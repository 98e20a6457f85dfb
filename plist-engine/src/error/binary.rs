/*!
 Errors that can happen when parsing binary property list data.
*/

use std::{
    array::TryFromSliceError,
    fmt::{Display, Formatter, Result},
    string::FromUtf16Error,
};

use crate::error::plist::{CodingPath, PlistError};

/// Errors that can happen when parsing binary property list data
#[derive(Debug)]
pub enum BinaryPlistError {
    OutOfBounds(usize, usize),
    InvalidHeader,
    InvalidTrailer(&'static str),
    InvalidOffset(usize, u64),
    InvalidReference(u64, usize),
    InvalidMarker(u8),
    InvalidCount(usize),
    InvalidDictionaryKey(usize),
    UnexpectedNull,
    ReferenceCycle(usize),
    TooDeep(usize),
    TooManyObjects(usize),
    SliceError(TryFromSliceError),
    StringParseError(FromUtf16Error),
}

impl BinaryPlistError {
    /// Attach the location of the value being read when this error happened
    pub(crate) fn at(self, path: CodingPath) -> PlistError {
        PlistError::DataCorrupted(path, self.to_string())
    }
}

impl Display for BinaryPlistError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            BinaryPlistError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            BinaryPlistError::InvalidHeader => write!(fmt, "Invalid binary property list header!"),
            BinaryPlistError::InvalidTrailer(why) => {
                write!(fmt, "Invalid binary property list trailer: {why}")
            }
            BinaryPlistError::InvalidOffset(idx, offset) => {
                write!(fmt, "Object {idx} has an invalid offset {offset:x}")
            }
            BinaryPlistError::InvalidReference(reference, count) => {
                write!(
                    fmt,
                    "Object reference {reference} is outside of the {count} objects in the table"
                )
            }
            BinaryPlistError::InvalidMarker(marker) => {
                write!(fmt, "Unknown object type marker {marker:02x}")
            }
            BinaryPlistError::InvalidCount(offset) => {
                write!(fmt, "Invalid object count for object at {offset:x}")
            }
            BinaryPlistError::InvalidDictionaryKey(idx) => {
                write!(fmt, "Invalid dictionary key: object {idx} is not a string")
            }
            BinaryPlistError::UnexpectedNull => write!(fmt, "Unexpected null in property list"),
            BinaryPlistError::ReferenceCycle(idx) => {
                write!(fmt, "Object reference cycle through object {idx}")
            }
            BinaryPlistError::TooDeep(depth) => {
                write!(fmt, "Too many nested arrays or dictionaries (more than {depth})")
            }
            BinaryPlistError::TooManyObjects(limit) => {
                write!(fmt, "Object references expand to more than {limit} values")
            }
            BinaryPlistError::SliceError(why) => {
                write!(fmt, "Unable to slice source stream: {why}")
            }
            BinaryPlistError::StringParseError(why) => {
                write!(fmt, "Invalid string: {why}")
            }
        }
    }
}
