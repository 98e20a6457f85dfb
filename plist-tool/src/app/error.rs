/*!
Errors that can happen during the application's runtime
*/

use std::{
    fmt::{Display, Formatter, Result},
    io::Error as IoError,
    path::PathBuf,
};

use plist_engine::PlistError;

/// Errors that can happen during the application's runtime
#[derive(Debug)]
pub enum RuntimeError {
    InvalidOptions(String),
    FileError(IoError, PathBuf),
    PlistError(PlistError),
    ExportError(String),
}

impl Display for RuntimeError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            RuntimeError::InvalidOptions(why) => write!(fmt, "Invalid options!\n{why}"),
            RuntimeError::FileError(why, path) => write!(fmt, "{why}: {path:?}"),
            RuntimeError::PlistError(why) => write!(fmt, "{why}"),
            RuntimeError::ExportError(why) => write!(fmt, "Unable to export: {why}"),
        }
    }
}

impl From<PlistError> for RuntimeError {
    fn from(why: PlistError) -> Self {
        RuntimeError::PlistError(why)
    }
}
