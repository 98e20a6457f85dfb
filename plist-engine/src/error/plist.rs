/*!
 The error taxonomy shared by every property list format.
*/

use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
};

/// A single step from a container into one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodingKey {
    /// A position inside of an array
    Index(usize),
    /// A key inside of a dictionary
    Key(String),
}

impl Display for CodingKey {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            CodingKey::Index(idx) => write!(fmt, "[{idx}]"),
            CodingKey::Key(key) => write!(fmt, ".{key}"),
        }
    }
}

impl From<usize> for CodingKey {
    fn from(idx: usize) -> Self {
        CodingKey::Index(idx)
    }
}

impl From<&str> for CodingKey {
    fn from(key: &str) -> Self {
        CodingKey::Key(key.to_string())
    }
}

impl From<String> for CodingKey {
    fn from(key: String) -> Self {
        CodingKey::Key(key)
    }
}

/// The location of a value, as the steps taken from the root of the tree to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath(Vec<CodingKey>);

impl CodingPath {
    /// The path of the top-level value
    pub fn root() -> Self {
        Self::default()
    }

    /// Descend into a child of the current value
    pub fn push(&mut self, key: impl Into<CodingKey>) {
        self.0.push(key.into());
    }

    /// Return to the parent of the current value
    pub fn pop(&mut self) -> Option<CodingKey> {
        self.0.pop()
    }

    /// Create a new path that descends one step further than this one
    pub fn appending(&self, key: impl Into<CodingKey>) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    pub fn keys(&self) -> &[CodingKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<CodingKey>> for CodingPath {
    fn from(keys: Vec<CodingKey>) -> Self {
        Self(keys)
    }
}

impl Display for CodingPath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        write!(fmt, "root")?;
        self.0.iter().try_for_each(|key| write!(fmt, "{key}"))
    }
}

/// Errors that can happen when reading, writing, or coercing property list values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistError {
    /// The input is not a structurally valid property list
    DataCorrupted(CodingPath, String),
    /// A value that was required is absent
    ValueNotFound(CodingPath, String),
    /// A value exists but cannot be represented as the requested type
    TypeMismatch(CodingPath, String),
    /// A value cannot be written in the requested format
    InvalidValue(CodingPath, String),
    /// The requested operation is not available for the requested format
    Unsupported(String),
}

impl PlistError {
    /// Build a [`PlistError::DataCorrupted`] for the top-level value
    pub fn data_corrupted(why: impl Into<String>) -> Self {
        PlistError::DataCorrupted(CodingPath::root(), why.into())
    }

    /// Build a [`PlistError::TypeMismatch`] for the top-level value
    pub fn type_mismatch(why: impl Into<String>) -> Self {
        PlistError::TypeMismatch(CodingPath::root(), why.into())
    }

    /// The location of the value that caused the error, if the error is tied to a value
    pub fn path(&self) -> Option<&CodingPath> {
        match self {
            PlistError::DataCorrupted(path, _)
            | PlistError::ValueNotFound(path, _)
            | PlistError::TypeMismatch(path, _)
            | PlistError::InvalidValue(path, _) => Some(path),
            PlistError::Unsupported(_) => None,
        }
    }

    /// The human readable description of the error
    pub fn message(&self) -> &str {
        match self {
            PlistError::DataCorrupted(_, why)
            | PlistError::ValueNotFound(_, why)
            | PlistError::TypeMismatch(_, why)
            | PlistError::InvalidValue(_, why)
            | PlistError::Unsupported(why) => why,
        }
    }

    /// Replace the location attached to this error
    pub fn with_path(self, path: CodingPath) -> Self {
        match self {
            PlistError::DataCorrupted(_, why) => PlistError::DataCorrupted(path, why),
            PlistError::ValueNotFound(_, why) => PlistError::ValueNotFound(path, why),
            PlistError::TypeMismatch(_, why) => PlistError::TypeMismatch(path, why),
            PlistError::InvalidValue(_, why) => PlistError::InvalidValue(path, why),
            PlistError::Unsupported(why) => PlistError::Unsupported(why),
        }
    }

    pub fn is_data_corrupted(&self) -> bool {
        matches!(self, PlistError::DataCorrupted(..))
    }

    pub fn is_value_not_found(&self) -> bool {
        matches!(self, PlistError::ValueNotFound(..))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, PlistError::TypeMismatch(..))
    }
}

impl Display for PlistError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            PlistError::DataCorrupted(path, why) => {
                write!(fmt, "Data corrupted at {path}: {why}")
            }
            PlistError::ValueNotFound(path, why) => {
                write!(fmt, "Value not found at {path}: {why}")
            }
            PlistError::TypeMismatch(path, why) => write!(fmt, "Type mismatch at {path}: {why}"),
            PlistError::InvalidValue(path, why) => write!(fmt, "Invalid value at {path}: {why}"),
            PlistError::Unsupported(why) => write!(fmt, "Unsupported operation: {why}"),
        }
    }
}

impl Error for PlistError {}
