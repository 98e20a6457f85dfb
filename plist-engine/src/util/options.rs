/*!
 Limits that bound the work a decoder will do for a single document.
*/

use crate::error::plist::PlistError;

/// The deepest nesting of arrays and dictionaries a decoder accepts by default
pub const DEFAULT_MAX_DEPTH: usize = 512;
/// The most values a binary decoder will materialize from shared object references by default
pub const DEFAULT_MAX_NODES: usize = 1 << 24;

/// Options that control how property list data is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// The deepest nesting of containers that is accepted
    pub max_depth: usize,
    /// The most values that shared binary object references may expand into
    pub max_nodes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Change the nesting limit, rejecting a limit that would refuse every document
    pub fn set_max_depth(&mut self, max_depth: usize) -> Result<(), PlistError> {
        if max_depth == 0 {
            return Err(PlistError::InvalidValue(
                Default::default(),
                "Maximum depth must be at least 1".to_string(),
            ));
        }
        self.max_depth = max_depth;
        Ok(())
    }
}
