use plist_engine::Value;

use crate::app::error::RuntimeError;

/// Defines behavior for rendering a decoded property list in an export format
pub trait Exporter {
    /// Render the whole tree as the bytes of the exported document
    fn export(&self, value: &Value) -> Result<Vec<u8>, RuntimeError>;
}
