pub mod binary;
pub mod exporter;
pub mod json;
pub mod txt;
pub mod xml;

pub use self::{binary::Binary, exporter::Exporter, json::JSON, txt::TXT, xml::XML};
