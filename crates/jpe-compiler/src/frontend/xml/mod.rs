//! Tuning XML front-end: reads generated documents back into IR.

mod reader;
mod to_ir;

pub use reader::{read_document, root_name, Element, XmlError};
pub use to_ir::{parse_documents, XmlDocuments};

use super::{Frontend, ParseOutput};
use crate::ir::ArtifactKind;

/// Tuning XML front-end implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlFrontend;

impl XmlFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for XmlFrontend {
    type Input = XmlDocuments;

    fn language(&self) -> &str {
        "xml"
    }

    fn parse(&self, input: &XmlDocuments) -> ParseOutput {
        parse_documents(input)
    }
}

/// Works out which artifact a file holds: by file name suffix first, then
/// by its root element.
pub fn detect_kind(file_name: &str, bytes: &[u8]) -> Option<ArtifactKind> {
    ArtifactKind::from_file_name(file_name)
        .or_else(|| root_name(bytes).and_then(|name| ArtifactKind::from_name(&name)))
}
