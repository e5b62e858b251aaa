//! Back-ends: IR to tuning XML, and IR back to JPE text.
//!
//! Both are byte-for-byte deterministic, so generating twice from the same
//! IR yields identical output. XML generation only fails if its writer does.

pub mod jpe;
pub mod xml;

pub use jpe::serialize;
pub use xml::generate;

/// Generated XML documents keyed by artifact kind, in `ArtifactKind` order.
pub type GeneratedArtifacts = crate::frontend::xml::XmlDocuments;
