//! Diagnostic codes and their classification.

use serde::{Serialize, Serializer};

use super::Severity;

/// The four error families a diagnostic can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed JPE line or section.
    Syntax,
    /// Validator rule violation.
    Semantic,
    /// Malformed XML during reverse parsing.
    Format,
    /// Bad project metadata or packaging configuration.
    Config,
}

/// Every diagnostic the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // =========================================================================
    // JPE syntax
    // =========================================================================
    UnknownSection,
    OrphanEnd,
    LineOutsideSection,
    MalformedLine,
    UnterminatedEntry,
    MissingRequiredKey,
    InvalidValue,
    DuplicateProjectBlock,
    UnknownKey,
    DuplicateKey,

    // =========================================================================
    // XML format
    // =========================================================================
    MalformedXml,
    UnexpectedRoot,
    MissingAttribute,
    InvalidAttribute,
    UnknownElement,
    UnknownAttribute,

    // =========================================================================
    // Semantic
    // =========================================================================
    DuplicateId,
    InvalidIdentifier,
    DanglingReference,
    MissingLocalization,
    MissingParticipant,
    EmptyEnum,
    DuplicateEnumOption,

    // =========================================================================
    // Config
    // =========================================================================
    MissingProjectBlock,
    InvalidVersion,
    InvalidProjectId,
    ArtifactWriteFailed,
}

impl DiagnosticCode {
    /// Stable dotted name, e.g. `jpe::syntax::unknown_section`.
    pub fn as_str(&self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            UnknownSection => "jpe::syntax::unknown_section",
            OrphanEnd => "jpe::syntax::orphan_end",
            LineOutsideSection => "jpe::syntax::line_outside_section",
            MalformedLine => "jpe::syntax::malformed_line",
            UnterminatedEntry => "jpe::syntax::unterminated_entry",
            MissingRequiredKey => "jpe::syntax::missing_required_key",
            InvalidValue => "jpe::syntax::invalid_value",
            DuplicateProjectBlock => "jpe::syntax::duplicate_project_block",
            UnknownKey => "jpe::syntax::unknown_key",
            DuplicateKey => "jpe::syntax::duplicate_key",
            MalformedXml => "jpe::format::malformed_xml",
            UnexpectedRoot => "jpe::format::unexpected_root",
            MissingAttribute => "jpe::format::missing_attribute",
            InvalidAttribute => "jpe::format::invalid_attribute",
            UnknownElement => "jpe::format::unknown_element",
            UnknownAttribute => "jpe::format::unknown_attribute",
            DuplicateId => "jpe::semantic::duplicate_id",
            InvalidIdentifier => "jpe::semantic::invalid_identifier",
            DanglingReference => "jpe::semantic::dangling_reference",
            MissingLocalization => "jpe::semantic::missing_localization",
            MissingParticipant => "jpe::semantic::missing_participant",
            EmptyEnum => "jpe::semantic::empty_enum",
            DuplicateEnumOption => "jpe::semantic::duplicate_enum_option",
            MissingProjectBlock => "jpe::config::missing_project_block",
            InvalidVersion => "jpe::config::invalid_version",
            InvalidProjectId => "jpe::config::invalid_project_id",
            ArtifactWriteFailed => "jpe::config::artifact_write_failed",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use DiagnosticCode::*;
        match self {
            UnknownSection | OrphanEnd | LineOutsideSection | MalformedLine
            | UnterminatedEntry | MissingRequiredKey | InvalidValue
            | DuplicateProjectBlock | UnknownKey | DuplicateKey => ErrorKind::Syntax,
            MalformedXml | UnexpectedRoot | MissingAttribute | InvalidAttribute
            | UnknownElement | UnknownAttribute => ErrorKind::Format,
            DuplicateId | InvalidIdentifier | DanglingReference | MissingLocalization
            | MissingParticipant | EmptyEnum | DuplicateEnumOption => ErrorKind::Semantic,
            MissingProjectBlock | InvalidVersion | InvalidProjectId
            | ArtifactWriteFailed => ErrorKind::Config,
        }
    }

    /// Severity used when the code is reported.
    pub fn default_severity(&self) -> Severity {
        use DiagnosticCode::*;
        match self {
            UnknownKey | DuplicateKey | UnknownElement | UnknownAttribute
            | MissingLocalization | MissingProjectBlock => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prefix_matches_kind() {
        let codes = [
            DiagnosticCode::UnknownSection,
            DiagnosticCode::MalformedXml,
            DiagnosticCode::DanglingReference,
            DiagnosticCode::InvalidVersion,
        ];
        for code in codes {
            let family = match code.kind() {
                ErrorKind::Syntax => "syntax",
                ErrorKind::Semantic => "semantic",
                ErrorKind::Format => "format",
                ErrorKind::Config => "config",
            };
            assert!(code.as_str().starts_with(&format!("jpe::{}::", family)));
        }
    }

    #[test]
    fn test_forward_compatible_codes_are_warnings() {
        assert_eq!(DiagnosticCode::UnknownKey.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::UnknownElement.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::OrphanEnd.default_severity(), Severity::Error);
    }
}
