//! Terminal rendering of compiler diagnostics through miette.

use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, SourceSpan};

use jpe_compiler::{Diagnostic, Severity};

/// Turns a diagnostic into a report, labelled against `source` when the
/// diagnostic carries a position.
pub fn report(diagnostic: &Diagnostic, name: &str, source: Option<&str>) -> Report {
    let mut rendered = MietteDiagnostic::new(diagnostic.message.clone())
        .with_code(diagnostic.code.as_str())
        .with_severity(severity(diagnostic.severity));
    if let Some(help) = &diagnostic.help {
        rendered = rendered.with_help(help.clone());
    }

    match (diagnostic.position, source) {
        (Some(position), Some(source)) => {
            let span = line_span(source, position.offset_in(source));
            let label = match diagnostic.artifact {
                Some(kind) => format!("in {}", kind),
                None => "here".to_string(),
            };
            rendered = rendered.with_label(LabeledSpan::at(span, label));
            Report::new(rendered).with_source_code(NamedSource::new(name, source.to_string()))
        }
        _ => Report::new(rendered),
    }
}

/// Prints every diagnostic to stderr.
pub fn print_all(diagnostics: &[Diagnostic], name: &str, source: Option<&str>) {
    for diagnostic in diagnostics {
        eprintln!("{:?}", report(diagnostic, name, source));
    }
}

fn severity(severity: Severity) -> miette::Severity {
    match severity {
        Severity::Error => miette::Severity::Error,
        Severity::Warning => miette::Severity::Warning,
        Severity::Info => miette::Severity::Advice,
    }
}

/// The rest of the line starting at `offset`, without the line break.
fn line_span(source: &str, offset: usize) -> SourceSpan {
    let rest = &source[offset..];
    let len = rest.find(|c: char| c == '\r' || c == '\n').unwrap_or(rest.len());
    (offset, len).into()
}
