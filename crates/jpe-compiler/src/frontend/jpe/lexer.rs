//! Line classification for JPE source.
//!
//! JPE is line oriented: every physical line is one of a handful of shapes,
//! so lexing is a single pass that never fails.

use crate::diagnostic::Position;

/// The shape of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// `# ...` or `// ...`
    Comment,
    /// `[Name]`, with the name trimmed.
    Section(&'a str),
    /// A literal `end`.
    End,
    /// `key: value`, with the key normalised to lower snake case.
    KeyValue { key: String, value: &'a str },
    /// Anything else.
    Malformed(&'a str),
}

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Position of the first non-blank character.
    pub position: Position,
    pub kind: LineKind<'a>,
}

/// Classifies every line of `source`.
pub fn lex(source: &str) -> impl Iterator<Item = Line<'_>> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    source.lines().enumerate().map(|(index, raw)| {
        let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
        Line {
            position: Position::new(index + 1, indent + 1),
            kind: classify(raw.trim()),
        }
    })
}

fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') || line.starts_with("//") {
        return LineKind::Comment;
    }
    if line.eq_ignore_ascii_case("end") {
        return LineKind::End;
    }
    if let Some(inner) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return LineKind::Section(inner.trim());
    }
    match line.split_once(':') {
        Some((key, value)) if is_key(key) => LineKind::KeyValue {
            key: normalize_key(key),
            value: value.trim(),
        },
        _ => LineKind::Malformed(line),
    }
}

fn is_key(raw: &str) -> bool {
    let raw = raw.trim();
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ')
}

/// `Display Name` / `display-name` / `DISPLAY_NAME` → `display_name`.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_line_shapes() {
        let source = indoc! {"
            [Buffs]
            # a comment
              id: happy_buff

            Display Name: STR_HAPPY
            just words
            END
        "};
        let kinds: Vec<LineKind> = lex(source).map(|line| line.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Section("Buffs"),
                LineKind::Comment,
                LineKind::KeyValue { key: "id".to_string(), value: "happy_buff" },
                LineKind::Blank,
                LineKind::KeyValue { key: "display_name".to_string(), value: "STR_HAPPY" },
                LineKind::Malformed("just words"),
                LineKind::End,
            ]
        );
    }

    #[test]
    fn test_positions_skip_indentation() {
        let lines: Vec<Line> = lex("[Traits]\n    id: x\n").collect();
        assert_eq!(lines[0].position, Position::new(1, 1));
        assert_eq!(lines[1].position, Position::new(2, 5));
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let lines: Vec<Line> = lex("text: Ratio 1:2").collect();
        assert_eq!(
            lines[0].kind,
            LineKind::KeyValue { key: "text".to_string(), value: "Ratio 1:2" }
        );
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let lines: Vec<Line> = lex("\u{feff}[Project]").collect();
        assert_eq!(lines[0].kind, LineKind::Section("Project"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Display Name"), "display_name");
        assert_eq!(normalize_key("instance-id"), "instance_id");
        assert_eq!(normalize_key(" AUTONOMY_DISABLED "), "autonomy_disabled");
    }
}
