//! Value syntax shared by JPE reader and writer.
//!
//! Structured values are comma separated `name:value` pairs:
//!
//! ```text
//! participant: role:initiator, description:"Hugs, warmly"
//! ```
//!
//! A value may be double-quoted to contain `,` or `:`. Single-valued text
//! keys use the same quoting when the text has surrounding whitespace, a line
//! break or a leading quote:
//!
//! ```text
//! text: "Line one\nLine two"
//! ```
//!
//! Inside quotes the escapes are `\"`, `\\`, `\n`, `\r` and `\t`.

/// One `name:value` component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
    /// Whether the value was written in quotes.
    pub quoted: bool,
}

/// Splits a structured value into pairs.
pub fn split_pairs(input: &str) -> Result<Vec<Pair>, String> {
    let mut pairs = Vec::new();
    for item in split_top_level(input, ',')? {
        if item.trim().is_empty() {
            continue;
        }
        let (key, raw_value) = split_once_top_level(item, ':')
            .ok_or_else(|| format!("expected `name:value`, found `{}`", item.trim()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing name before `:` in `{}`", item.trim()));
        }
        let (value, quoted) = unquote(raw_value.trim())?;
        pairs.push(Pair {
            key: key.to_string(),
            value,
            quoted,
        });
    }
    Ok(pairs)
}

/// Splits on `sep` outside of double quotes.
fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(format!("unterminated quote in `{}`", input.trim()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn split_once_top_level(input: &str, sep: char) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => return Some((&input[..i], &input[i + c.len_utf8()..])),
            _ => {}
        }
    }
    None
}

/// Strips surrounding quotes and resolves escapes. Unquoted text is literal.
fn unquote(raw: &str) -> Result<(String, bool), String> {
    let Some(body) = raw.strip_prefix('"') else {
        return Ok((raw.to_string(), false));
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return Err(format!("unterminated quote in `{}`", raw)),
            },
            '"' => {
                let rest: String = chars.collect();
                if !rest.trim().is_empty() {
                    return Err(format!("unexpected `{}` after quoted value", rest.trim()));
                }
                return Ok((out, true));
            }
            c => out.push(c),
        }
    }
    Err(format!("unterminated quote in `{}`", raw))
}

/// Renders one component, quoting it when it would not survive `split_pairs`.
///
/// `force` quotes regardless, e.g. for text enum values that look numeric.
pub fn quote(value: &str, force: bool) -> String {
    let needs_quotes = force || value.contains([',', ':', '"']) || needs_text_quotes(value);
    if needs_quotes {
        escaped(value)
    } else {
        value.to_string()
    }
}

/// Reads a single-valued text key: quoted text is unescaped, anything else
/// is taken as written.
pub fn parse_text(value: &str) -> Result<String, String> {
    if value.starts_with('"') {
        unquote(value).map(|(text, _)| text)
    } else {
        Ok(value.to_string())
    }
}

/// Renders a single-valued text key so that [`parse_text`] gives it back.
pub fn quote_text(value: &str) -> String {
    if value.starts_with('"') || needs_text_quotes(value) {
        escaped(value)
    } else {
        value.to_string()
    }
}

/// Text the line reader would trim or split.
fn needs_text_quotes(value: &str) -> bool {
    value.contains(['\n', '\r'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
}

fn escaped(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Joins pairs back into a structured value.
pub fn join_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> String {
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses the boolean spellings JPE accepts.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("expected true or false, found `{}`", value)),
    }
}
