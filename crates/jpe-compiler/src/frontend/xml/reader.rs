//! A small element tree over `quick_xml` events.
//!
//! Tuning documents are tiny, so reading the whole document into a tree
//! first keeps the IR mapping free of event-loop bookkeeping.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::diagnostic::{line_starts, position_at, Position};

/// One XML element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated text and CDATA content, untrimmed.
    pub text: String,
    /// Position of the opening `<`.
    pub position: Position,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Why a document could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub message: String,
    pub position: Position,
}

/// Reads `bytes` into an element tree rooted at the document element.
pub fn read_document(bytes: &[u8]) -> Result<Element, XmlError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        let lossy = String::from_utf8_lossy(bytes);
        XmlError {
            message: format!("document is not valid UTF-8: {}", e),
            position: position_at(&lossy, e.valid_up_to(), &line_starts(&lossy)),
        }
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let starts = line_starts(text);

    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError {
            message: e.to_string(),
            position: position_at(text, reader.buffer_position() as usize, &starts),
        })?;
        let end = reader.buffer_position() as usize;
        let tag_position = || position_at(text, text[..end].rfind('<').unwrap_or(0), &starts);

        match event {
            Event::Start(start) => {
                stack.push(open_element(&start, tag_position())?);
            }
            Event::Empty(start) => {
                let element = open_element(&start, tag_position())?;
                attach(element, &mut stack, &mut root, tag_position())?;
            }
            Event::End(_) => {
                // quick-xml has already checked that the names match.
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root, tag_position())?;
                }
            }
            Event::Text(content) => {
                let content = content.unescape().map_err(|e| XmlError {
                    message: e.to_string(),
                    position: position_at(text, end, &starts),
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&content),
                    None if content.trim().is_empty() => {}
                    None => {
                        return Err(XmlError {
                            message: "text outside of the root element".to_string(),
                            position: position_at(text, end, &starts),
                        })
                    }
                }
            }
            Event::CData(content) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError {
            message: format!("element <{}> is never closed", open.name),
            position: open.position,
        });
    }

    root.ok_or_else(|| XmlError {
        message: "document has no root element".to_string(),
        position: Position::new(1, 1),
    })
}

/// Returns the root element name without reading the whole document.
pub fn root_name(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event().ok()? {
            Event::Start(start) | Event::Empty(start) => {
                return Some(String::from_utf8_lossy(start.name().as_ref()).into_owned())
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn open_element(start: &BytesStart<'_>, position: Position) -> Result<Element, XmlError> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError {
            message: e.to_string(),
            position,
        })?;
        let value = attribute.unescape_value().map_err(|e| XmlError {
            message: e.to_string(),
            position,
        })?;
        attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
        position,
    })
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    position: Position,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XmlError {
                message: format!("second root element <{}>", element.name),
                position,
            })
        }
    }
    Ok(())
}
