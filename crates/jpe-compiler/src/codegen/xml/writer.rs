//! Indented XML writer over `quick_xml::Writer`.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Builds an XML document with two-space indentation. Attributes are
/// written in the order given.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts a document with the XML declaration.
    pub fn new() -> io::Result<Self> {
        let mut inner = Writer::new_with_indent(Vec::new(), b' ', 2);
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(Self { inner })
    }

    fn start_tag<'a>(name: &'a str, attributes: &[(&str, String)]) -> BytesStart<'a> {
        let mut tag = BytesStart::new(name);
        for (key, value) in attributes {
            tag.push_attribute((*key, value.as_str()));
        }
        tag
    }

    /// `<name a="..">` and descends.
    pub fn open(&mut self, name: &str, attributes: &[(&str, String)]) -> io::Result<()> {
        self.inner.write_event(Event::Start(Self::start_tag(name, attributes)))
    }

    /// `</name>` one level up.
    pub fn close(&mut self, name: &str) -> io::Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))
    }

    /// `<name a=".."/>`
    pub fn empty(&mut self, name: &str, attributes: &[(&str, String)]) -> io::Result<()> {
        self.inner.write_event(Event::Empty(Self::start_tag(name, attributes)))
    }

    /// `<name a="..">text</name>` on one line.
    pub fn text(&mut self, name: &str, attributes: &[(&str, String)], text: &str) -> io::Result<()> {
        self.open(name, attributes)?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// The document bytes, ending in a newline.
    pub fn finish(self) -> Vec<u8> {
        let mut out = self.inner.into_inner();
        out.push(b'\n');
        out
    }
}
