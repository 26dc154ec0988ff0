//! Owned element tree for building output documents

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

use crate::error::RdfXmlResult;

/// Element under construction; names are already qualified (`prefix:local`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Child node of an [`Element`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped on output
    Text(String),
    /// Well-formed markup written verbatim
    Markup(String),
}

impl Element {
    /// Create an element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_markup(&mut self, markup: impl Into<String>) {
        self.children.push(Node::Markup(markup.into()));
    }

    /// Child elements in order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Serialize the tree as a complete document
    pub fn to_xml_string(&self, options: &SerializeOptions) -> RdfXmlResult<String> {
        let mut out = Vec::new();
        self.write_document(&mut out, options)?;
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Serialize the tree as a complete document into a writer
    pub fn write_document<W: Write>(&self, mut out: W, options: &SerializeOptions) -> RdfXmlResult<()> {
        if options.declaration {
            writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        }
        if let Some(href) = &options.stylesheet {
            writeln!(
                out,
                r#"<?xml-stylesheet type="text/xsl" href="{}"?>"#,
                escape(href.as_str())
            )?;
        }
        let mut writer = if options.indent > 0 {
            Writer::new_with_indent(&mut out, b' ', options.indent)
        } else {
            Writer::new(&mut out)
        };
        write_element(&mut writer, self).map_err(map_err)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Output options for [`Element::to_xml_string`]
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Spaces per nesting level, 0 for compact output
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
    /// `xml-stylesheet` processing instruction written after the declaration
    pub stylesheet: Option<String>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
            stylesheet: None,
        }
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::Markup(markup) => {
                writer.write_event(Event::Text(BytesText::from_escaped(markup.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}

fn map_err(error: quick_xml::Error) -> io::Error {
    if let quick_xml::Error::Io(error) = error {
        io::Error::new(error.kind(), error.to_string())
    } else {
        io::Error::new(io::ErrorKind::Other, error)
    }
}
