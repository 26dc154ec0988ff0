//! Arena-backed XML document parsed with quick-xml
//!
//! Namespaces are resolved while parsing, and internal DOCTYPE `<!ENTITY>`
//! declarations are expanded in text and attribute values.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;
use std::ptr;
use std::str::FromStr;

use super::{QualifiedName, XmlAttribute, XmlContent, XmlNode};
use crate::error::{RdfXmlError, RdfXmlResult};
use crate::rdf::vocab::XML_NS;

/// Parsed XML document
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<ElementData>,
    root: Option<usize>,
}

#[derive(Debug, Clone)]
struct ElementData {
    name: QualifiedName,
    attributes: Vec<XmlAttribute>,
    namespaces: Vec<(String, String)>,
    children: Vec<Child>,
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
enum Child {
    Element(usize),
    Text(String),
    Comment(String),
}

impl Document {
    /// Parse a document from a string
    pub fn parse(input: &str) -> RdfXmlResult<Self> {
        TreeBuilder::new(input).build()
    }

    /// The document element
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|index| NodeRef {
            document: self,
            index,
        })
    }

    /// Number of elements in the document
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

impl FromStr for Document {
    type Err = RdfXmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}

/// Handle to one element of a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    document: &'a Document,
    index: usize,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a ElementData {
        &self.document.elements[self.index]
    }

    fn at(&self, index: usize) -> NodeRef<'a> {
        NodeRef {
            document: self.document,
            index,
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.document, other.document) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> XmlNode for NodeRef<'a> {
    fn name(&self) -> &QualifiedName {
        &self.data().name
    }

    fn attributes(&self) -> &[XmlAttribute] {
        &self.data().attributes
    }

    fn namespace_declarations(&self) -> &[(String, String)] {
        &self.data().namespaces
    }

    fn children(&self) -> Vec<XmlContent<Self>> {
        self.data()
            .children
            .iter()
            .map(|child| match child {
                Child::Element(index) => XmlContent::Element(self.at(*index)),
                Child::Text(text) => XmlContent::Text(text.clone()),
                Child::Comment(comment) => XmlContent::Comment(comment.clone()),
            })
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|index| self.at(index))
    }
}

struct TreeBuilder<'i> {
    input: &'i str,
    document: Document,
    /// Open elements
    stack: Vec<usize>,
    /// Namespace declarations per open element
    scopes: Vec<Vec<(String, String)>>,
    entities: FxHashMap<String, String>,
}

impl<'i> TreeBuilder<'i> {
    fn new(input: &'i str) -> Self {
        Self {
            input,
            document: Document::default(),
            stack: Vec::new(),
            scopes: Vec::new(),
            entities: FxHashMap::default(),
        }
    }

    fn build(mut self) -> RdfXmlResult<Document> {
        let mut reader = Reader::from_str(self.input);
        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| self.error(e.to_string(), reader.buffer_position()))?;
            match event {
                Event::Start(start) => {
                    let index = self.open(&start, position)?;
                    self.stack.push(index);
                }
                Event::Empty(start) => {
                    self.open(&start, position)?;
                    self.scopes.pop();
                }
                Event::End(_) => {
                    if self.stack.pop().is_none() {
                        return Err(self.error("unexpected closing tag", position));
                    }
                    self.scopes.pop();
                }
                Event::Text(text) => {
                    let entities = &self.entities;
                    let text = text
                        .unescape_with(|entity| resolve_entity(entities, entity))
                        .map_err(|e| self.error(e.to_string(), position))?
                        .into_owned();
                    self.push_text(text, position)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| self.error(e.to_string(), position))?;
                    self.push_text(text, position)?;
                }
                Event::Comment(comment) => {
                    if let Some(parent) = self.stack.last().copied() {
                        let comment = String::from_utf8_lossy(&comment).into_owned();
                        self.document.elements[parent]
                            .children
                            .push(Child::Comment(comment));
                    }
                }
                Event::DocType(doctype) => {
                    let doctype = String::from_utf8_lossy(&doctype).into_owned();
                    self.declare_entities(&doctype, position)?;
                }
                Event::Decl(_) | Event::PI(_) => {}
                Event::Eof => break,
            }
        }

        if !self.stack.is_empty() {
            return Err(self.error("unclosed element at end of input", self.input.len()));
        }
        if self.document.root.is_none() {
            return Err(self.error("no document element", self.input.len()));
        }
        Ok(self.document)
    }

    fn open(&mut self, start: &BytesStart<'_>, position: usize) -> RdfXmlResult<usize> {
        let parent = self.stack.last().copied();
        if parent.is_none() && self.document.root.is_some() {
            return Err(self.error("more than one document element", position));
        }

        let raw_name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| self.error(e.to_string(), position))?
            .to_string();

        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| self.error(e.to_string(), position))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| self.error(e.to_string(), position))?
                .to_string();
            let entities = &self.entities;
            let value = attribute
                .unescape_value_with(|entity| resolve_entity(entities, entity))
                .map_err(|e| self.error(e.to_string(), position))?
                .into_owned();
            if key == "xmlns" {
                declarations.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((prefix.to_string(), value));
            } else {
                raw_attributes.push((key, value));
            }
        }
        self.scopes.push(declarations.clone());

        let name = self.resolve(&raw_name, true, position)?;
        let attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| {
                Ok(XmlAttribute {
                    name: self.resolve(&key, false, position)?,
                    value,
                })
            })
            .collect::<RdfXmlResult<Vec<_>>>()?;

        let index = self.document.elements.len();
        self.document.elements.push(ElementData {
            name,
            attributes,
            namespaces: declarations,
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.document.elements[parent]
                .children
                .push(Child::Element(index)),
            None => self.document.root = Some(index),
        }
        Ok(index)
    }

    fn resolve(&self, raw: &str, is_element: bool, position: usize) -> RdfXmlResult<QualifiedName> {
        match raw.split_once(':') {
            Some((prefix, local)) => {
                let namespace = if prefix == "xml" {
                    XML_NS.to_string()
                } else {
                    self.lookup(prefix).ok_or_else(|| {
                        self.error(format!("unbound namespace prefix '{}'", prefix), position)
                    })?
                };
                Ok(QualifiedName::new(
                    Some(namespace),
                    local,
                    Some(prefix.to_string()),
                ))
            }
            None if is_element => Ok(QualifiedName::new(self.lookup(""), raw, None)),
            None => Ok(QualifiedName::new(None, raw, None)),
        }
    }

    /// Innermost binding of a prefix; an empty IRI undeclares it
    fn lookup(&self, prefix: &str) -> Option<String> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, namespace)| namespace.clone())
            .filter(|namespace| !namespace.is_empty())
    }

    fn push_text(&mut self, text: String, position: usize) -> RdfXmlResult<()> {
        let Some(parent) = self.stack.last().copied() else {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(self.error("text outside of the document element", position));
        };
        let children = &mut self.document.elements[parent].children;
        if let Some(Child::Text(previous)) = children.last_mut() {
            previous.push_str(&text);
        } else {
            children.push(Child::Text(text));
        }
        Ok(())
    }

    fn declare_entities(&mut self, doctype: &str, position: usize) -> RdfXmlResult<()> {
        for declaration in doctype.split('<').skip(1) {
            let Some(declaration) = declaration.strip_prefix("!ENTITY") else {
                continue;
            };
            let declaration = declaration.trim_start();
            let (name, rest) = declaration
                .split_once(char::is_whitespace)
                .ok_or_else(|| self.error("<!ENTITY> without a value", position))?;
            let rest = rest.trim_start();
            let quote = rest
                .chars()
                .next()
                .filter(|c| *c == '"' || *c == '\'')
                .ok_or_else(|| self.error("<!ENTITY> value must be quoted", position))?;
            let (value, _) = rest[1..]
                .split_once(quote)
                .ok_or_else(|| self.error("unterminated <!ENTITY> value", position))?;
            self.entities.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>, position: usize) -> RdfXmlError {
        let consumed = &self.input.as_bytes()[..position.min(self.input.len())];
        let line = consumed.iter().filter(|b| **b == b'\n').count() + 1;
        let column = consumed
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(consumed.len(), |newline| consumed.len() - newline - 1)
            + 1;
        RdfXmlError::syntax(message, format!("line {}, column {}", line, column))
    }
}

fn resolve_entity<'a>(entities: &'a FxHashMap<String, String>, entity: &str) -> Option<&'a str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => entities.get(entity).map(String::as_str),
    }
}
