//! RDF/XML writer
//!
//! Turns a [`Graph`] into an element tree rooted at `rdf:RDF`, then into
//! text. Subjects are emitted in a deterministic order; objects that are
//! themselves unrendered subjects are nested under the property that
//! references them, and well-formed lists are written as collections.
//!
//! # Example
//!
//! ```rust
//! use samyama_rdfxml::rdf::{Graph, Literal, NamedNode, Triple};
//! use samyama_rdfxml::writer::{RdfXmlWriter, WriterOptions};
//!
//! let mut graph = Graph::new();
//! graph.insert(Triple::new(
//!     NamedNode::new("http://example.org/joe").unwrap(),
//!     NamedNode::new("http://example.org/terms#name").unwrap(),
//!     Literal::new_simple_literal("Joe"),
//! ));
//!
//! let xml = RdfXmlWriter::new(WriterOptions::default()).write_to_string(&graph).unwrap();
//! assert!(xml.contains("<ns0:name>Joe</ns0:name>"));
//! ```

mod engine;
mod scheduler;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

use crate::error::RdfXmlResult;
use crate::rdf::vocab::RDFS_CLASS;
use crate::rdf::{Graph, RdfTerm};
use crate::xml::{Element, SerializeOptions};
use engine::Renderer;

/// Which literal properties may be written as attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    /// Every property is a child element
    #[default]
    None,
    /// Literals without a datatype
    Untyped,
    /// Any literal; datatypes are not preserved in attribute form
    Typed,
}

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Attribute form for single literal values
    pub attributes: AttributeMode,
    /// Emitted as `xml:base`; IRIs under it are written relative
    pub base_uri: Option<String>,
    /// Namespace written without a prefix
    pub default_namespace: Option<String>,
    /// Emitted as `xml:lang` on the document element
    pub lang: Option<String>,
    /// Maximum nesting of embedded subjects
    pub max_depth: usize,
    /// Caller-supplied prefix → namespace mappings
    pub prefixes: IndexMap<String, String>,
    /// Use prefixes of well-known vocabularies when nothing else matches
    pub standard_prefixes: bool,
    /// Emitted as an `xml-stylesheet` processing instruction
    pub stylesheet: Option<String>,
    /// Classes whose instances are written first
    pub top_classes: Vec<String>,
    /// Fail when a property has no qualified name instead of dropping it
    pub strict: bool,
    /// Spaces per nesting level, 0 for compact output
    pub indent: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            attributes: AttributeMode::None,
            base_uri: None,
            default_namespace: None,
            lang: None,
            max_depth: 10,
            prefixes: IndexMap::new(),
            standard_prefixes: true,
            stylesheet: None,
            top_classes: vec![RDFS_CLASS.to_string()],
            strict: false,
            indent: 2,
        }
    }
}

impl WriterOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: AttributeMode) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Declare a prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), namespace.into());
        self
    }

    pub fn with_standard_prefixes(mut self, enabled: bool) -> Self {
        self.standard_prefixes = enabled;
        self
    }

    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheet = Some(href.into());
        self
    }

    pub fn with_top_classes(mut self, classes: Vec<String>) -> Self {
        self.top_classes = classes;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Load options from a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> RdfXmlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            indent: self.indent,
            declaration: true,
            stylesheet: self.stylesheet.clone(),
        }
    }
}

/// RDF/XML writer
#[derive(Debug, Clone, Default)]
pub struct RdfXmlWriter {
    options: WriterOptions,
}

impl RdfXmlWriter {
    /// Create a writer with the given options
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Get the writer options
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Build the `rdf:RDF` element tree for a graph
    pub fn write_tree(&self, graph: &Graph) -> RdfXmlResult<Element> {
        debug!(triples = graph.len(), "writing RDF/XML");
        let mut renderer = Renderer::new(&self.options, graph)?;
        let root = renderer.render()?;
        debug!(
            subjects = root.children.len(),
            bindings = renderer.binding_count(),
            "wrote RDF/XML"
        );
        Ok(root)
    }

    /// Build the tree for generalized statements
    ///
    /// Literal subjects and non-IRI predicates have no RDF/XML form and fail
    /// with [`RdfXmlError::UnsupportedTerm`](crate::error::RdfXmlError::UnsupportedTerm).
    pub fn write_terms<I>(&self, statements: I) -> RdfXmlResult<Element>
    where
        I: IntoIterator<Item = (RdfTerm, RdfTerm, RdfTerm)>,
    {
        let mut graph = Graph::new();
        for (subject, predicate, object) in statements {
            graph.try_insert_terms(subject, predicate, object)?;
        }
        self.write_tree(&graph)
    }

    /// Serialize a graph as an RDF/XML document
    pub fn write_to_string(&self, graph: &Graph) -> RdfXmlResult<String> {
        self.write_tree(graph)?
            .to_xml_string(&self.options.serialize_options())
    }

    /// Serialize a graph as an RDF/XML document into a writer
    pub fn write<W: Write>(&self, graph: &Graph, out: W) -> RdfXmlResult<()> {
        self.write_tree(graph)?
            .write_document(out, &self.options.serialize_options())
    }
}
