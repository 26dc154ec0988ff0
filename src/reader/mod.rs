//! RDF/XML reader
//!
//! Walks an XML tree top-down and derives triples from the RDF/XML grammar.
//! Triples are handed to a callback as soon as they are derived; the
//! `parse_*` conveniences collect them into a [`Graph`].
//!
//! # Example
//!
//! ```rust
//! use samyama_rdfxml::reader::{RdfXmlParser, ReaderOptions};
//!
//! let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                       xmlns:ex="http://example.org/">
//!   <rdf:Description rdf:about="http://example.org/joe">
//!     <ex:name>Joe</ex:name>
//!   </rdf:Description>
//! </rdf:RDF>"#;
//!
//! let graph = RdfXmlParser::new(ReaderOptions::default()).parse_str(xml).unwrap();
//! assert_eq!(graph.len(), 1);
//! ```

mod context;
mod engine;
mod literal;
mod shape;

pub use context::EvalContext;

use oxiri::Iri;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RdfXmlError, RdfXmlResult};
use crate::rdf::{Graph, Triple};
use crate::xml::{Document, XmlNode};
use engine::Engine;

/// Reader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Base IRI for relative references when the document sets no `xml:base`
    pub base_uri: Option<String>,
    /// Fail on grammar violations instead of skipping them
    pub validate: bool,
    /// Canonical lexical forms for common XSD datatypes
    pub canonicalize: bool,
    /// Resolve each distinct (base, reference) pair once
    pub intern: bool,
}

impl ReaderOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_canonicalize(mut self, canonicalize: bool) -> Self {
        self.canonicalize = canonicalize;
        self
    }

    pub fn with_intern(mut self, intern: bool) -> Self {
        self.intern = intern;
        self
    }

    /// Load options from a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> RdfXmlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// RDF/XML parser
#[derive(Debug, Clone, Default)]
pub struct RdfXmlParser {
    options: ReaderOptions,
}

impl RdfXmlParser {
    /// Create a parser with the given options
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Get the parser options
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Parse an RDF/XML document into a graph
    pub fn parse_str(&self, input: &str) -> RdfXmlResult<Graph> {
        let document = Document::parse(input)?;
        self.parse_document(&document)
    }

    /// Parse an already loaded document into a graph
    pub fn parse_document(&self, document: &Document) -> RdfXmlResult<Graph> {
        let root = document
            .root()
            .ok_or_else(|| RdfXmlError::syntax("no document element", "end of input"))?;
        let mut graph = Graph::new();
        self.parse_node(&root, &mut |triple| {
            graph.insert(triple);
            Ok::<_, RdfXmlError>(())
        })?;
        Ok(graph)
    }

    /// Parse the tree rooted at `root`, delivering triples to `on_triple`
    ///
    /// `rdf:RDF` elements are searched for anywhere under `root`; when there
    /// is none, `root` itself is read as a single node element. Delivery is
    /// synchronous and in derivation order; an error from the callback stops
    /// the parse.
    pub fn parse_node<N, E>(
        &self,
        root: &N,
        on_triple: &mut impl FnMut(Triple) -> Result<(), E>,
    ) -> Result<(), E>
    where
        N: XmlNode,
        E: From<RdfXmlError>,
    {
        let base = match &self.options.base_uri {
            Some(base) => Some(Iri::parse(base.clone()).map_err(|e| RdfXmlError::InvalidIri {
                iri: base.clone(),
                path: String::new(),
                message: e.to_string(),
            })?),
            None => None,
        };

        debug!(
            base = self.options.base_uri.as_deref().unwrap_or(""),
            validate = self.options.validate,
            "parsing RDF/XML"
        );
        let mut engine = Engine::new(&self.options, base, on_triple);
        engine.parse_root(root)?;
        debug!(triples = engine.emitted(), "parsed RDF/XML");
        Ok(())
    }
}
