//! Samyama RDF/XML
//!
//! Reader and writer for the RDF/XML serialization of RDF graphs.
//!
//! # Architecture
//!
//! - `xml`: namespace-aware XML tree read through quick-xml, and an owned
//!   element tree for output
//! - `rdf`: terms, triples, graphs and the qualified name registry
//! - `reader`: XML tree to triples, following the RDF/XML grammar
//! - `writer`: graph to XML tree, with subject nesting, collections and
//!   attribute abbreviation
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_rdfxml::{RdfXmlParser, RdfXmlWriter, ReaderOptions, WriterOptions};
//!
//! let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                       xmlns:ex="http://example.org/terms#">
//!   <ex:Person rdf:about="http://example.org/joe">
//!     <ex:name>Joe</ex:name>
//!   </ex:Person>
//! </rdf:RDF>"#;
//!
//! // Read
//! let graph = RdfXmlParser::new(ReaderOptions::default()).parse_str(xml).unwrap();
//! assert_eq!(graph.len(), 2);
//!
//! // Write it back
//! let options = WriterOptions::default().with_prefix("ex", "http://example.org/terms#");
//! let output = RdfXmlWriter::new(options).write_to_string(&graph).unwrap();
//! assert!(output.contains("<ex:Person rdf:about=\"http://example.org/joe\">"));
//!
//! let reread = RdfXmlParser::default().parse_str(&output).unwrap();
//! assert!(graph.is_isomorphic(&reread));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod rdf;
pub mod reader;
pub mod writer;
pub mod xml;

// Re-export main types for convenience
pub use error::{RdfXmlError, RdfXmlResult};

pub use rdf::{
    BlankNode, Graph, Literal, NamedNode, QName, QNameRegistry, RdfObject, RdfPredicate,
    RdfSubject, RdfTerm, Triple,
};

pub use reader::{EvalContext, RdfXmlParser, ReaderOptions};

pub use writer::{AttributeMode, RdfXmlWriter, WriterOptions};

pub use xml::{Document, Element, XmlNode};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "1.0.0");
    }
}
