//! RDF data model used by the RDF/XML codec
//!
//! This module provides:
//! - RDF terms and triples (subject-predicate-object)
//! - An insertion-ordered graph with isomorphism checking
//! - The qualified name registry used when writing
//! - Syntax vocabulary constants
//!
//! # Example
//!
//! ```rust
//! use samyama_rdfxml::rdf::{Graph, Literal, NamedNode, RdfPredicate, Triple};
//!
//! let mut graph = Graph::new();
//!
//! // Create a triple
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! graph.insert(Triple::new(subject.clone(), predicate, object));
//!
//! // Query triples
//! assert_eq!(graph.triples_for_subject(&subject.into()).count(), 1);
//! ```

mod graph;
mod namespace;
pub(crate) mod types;
pub mod vocab;

pub use graph::Graph;
pub use namespace::{QName, QNameRegistry};
pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    RdfTerm, Triple,
};
