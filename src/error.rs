//! Error types shared by the RDF/XML reader and writer

use thiserror::Error;

/// RDF/XML codec errors
#[derive(Error, Debug)]
pub enum RdfXmlError {
    /// Malformed XML input (unbalanced tags, unbound prefixes, bad escapes)
    #[error("Syntax error at {location}: {message}")]
    Syntax { message: String, location: String },

    /// A structural RDF/XML rule was broken
    #[error("Grammar violation at {path}: {message}")]
    Grammar { message: String, path: String },

    /// An IRI reference could not be resolved
    #[error("Invalid IRI <{iri}> at {path}: {message}")]
    InvalidIri {
        iri: String,
        path: String,
        message: String,
    },

    /// No qualified name can be minted for an IRI
    #[error("Cannot mint a qualified name for <{iri}>")]
    Resolution { iri: String },

    /// A statement RDF/XML cannot represent
    #[error("Unsupported term: {0}")]
    UnsupportedTerm(String),

    /// Invalid option document
    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RdfXmlError {
    pub(crate) fn syntax(message: impl Into<String>, location: impl Into<String>) -> Self {
        RdfXmlError::Syntax {
            message: message.into(),
            location: location.into(),
        }
    }

    pub(crate) fn grammar(message: impl Into<String>, path: impl Into<String>) -> Self {
        RdfXmlError::Grammar {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Check if this error is a grammar violation
    pub fn is_grammar_violation(&self) -> bool {
        matches!(self, RdfXmlError::Grammar { .. })
    }
}

pub type RdfXmlResult<T> = Result<T, RdfXmlError>;
