//! XML tree abstraction
//!
//! The reader only depends on [`XmlNode`], a read-only view of an element
//! with resolved namespaces. [`Document`] is the bundled backend, parsed with
//! `quick-xml`. The writer builds an owned [`Element`] tree and serializes it.

pub mod builder;
pub mod document;
pub mod names;

pub use builder::{Element, Node, SerializeOptions};
pub use document::{Document, NodeRef};

use std::fmt;

/// Element or attribute name with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace IRI, `None` for unqualified names
    pub namespace: Option<String>,
    /// Local part
    pub local: String,
    /// Prefix as written in the source
    pub prefix: Option<String>,
}

impl QualifiedName {
    /// Create a name in a namespace
    pub fn new(namespace: Option<String>, local: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
            prefix,
        }
    }

    /// The IRI formed by concatenating namespace and local name
    pub fn iri(&self) -> Option<String> {
        self.namespace
            .as_ref()
            .map(|namespace| format!("{}{}", namespace, self.local))
    }

    /// Check if this is `namespace` + `local`
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Check if the name is in the given namespace
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Attribute of an element, value already unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QualifiedName,
    pub value: String,
}

/// Child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent<N> {
    Element(N),
    /// Character data, CDATA sections included
    Text(String),
    Comment(String),
}

/// Read-only view of an XML element
pub trait XmlNode: Clone + PartialEq {
    /// Element name
    fn name(&self) -> &QualifiedName;

    /// Attributes other than namespace declarations, in document order
    fn attributes(&self) -> &[XmlAttribute];

    /// Namespace declarations made on this element as (prefix, IRI);
    /// the default namespace uses the empty prefix
    fn namespace_declarations(&self) -> &[(String, String)];

    /// Ordered children
    fn children(&self) -> Vec<XmlContent<Self>>;

    /// Parent element, `None` for the document element
    fn parent(&self) -> Option<Self>;

    /// Ancestors, nearest first
    fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            ancestors.push(node);
        }
        ancestors
    }

    /// Child elements only
    fn element_children(&self) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter_map(|child| match child {
                XmlContent::Element(element) => Some(element),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text of the direct text children
    fn text(&self) -> String {
        self.children()
            .into_iter()
            .filter_map(|child| match child {
                XmlContent::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Value of the attribute `namespace` + `local`
    fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|attribute| attribute.name.is(namespace, local))
            .map(|attribute| attribute.value.as_str())
    }

    /// Location path such as `/rdf:RDF[1]/rdf:Description[2]`
    fn path(&self) -> String {
        let mut steps = Vec::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            let parent = node.parent();
            let index = parent
                .as_ref()
                .map(|parent| {
                    parent
                        .element_children()
                        .iter()
                        .filter(|sibling| sibling.name() == node.name())
                        .position(|sibling| sibling == &node)
                        .unwrap_or(0)
                })
                .unwrap_or(0);
            steps.push(format!("{}[{}]", node.name(), index + 1));
            current = parent;
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// Location path of one of this element's attributes
    fn attribute_path(&self, attribute: &QualifiedName) -> String {
        format!("{}/@{}", self.path(), attribute)
    }
}
