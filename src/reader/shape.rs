//! Attribute and content classification for node and property elements

use crate::rdf::vocab::{self, RDF_NS, XML_NS};
use crate::xml::{XmlContent, XmlNode};

/// A rule broken by the markup, with the location it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Violation {
    pub message: String,
    pub path: String,
}

impl Violation {
    fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Syntax attributes of an element, with the remaining property attributes
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementAttrs {
    pub id: Option<String>,
    pub node_id: Option<String>,
    pub about: Option<String>,
    pub resource: Option<String>,
    pub datatype: Option<String>,
    pub parse_type: Option<String>,
    /// (predicate IRI, value); `rdf:type` is kept here and resolved as an IRI
    pub property_attrs: Vec<(String, String)>,
}

impl ElementAttrs {
    pub fn classify<N: XmlNode>(element: &N) -> (Self, Vec<Violation>) {
        let mut attrs = ElementAttrs::default();
        let mut violations = Vec::new();

        for attribute in element.attributes() {
            let name = &attribute.name;
            let value = attribute.value.clone();
            let Some(namespace) = name.namespace.as_deref() else {
                violations.push(Violation::new(
                    format!("unqualified attribute '{}'", name.local),
                    element.attribute_path(name),
                ));
                continue;
            };
            if namespace == XML_NS {
                continue;
            }
            if namespace != RDF_NS {
                attrs.property_attrs.push((format!("{}{}", namespace, name.local), value));
                continue;
            }

            match name.local.as_str() {
                "ID" => attrs.id = Some(value),
                "nodeID" => attrs.node_id = Some(value),
                "about" => attrs.about = Some(value),
                "resource" => attrs.resource = Some(value),
                "datatype" => attrs.datatype = Some(value),
                "parseType" => attrs.parse_type = Some(value),
                "aboutEach" | "aboutEachPrefix" | "bagID" => violations.push(Violation::new(
                    format!("rdf:{} is obsolete", name.local),
                    element.attribute_path(name),
                )),
                "li" | "Description" | "RDF" => violations.push(Violation::new(
                    format!("rdf:{} is not allowed as an attribute", name.local),
                    element.attribute_path(name),
                )),
                local => attrs
                    .property_attrs
                    .push((format!("{}{}", RDF_NS, local), value)),
            }
        }
        (attrs, violations)
    }

    /// Check if the element carries anything that makes an empty property a resource
    pub fn describes_resource(&self) -> bool {
        self.resource.is_some() || self.node_id.is_some() || !self.property_attrs.is_empty()
    }
}

/// The production a property element falls under
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PropertyShape<N> {
    /// One nested node element
    Resource { node: N },
    /// Text content, typed or language-tagged
    Literal { text: String },
    /// `rdf:parseType="Resource"`
    ParseTypeResource,
    /// `rdf:parseType="Collection"`
    Collection { items: Vec<N> },
    /// `rdf:parseType="Literal"` or any other parse type
    XmlLiteral,
    /// No content
    Empty,
}

impl<N: XmlNode> PropertyShape<N> {
    /// Classify a property element; productions are tried in order and the
    /// first that fits wins, violations are reported for whatever is ignored
    pub fn classify(element: &N, attrs: &ElementAttrs) -> (Self, Vec<Violation>) {
        let path = element.path();
        let mut violations = Vec::new();
        let mut nodes = Vec::new();
        let mut text = String::new();
        for child in element.children() {
            match child {
                XmlContent::Element(node) => nodes.push(node),
                XmlContent::Text(t) => text.push_str(&t),
                XmlContent::Comment(_) => {}
            }
        }
        let has_text = !text.trim().is_empty();

        let parse_type = attrs.parse_type.as_deref();
        if parse_type.is_some() {
            if !attrs.property_attrs.is_empty() {
                violations.push(Violation::new(
                    "property attributes are not allowed with rdf:parseType",
                    path.clone(),
                ));
            }
            if attrs.datatype.is_some() {
                violations.push(Violation::new(
                    "rdf:datatype is not allowed with rdf:parseType",
                    path.clone(),
                ));
            }
            if attrs.resource.is_some() || attrs.node_id.is_some() {
                violations.push(Violation::new(
                    "rdf:resource and rdf:nodeID are not allowed with rdf:parseType",
                    path.clone(),
                ));
            }
        }

        let shape = match parse_type {
            Some("Resource") | Some("Collection") => {
                if has_text {
                    violations.push(Violation::new(
                        "text is not allowed in this rdf:parseType",
                        path.clone(),
                    ));
                }
                if parse_type == Some("Resource") {
                    PropertyShape::ParseTypeResource
                } else {
                    PropertyShape::Collection { items: nodes }
                }
            }
            Some(_) => PropertyShape::XmlLiteral,
            None if nodes.is_empty() => {
                if text.is_empty() || (!has_text && attrs.describes_resource()) {
                    PropertyShape::Empty
                } else {
                    if attrs.describes_resource() {
                        violations.push(Violation::new(
                            "a literal property element cannot carry rdf:resource, rdf:nodeID or property attributes",
                            path.clone(),
                        ));
                    }
                    PropertyShape::Literal { text }
                }
            }
            None => {
                if has_text {
                    violations.push(Violation::new(
                        "text is not allowed next to a node element",
                        path.clone(),
                    ));
                }
                if nodes.len() > 1 {
                    violations.push(Violation::new(
                        "a property element contains more than one node element",
                        path.clone(),
                    ));
                }
                if attrs.describes_resource() || attrs.datatype.is_some() {
                    violations.push(Violation::new(
                        "a resource property element only allows rdf:ID",
                        path.clone(),
                    ));
                }
                let node = nodes.swap_remove(0);
                PropertyShape::Resource { node }
            }
        };
        (shape, violations)
    }
}

/// Names that cannot be used as node element names
pub(crate) fn node_element_name_error(iri: &str) -> Option<String> {
    if vocab::is_old_term(iri) {
        Some(format!("<{}> is obsolete", iri))
    } else if !vocab::is_node_element_name(iri) {
        Some(format!("<{}> is not allowed as a node element name", iri))
    } else {
        None
    }
}

/// Names that cannot be used as property element names
pub(crate) fn property_element_name_error(iri: &str) -> Option<String> {
    if vocab::is_old_term(iri) {
        Some(format!("<{}> is obsolete", iri))
    } else if !vocab::is_property_element_name(iri) {
        Some(format!("<{}> is not allowed as a property element name", iri))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{Document, NodeRef};

    const PREAMBLE: &str = r#"xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/""#;

    fn shape_of(doc: &Document) -> (PropertyShape<NodeRef<'_>>, Vec<Violation>) {
        let element = doc.root().unwrap();
        let (attrs, _) = ElementAttrs::classify(&element);
        PropertyShape::classify(&element, &attrs)
    }

    fn parse(body: &str) -> Document {
        Document::parse(&body.replacen("<ex:p", &format!("<ex:p {}", PREAMBLE), 1)).unwrap()
    }

    #[test]
    fn test_classify_attributes() {
        let doc = parse(
            r##"<ex:p rdf:ID="x" rdf:resource="#y" ex:q="v" rdf:type="#T" xml:lang="en" rdf:bagID="z"/>"##,
        );
        let (attrs, violations) = ElementAttrs::classify(&doc.root().unwrap());
        assert_eq!(attrs.id.as_deref(), Some("x"));
        assert_eq!(attrs.resource.as_deref(), Some("#y"));
        assert_eq!(attrs.property_attrs.len(), 2);
        assert_eq!(attrs.property_attrs[1].0, vocab::RDF_TYPE);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("obsolete"));
        assert!(violations[0].path.ends_with("/@rdf:bagID"));
    }

    #[test]
    fn test_shapes() {
        let doc = parse("<ex:p><ex:Thing/></ex:p>");
        let (shape, v) = shape_of(&doc);
        assert!(matches!(shape, PropertyShape::Resource { .. }));
        assert!(v.is_empty());

        let doc = parse("<ex:p>hello</ex:p>");
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::Literal { text: "hello".to_string() });

        let doc = parse("<ex:p> </ex:p>");
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::Literal { text: " ".to_string() });

        let doc = parse(r#"<ex:p rdf:resource="x"> </ex:p>"#);
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::Empty);

        let doc = parse(r#"<ex:p rdf:parseType="Resource"><ex:q>1</ex:q></ex:p>"#);
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::ParseTypeResource);

        let doc = parse(r#"<ex:p rdf:parseType="Collection"><ex:A/><ex:B/></ex:p>"#);
        let (shape, _) = shape_of(&doc);
        assert!(matches!(shape, PropertyShape::Collection { ref items } if items.len() == 2));

        let doc = parse(r#"<ex:p rdf:parseType="Other"><b/></ex:p>"#);
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::XmlLiteral);

        let doc = parse("<ex:p/>");
        let (shape, _) = shape_of(&doc);
        assert_eq!(shape, PropertyShape::Empty);
    }

    #[test]
    fn test_shape_violations() {
        let doc = parse(r#"<ex:p rdf:parseType="Resource" ex:q="1"/>"#);
        let (_, v) = shape_of(&doc);
        assert_eq!(v.len(), 1);

        let doc = parse("<ex:p><ex:A/><ex:B/></ex:p>");
        let (shape, v) = shape_of(&doc);
        assert!(matches!(shape, PropertyShape::Resource { .. }));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_element_name_rules() {
        assert!(node_element_name_error(vocab::RDF_LI).is_some());
        assert!(node_element_name_error(vocab::RDF_DESCRIPTION).is_none());
        assert!(property_element_name_error(vocab::RDF_DESCRIPTION).is_some());
        assert!(property_element_name_error(vocab::RDF_LI).is_none());
        assert!(property_element_name_error(vocab::RDF_BAG_ID).unwrap().contains("obsolete"));
    }
}
