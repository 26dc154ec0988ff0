//! Vocabulary terms used by the RDF/XML grammar

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

pub const RDF_ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
pub const RDF_ABOUT_EACH: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#aboutEach";
pub const RDF_ABOUT_EACH_PREFIX: &str =
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#aboutEachPrefix";
pub const RDF_BAG_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#bagID";
pub const RDF_DATATYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#datatype";
pub const RDF_DESCRIPTION: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Description";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#ID";
pub const RDF_LI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#li";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_NODE_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nodeID";
pub const RDF_OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";
pub const RDF_PARSE_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#parseType";
pub const RDF_PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";
pub const RDF_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#RDF";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";
pub const RDF_STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";
pub const RDF_SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

pub const DC_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DC11_TITLE: &str = "http://purl.org/dc/elements/1.1/title";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Names that structure the syntax itself and never denote properties or classes
pub const CORE_SYNTAX_TERMS: [&str; 7] = [
    RDF_RDF,
    RDF_ID,
    RDF_ABOUT,
    RDF_PARSE_TYPE,
    RDF_RESOURCE,
    RDF_NODE_ID,
    RDF_DATATYPE,
];

/// Terms withdrawn from the grammar in the 2004 revision
pub const OLD_TERMS: [&str; 3] = [RDF_ABOUT_EACH, RDF_ABOUT_EACH_PREFIX, RDF_BAG_ID];

/// Well-known vocabularies used when `standard_prefixes` is enabled
pub const STANDARD_PREFIXES: [(&str, &str); 12] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dc", "http://purl.org/dc/terms/"),
    ("dc11", "http://purl.org/dc/elements/1.1/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("schema", "http://schema.org/"),
    ("void", "http://rdfs.org/ns/void#"),
    ("xhv", "http://www.w3.org/1999/xhtml/vocab#"),
    ("geo", "http://www.w3.org/2003/01/geo/wgs84_pos#"),
];

/// Check if an IRI is in the RDF namespace and names a core syntax term
pub fn is_core_syntax_term(iri: &str) -> bool {
    CORE_SYNTAX_TERMS.contains(&iri)
}

/// Check if an IRI is one of the obsolete RDF/XML terms
pub fn is_old_term(iri: &str) -> bool {
    OLD_TERMS.contains(&iri)
}

/// Check if an IRI may name a node element
pub fn is_node_element_name(iri: &str) -> bool {
    !is_core_syntax_term(iri) && !is_old_term(iri) && iri != RDF_LI
}

/// Check if an IRI may name a property element
pub fn is_property_element_name(iri: &str) -> bool {
    !is_core_syntax_term(iri) && !is_old_term(iri) && iri != RDF_DESCRIPTION
}

/// `rdf:_N` for list item N
pub fn rdf_member(n: u64) -> String {
    format!("{}_{}", RDF_NS, n)
}
