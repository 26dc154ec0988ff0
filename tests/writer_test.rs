use samyama_rdfxml::rdf::vocab::{RDFS_CLASS, RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE, RDF_XML_LITERAL};
use samyama_rdfxml::{
    AttributeMode, BlankNode, Element, Graph, Literal, NamedNode, RdfXmlError, RdfXmlParser,
    RdfXmlWriter, Triple, WriterOptions,
};

fn iri(s: &str) -> NamedNode {
    NamedNode::new(s).unwrap()
}

fn ex(local: &str) -> NamedNode {
    iri(&format!("http://example.org/{}", local))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ex_options() -> WriterOptions {
    WriterOptions::default().with_prefix("ex", "http://example.org/")
}

fn write(options: WriterOptions, graph: &Graph) -> String {
    RdfXmlWriter::new(options).write_to_string(graph).unwrap()
}

fn tree(options: WriterOptions, graph: &Graph) -> Element {
    RdfXmlWriter::new(options).write_tree(graph).unwrap()
}

fn children(element: &Element) -> Vec<&Element> {
    element.child_elements().collect()
}

#[test]
fn test_untyped_attributes_with_standard_prefixes() {
    let graph: Graph = vec![Triple::new(
        ex("doc"),
        iri("http://purl.org/dc/terms/title"),
        Literal::new_simple_literal("A title"),
    )]
    .into_iter()
    .collect();

    let options = WriterOptions::default()
        .with_attributes(AttributeMode::Untyped)
        .with_standard_prefixes(true);
    let xml = write(options, &graph);
    assert!(xml.contains(r#"xmlns:dc="http://purl.org/dc/terms/""#));
    assert!(xml.contains(r#"<rdf:Description rdf:about="http://example.org/doc" dc:title="A title"/>"#));

    let xml = write(WriterOptions::default().with_standard_prefixes(true), &graph);
    assert!(xml.contains("<dc:title>A title</dc:title>"));
}

#[test]
fn test_typed_attributes_drop_datatypes() {
    let integer = iri("http://www.w3.org/2001/XMLSchema#integer");
    let graph: Graph = vec![Triple::new(
        ex("joe"),
        ex("age"),
        Literal::new_typed_literal("30", integer),
    )]
    .into_iter()
    .collect();

    let xml = write(ex_options().with_attributes(AttributeMode::Untyped), &graph);
    assert!(xml.contains(
        r#"<ex:age rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">30</ex:age>"#
    ));

    let xml = write(ex_options().with_attributes(AttributeMode::Typed), &graph);
    assert!(xml.contains(r#"ex:age="30""#));
}

#[test]
fn test_first_type_becomes_the_tag() {
    let graph: Graph = vec![
        Triple::new(ex("alice"), iri(RDF_TYPE), ex("Person")),
        Triple::new(ex("alice"), iri(RDF_TYPE), ex("Agent")),
        Triple::new(ex("alice"), ex("name"), Literal::new_simple_literal("Alice")),
    ]
    .into_iter()
    .collect();

    let root = tree(ex_options(), &graph);
    let subjects = children(&root);
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].name, "ex:Agent");
    assert_eq!(subjects[0].attribute("rdf:about"), Some("http://example.org/alice"));

    let properties = children(subjects[0]);
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0].name, "rdf:type");
    assert_eq!(properties[0].attribute("rdf:resource"), Some("http://example.org/Person"));
    assert_eq!(properties[1].name, "ex:name");
}

#[test]
fn test_unreferenced_subjects_embed_their_objects() {
    let graph: Graph = vec![
        Triple::new(ex("alice"), ex("knows"), ex("bob")),
        Triple::new(ex("bob"), ex("name"), Literal::new_simple_literal("Bob")),
    ]
    .into_iter()
    .collect();

    let root = tree(ex_options(), &graph);
    let subjects = children(&root);
    assert_eq!(subjects.len(), 1);
    let knows = children(subjects[0]);
    assert_eq!(knows[0].name, "ex:knows");
    let bob = children(knows[0]);
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].attribute("rdf:about"), Some("http://example.org/bob"));

    let root = tree(ex_options().with_max_depth(0), &graph);
    let subjects = children(&root);
    assert_eq!(subjects.len(), 2);
    let knows = children(subjects[0]);
    assert_eq!(knows[0].attribute("rdf:resource"), Some("http://example.org/bob"));
}

#[test]
fn test_blank_nodes() {
    let shared = BlankNode::new();
    let leaf = BlankNode::new();
    let graph: Graph = vec![
        Triple::new(ex("alice"), ex("likes"), shared.clone()),
        Triple::new(ex("bob"), ex("likes"), shared.clone()),
        Triple::new(shared, ex("name"), Literal::new_simple_literal("X")),
        Triple::new(ex("alice"), ex("owns"), leaf),
    ]
    .into_iter()
    .collect();

    let xml = write(ex_options(), &graph);
    assert_eq!(xml.matches(r#"rdf:nodeID="b0""#).count(), 2);
    assert!(xml.contains(r#"<ex:owns rdf:parseType="Resource"/>"#));

    let root = tree(ex_options(), &graph);
    assert_eq!(children(&root).len(), 2);
}

#[test]
fn test_well_formed_lists_become_collections() {
    let (c1, c2) = (BlankNode::new(), BlankNode::new());
    let graph: Graph = vec![
        Triple::new(ex("list"), ex("members"), c1.clone()),
        Triple::new(c1.clone(), iri(RDF_FIRST), ex("a")),
        Triple::new(c1, iri(RDF_REST), c2.clone()),
        Triple::new(c2.clone(), iri(RDF_FIRST), ex("b")),
        Triple::new(c2, iri(RDF_REST), iri(RDF_NIL)),
    ]
    .into_iter()
    .collect();

    let root = tree(ex_options(), &graph);
    let subjects = children(&root);
    assert_eq!(subjects.len(), 1);
    let members = children(subjects[0]);
    assert_eq!(members[0].attribute("rdf:parseType"), Some("Collection"));
    let items: Vec<_> = children(members[0])
        .iter()
        .map(|item| item.attribute("rdf:about").unwrap_or_default().to_string())
        .collect();
    assert_eq!(items, vec!["http://example.org/a", "http://example.org/b"]);
}

#[test]
fn test_lists_with_literal_items_are_not_collections() {
    let cell = BlankNode::new();
    let graph: Graph = vec![
        Triple::new(ex("list"), ex("members"), cell.clone()),
        Triple::new(cell.clone(), iri(RDF_FIRST), Literal::new_simple_literal("1")),
        Triple::new(cell, iri(RDF_REST), iri(RDF_NIL)),
    ]
    .into_iter()
    .collect();

    let xml = write(ex_options(), &graph);
    assert!(!xml.contains("Collection"));
    assert!(xml.contains("<rdf:first>1</rdf:first>"));
}

#[test]
fn test_base_relative_iris_and_ordering() {
    let graph: Graph = vec![
        Triple::new(ex("aaa"), ex("terms/p"), Literal::new_simple_literal("1")),
        Triple::new(ex("doc#me"), ex("terms/p"), Literal::new_simple_literal("2")),
        Triple::new(ex("doc"), ex("terms/p"), Literal::new_simple_literal("3")),
    ]
    .into_iter()
    .collect();

    let options = WriterOptions::default()
        .with_base_uri("http://example.org/doc")
        .with_prefix("t", "http://example.org/terms/");
    let root = tree(options, &graph);
    assert_eq!(root.attribute("xml:base"), Some("http://example.org/doc"));
    let abouts: Vec<_> = children(&root)
        .iter()
        .map(|subject| subject.attribute("rdf:about").unwrap_or_default().to_string())
        .collect();
    assert_eq!(abouts, vec!["", "aaa", "#me"]);
}

#[test]
fn test_top_classes_come_first() {
    let graph: Graph = vec![
        Triple::new(ex("alice"), iri(RDF_TYPE), ex("Person")),
        Triple::new(ex("Person"), iri(RDF_TYPE), iri(RDFS_CLASS)),
    ]
    .into_iter()
    .collect();

    let root = tree(ex_options(), &graph);
    let first = children(&root)[0];
    assert_eq!(first.attribute("rdf:about"), Some("http://example.org/Person"));

    let root = tree(ex_options().with_top_classes(Vec::new()), &graph);
    let first = children(&root)[0];
    assert_eq!(first.attribute("rdf:about"), Some("http://example.org/alice"));
}

#[test]
fn test_document_language() {
    let graph: Graph = vec![
        Triple::new(
            ex("alice"),
            ex("greeting"),
            Literal::new_language_tagged_literal("hi", "en").unwrap(),
        ),
        Triple::new(ex("alice"), ex("note"), Literal::new_simple_literal("plain")),
        Triple::new(
            ex("alice"),
            ex("word"),
            Literal::new_language_tagged_literal("salut", "fr").unwrap(),
        ),
    ]
    .into_iter()
    .collect();

    let xml = write(ex_options().with_lang("en"), &graph);
    assert!(xml.contains(r#"xml:lang="en">"#));
    assert!(xml.contains("<ex:greeting>hi</ex:greeting>"));
    assert!(xml.contains(r#"<ex:note xml:lang="">plain</ex:note>"#));
    assert!(xml.contains(r#"<ex:word xml:lang="fr">salut</ex:word>"#));
}

#[test]
fn test_xml_literals_are_written_as_markup() {
    let graph: Graph = vec![
        Triple::new(
            ex("a"),
            ex("body"),
            Literal::new_typed_literal("<b>bold</b>", iri(RDF_XML_LITERAL)),
        ),
        Triple::new(
            ex("a"),
            ex("broken"),
            Literal::new_typed_literal("a < b", iri(RDF_XML_LITERAL)),
        ),
    ]
    .into_iter()
    .collect();

    let xml = write(ex_options(), &graph);
    assert!(xml.contains(r#"<ex:body rdf:parseType="Literal"><b>bold</b></ex:body>"#));
    assert!(xml.contains("a &lt; b</ex:broken>"));
}

#[test]
fn test_xml_literals_under_a_default_namespace() {
    let markup = Literal::new_typed_literal("<b>bold</b>", iri(RDF_XML_LITERAL));
    let graph: Graph = vec![
        Triple::new(ex("a"), ex("body"), markup.clone()),
        Triple::new(ex("a"), iri("http://example.org/terms/note"), markup),
    ]
    .into_iter()
    .collect();

    let options = ex_options().with_default_namespace("http://example.org/terms/");
    let xml = write(options, &graph);
    assert!(xml.contains(r#"<ex:body rdf:parseType="Literal" xmlns=""><b>bold</b></ex:body>"#));
    assert!(xml.contains(concat!(
        r#"<note rdf:datatype="http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral">"#,
        "&lt;b&gt;bold&lt;/b&gt;</note>"
    )));

    let reread = RdfXmlParser::default().parse_str(&xml).unwrap();
    assert!(graph.is_isomorphic(&reread));
}

#[test]
fn test_literal_types_stay_elements() {
    let graph: Graph = vec![Triple::new(
        ex("a"),
        iri(RDF_TYPE),
        Literal::new_simple_literal("foo"),
    )]
    .into_iter()
    .collect();

    let xml = write(ex_options().with_attributes(AttributeMode::Untyped), &graph);
    assert!(!xml.contains(r#"rdf:type="foo""#));
    assert!(xml.contains("<rdf:type>foo</rdf:type>"));
}

#[test]
fn test_properties_without_qualified_names() {
    init_tracing();
    let graph: Graph = vec![
        Triple::new(ex("alice"), ex("123"), Literal::new_simple_literal("x")),
        Triple::new(ex("alice"), ex("name"), Literal::new_simple_literal("Alice")),
    ]
    .into_iter()
    .collect();

    let err = RdfXmlWriter::new(ex_options().with_strict(true))
        .write_tree(&graph)
        .unwrap_err();
    assert!(matches!(err, RdfXmlError::Resolution { .. }));

    let xml = write(ex_options(), &graph);
    let reread = RdfXmlParser::default().parse_str(&xml).unwrap();
    assert_eq!(reread.len(), 1);
}

#[test]
fn test_stylesheet_and_compact_output() {
    let graph: Graph = vec![Triple::new(ex("a"), ex("p"), ex("b"))]
        .into_iter()
        .collect();

    let xml = write(ex_options().with_stylesheet("style.xsl"), &graph);
    let lines: Vec<&str> = xml.lines().collect();
    assert_eq!(lines[0], r#"<?xml version="1.0" encoding="utf-8"?>"#);
    assert_eq!(lines[1], r#"<?xml-stylesheet type="text/xsl" href="style.xsl"?>"#);

    let xml = write(ex_options().with_indent(0), &graph);
    assert!(xml.contains(
        r#"<rdf:Description rdf:about="http://example.org/a"><ex:p rdf:resource="http://example.org/b"/></rdf:Description>"#
    ));
}
