use samyama_rdfxml::rdf::vocab::{RDF_NS, RDF_TYPE, RDF_XML_LITERAL};
use samyama_rdfxml::{
    AttributeMode, BlankNode, Graph, Literal, NamedNode, RdfObject, RdfXmlParser, RdfXmlWriter,
    ReaderOptions, Triple, WriterOptions,
};

fn document(body: &str) -> String {
    format!(
        r#"<rdf:RDF xmlns:rdf="{}" xmlns:ex="http://example.org/" xmlns:dc="http://purl.org/dc/terms/">{}</rdf:RDF>"#,
        RDF_NS, body
    )
}

fn ex(local: &str) -> NamedNode {
    NamedNode::new(&format!("http://example.org/{}", local)).unwrap()
}

fn option_sets() -> Vec<WriterOptions> {
    vec![
        WriterOptions::default(),
        WriterOptions::default().with_prefix("ex", "http://example.org/"),
        WriterOptions::default()
            .with_attributes(AttributeMode::Untyped)
            .with_standard_prefixes(true),
        WriterOptions::default().with_max_depth(0).with_indent(0),
        WriterOptions::default()
            .with_base_uri("http://example.org/")
            .with_lang("en"),
        WriterOptions::default().with_default_namespace("http://example.org/"),
        WriterOptions::default()
            .with_prefix("ex", "http://example.org/")
            .with_default_namespace("http://example.org/terms/"),
    ]
}

fn assert_round_trips(graph: &Graph) {
    for options in option_sets() {
        assert_round_trips_with(graph, options);
    }
}

fn assert_round_trips_with(graph: &Graph, options: WriterOptions) -> String {
    let xml = RdfXmlWriter::new(options.clone()).write_to_string(graph).unwrap();
    let reread = RdfXmlParser::new(ReaderOptions::new().with_validate(true))
        .parse_str(&xml)
        .unwrap_or_else(|e| panic!("{}\n{}", e, xml));
    assert!(
        graph.is_isomorphic(&reread),
        "not isomorphic with {:?}:\n{}",
        options,
        xml
    );
    xml
}

fn parse(body: &str) -> Graph {
    RdfXmlParser::default().parse_str(&document(body)).unwrap()
}

#[test]
fn test_round_trip_descriptions() {
    assert_round_trips(&parse(
        r#"<ex:Person rdf:about="http://example.org/joe" ex:age="42">
             <ex:name>Joe</ex:name>
             <ex:name xml:lang="en">Joseph</ex:name>
             <dc:title>Mr</dc:title>
             <ex:knows>
               <ex:Person rdf:about="http://example.org/ann">
                 <ex:height rdf:datatype="http://www.w3.org/2001/XMLSchema#decimal">1.7</ex:height>
               </ex:Person>
             </ex:knows>
             <ex:empty/>
             <ex:multi>line one
line two</ex:multi>
           </ex:Person>"#,
    ));
}

#[test]
fn test_round_trip_blank_nodes() {
    assert_round_trips(&parse(
        r#"<rdf:Description rdf:about="http://example.org/a">
             <ex:address rdf:parseType="Resource">
               <ex:city>Paris</ex:city>
               <ex:geo rdf:parseType="Resource"><ex:lat>48.8</ex:lat></ex:geo>
             </ex:address>
             <ex:shared rdf:nodeID="s"/>
             <ex:leaf rdf:parseType="Resource"/>
           </rdf:Description>
           <rdf:Description rdf:about="http://example.org/b">
             <ex:shared rdf:nodeID="s"/>
           </rdf:Description>
           <rdf:Description rdf:nodeID="s">
             <ex:name>shared</ex:name>
           </rdf:Description>"#,
    ));
}

#[test]
fn test_round_trip_blank_node_cycle() {
    let (a, b) = (BlankNode::new(), BlankNode::new());
    let graph: Graph = vec![
        Triple::new(a.clone(), ex("next"), b.clone()),
        Triple::new(b.clone(), ex("next"), a.clone()),
        Triple::new(a, ex("name"), Literal::new_simple_literal("a")),
    ]
    .into_iter()
    .collect();
    assert_round_trips(&graph);
}

#[test]
fn test_round_trip_collections_and_containers() {
    assert_round_trips(&parse(
        r#"<rdf:Description rdf:about="http://example.org/list">
             <ex:members rdf:parseType="Collection">
               <rdf:Description rdf:about="http://example.org/a"/>
               <ex:Thing><ex:name>anonymous</ex:name></ex:Thing>
               <rdf:Description rdf:about="http://example.org/c"/>
             </ex:members>
             <ex:none rdf:parseType="Collection"/>
           </rdf:Description>
           <rdf:Seq rdf:about="http://example.org/seq">
             <rdf:li>one</rdf:li>
             <rdf:li rdf:resource="http://example.org/two"/>
           </rdf:Seq>"#,
    ));
}

#[test]
fn test_round_trip_reification_and_xml_literals() {
    let xml = format!(
        r#"<rdf:RDF xmlns:rdf="{}" xmlns:ex="http://example.org/" xml:base="http://example.org/doc">
             <rdf:Description rdf:about="http://example.org/a">
               <ex:says rdf:ID="s1">hello</ex:says>
               <ex:body rdf:parseType="Literal">x &amp; y</ex:body>
             </rdf:Description>
           </rdf:RDF>"#,
        RDF_NS
    );
    let graph = RdfXmlParser::default().parse_str(&xml).unwrap();
    assert_eq!(graph.len(), 6);
    assert_round_trips(&graph);
}

#[test]
fn test_round_trip_xml_literal_markup() {
    let graph = parse(
        r#"<rdf:Description rdf:about="http://example.org/a">
             <ex:body rdf:parseType="Literal"><b>x</b> and <ex:i dc:note="n">y</ex:i></ex:body>
           </rdf:Description>"#,
    );
    let objects = graph.objects_for(&ex("a").into(), &ex("body").into());
    let [RdfObject::Literal(body)] = objects.as_slice() else {
        panic!("expected one literal, got {:?}", objects);
    };
    assert_eq!(
        body.value(),
        r#"<b>x</b> and <ex:i xmlns:dc="http://purl.org/dc/terms/" xmlns:ex="http://example.org/" dc:note="n">y</ex:i>"#
    );
    assert_round_trips(&graph);

    let built: Graph = vec![Triple::new(
        ex("a"),
        ex("body"),
        Literal::new_typed_literal("<b>x</b>", NamedNode::new(RDF_XML_LITERAL).unwrap()),
    )]
    .into_iter()
    .collect();
    assert_round_trips(&built);

    let xml = assert_round_trips_with(
        &built,
        WriterOptions::default()
            .with_prefix("ex", "http://example.org/")
            .with_base_uri("http://example.org/doc"),
    );
    assert!(xml.contains(r#"<ex:body rdf:parseType="Literal" xmlns=""><b>x</b></ex:body>"#));
}

#[test]
fn test_round_trip_literal_types() {
    let graph: Graph = vec![
        Triple::new(
            ex("a"),
            NamedNode::new(RDF_TYPE).unwrap(),
            Literal::new_simple_literal("foo"),
        ),
        Triple::new(ex("a"), ex("name"), Literal::new_simple_literal("A")),
    ]
    .into_iter()
    .collect();
    assert_round_trips(&graph);

    for mode in [AttributeMode::Untyped, AttributeMode::Typed] {
        let options = WriterOptions::default()
            .with_prefix("ex", "http://example.org/")
            .with_attributes(mode);
        let xml = assert_round_trips_with(&graph, options);
        assert!(xml.contains("<rdf:type>foo</rdf:type>"), "{}", xml);
        assert!(xml.contains(r#"ex:name="A""#), "{}", xml);
    }
}

#[test]
fn test_round_trip_deep_nesting() {
    let mut graph = Graph::new();
    let nodes: Vec<BlankNode> = (0..15).map(|_| BlankNode::new()).collect();
    graph.insert(Triple::new(ex("root"), ex("child"), nodes[0].clone()));
    for (i, pair) in nodes.windows(2).enumerate() {
        graph.insert(Triple::new(pair[0].clone(), ex("child"), pair[1].clone()));
        graph.insert(Triple::new(
            pair[0].clone(),
            ex("depth"),
            Literal::new_simple_literal(i.to_string()),
        ));
    }
    assert_round_trips(&graph);
}
