//! Graph to element tree rendering

use oxiri::Iri;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use super::scheduler::SubjectScheduler;
use super::{AttributeMode, WriterOptions};
use crate::error::{RdfXmlError, RdfXmlResult};
use crate::rdf::types::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use crate::rdf::vocab::{self, RDF_FIRST, RDF_NIL, RDF_NS, RDF_REST, RDF_TYPE, XML_NS};
use crate::rdf::{Graph, QName, QNameRegistry};
use crate::xml::{Document, Element};

/// State for writing one graph
pub(crate) struct Renderer<'g, 'o> {
    options: &'o WriterOptions,
    scheduler: SubjectScheduler<'g>,
    registry: QNameRegistry,
    base: Option<Iri<String>>,
    /// Output labels for blank nodes, `b0`, `b1`, ... in order of first use
    blank_labels: FxHashMap<BlankNode, String>,
}

impl<'g, 'o> Renderer<'g, 'o> {
    pub fn new(options: &'o WriterOptions, graph: &'g Graph) -> RdfXmlResult<Self> {
        let base = match &options.base_uri {
            Some(base) => Some(Iri::parse(base.clone()).map_err(|e| RdfXmlError::InvalidIri {
                iri: base.clone(),
                path: String::new(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let mut registry = QNameRegistry::new()
            .with_standard_prefixes(options.standard_prefixes)
            .with_base(options.base_uri.clone())
            .with_default_namespace(options.default_namespace.clone());
        registry.bind("rdf", RDF_NS);
        for (prefix, namespace) in &options.prefixes {
            registry.add_prefix(prefix.clone(), namespace.clone());
        }

        Ok(Self {
            options,
            scheduler: SubjectScheduler::new(graph),
            registry,
            base,
            blank_labels: FxHashMap::default(),
        })
    }

    /// Number of namespace bindings declared on the document element
    pub fn binding_count(&self) -> usize {
        self.registry.bindings().count()
    }

    /// Render every subject under an `rdf:RDF` element
    pub fn render(&mut self) -> RdfXmlResult<Element> {
        let order = self
            .scheduler
            .ordered_subjects(self.options.base_uri.as_deref(), &self.options.top_classes);
        trace!(subjects = self.scheduler.subject_count(), "rendering subjects");

        let mut body = Vec::with_capacity(order.len());
        for subject in order {
            if self.scheduler.is_emitted(subject) {
                continue;
            }
            body.push(self.subject_element(subject, 0)?);
        }

        // bindings are only known once every name has been minted
        let mut root = Element::new("rdf:RDF");
        for (prefix, namespace) in self.registry.bindings() {
            if prefix.is_empty() {
                root.set_attribute("xmlns", namespace);
            } else {
                root.set_attribute(format!("xmlns:{}", prefix), namespace);
            }
        }
        if let Some(base) = &self.options.base_uri {
            root.set_attribute("xml:base", base.as_str());
        }
        if let Some(lang) = &self.options.lang {
            root.set_attribute("xml:lang", lang.as_str());
        }
        for element in body {
            root.push_element(element);
        }
        Ok(root)
    }

    fn subject_element(&mut self, subject: &RdfSubject, depth: usize) -> RdfXmlResult<Element> {
        self.scheduler.mark_emitted(subject);
        let triples: Vec<&'g Triple> = self.scheduler.triples_for(subject).to_vec();

        let mut types: Vec<&'g NamedNode> = triples
            .iter()
            .filter(|t| t.predicate.as_str() == RDF_TYPE)
            .filter_map(|t| match &t.object {
                RdfObject::NamedNode(class) => Some(class),
                _ => None,
            })
            .collect();
        types.sort();
        let tag_type = types
            .first()
            .copied()
            .and_then(|class| self.type_tag(class).map(|tag| (class, tag)));

        let mut element = match &tag_type {
            Some((_, tag)) => Element::new(tag.clone()),
            None => Element::new("rdf:Description"),
        };
        match subject {
            RdfSubject::NamedNode(node) => {
                element.set_attribute("rdf:about", self.relative(node.as_str()));
            }
            RdfSubject::BlankNode(node) => {
                let refs = self.scheduler.ref_count(subject);
                if (depth == 0 && refs > 0) || refs > 1 {
                    element.set_attribute("rdf:nodeID", self.blank_label(node));
                }
            }
        }

        let mut groups: Vec<(&'g RdfPredicate, Vec<&'g RdfObject>)> = Vec::new();
        for triple in &triples {
            let is_tag = match (&tag_type, &triple.object) {
                (Some((class, _)), RdfObject::NamedNode(object)) => {
                    triple.predicate.as_str() == RDF_TYPE && object == *class
                }
                _ => false,
            };
            if is_tag {
                continue;
            }
            match groups.iter_mut().find(|(p, _)| *p == &triple.predicate) {
                Some((_, objects)) => objects.push(&triple.object),
                None => groups.push((&triple.predicate, vec![&triple.object])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| {
            (predicate_rank(a.as_str()), a.as_str()).cmp(&(predicate_rank(b.as_str()), b.as_str()))
        });

        for (predicate, mut objects) in groups {
            let Some(name) = self.property_name(predicate)? else {
                continue;
            };
            objects.sort();
            if let [RdfObject::Literal(literal)] = objects.as_slice() {
                if self.attribute_eligible(&name, literal) {
                    element.set_attribute(name.to_string(), literal.value());
                    continue;
                }
            }
            for object in objects {
                let property = self.property_element(&name, object, depth)?;
                element.push_element(property);
            }
        }
        Ok(element)
    }

    /// Element name for a type, when the type can stand in for `rdf:Description`
    fn type_tag(&mut self, class: &NamedNode) -> Option<String> {
        let iri = class.as_str();
        if iri == vocab::RDF_DESCRIPTION || !vocab::is_node_element_name(iri) {
            return None;
        }
        self.registry.qname(iri).ok().map(|qname| qname.to_string())
    }

    /// Qualified name for a predicate; `None` drops its statements
    fn property_name(&mut self, predicate: &RdfPredicate) -> RdfXmlResult<Option<QName>> {
        let iri = predicate.as_str();
        let result = if iri == vocab::RDF_LI || !vocab::is_property_element_name(iri) {
            Err(RdfXmlError::UnsupportedTerm(format!(
                "<{}> cannot be written as a property element",
                iri
            )))
        } else {
            self.registry.qname(iri)
        };
        match result {
            Ok(name) => Ok(Some(name)),
            Err(error) if !self.options.strict => {
                warn!(%error, "dropping statements without an RDF/XML form");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn attribute_eligible(&self, name: &QName, literal: &Literal) -> bool {
        // rdf:type attribute values are read back as IRIs
        if !name.is_prefixed() || name.namespace == XML_NS || name.iri() == RDF_TYPE {
            return false;
        }
        if !same_language(literal.language(), self.options.lang.as_deref()) {
            return false;
        }
        if literal.value().contains(&['\n', '\r', '\t'][..]) {
            return false;
        }
        match self.options.attributes {
            AttributeMode::None => false,
            AttributeMode::Untyped => !literal.has_datatype(),
            AttributeMode::Typed => !literal.is_xml_literal(),
        }
    }

    fn property_element(
        &mut self,
        name: &QName,
        object: &'g RdfObject,
        depth: usize,
    ) -> RdfXmlResult<Element> {
        let mut element = Element::new(name.to_string());
        match object {
            RdfObject::Literal(literal) => self.literal_content(&mut element, name, literal),
            RdfObject::NamedNode(node) => {
                let subject = RdfSubject::NamedNode(node.clone());
                if self.can_embed(&subject, depth) {
                    let nested = self.subject_element(&subject, depth + 1)?;
                    element.push_element(nested);
                } else {
                    element.set_attribute("rdf:resource", self.relative(node.as_str()));
                }
            }
            RdfObject::BlankNode(node) => {
                let subject = RdfSubject::BlankNode(node.clone());
                if let Some(items) = self.collection_items(node) {
                    element.set_attribute("rdf:parseType", "Collection");
                    for item in items {
                        let item = self.collection_item(&item, depth)?;
                        element.push_element(item);
                    }
                } else if self.can_embed(&subject, depth) {
                    let nested = self.subject_element(&subject, depth + 1)?;
                    element.push_element(nested);
                } else if !self.scheduler.is_subject(&subject) && self.scheduler.ref_count(&subject) == 1 {
                    element.set_attribute("rdf:parseType", "Resource");
                } else {
                    element.set_attribute("rdf:nodeID", self.blank_label(node));
                }
            }
        }
        Ok(element)
    }

    fn literal_content(&self, element: &mut Element, name: &QName, literal: &Literal) {
        let value = literal.value();
        // Markup under an unprefixed property would land in the default namespace
        if literal.is_xml_literal() && name.is_prefixed() && is_well_formed_markup(value) {
            element.set_attribute("rdf:parseType", "Literal");
            if self.registry.default_namespace().is_some() {
                element.set_attribute("xmlns", "");
            }
            if self.options.lang.is_some() {
                element.set_attribute("xml:lang", "");
            }
            if !value.is_empty() {
                element.push_markup(value);
            }
            return;
        }

        match literal.language() {
            Some(language) => {
                if !same_language(Some(language), self.options.lang.as_deref()) {
                    element.set_attribute("xml:lang", language);
                }
            }
            None => {
                if self.options.lang.is_some() {
                    element.set_attribute("xml:lang", "");
                }
                if literal.has_datatype() {
                    element.set_attribute("rdf:datatype", literal.datatype().as_str());
                }
            }
        }
        if !value.is_empty() {
            element.push_text(value);
        }
    }

    /// Items of a well-formed list starting at `head`, marking its cells emitted
    ///
    /// Every cell must be an unemitted blank node referenced exactly once and
    /// carrying only `rdf:first` and `rdf:rest`; items must not be literals.
    fn collection_items(&mut self, head: &BlankNode) -> Option<Vec<RdfSubject>> {
        let mut items = Vec::new();
        let mut cells: Vec<RdfSubject> = Vec::new();
        let mut current = RdfSubject::BlankNode(head.clone());
        loop {
            if self.scheduler.is_emitted(&current)
                || self.scheduler.ref_count(&current) != 1
                || cells.contains(&current)
            {
                return None;
            }
            let triples = self.scheduler.triples_for(&current);
            if triples.len() != 2 {
                return None;
            }
            let (mut first, mut rest) = (None, None);
            for triple in triples {
                match triple.predicate.as_str() {
                    RDF_FIRST => first = Some(&triple.object),
                    RDF_REST => rest = Some(&triple.object),
                    _ => return None,
                }
            }
            let (Some(first), Some(rest)) = (first, rest) else {
                return None;
            };
            items.push(first.as_subject()?);
            cells.push(current);
            current = match rest {
                RdfObject::NamedNode(nil) if nil.as_str() == RDF_NIL => break,
                RdfObject::BlankNode(next) => RdfSubject::BlankNode(next.clone()),
                _ => return None,
            };
        }
        for cell in &cells {
            self.scheduler.mark_emitted(cell);
        }
        Some(items)
    }

    fn collection_item(&mut self, item: &RdfSubject, depth: usize) -> RdfXmlResult<Element> {
        if self.can_embed(item, depth) {
            return self.subject_element(item, depth + 1);
        }
        let mut element = Element::new("rdf:Description");
        match item {
            RdfSubject::NamedNode(node) => {
                element.set_attribute("rdf:about", self.relative(node.as_str()));
            }
            RdfSubject::BlankNode(node) => {
                if self.scheduler.is_subject(item) || self.scheduler.ref_count(item) > 1 {
                    element.set_attribute("rdf:nodeID", self.blank_label(node));
                }
            }
        }
        Ok(element)
    }

    fn can_embed(&self, subject: &RdfSubject, depth: usize) -> bool {
        depth < self.options.max_depth
            && self.scheduler.is_subject(subject)
            && !self.scheduler.is_emitted(subject)
    }

    fn blank_label(&mut self, node: &BlankNode) -> String {
        let next = self.blank_labels.len();
        self.blank_labels
            .entry(node.clone())
            .or_insert_with(|| format!("b{}", next))
            .clone()
    }

    fn relative(&self, iri: &str) -> String {
        self.base
            .as_ref()
            .and_then(|base| relativize(base, iri))
            .unwrap_or_else(|| iri.to_string())
    }
}

fn predicate_rank(iri: &str) -> u8 {
    match iri {
        RDF_TYPE => 0,
        vocab::RDFS_LABEL => 1,
        vocab::DC_TITLE | vocab::DC11_TITLE => 2,
        _ => 3,
    }
}

fn same_language(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn is_well_formed_markup(value: &str) -> bool {
    Document::parse(&format!("<literal>{}</literal>", value)).is_ok()
}

/// Shortest reference that resolves back to `iri` against `base`:
/// empty, a fragment, or a path below the base directory
fn relativize(base: &Iri<String>, iri: &str) -> Option<String> {
    let base_str = base.as_str();
    let document = base_str.split('#').next().unwrap_or(base_str);
    let candidate = if iri == document {
        String::new()
    } else if let Some(fragment) = iri.strip_prefix(document).filter(|r| r.starts_with('#')) {
        fragment.to_string()
    } else {
        let directory = &document[..document.rfind('/')? + 1];
        let rest = iri.strip_prefix(directory).filter(|r| !r.is_empty())?;
        rest.to_string()
    };
    let resolved = base.resolve(&candidate).ok()?;
    (resolved.as_str() == iri).then_some(candidate)
}
