//! Grammar evaluation: node elements, the property element productions,
//! reification and collections

use oxiri::Iri;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use super::context::EvalContext;
use super::literal::{canonical_form, xml_literal};
use super::shape::{
    node_element_name_error, property_element_name_error, ElementAttrs, PropertyShape, Violation,
};
use super::ReaderOptions;
use crate::error::RdfXmlError;
use crate::rdf::types::{BlankNode, Literal, NamedNode, RdfObject, RdfSubject, Triple};
use crate::rdf::vocab::{self, RDF_NS};
use crate::xml::names::is_nc_name;
use crate::xml::{XmlContent, XmlNode};

/// State of one parse: options, blank node cache and the triple sink
pub(crate) struct Engine<'o, F> {
    options: &'o ReaderOptions,
    base: Option<Iri<String>>,
    /// `rdf:nodeID` text → blank node, for this parse only
    blank_nodes: FxHashMap<String, BlankNode>,
    /// `rdf:ID` values already used, as resolved IRIs
    known_ids: FxHashSet<String>,
    /// (base, reference) → resolved IRI, filled when interning
    interned: FxHashMap<(String, String), NamedNode>,
    on_triple: F,
    emitted: usize,
}

impl<'o, F, E> Engine<'o, F>
where
    F: FnMut(Triple) -> Result<(), E>,
    E: From<RdfXmlError>,
{
    pub fn new(options: &'o ReaderOptions, base: Option<Iri<String>>, on_triple: F) -> Self {
        Self {
            options,
            base,
            blank_nodes: FxHashMap::default(),
            known_ids: FxHashSet::default(),
            interned: FxHashMap::default(),
            on_triple,
            emitted: 0,
        }
    }

    /// Number of triples delivered so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Evaluate a document or subtree
    pub fn parse_root<N: XmlNode>(&mut self, root: &N) -> Result<(), E> {
        let wrappers = find_wrappers(root);
        if wrappers.is_empty() {
            trace!(element = %root.name(), "no rdf:RDF wrapper, reading the root as a node element");
            let ctx = self.context_for(root)?;
            self.node_element(root, &ctx)?;
            return Ok(());
        }

        for wrapper in wrappers {
            let outer = self.context_for(&wrapper)?;
            let ctx = self.enter(&outer, &wrapper)?;
            let (attrs, violations) = ElementAttrs::classify(&wrapper);
            self.tolerate_all(violations)?;
            if attrs.describes_resource() || attrs.id.is_some() || attrs.about.is_some() {
                self.violation("rdf:RDF only allows namespace, xml:base and xml:lang attributes", wrapper.path())?;
            }
            for child in wrapper.children() {
                match child {
                    XmlContent::Element(node) => {
                        self.node_element(&node, &ctx)?;
                    }
                    XmlContent::Text(text) if !text.trim().is_empty() => {
                        self.violation("text is not allowed inside rdf:RDF", wrapper.path())?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Context in effect at `node`, rebuilt from its ancestors
    fn context_for<N: XmlNode>(&mut self, node: &N) -> Result<EvalContext, E> {
        let mut ctx = EvalContext::new(self.base.clone());
        for ancestor in node.ancestors().iter().rev() {
            ctx = self.enter(&ctx, ancestor)?;
        }
        Ok(ctx)
    }

    /// Derive the context for `element` from its parent's
    fn enter<N: XmlNode>(&mut self, parent: &EvalContext, element: &N) -> Result<EvalContext, E> {
        let base = match parent.element_base(element) {
            Ok(base) => base,
            Err(err) => {
                self.tolerate(err)?;
                parent.base.clone()
            }
        };
        let ctx = parent.descend(element, base);
        if let Some(language) = &ctx.language {
            if Literal::new_language_tagged_literal("", language.as_str()).is_err() {
                self.violation(format!("invalid language tag '{}'", language), element.path())?;
            }
        }
        Ok(ctx)
    }

    /// nodeElement: returns the subject the element describes
    fn node_element<N: XmlNode>(&mut self, element: &N, parent: &EvalContext) -> Result<RdfSubject, E> {
        let ctx = self.enter(parent, element)?;
        let name = element.name();
        let element_iri = name.iri();
        match &element_iri {
            Some(iri) => {
                if let Some(message) = node_element_name_error(iri) {
                    self.violation(message, element.path())?;
                }
            }
            None => self.violation(format!("unqualified element name '{}'", name), element.path())?,
        }

        let (attrs, violations) = ElementAttrs::classify(element);
        self.tolerate_all(violations)?;
        for (present, attribute) in [
            (attrs.resource.is_some(), "rdf:resource"),
            (attrs.datatype.is_some(), "rdf:datatype"),
            (attrs.parse_type.is_some(), "rdf:parseType"),
        ] {
            if present {
                self.violation(format!("{} is not allowed on a node element", attribute), element.path())?;
            }
        }

        let subject = self.node_subject(element, &attrs, &ctx)?;
        trace!(subject = %subject, element = %name, "node element");

        if let Some(iri) = element_iri {
            if iri != vocab::RDF_DESCRIPTION {
                self.emit(Triple::new(
                    subject.clone(),
                    NamedNode::new_unchecked(vocab::RDF_TYPE),
                    NamedNode::new_unchecked(iri),
                ))?;
            }
        }
        self.property_attributes(&subject, &attrs.property_attrs, &ctx, element)?;

        let mut ctx = ctx.with_subject(subject.clone());
        self.property_elements(element, &mut ctx)?;
        Ok(subject)
    }

    fn node_subject<N: XmlNode>(
        &mut self,
        element: &N,
        attrs: &ElementAttrs,
        ctx: &EvalContext,
    ) -> Result<RdfSubject, E> {
        let conflicts = [
            (attrs.id.is_some() && attrs.node_id.is_some(), "rdf:ID and rdf:nodeID"),
            (attrs.id.is_some() && attrs.about.is_some(), "rdf:ID and rdf:about"),
            (attrs.node_id.is_some() && attrs.about.is_some(), "rdf:nodeID and rdf:about"),
        ];
        for (conflict, pair) in conflicts {
            if conflict {
                self.violation(format!("{} cannot be used together", pair), element.path())?;
            }
        }

        if let Some(id) = &attrs.id {
            return Ok(self.rdf_id(id, ctx, element)?.into());
        }
        if let Some(node_id) = &attrs.node_id {
            return Ok(self.node_id(node_id, element)?.into());
        }
        if let Some(about) = &attrs.about {
            return Ok(self.resolve(about, ctx, element)?.into());
        }
        Ok(BlankNode::new().into())
    }

    fn property_elements<N: XmlNode>(&mut self, element: &N, ctx: &mut EvalContext) -> Result<(), E> {
        for child in element.children() {
            match child {
                XmlContent::Element(property) => self.property_element(&property, ctx)?,
                XmlContent::Text(text) if !text.trim().is_empty() => {
                    self.violation("text is not allowed between property elements", element.path())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// propertyElt: one of the six productions, chosen by [`PropertyShape`]
    fn property_element<N: XmlNode>(&mut self, element: &N, ctx: &mut EvalContext) -> Result<(), E> {
        let Some(subject) = ctx.subject.clone() else {
            return Ok(());
        };
        let Some(iri) = element.name().iri() else {
            self.violation(
                format!("unqualified property element '{}'", element.name()),
                element.path(),
            )?;
            return Ok(());
        };
        if let Some(message) = property_element_name_error(&iri) {
            self.violation(message, element.path())?;
        }
        let predicate = if iri == vocab::RDF_LI {
            NamedNode::new_unchecked(vocab::rdf_member(ctx.next_li()))
        } else {
            NamedNode::new_unchecked(iri)
        };

        let pctx = self.enter(ctx, element)?;
        let (attrs, violations) = ElementAttrs::classify(element);
        self.tolerate_all(violations)?;
        if attrs.about.is_some() {
            self.violation("rdf:about is not allowed on a property element", element.path())?;
        }
        if attrs.resource.is_some() && attrs.node_id.is_some() {
            self.violation("rdf:resource and rdf:nodeID cannot be used together", element.path())?;
        }
        let (shape, violations) = PropertyShape::classify(element, &attrs);
        self.tolerate_all(violations)?;

        let id = attrs.id.as_deref();
        match shape {
            PropertyShape::Resource { node } => {
                trace!(predicate = %predicate, "resource property element");
                let object = self.node_element(&node, &pctx)?;
                self.emit_reified(Triple::new(subject, predicate, object), id, &pctx, element)?;
            }
            PropertyShape::Literal { text } => {
                trace!(predicate = %predicate, "literal property element");
                let literal = self.literal(text, attrs.datatype.as_deref(), &pctx, element)?;
                self.emit_reified(Triple::new(subject, predicate, literal), id, &pctx, element)?;
            }
            PropertyShape::ParseTypeResource => {
                trace!(predicate = %predicate, "parseType=\"Resource\" property element");
                let node = BlankNode::new();
                self.emit_reified(Triple::new(subject, predicate, node.clone()), id, &pctx, element)?;
                let mut inner = pctx.with_subject(node.into());
                self.property_elements(element, &mut inner)?;
            }
            PropertyShape::Collection { items } => {
                trace!(predicate = %predicate, items = items.len(), "parseType=\"Collection\" property element");
                let mut members = Vec::with_capacity(items.len());
                for item in &items {
                    members.push(self.node_element(item, &pctx)?);
                }
                let cells: Vec<BlankNode> = members.iter().map(|_| BlankNode::new()).collect();
                let nil = NamedNode::new_unchecked(vocab::RDF_NIL);
                let head: RdfObject = match cells.first() {
                    Some(cell) => cell.clone().into(),
                    None => nil.clone().into(),
                };
                self.emit_reified(Triple::new(subject, predicate, head), id, &pctx, element)?;
                for (i, (cell, member)) in cells.iter().zip(members).enumerate() {
                    self.emit(Triple::new(
                        cell.clone(),
                        NamedNode::new_unchecked(vocab::RDF_FIRST),
                        member,
                    ))?;
                    let rest: RdfObject = match cells.get(i + 1) {
                        Some(next) => next.clone().into(),
                        None => nil.clone().into(),
                    };
                    self.emit(Triple::new(
                        cell.clone(),
                        NamedNode::new_unchecked(vocab::RDF_REST),
                        rest,
                    ))?;
                }
            }
            PropertyShape::XmlLiteral => {
                trace!(predicate = %predicate, "parseType=\"Literal\" property element");
                let literal = Literal::new_typed_literal(
                    xml_literal(element, &pctx),
                    NamedNode::new_unchecked(vocab::RDF_XML_LITERAL),
                );
                self.emit_reified(Triple::new(subject, predicate, literal), id, &pctx, element)?;
            }
            PropertyShape::Empty if !attrs.describes_resource() => {
                trace!(predicate = %predicate, "empty literal property element");
                let literal = self.literal(String::new(), attrs.datatype.as_deref(), &pctx, element)?;
                self.emit_reified(Triple::new(subject, predicate, literal), id, &pctx, element)?;
            }
            PropertyShape::Empty => {
                trace!(predicate = %predicate, "empty resource property element");
                if attrs.datatype.is_some() {
                    self.violation("rdf:datatype is only allowed on literal property elements", element.path())?;
                }
                let target: RdfSubject = if let Some(resource) = &attrs.resource {
                    self.resolve(resource, &pctx, element)?.into()
                } else if let Some(node_id) = &attrs.node_id {
                    self.node_id(node_id, element)?.into()
                } else {
                    BlankNode::new().into()
                };
                self.emit_reified(
                    Triple::new(subject, predicate, target.clone()),
                    id,
                    &pctx,
                    element,
                )?;
                self.property_attributes(&target, &attrs.property_attrs, &pctx, element)?;
            }
        }
        Ok(())
    }

    /// Property attributes of a node element or an empty property element
    fn property_attributes<N: XmlNode>(
        &mut self,
        subject: &RdfSubject,
        attributes: &[(String, String)],
        ctx: &EvalContext,
        element: &N,
    ) -> Result<(), E> {
        for (iri, value) in attributes {
            let object: RdfObject = if iri == vocab::RDF_TYPE {
                self.resolve(value, ctx, element)?.into()
            } else {
                self.plain_literal(value.clone(), ctx).into()
            };
            self.emit(Triple::new(subject.clone(), NamedNode::new_unchecked(iri.as_str()), object))?;
        }
        Ok(())
    }

    /// Emit a triple, then its reification when the property carries `rdf:ID`
    fn emit_reified<N: XmlNode>(
        &mut self,
        triple: Triple,
        id: Option<&str>,
        ctx: &EvalContext,
        element: &N,
    ) -> Result<(), E> {
        let Some(id) = id else {
            return self.emit(triple);
        };
        let statement = self.rdf_id(id, ctx, element)?;
        let Triple {
            subject,
            predicate,
            object,
        } = triple.clone();
        self.emit(triple)?;

        self.emit(Triple::new(
            statement.clone(),
            NamedNode::new_unchecked(vocab::RDF_TYPE),
            NamedNode::new_unchecked(vocab::RDF_STATEMENT),
        ))?;
        self.emit(Triple::new(
            statement.clone(),
            NamedNode::new_unchecked(vocab::RDF_SUBJECT),
            subject,
        ))?;
        self.emit(Triple::new(
            statement.clone(),
            NamedNode::new_unchecked(vocab::RDF_PREDICATE),
            NamedNode::from(predicate),
        ))?;
        self.emit(Triple::new(
            statement,
            NamedNode::new_unchecked(vocab::RDF_OBJECT),
            object,
        ))
    }

    /// `rdf:ID` as an IRI: the base with the id as fragment
    fn rdf_id<N: XmlNode>(&mut self, id: &str, ctx: &EvalContext, element: &N) -> Result<NamedNode, E> {
        if !is_nc_name(id) {
            self.violation(format!("rdf:ID value '{}' is not an NCName", id), element.path())?;
        }
        let iri = self.resolve(&format!("#{}", id), ctx, element)?;
        if !self.known_ids.insert(iri.as_str().to_string()) {
            self.violation(format!("rdf:ID '{}' is used more than once", id), element.path())?;
        }
        Ok(iri)
    }

    fn node_id<N: XmlNode>(&mut self, node_id: &str, element: &N) -> Result<BlankNode, E> {
        if !is_nc_name(node_id) {
            self.violation(
                format!("rdf:nodeID value '{}' is not an NCName", node_id),
                element.path(),
            )?;
        }
        Ok(self
            .blank_nodes
            .entry(node_id.to_string())
            .or_default()
            .clone())
    }

    /// Resolve an IRI reference; when tolerated, unresolvable references are kept verbatim
    fn resolve<N: XmlNode>(&mut self, reference: &str, ctx: &EvalContext, element: &N) -> Result<NamedNode, E> {
        let key = (
            ctx.base.as_ref().map(|base| base.as_str().to_string()).unwrap_or_default(),
            reference.to_string(),
        );
        if self.options.intern {
            if let Some(iri) = self.interned.get(&key) {
                return Ok(iri.clone());
            }
        }

        let resolved = match &ctx.base {
            Some(base) => base.resolve(reference),
            None => Iri::parse(reference.to_string()),
        };
        let iri = match resolved {
            Ok(iri) => NamedNode::new_unchecked(iri.into_inner()),
            Err(e) => {
                self.tolerate(RdfXmlError::InvalidIri {
                    iri: reference.to_string(),
                    path: element.path(),
                    message: e.to_string(),
                })?;
                NamedNode::new_unchecked(reference)
            }
        };
        if self.options.intern {
            self.interned.insert(key, iri.clone());
        }
        Ok(iri)
    }

    fn literal<N: XmlNode>(
        &mut self,
        text: String,
        datatype: Option<&str>,
        ctx: &EvalContext,
        element: &N,
    ) -> Result<Literal, E> {
        match datatype {
            Some(datatype) => {
                let datatype = self.resolve(datatype, ctx, element)?;
                let value = if self.options.canonicalize {
                    canonical_form(&text, datatype.as_str())
                } else {
                    text
                };
                Ok(Literal::new_typed_literal(value, datatype))
            }
            None => Ok(self.plain_literal(text, ctx)),
        }
    }

    fn plain_literal(&self, value: String, ctx: &EvalContext) -> Literal {
        match &ctx.language {
            Some(language) => Literal::new_language_tagged_literal_unchecked(value, language.as_str()),
            None => Literal::new_simple_literal(value),
        }
    }

    fn emit(&mut self, triple: Triple) -> Result<(), E> {
        self.emitted += 1;
        (self.on_triple)(triple)
    }

    fn violation(&mut self, message: impl Into<String>, path: String) -> Result<(), E> {
        self.tolerate(RdfXmlError::grammar(message, path))
    }

    fn tolerate_all(&mut self, violations: Vec<Violation>) -> Result<(), E> {
        for violation in violations {
            self.violation(violation.message, violation.path)?;
        }
        Ok(())
    }

    /// Fail when validating, otherwise log and carry on
    fn tolerate(&mut self, error: RdfXmlError) -> Result<(), E> {
        if self.options.validate {
            return Err(error.into());
        }
        warn!(%error, "ignoring invalid RDF/XML");
        Ok(())
    }
}

/// `rdf:RDF` elements, outermost only, in document order
fn find_wrappers<N: XmlNode>(root: &N) -> Vec<N> {
    if root.name().is(RDF_NS, "RDF") {
        return vec![root.clone()];
    }
    root.element_children()
        .iter()
        .flat_map(|child| find_wrappers(child))
        .collect()
}
