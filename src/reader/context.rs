//! Evaluation context inherited down the element tree

use oxiri::Iri;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{RdfXmlError, RdfXmlResult};
use crate::rdf::types::RdfSubject;
use crate::rdf::vocab::XML_NS;
use crate::xml::{QualifiedName, XmlNode};

/// Base, subject, language and namespaces in effect at one element
///
/// A context is derived for every element the reader descends into and is
/// never shared between siblings; only the `li` counter of a node element's
/// own context advances while its property elements are read.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    /// Base IRI for relative references
    pub base: Option<Iri<String>>,
    /// Subject that property elements attach to
    pub subject: Option<RdfSubject>,
    /// Active `xml:lang`, `None` when unset or reset with `xml:lang=""`
    pub language: Option<String>,
    /// In-scope prefix → namespace mappings (`""` is the default namespace)
    pub namespaces: Rc<BTreeMap<String, String>>,
    /// Last `rdf:li` index used under the current node element
    pub li_counter: u64,
}

impl EvalContext {
    /// Context at the top of a document
    pub fn new(base: Option<Iri<String>>) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    /// Resolve the `xml:base` of `element` against the inherited base
    ///
    /// Returns the inherited base when the element does not set one.
    pub fn element_base<N: XmlNode>(&self, element: &N) -> RdfXmlResult<Option<Iri<String>>> {
        let Some(value) = element.attribute(XML_NS, "base") else {
            return Ok(self.base.clone());
        };
        let resolved = match &self.base {
            Some(base) => base.resolve(value),
            None => Iri::parse(value.to_string()),
        };
        resolved.map(Some).map_err(|e| RdfXmlError::InvalidIri {
            iri: value.to_string(),
            path: element.attribute_path(&QualifiedName::new(
                Some(XML_NS.to_string()),
                "base",
                Some("xml".to_string()),
            )),
            message: e.to_string(),
        })
    }

    /// Context for a child element, with `base` already resolved
    pub fn descend<N: XmlNode>(&self, element: &N, base: Option<Iri<String>>) -> Self {
        let language = match element.attribute(XML_NS, "lang") {
            Some("") => None,
            Some(lang) => Some(lang.to_string()),
            None => self.language.clone(),
        };

        let declarations = element.namespace_declarations();
        let namespaces = if declarations.is_empty() {
            Rc::clone(&self.namespaces)
        } else {
            let mut namespaces = (*self.namespaces).clone();
            for (prefix, namespace) in declarations {
                namespaces.insert(prefix.clone(), namespace.clone());
            }
            Rc::new(namespaces)
        };

        Self {
            base,
            subject: self.subject.clone(),
            language,
            namespaces,
            li_counter: self.li_counter,
        }
    }

    /// Start a node element's property list for `subject`
    pub fn with_subject(mut self, subject: RdfSubject) -> Self {
        self.subject = Some(subject);
        self.li_counter = 0;
        self
    }

    /// Next `rdf:li` index, starting at 1
    pub fn next_li(&mut self) -> u64 {
        self.li_counter += 1;
        self.li_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    #[test]
    fn test_descend_inherits_and_overrides() {
        let doc = Document::parse(
            r#"<a xmlns:ex="http://example.org/" xml:lang="en" xml:base="http://example.org/dir/">
                 <b xml:lang="" xml:base="sub/" xmlns:ex="http://example.com/"/>
                 <c/>
               </a>"#,
        )
        .unwrap();
        let a = doc.root().unwrap();
        let children = a.element_children();

        let top = EvalContext::new(None);
        let base = top.element_base(&a).unwrap();
        let ctx_a = top.descend(&a, base);
        assert_eq!(ctx_a.language.as_deref(), Some("en"));
        assert_eq!(ctx_a.namespaces.get("ex").unwrap(), "http://example.org/");

        let base = ctx_a.element_base(&children[0]).unwrap();
        let ctx_b = ctx_a.descend(&children[0], base);
        assert_eq!(ctx_b.language, None);
        assert_eq!(ctx_b.base.as_ref().unwrap().as_str(), "http://example.org/dir/sub/");
        assert_eq!(ctx_b.namespaces.get("ex").unwrap(), "http://example.com/");

        let base = ctx_a.element_base(&children[1]).unwrap();
        let ctx_c = ctx_a.descend(&children[1], base);
        assert_eq!(ctx_c.language.as_deref(), Some("en"));
        assert!(Rc::ptr_eq(&ctx_a.namespaces, &ctx_c.namespaces));
        // siblings never see each other's declarations
        assert_eq!(ctx_a.namespaces.get("ex").unwrap(), "http://example.org/");
    }

    #[test]
    fn test_relative_base_without_parent_base() {
        let doc = Document::parse(r#"<a xml:base="relative/"/>"#).unwrap();
        let err = EvalContext::new(None)
            .element_base(&doc.root().unwrap())
            .unwrap_err();
        assert!(matches!(err, RdfXmlError::InvalidIri { .. }));
    }

    #[test]
    fn test_li_counter() {
        let mut ctx = EvalContext::new(None).with_subject(RdfSubject::from(
            crate::rdf::types::BlankNode::new(),
        ));
        assert_eq!(ctx.next_li(), 1);
        assert_eq!(ctx.next_li(), 2);
        let fresh = ctx.clone().with_subject(RdfSubject::from(
            crate::rdf::types::BlankNode::new(),
        ));
        assert_eq!(fresh.li_counter, 0);
    }
}
