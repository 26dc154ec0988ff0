//! Subject ordering and emission bookkeeping for one serialization

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::rdf::types::{NamedNode, RdfObject, RdfSubject, Triple};
use crate::rdf::vocab;
use crate::rdf::Graph;

/// Reference counts, emitted set and per-subject statements
pub(crate) struct SubjectScheduler<'g> {
    /// Statements grouped by subject, subjects in first-seen order
    by_subject: IndexMap<&'g RdfSubject, Vec<&'g Triple>>,
    /// How often each IRI or blank node occurs as an object
    ref_counts: FxHashMap<RdfSubject, usize>,
    emitted: FxHashSet<RdfSubject>,
}

impl<'g> SubjectScheduler<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut by_subject: IndexMap<&RdfSubject, Vec<&Triple>> = IndexMap::new();
        let mut ref_counts = FxHashMap::default();
        for triple in graph.iter() {
            by_subject.entry(&triple.subject).or_default().push(triple);
            if let Some(object) = triple.object.as_subject() {
                *ref_counts.entry(object).or_default() += 1;
            }
        }
        Self {
            by_subject,
            ref_counts,
            emitted: FxHashSet::default(),
        }
    }

    /// Number of distinct subjects
    pub fn subject_count(&self) -> usize {
        self.by_subject.len()
    }

    /// Emission order: the base subject, subjects typed with a top class
    /// (per class, sorted), then the rest by (blank node, incoming
    /// references, term), first-seen order breaking ties
    pub fn ordered_subjects(&self, base: Option<&str>, top_classes: &[String]) -> Vec<&'g RdfSubject> {
        let mut ordered = Vec::with_capacity(self.by_subject.len());
        let mut placed: FxHashSet<&RdfSubject> = FxHashSet::default();

        if let Some(base) = base {
            let base_subject = RdfSubject::NamedNode(NamedNode::new_unchecked(base));
            if let Some((subject, _)) = self.by_subject.get_key_value(&base_subject) {
                ordered.push(*subject);
                placed.insert(*subject);
            }
        }

        for class in top_classes {
            let class = RdfObject::NamedNode(NamedNode::new_unchecked(class.as_str()));
            let mut members: Vec<&'g RdfSubject> = self
                .by_subject
                .iter()
                .filter(|(subject, triples)| {
                    !placed.contains(**subject)
                        && triples.iter().any(|t| {
                            t.predicate.as_str() == vocab::RDF_TYPE && t.object == class
                        })
                })
                .map(|(subject, _)| *subject)
                .collect();
            members.sort();
            for member in members {
                placed.insert(member);
                ordered.push(member);
            }
        }

        let mut rest: Vec<&'g RdfSubject> = self
            .by_subject
            .keys()
            .filter(|subject| !placed.contains(**subject))
            .copied()
            .collect();
        rest.sort_by(|a, b| {
            (a.is_blank_node(), self.ref_count(a), *a).cmp(&(b.is_blank_node(), self.ref_count(b), *b))
        });
        ordered.extend(rest);
        ordered
    }

    /// Statements with `subject` as subject, in graph order
    pub fn triples_for(&self, subject: &RdfSubject) -> &[&'g Triple] {
        self.by_subject
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if the term has statements of its own
    pub fn is_subject(&self, subject: &RdfSubject) -> bool {
        self.by_subject.contains_key(subject)
    }

    /// Occurrences of the term as an object
    pub fn ref_count(&self, subject: &RdfSubject) -> usize {
        self.ref_counts.get(subject).copied().unwrap_or(0)
    }

    pub fn is_emitted(&self, subject: &RdfSubject) -> bool {
        self.emitted.contains(subject)
    }

    /// Mark a subject as emitted, returning false if it already was
    pub fn mark_emitted(&mut self, subject: &RdfSubject) -> bool {
        self.emitted.insert(subject.clone())
    }
}
