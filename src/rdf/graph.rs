//! In-memory RDF graph
//!
//! A set of triples that remembers first-seen order. Duplicate inserts
//! collapse; iteration order is insertion order, which the writer uses as
//! its final tie-break when ordering subjects.

use super::types::{BlankNode, RdfObject, RdfPredicate, RdfSubject, RdfTerm, Triple};
use crate::error::RdfXmlResult;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};

/// RDF graph with set semantics
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// All triples, in first-seen order
    triples: IndexSet<Triple>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            triples: IndexSet::new(),
        }
    }

    /// Insert a triple, returning false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Insert a generalized statement, rejecting literal subjects and non-IRI predicates
    pub fn try_insert_terms(
        &mut self,
        subject: RdfTerm,
        predicate: RdfTerm,
        object: RdfTerm,
    ) -> RdfXmlResult<bool> {
        Ok(self.insert(Triple::try_from_terms(subject, predicate, object)?))
    }

    /// Remove a triple, keeping the order of the remaining ones
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.shift_remove(triple)
    }

    /// Check if a triple exists in the graph
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Clear all triples
    pub fn clear(&mut self) {
        self.triples.clear();
    }

    /// Iterate over triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Get triples with a specific subject
    pub fn triples_for_subject<'a>(
        &'a self,
        subject: &'a RdfSubject,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Get triples with a specific predicate
    pub fn triples_for_predicate<'a>(
        &'a self,
        predicate: &'a RdfPredicate,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.predicate == predicate)
    }

    /// Get triples with a specific object
    pub fn triples_for_object<'a>(
        &'a self,
        object: &'a RdfObject,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.object == object)
    }

    /// Objects of all triples matching a subject and predicate
    pub fn objects_for(&self, subject: &RdfSubject, predicate: &RdfPredicate) -> Vec<&RdfObject> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Distinct subjects in first-seen order
    pub fn subjects(&self) -> Vec<&RdfSubject> {
        let mut seen = FxHashSet::default();
        self.triples
            .iter()
            .map(|t| &t.subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Check if two graphs are equal up to blank node renaming
    pub fn is_isomorphic(&self, other: &Graph) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let (ground, blank_triples) = self.partition_ground();
        let (other_ground, other_blank_triples) = other.partition_ground();
        if ground.len() != other_ground.len() || !ground.iter().all(|t| other.contains(t)) {
            return false;
        }

        let colors = blank_colors(&blank_triples);
        let other_colors = blank_colors(&other_blank_triples);
        let mut histogram: Vec<u64> = colors.values().copied().collect();
        let mut other_histogram: Vec<u64> = other_colors.values().copied().collect();
        histogram.sort_unstable();
        other_histogram.sort_unstable();
        if histogram != other_histogram {
            return false;
        }

        // Rarest colors first keeps the search narrow
        let mut class_sizes: FxHashMap<u64, usize> = FxHashMap::default();
        for color in colors.values() {
            *class_sizes.entry(*color).or_default() += 1;
        }
        let mut nodes: Vec<&BlankNode> = colors.keys().copied().collect();
        nodes.sort_by(|a, b| {
            class_sizes[&colors[*a]]
                .cmp(&class_sizes[&colors[*b]])
                .then_with(|| a.cmp(b))
        });

        let mut incident: FxHashMap<&BlankNode, Vec<&Triple>> = FxHashMap::default();
        for triple in blank_triples.iter().copied() {
            for node in blank_nodes_of(triple) {
                incident.entry(node).or_default().push(triple);
            }
        }

        let mut search = IsomorphismSearch {
            nodes: &nodes,
            colors: &colors,
            other_colors: &other_colors,
            incident: &incident,
            target: other,
            mapping: FxHashMap::default(),
            used: FxHashSet::default(),
        };
        search.extend(0)
    }

    fn partition_ground(&self) -> (Vec<&Triple>, Vec<&Triple>) {
        self.triples
            .iter()
            .partition(|t| blank_nodes_of(t).is_empty())
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

fn blank_nodes_of(triple: &Triple) -> Vec<&BlankNode> {
    let mut nodes = Vec::with_capacity(2);
    if let RdfSubject::BlankNode(b) = &triple.subject {
        nodes.push(b);
    }
    if let RdfObject::BlankNode(b) = &triple.object {
        nodes.push(b);
    }
    nodes
}

fn hash_of(value: impl Hash) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Colour refinement over the blank-node neighbourhoods
fn blank_colors<'a>(triples: &[&'a Triple]) -> FxHashMap<&'a BlankNode, u64> {
    let mut colors: FxHashMap<&BlankNode, u64> = FxHashMap::default();
    for triple in triples {
        for node in blank_nodes_of(triple) {
            colors.insert(node, 0);
        }
    }

    let mut distinct = 1;
    for _ in 0..colors.len().max(1) {
        let mut signatures: FxHashMap<&BlankNode, Vec<u64>> = FxHashMap::default();
        for triple in triples {
            let subject_sig = match &triple.subject {
                RdfSubject::BlankNode(b) => colors[b],
                RdfSubject::NamedNode(n) => hash_of(n),
            };
            let object_sig = match &triple.object {
                RdfObject::BlankNode(b) => colors[b],
                other => hash_of(other),
            };
            let predicate_sig = hash_of(&triple.predicate);
            if let RdfSubject::BlankNode(b) = &triple.subject {
                signatures
                    .entry(b)
                    .or_default()
                    .push(hash_of((0u8, predicate_sig, object_sig)));
            }
            if let RdfObject::BlankNode(b) = &triple.object {
                signatures
                    .entry(b)
                    .or_default()
                    .push(hash_of((1u8, predicate_sig, subject_sig)));
            }
        }

        let refined: FxHashMap<&BlankNode, u64> = signatures
            .into_iter()
            .map(|(node, mut sig)| {
                sig.sort_unstable();
                (node, hash_of((colors[node], sig)))
            })
            .collect();
        let refined_distinct = refined.values().collect::<FxHashSet<_>>().len();
        colors = refined;
        if refined_distinct == distinct {
            break;
        }
        distinct = refined_distinct;
    }
    colors
}

struct IsomorphismSearch<'a> {
    nodes: &'a [&'a BlankNode],
    colors: &'a FxHashMap<&'a BlankNode, u64>,
    other_colors: &'a FxHashMap<&'a BlankNode, u64>,
    incident: &'a FxHashMap<&'a BlankNode, Vec<&'a Triple>>,
    target: &'a Graph,
    mapping: FxHashMap<&'a BlankNode, &'a BlankNode>,
    used: FxHashSet<&'a BlankNode>,
}

impl<'a> IsomorphismSearch<'a> {
    fn extend(&mut self, depth: usize) -> bool {
        let Some(node) = self.nodes.get(depth).copied() else {
            return true;
        };
        let color = self.colors[node];
        let mut candidates: Vec<&'a BlankNode> = self
            .other_colors
            .iter()
            .filter(|(candidate, c)| **c == color && !self.used.contains(*candidate))
            .map(|(candidate, _)| *candidate)
            .collect();
        candidates.sort();

        for candidate in candidates {
            self.mapping.insert(node, candidate);
            self.used.insert(candidate);
            if self.consistent(node) && self.extend(depth + 1) {
                return true;
            }
            self.mapping.remove(node);
            self.used.remove(candidate);
        }
        false
    }

    /// Every fully mapped triple around `node` must exist in the target graph
    fn consistent(&self, node: &BlankNode) -> bool {
        self.incident[node].iter().all(|triple| {
            let subject = match &triple.subject {
                RdfSubject::BlankNode(b) => match self.mapping.get(b) {
                    Some(mapped) => RdfSubject::BlankNode((*mapped).clone()),
                    None => return true,
                },
                other => other.clone(),
            };
            let object = match &triple.object {
                RdfObject::BlankNode(b) => match self.mapping.get(b) {
                    Some(mapped) => RdfObject::BlankNode((*mapped).clone()),
                    None => return true,
                },
                other => other.clone(),
            };
            self.target.contains(&Triple {
                subject,
                predicate: triple.predicate.clone(),
                object,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::{Literal, NamedNode};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    fn bnode(id: &str) -> BlankNode {
        BlankNode::from_str(id).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut graph = Graph::new();
        let triple = Triple::new(
            iri("http://example.org/alice"),
            iri("http://xmlns.com/foaf/0.1/name"),
            Literal::new_simple_literal("Alice"),
        );
        assert!(graph.insert(triple.clone()));
        assert!(!graph.insert(triple.clone()));
        assert_eq!(graph.len(), 1);
        assert!(graph.contains(&triple));

        assert!(graph.remove(&triple));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_subjects_in_first_seen_order() {
        let p = iri("http://example.org/p");
        let graph: Graph = vec![
            Triple::new(iri("http://example.org/b"), p.clone(), Literal::new_simple_literal("1")),
            Triple::new(iri("http://example.org/a"), p.clone(), Literal::new_simple_literal("2")),
            Triple::new(iri("http://example.org/b"), p.clone(), Literal::new_simple_literal("3")),
        ]
        .into_iter()
        .collect();

        let subjects: Vec<String> = graph.subjects().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            subjects,
            vec!["<http://example.org/b>", "<http://example.org/a>"]
        );

        let b = RdfSubject::from(iri("http://example.org/b"));
        assert_eq!(graph.objects_for(&b, &RdfPredicate::from(p)).len(), 2);
    }

    #[test]
    fn test_isomorphism_renames_blank_nodes() {
        let p = iri("http://example.org/p");
        let q = iri("http://example.org/q");
        let a: Graph = vec![
            Triple::new(bnode("x"), p.clone(), bnode("y")),
            Triple::new(bnode("y"), q.clone(), Literal::new_simple_literal("leaf")),
            Triple::new(iri("http://example.org/root"), p.clone(), bnode("x")),
        ]
        .into_iter()
        .collect();
        let b: Graph = vec![
            Triple::new(iri("http://example.org/root"), p.clone(), bnode("n1")),
            Triple::new(bnode("n2"), q.clone(), Literal::new_simple_literal("leaf")),
            Triple::new(bnode("n1"), p.clone(), bnode("n2")),
        ]
        .into_iter()
        .collect();
        assert!(a.is_isomorphic(&b));

        let c: Graph = vec![
            Triple::new(iri("http://example.org/root"), p.clone(), bnode("n1")),
            Triple::new(bnode("n1"), q.clone(), Literal::new_simple_literal("leaf")),
            Triple::new(bnode("n1"), p, bnode("n2")),
        ]
        .into_iter()
        .collect();
        assert!(!a.is_isomorphic(&c));
    }

    #[test]
    fn test_isomorphism_with_symmetric_blank_nodes() {
        let p = iri("http://example.org/p");
        let cycle = |x: &str, y: &str| -> Graph {
            vec![
                Triple::new(bnode(x), p.clone(), bnode(y)),
                Triple::new(bnode(y), p.clone(), bnode(x)),
            ]
            .into_iter()
            .collect()
        };
        assert!(cycle("a", "b").is_isomorphic(&cycle("c", "d")));
    }
}
