//! Namespace prefixes and qualified names
//!
//! The registry maps IRIs to `prefix:local` names for one serialization.
//! Names are minted on demand and remembered, so the same IRI always gets
//! the same qualified name; every namespace that ends up in use is recorded
//! as a binding that the writer declares on the document element.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::trace;

use super::vocab::STANDARD_PREFIXES;
use crate::error::{RdfXmlError, RdfXmlResult};
use crate::xml::names::{is_nc_name, split_iri};

/// Qualified name minted for an IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Prefix, or `None` for the default namespace
    pub prefix: Option<String>,
    /// Local part
    pub local: String,
    /// Namespace IRI the prefix is bound to
    pub namespace: String,
}

impl QName {
    /// Check if the name carries a prefix (required for attribute names)
    pub fn is_prefixed(&self) -> bool {
        self.prefix.is_some()
    }

    /// The full IRI this name stands for
    pub fn iri(&self) -> String {
        format!("{}{}", self.namespace, self.local)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// IRI to qualified name registry, scoped to one serialization
#[derive(Debug, Clone, Default)]
pub struct QNameRegistry {
    /// Caller-declared prefix → namespace mappings
    declared: IndexMap<String, String>,
    /// Fall back to well-known vocabulary prefixes
    standard_prefixes: bool,
    /// Base IRI, usable as the default namespace
    base: Option<String>,
    /// Explicit default namespace
    default_namespace: Option<String>,
    /// Bindings in use, in first-use order (`""` is the default namespace)
    bindings: IndexMap<String, String>,
    /// Minted names, including failures
    cache: FxHashMap<String, Option<QName>>,
    /// Next `nsN` candidate
    next_generated: usize,
}

impl QNameRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a caller-supplied prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.declared.insert(prefix.into(), namespace.into());
    }

    /// Enable or disable the well-known vocabulary prefixes
    pub fn with_standard_prefixes(mut self, enabled: bool) -> Self {
        self.standard_prefixes = enabled;
        self
    }

    /// Set the base IRI
    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    /// Set the default namespace
    pub fn with_default_namespace(mut self, namespace: Option<String>) -> Self {
        self.default_namespace = namespace;
        self
    }

    /// Bind a prefix eagerly, e.g. `rdf` for the syntax vocabulary
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.bindings.insert(prefix.into(), namespace.into());
    }

    /// Namespace that unprefixed names may be minted in
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref().or(self.base.as_deref())
    }

    /// Prefix bindings in use, in first-use order; the default namespace has prefix `""`
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Get the qualified name for an IRI, minting one if needed
    pub fn qname(&mut self, iri: &str) -> RdfXmlResult<QName> {
        let minted = match self.cache.get(iri) {
            Some(cached) => cached.clone(),
            None => {
                let minted = self.mint(iri);
                match &minted {
                    Some(qname) => trace!(iri, qname = %qname, "minted qualified name"),
                    None => trace!(iri, "no qualified name for IRI"),
                }
                self.cache.insert(iri.to_string(), minted.clone());
                minted
            }
        };
        minted.ok_or_else(|| RdfXmlError::Resolution {
            iri: iri.to_string(),
        })
    }

    /// Expand a `prefix:local` name using the bindings and declared prefixes
    pub fn expand(&self, qname: &str) -> Option<String> {
        let (prefix, local) = qname.split_once(':').unwrap_or(("", qname));
        let namespace = self
            .bindings
            .get(prefix)
            .or_else(|| self.declared.get(prefix))
            .map(String::as_str)
            .or_else(|| {
                STANDARD_PREFIXES
                    .iter()
                    .find(|(p, _)| self.standard_prefixes && *p == prefix)
                    .map(|(_, ns)| *ns)
            })?;
        Some(format!("{}{}", namespace, local))
    }

    fn mint(&mut self, iri: &str) -> Option<QName> {
        if let Some(namespace) = self.default_namespace.clone() {
            if let Some(local) = local_part(iri, &namespace) {
                return Some(self.use_binding(None, namespace, local.to_string()));
            }
        } else if let Some(base) = self.base.clone() {
            if let Some(local) = local_part(iri, &base) {
                return Some(self.use_binding(None, base, local.to_string()));
            }
        }

        if let Some((prefix, namespace, local)) = longest_match(
            self.declared.iter().map(|(p, ns)| (p.as_str(), ns.as_str())),
            iri,
        ) {
            let (prefix, namespace, local) = (prefix.to_string(), namespace.to_string(), local.to_string());
            return Some(self.use_binding(Some(prefix), namespace, local));
        }

        if self.standard_prefixes {
            let available = STANDARD_PREFIXES
                .iter()
                .copied()
                .filter(|(p, ns)| self.is_available(p, ns));
            if let Some((prefix, namespace, local)) = longest_match(available, iri) {
                return Some(self.use_binding(
                    Some(prefix.to_string()),
                    namespace.to_string(),
                    local.to_string(),
                ));
            }
        }

        let (namespace, local) = split_iri(iri)?;
        let prefix = match self.prefix_for_namespace(namespace) {
            Some(existing) => existing,
            None => self.fresh_prefix(),
        };
        Some(self.use_binding(Some(prefix), namespace.to_string(), local.to_string()))
    }

    fn use_binding(&mut self, prefix: Option<String>, namespace: String, local: String) -> QName {
        let key = prefix.clone().unwrap_or_default();
        let taken = self.bindings.get(&key).map_or(false, |bound| *bound != namespace);
        let prefix = if taken {
            let renamed = self
                .prefix_for_namespace(&namespace)
                .unwrap_or_else(|| self.fresh_prefix());
            trace!(prefix = %key, renamed = %renamed, namespace = %namespace, "prefix already bound elsewhere");
            Some(renamed)
        } else {
            prefix
        };
        let key = prefix.clone().unwrap_or_default();
        self.bindings.entry(key).or_insert_with(|| namespace.clone());
        QName {
            prefix,
            local,
            namespace,
        }
    }

    /// A standard prefix can be used unless its name is taken by another namespace
    fn is_available(&self, prefix: &str, namespace: &str) -> bool {
        [&self.declared, &self.bindings]
            .iter()
            .all(|map| map.get(prefix).map_or(true, |bound| bound == namespace))
    }

    fn prefix_for_namespace(&self, namespace: &str) -> Option<String> {
        self.bindings
            .iter()
            .find(|(p, ns)| !p.is_empty() && ns.as_str() == namespace)
            .map(|(p, _)| p.clone())
    }

    fn fresh_prefix(&mut self) -> String {
        loop {
            let candidate = format!("ns{}", self.next_generated);
            self.next_generated += 1;
            if !self.bindings.contains_key(&candidate) && !self.declared.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

fn local_part<'a>(iri: &'a str, namespace: &str) -> Option<&'a str> {
    iri.strip_prefix(namespace).filter(|local| is_nc_name(local))
}

/// Longest namespace that prefixes `iri` with a valid local part
fn longest_match<'a>(
    candidates: impl Iterator<Item = (&'a str, &'a str)>,
    iri: &str,
) -> Option<(&'a str, &'a str, String)> {
    candidates
        .filter_map(|(prefix, namespace)| {
            local_part(iri, namespace).map(|local| (prefix, namespace, local.to_string()))
        })
        .max_by_key(|(_, namespace, _)| namespace.len())
}
