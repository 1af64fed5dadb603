//! IRI - compact identifier representation
//!
//! An `Iri` is composed of:
//! - `namespace_code`: u16 mapping to a namespace prefix (e.g., 1 = "http://www.w3.org/2001/XMLSchema#")
//! - `name`: Arc<str> local part after the namespace prefix (cheap clones)
//!
//! ## Ordering
//!
//! IRIs use strict total ordering: namespace_code first, then name.
//! This enables efficient use as keys in sorted collections.
//!
//! ## Blank nodes
//!
//! Blank node identifiers share the representation, under the reserved
//! `BLANK_NODE` namespace code.
//!
//! ## Interning
//!
//! The `IriInterner` deduplicates local names, reducing memory usage when
//! many facts share the same subjects/predicates. Interning happens at
//! schema/data build time, never on the validation path.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use trellis_vocab::namespaces;

/// Compact IRI representation
///
/// Uses `Arc<str>` for the name to enable cheap clones and interning.
/// Serializes as a `[namespace_code, name]` tuple in JSON.
#[derive(Clone, Debug)]
pub struct Iri {
    pub namespace_code: u16,
    pub name: Arc<str>,
}

impl Iri {
    /// Create a new IRI
    pub fn new(namespace_code: u16, name: impl AsRef<str>) -> Self {
        Self {
            namespace_code,
            name: Arc::from(name.as_ref()),
        }
    }

    /// Create a new IRI with a pre-interned name
    ///
    /// Use this when you already have an `Arc<str>` from an interner.
    pub fn with_arc(namespace_code: u16, name: Arc<str>) -> Self {
        Self {
            namespace_code,
            name,
        }
    }

    /// Create a blank node identifier
    pub fn blank(label: impl AsRef<str>) -> Self {
        Self::new(namespaces::BLANK_NODE, label)
    }

    /// Check if this identifier denotes a blank node
    pub fn is_blank(&self) -> bool {
        self.namespace_code == namespaces::BLANK_NODE
    }

    /// Get the name as a string slice
    pub fn name_str(&self) -> &str {
        &self.name
    }
}

// === Strict Total Ordering ===

impl PartialEq for Iri {
    fn eq(&self, other: &Self) -> bool {
        self.namespace_code == other.namespace_code && self.name == other.name
    }
}

impl Eq for Iri {}

impl Ord for Iri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace_code
            .cmp(&other.namespace_code)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Iri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Iri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace_code.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match namespaces::prefix(self.namespace_code) {
            Some(prefix) => write!(f, "{}{}", prefix, self.name),
            None => write!(f, "ns{}:{}", self.namespace_code, self.name),
        }
    }
}

impl Serialize for Iri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.namespace_code, self.name.as_ref()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Iri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (namespace_code, name): (u16, String) = Deserialize::deserialize(deserializer)?;
        Ok(Iri::new(namespace_code, name))
    }
}

/// Deduplicates IRI local names
///
/// Many facts share the same predicates and subjects; interning their names
/// keeps one `Arc<str>` per distinct string.
#[derive(Default)]
pub struct IriInterner {
    names: Mutex<FxHashMap<Arc<str>, Arc<str>>>,
}

impl IriInterner {
    /// Create a new, empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name and return an IRI using the shared `Arc<str>`
    pub fn intern(&self, namespace_code: u16, name: impl AsRef<str>) -> Iri {
        let name = name.as_ref();
        let mut names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        let shared = match names.get(name) {
            Some(existing) => existing.clone(),
            None => {
                let arc: Arc<str> = Arc::from(name);
                names.insert(arc.clone(), arc.clone());
                arc
            }
        };
        Iri::with_arc(namespace_code, shared)
    }

    /// Number of distinct names interned
    pub fn len(&self) -> usize {
        self.names.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the interner is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_and_order() {
        let a = Iri::new(100, "alpha");
        let b = Iri::new(100, "alpha");
        let c = Iri::new(100, "beta");
        let d = Iri::new(101, "alpha");

        assert_eq!(a, b);
        assert!(a < c);
        assert!(c < d); // namespace code dominates
    }

    #[test]
    fn test_blank_nodes() {
        let b = Iri::blank("b0");
        assert!(b.is_blank());
        assert!(!Iri::new(100, "b0").is_blank());
        assert_eq!(b.to_string(), "_:b0");
    }

    #[test]
    fn test_display_known_namespace() {
        let dt = Iri::new(namespaces::XSD, "dateTime");
        assert_eq!(dt.to_string(), "http://www.w3.org/2001/XMLSchema#dateTime");
    }

    #[test]
    fn test_interner_shares_names() {
        let interner = IriInterner::new();
        let a = interner.intern(100, "name");
        let b = interner.intern(101, "name");
        assert!(Arc::ptr_eq(&a.name, &b.name));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_serde_tuple_form() {
        let iri = Iri::new(100, "person");
        let json = serde_json::to_string(&iri).unwrap();
        assert_eq!(json, r#"[100,"person"]"#);
        let back: Iri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iri);
    }
}
