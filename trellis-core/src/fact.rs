//! Facts and the indexed fact set
//!
//! A `Fact` is a single subject-predicate-object statement. A `FactSet` is an
//! immutable collection of facts with hash indexes for the two traversal
//! directions the validation engine needs:
//!
//! - `(subject, predicate)` → matching facts (direct traversal)
//! - `(predicate, object-reference)` → matching facts (inverse traversal)
//!
//! Facts are addressed by index within the set, so callers can track
//! subsets (e.g. the accepted envelope of a validation walk) as index sets
//! without requiring facts themselves to be hashable.

use crate::iri::Iri;
use crate::value::Value;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use trellis_vocab::{namespaces, rdf_names};

/// A single subject-predicate-object statement
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Fact {
    /// Subject (IRI or blank node)
    pub s: Iri,
    /// Predicate
    pub p: Iri,
    /// Object value
    pub o: Value,
}

impl Fact {
    /// Create a new fact
    pub fn new(s: Iri, p: Iri, o: impl Into<Value>) -> Self {
        Self {
            s,
            p,
            o: o.into(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.s, self.p, self.o)
    }
}

/// Immutable, indexed collection of facts
///
/// Exact duplicate facts are collapsed at construction; the collection
/// preserves first-occurrence order.
#[derive(Debug, Default)]
pub struct FactSet {
    facts: Vec<Fact>,
    /// (subject, predicate) -> fact indexes
    by_sp: FxHashMap<(Iri, Iri), SmallVec<[u32; 4]>>,
    /// (predicate, object reference) -> fact indexes
    by_po: FxHashMap<(Iri, Iri), SmallVec<[u32; 4]>>,
}

impl FactSet {
    /// Build a fact set, deduplicating exact repeats and indexing both
    /// traversal directions
    pub fn new(input: impl IntoIterator<Item = Fact>) -> Self {
        let mut facts: Vec<Fact> = Vec::new();
        for fact in input {
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }

        let mut by_sp: FxHashMap<(Iri, Iri), SmallVec<[u32; 4]>> = FxHashMap::default();
        let mut by_po: FxHashMap<(Iri, Iri), SmallVec<[u32; 4]>> = FxHashMap::default();

        for (idx, fact) in facts.iter().enumerate() {
            let idx = idx as u32;
            by_sp
                .entry((fact.s.clone(), fact.p.clone()))
                .or_default()
                .push(idx);
            if let Some(obj) = fact.o.as_iri() {
                by_po
                    .entry((fact.p.clone(), obj.clone()))
                    .or_default()
                    .push(idx);
            }
        }

        Self {
            facts,
            by_sp,
            by_po,
        }
    }

    /// Number of facts in the set
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate all facts in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// The fact at a given index
    pub fn fact(&self, idx: u32) -> &Fact {
        &self.facts[idx as usize]
    }

    /// Indexes of facts matching `(subject, predicate, ?)`
    pub fn matching_out(&self, subject: &Iri, predicate: &Iri) -> &[u32] {
        self.by_sp
            .get(&(subject.clone(), predicate.clone()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Indexes of facts matching `(?, predicate, object)`
    ///
    /// Only reference objects participate in inverse traversal.
    pub fn matching_in(&self, predicate: &Iri, object: &Iri) -> &[u32] {
        self.by_po
            .get(&(predicate.clone(), object.clone()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Object values of all facts matching `(subject, predicate, ?)`
    pub fn objects(&self, subject: &Iri, predicate: &Iri) -> Vec<Value> {
        self.matching_out(subject, predicate)
            .iter()
            .map(|&idx| self.fact(idx).o.clone())
            .collect()
    }

    /// Asserted types of a subject (`rdf:type` objects that are references)
    pub fn types_of(&self, subject: &Iri) -> Vec<Iri> {
        let rdf_type = Iri::new(namespaces::RDF, rdf_names::TYPE);
        self.matching_out(subject, &rdf_type)
            .iter()
            .filter_map(|&idx| self.fact(idx).o.as_iri().cloned())
            .collect()
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(name: &str) -> Iri {
        Iri::new(100, name)
    }

    #[test]
    fn test_direct_lookup() {
        let facts = FactSet::new(vec![
            Fact::new(iri("alice"), iri("knows"), Value::Ref(iri("bob"))),
            Fact::new(iri("alice"), iri("knows"), Value::Ref(iri("carol"))),
            Fact::new(iri("alice"), iri("name"), "Alice"),
        ]);

        assert_eq!(facts.len(), 3);
        assert_eq!(facts.matching_out(&iri("alice"), &iri("knows")).len(), 2);
        assert_eq!(facts.matching_out(&iri("bob"), &iri("knows")).len(), 0);
        assert_eq!(
            facts.objects(&iri("alice"), &iri("name")),
            vec![Value::from("Alice")]
        );
    }

    #[test]
    fn test_inverse_lookup() {
        let facts = FactSet::new(vec![
            Fact::new(iri("alice"), iri("knows"), Value::Ref(iri("bob"))),
            Fact::new(iri("carol"), iri("knows"), Value::Ref(iri("bob"))),
        ]);

        let incoming = facts.matching_in(&iri("knows"), &iri("bob"));
        assert_eq!(incoming.len(), 2);
        assert_eq!(facts.fact(incoming[0]).s, iri("alice"));
        assert_eq!(facts.fact(incoming[1]).s, iri("carol"));
    }

    #[test]
    fn test_literals_not_inverse_indexed() {
        let facts = FactSet::new(vec![Fact::new(iri("alice"), iri("name"), "Alice")]);
        // Literal objects never match an inverse pattern
        assert!(facts.by_po.is_empty());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let facts = FactSet::new(vec![
            Fact::new(iri("alice"), iri("name"), "Alice"),
            Fact::new(iri("alice"), iri("name"), "Alice"),
        ]);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_types_of() {
        let rdf_type = Iri::new(namespaces::RDF, rdf_names::TYPE);
        let facts = FactSet::new(vec![
            Fact::new(iri("alice"), rdf_type.clone(), Value::Ref(iri("Person"))),
            Fact::new(iri("alice"), rdf_type, Value::Ref(iri("Employee"))),
        ]);
        assert_eq!(
            facts.types_of(&iri("alice")),
            vec![iri("Person"), iri("Employee")]
        );
    }
}
