//! Class hierarchy for subclass reasoning
//!
//! Provides a precomputed transitive closure of the class hierarchy for
//! efficient membership expansion during validation.
//!
//! # Closure Direction
//!
//! The closure computes **descendants** (not ancestors):
//! `subclasses_of(Animal)` returns `[Dog, Cat, ...]` (classes that are
//! subClassOf Animal). This is the direction needed for membership checks:
//! a value asserted as `Dog` satisfies a constraint requiring `Animal`.

use crate::fact::FactSet;
use crate::iri::Iri;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use trellis_vocab::{namespaces, rdfs_names};

/// Static empty slice for missing entries
static EMPTY_IRIS: &[Iri] = &[];

/// Arc-backed class hierarchy for cheap cloning.
///
/// Computed once per schema and shared across validators.
#[derive(Clone, Debug, Default)]
pub struct ClassHierarchy {
    inner: Arc<ClassHierarchyInner>,
}

#[derive(Debug, Default)]
struct ClassHierarchyInner {
    /// Direct subclass relationships: parent -> immediate children
    direct: HashMap<Iri, SmallVec<[Iri; 2]>>,
    /// Transitive closure: class C -> all descendants of C (NOT including C itself)
    closure: HashMap<Iri, Arc<[Iri]>>,
}

impl ClassHierarchy {
    /// Build a hierarchy from `(child, parent)` subclass pairs.
    ///
    /// Computes the transitive closure for every parent class. Handles
    /// cycles gracefully (no infinite loops).
    pub fn from_subclass_pairs(pairs: impl IntoIterator<Item = (Iri, Iri)>) -> Self {
        let mut direct: HashMap<Iri, SmallVec<[Iri; 2]>> = HashMap::new();
        for (child, parent) in pairs {
            direct.entry(parent).or_default().push(child);
        }

        let closure = compute_transitive_closure(&direct);

        Self {
            inner: Arc::new(ClassHierarchyInner { direct, closure }),
        }
    }

    /// Build a hierarchy from the `rdfs:subClassOf` facts in a fact set
    pub fn from_facts(facts: &FactSet) -> Self {
        let sub_class_of = Iri::new(namespaces::RDFS, rdfs_names::SUB_CLASS_OF);
        Self::from_subclass_pairs(facts.iter().filter_map(|f| {
            if f.p == sub_class_of {
                f.o.as_iri().map(|parent| (f.s.clone(), parent.clone()))
            } else {
                None
            }
        }))
    }

    /// Returns all descendants of class `c` (subclasses, transitively).
    ///
    /// Does NOT include `c` itself. Returns empty slice if `c` has no
    /// subclasses.
    pub fn subclasses_of(&self, c: &Iri) -> &[Iri] {
        self.inner
            .closure
            .get(c)
            .map(|arc| arc.as_ref())
            .unwrap_or(EMPTY_IRIS)
    }

    /// Returns direct children of class `c` (immediate subclasses only).
    pub fn direct_subclasses_of(&self, c: &Iri) -> &[Iri] {
        self.inner
            .direct
            .get(c)
            .map(|sv| sv.as_slice())
            .unwrap_or(EMPTY_IRIS)
    }

    /// Check whether `candidate` is `required` or one of its descendants
    pub fn is_within(&self, candidate: &Iri, required: &Iri) -> bool {
        candidate == required || self.subclasses_of(required).contains(candidate)
    }

    /// Check if the hierarchy has no relationships
    pub fn is_empty(&self) -> bool {
        self.inner.direct.is_empty()
    }
}

/// Compute transitive closure using BFS from each node.
fn compute_transitive_closure(
    direct: &HashMap<Iri, SmallVec<[Iri; 2]>>,
) -> HashMap<Iri, Arc<[Iri]>> {
    let mut closure: HashMap<Iri, Arc<[Iri]>> = HashMap::new();

    for start in direct.keys() {
        let descendants = compute_descendants(start, direct);
        if !descendants.is_empty() {
            closure.insert(start.clone(), descendants.into());
        }
    }

    closure
}

/// Compute all descendants of a node using BFS.
///
/// Returns all nodes reachable from `start` (not including `start` itself).
/// Handles cycles by excluding the start node from results even if
/// reachable through a cycle.
fn compute_descendants(start: &Iri, direct: &HashMap<Iri, SmallVec<[Iri; 2]>>) -> Vec<Iri> {
    let mut visited: HashSet<Iri> = HashSet::new();
    let mut queue: VecDeque<Iri> = VecDeque::new();
    let mut result: Vec<Iri> = Vec::new();

    // Mark start as visited to keep it out of results even through a cycle.
    visited.insert(start.clone());

    if let Some(children) = direct.get(start) {
        for child in children {
            if visited.insert(child.clone()) {
                queue.push_back(child.clone());
                result.push(child.clone());
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        if let Some(children) = direct.get(&current) {
            for child in children {
                if visited.insert(child.clone()) {
                    queue.push_back(child.clone());
                    result.push(child.clone());
                }
            }
        }
    }

    result
}
