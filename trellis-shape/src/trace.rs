//! Validation traces
//!
//! A [`Trace`] is the structured output of a validation walk: issue messages
//! at the current level plus nested traces keyed by the traversal step that
//! produced them. An empty trace means the data conforms.
//!
//! Traces compose associatively: merging unions the issue lists
//! (order-preserving, duplicates collapsed) and recursively merges the
//! nested maps.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use trellis_core::Iri;

/// A traversal step: predicate plus direction
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Step {
    pub predicate: Iri,
    pub inverse: bool,
}

impl Step {
    /// Direct traversal step
    pub fn direct(predicate: Iri) -> Self {
        Self {
            predicate,
            inverse: false,
        }
    }

    /// Inverse traversal step
    pub fn inverse(predicate: Iri) -> Self {
        Self {
            predicate,
            inverse: true,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "^{}", self.predicate)
        } else {
            write!(f, "{}", self.predicate)
        }
    }
}

// Serialized as its display form so traces nest as plain JSON objects
impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Structured validation result
///
/// Empty = success. Reported as data, never as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// Issues at this level
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
    /// Nested traces per traversal step
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<Step, Trace>,
}

impl Trace {
    /// An empty (conforming) trace
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace with a single issue
    pub fn of(issue: impl Into<String>) -> Self {
        let mut trace = Self::new();
        trace.issue(issue);
        trace
    }

    /// Check if this trace reports no issues at any depth
    ///
    /// Nested traces are only retained when non-empty, so this is a shallow
    /// check.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.fields.is_empty()
    }

    /// Record an issue at this level (duplicates collapsed)
    pub fn issue(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.issues.contains(&message) {
            self.issues.push(message);
        }
    }

    /// Record a nested trace under a traversal step
    ///
    /// Empty traces are dropped; a trace already present under the step is
    /// merged.
    pub fn nest(&mut self, step: Step, nested: Trace) {
        if nested.is_empty() {
            return;
        }
        match self.fields.get_mut(&step) {
            Some(existing) => existing.merge(nested),
            None => {
                self.fields.insert(step, nested);
            }
        }
    }

    /// Merge another trace into this one
    ///
    /// Unions issues (order-preserving) and recursively merges nested maps.
    pub fn merge(&mut self, other: Trace) {
        for issue in other.issues {
            if !self.issues.contains(&issue) {
                self.issues.push(issue);
            }
        }
        for (step, nested) in other.fields {
            self.nest(step, nested);
        }
    }

    /// Issues at this level
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// Nested traces per traversal step
    pub fn fields(&self) -> &BTreeMap<Step, Trace> {
        &self.fields
    }

    /// Total number of issues at all depths
    pub fn issue_count(&self) -> usize {
        self.issues.len()
            + self
                .fields
                .values()
                .map(|nested| nested.issue_count())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str) -> Step {
        Step::direct(Iri::new(100, name))
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.issue_count(), 0);
    }

    #[test]
    fn test_issue_dedup() {
        let mut trace = Trace::new();
        trace.issue("too few values");
        trace.issue("too few values");
        assert_eq!(trace.issues().len(), 1);
    }

    #[test]
    fn test_nest_drops_empty() {
        let mut trace = Trace::new();
        trace.nest(step("name"), Trace::new());
        assert!(trace.is_empty());
    }

    #[test]
    fn test_merge_unions_and_recurses() {
        let mut a = Trace::of("top issue");
        a.nest(step("name"), Trace::of("nested a"));

        let mut b = Trace::of("top issue");
        b.nest(step("name"), Trace::of("nested b"));
        b.nest(step("age"), Trace::of("nested c"));

        a.merge(b);

        assert_eq!(a.issues(), &["top issue".to_string()]);
        assert_eq!(a.fields().len(), 2);
        let name_trace = &a.fields()[&step("name")];
        assert_eq!(name_trace.issues().len(), 2);
        assert_eq!(a.issue_count(), 4);
    }

    #[test]
    fn test_merge_associative() {
        let mk = |issue: &str, field: &str| {
            let mut t = Trace::of(issue);
            t.nest(step(field), Trace::of(format!("{} nested", issue)));
            t
        };
        let (a, b, c) = (mk("a", "x"), mk("b", "x"), mk("c", "y"));

        let mut left = a.clone();
        left.merge(b.clone());
        left.merge(c.clone());

        let mut bc = b;
        bc.merge(c);
        let mut right = a;
        right.merge(bc);

        assert_eq!(left, right);
    }

    #[test]
    fn test_json_serialization() {
        let mut trace = Trace::of("out of range");
        trace.nest(
            Step::inverse(Iri::new(100, "knows")),
            Trace::of("too few values"),
        );
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["issues"][0], "out of range");
        assert_eq!(json["fields"]["^ns100:knows"]["issues"][0], "too few values");
    }
}
