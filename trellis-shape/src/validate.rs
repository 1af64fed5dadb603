//! Shape validation engine
//!
//! The validator walks a fully-redacted, optimized shape against a fact set
//! from a root focus value, producing a [`Trace`]. Data problems never raise:
//! they accumulate in the trace, empty on success. The engine raises only for
//! caller contract violations: an unresolved guard, or an invalid pattern
//! expression.
//!
//! The walk threads two pieces of state:
//! - the current **focus set** of values under evaluation, fanning out at
//!   every field traversal, and
//! - the **envelope** of accepted fact indexes; facts never reached by a
//!   field traversal are reported as outside the shape's declared scope.

use crate::error::{Result, ShapeError};
use crate::shape::{FieldShape, Shape};
use crate::trace::{Step, Trace};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;
use trellis_core::{ClassHierarchy, FactSet, Iri, Value};

/// Recursive shape validation engine
///
/// When constructed with a [`ClassHierarchy`], class constraints are
/// subclass-aware: a value asserted as `Dog` satisfies a constraint
/// requiring `Animal` (if `Dog rdfs:subClassOf Animal`).
#[derive(Clone, Debug, Default)]
pub struct Validator {
    /// Class hierarchy for subclass reasoning (optional)
    hierarchy: Option<ClassHierarchy>,
}

impl Validator {
    /// Create a validator without subclass reasoning
    pub fn new() -> Self {
        Self { hierarchy: None }
    }

    /// Create a validator with a class hierarchy for subclass reasoning
    pub fn with_hierarchy(hierarchy: ClassHierarchy) -> Self {
        Self {
            hierarchy: Some(hierarchy),
        }
    }

    /// Validate a focus value against a shape over a fact set
    ///
    /// The shape must be fully redacted and should be optimized. Returns an
    /// empty trace on success. After the walk, any fact not accepted by a
    /// field traversal is reported as a top-level issue, unless the root
    /// shape is unconstrained.
    pub fn validate(&self, focus: &Value, shape: &Shape, facts: &FactSet) -> Result<Trace> {
        let focus_set = [focus.clone()];
        let mut envelope: FxHashSet<u32> = FxHashSet::default();
        let mut trace = self.probe(&focus_set, shape, facts, &mut envelope)?;

        if !shape.is_anything() {
            for idx in 0..facts.len() as u32 {
                if !envelope.contains(&idx) {
                    trace.issue(format!(
                        "fact outside shape envelope: {}",
                        facts.fact(idx)
                    ));
                }
            }
        }

        debug!(issues = trace.issue_count(), "validation finished");
        Ok(trace)
    }

    /// Validate one shape node against the current focus set
    fn probe(
        &self,
        focus: &[Value],
        shape: &Shape,
        facts: &FactSet,
        envelope: &mut FxHashSet<u32>,
    ) -> Result<Trace> {
        match shape {
            Shape::And(children) => {
                let mut trace = Trace::new();
                for child in children {
                    trace.merge(self.probe(focus, child, facts, envelope)?);
                }
                Ok(trace)
            }

            Shape::Or(children) => {
                // Children probe into a scratch envelope: only the accepted
                // alternative contributes accepted facts
                for child in children {
                    let mut scratch = FxHashSet::default();
                    let trace = self.probe(focus, child, facts, &mut scratch)?;
                    if trace.is_empty() {
                        envelope.extend(scratch);
                        return Ok(Trace::new());
                    }
                }
                // Alternatives are deliberately exclusive: report one issue
                // rather than every child's failures
                Ok(Trace::of(format!(
                    "none of the alternatives satisfied: {}",
                    shape.description()
                )))
            }

            Shape::When(c) => {
                // The test's outcome is a decision, not an error; its
                // traversals do not contribute to the envelope
                let mut scratch = FxHashSet::default();
                let test = self.probe(focus, &c.test, facts, &mut scratch)?;
                let branch = if test.is_empty() { &c.pass } else { &c.fail };
                self.probe(focus, branch, facts, envelope)
            }

            Shape::Field(f) | Shape::Link(f) => self.traverse(focus, f, facts, envelope),

            Shape::MinCount(limit) => {
                let mut trace = Trace::new();
                if focus.len() < *limit {
                    trace.issue(format!(
                        "expected at least {} value(s) but found {}",
                        limit,
                        focus.len()
                    ));
                }
                Ok(trace)
            }

            Shape::MaxCount(limit) => {
                let mut trace = Trace::new();
                if focus.len() > *limit {
                    trace.issue(format!(
                        "expected at most {} value(s) but found {}",
                        limit,
                        focus.len()
                    ));
                }
                Ok(trace)
            }

            Shape::Datatype(kind) => Ok(check_each(focus, |value| {
                if kind.satisfied_by(value) {
                    None
                } else {
                    Some(format!("value {} is not a {}", value, kind))
                }
            })),

            Shape::Class(class) => Ok(check_each(focus, |value| {
                self.check_class(value, class, facts)
            })),

            Shape::MinInclusive(bound) => Ok(check_each(focus, |value| {
                match value.order_cmp(bound) {
                    Some(ord) if ord >= Ordering::Equal => None,
                    _ => Some(format!("value {} is less than minimum {}", value, bound)),
                }
            })),

            Shape::MaxInclusive(bound) => Ok(check_each(focus, |value| {
                match value.order_cmp(bound) {
                    Some(ord) if ord <= Ordering::Equal => None,
                    _ => Some(format!("value {} exceeds maximum {}", value, bound)),
                }
            })),

            Shape::MinExclusive(bound) => Ok(check_each(focus, |value| {
                match value.order_cmp(bound) {
                    Some(Ordering::Greater) => None,
                    _ => Some(format!("value {} must be greater than {}", value, bound)),
                }
            })),

            Shape::MaxExclusive(bound) => Ok(check_each(focus, |value| {
                match value.order_cmp(bound) {
                    Some(Ordering::Less) => None,
                    _ => Some(format!("value {} must be less than {}", value, bound)),
                }
            })),

            Shape::MinLength(limit) => Ok(check_each(focus, |value| {
                let len = value.lexical_form().chars().count();
                if len < *limit {
                    Some(format!(
                        "lexical length {} is less than minimum {}",
                        len, limit
                    ))
                } else {
                    None
                }
            })),

            Shape::MaxLength(limit) => Ok(check_each(focus, |value| {
                let len = value.lexical_form().chars().count();
                if len > *limit {
                    Some(format!(
                        "lexical length {} exceeds maximum {}",
                        len, limit
                    ))
                } else {
                    None
                }
            })),

            Shape::Pattern(expr) => {
                // Compile once per occurrence, anchored: the whole lexical
                // form must match, never a substring
                let regex = compile_pattern(&format!("^(?:{})$", expr), expr)?;
                Ok(check_each(focus, |value| {
                    let lexical = value.lexical_form();
                    if regex.is_match(&lexical) {
                        None
                    } else {
                        Some(format!(
                            "value '{}' does not match pattern '{}'",
                            lexical, expr
                        ))
                    }
                }))
            }

            Shape::Like(keywords) => {
                let regex = like_regex(keywords)?;
                Ok(check_each(focus, |value| {
                    let lexical = value.lexical_form();
                    if regex.is_match(&lexical) {
                        None
                    } else {
                        Some(format!(
                            "value '{}' does not match keywords '{}'",
                            lexical, keywords
                        ))
                    }
                }))
            }

            Shape::Stem(prefix) => Ok(check_each(focus, |value| {
                let lexical = value.lexical_form();
                if lexical.starts_with(prefix.as_str()) {
                    None
                } else {
                    Some(format!(
                        "value '{}' does not start with '{}'",
                        lexical, prefix
                    ))
                }
            })),

            Shape::Range(allowed) | Shape::In(allowed) => {
                if allowed.is_empty() {
                    // Unconstrained
                    return Ok(Trace::new());
                }
                Ok(check_each(focus, |value| {
                    if allowed.contains(value) {
                        None
                    } else {
                        Some(format!(
                            "value {} is not in the allowed set of {} values",
                            value,
                            allowed.len()
                        ))
                    }
                }))
            }

            Shape::All(required) => {
                let mut trace = Trace::new();
                for value in required {
                    if !focus.contains(value) {
                        trace.issue(format!("required value {} not found", value));
                    }
                }
                Ok(trace)
            }

            Shape::Any(expected) => {
                let mut trace = Trace::new();
                if !expected.is_empty() && !expected.iter().any(|v| focus.contains(v)) {
                    trace.issue(format!(
                        "none of {} expected value(s) found",
                        expected.len()
                    ));
                }
                Ok(trace)
            }

            Shape::Lang(tags) => Ok(check_each(focus, |value| match value.lang() {
                None => Some(format!("value {} is missing a language tag", value)),
                Some(lang) if !tags.is_empty() && !tags.iter().any(|t| t.as_str() == lang) => {
                    Some(format!("language '{}' is not accepted", lang))
                }
                Some(_) => None,
            })),

            Shape::Localized => {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for value in focus {
                    if let Some(lang) = value.lang() {
                        *counts.entry(lang).or_default() += 1;
                    }
                }
                let mut trace = Trace::new();
                let mut duplicated: Vec<&str> = counts
                    .into_iter()
                    .filter_map(|(lang, count)| (count > 1).then_some(lang))
                    .collect();
                duplicated.sort_unstable();
                for lang in duplicated {
                    trace.issue(format!("duplicate values for language '{}'", lang));
                }
                Ok(trace)
            }

            Shape::Guard(g) => Err(ShapeError::UnresolvedGuard {
                axis: g.axis.clone(),
            }),
        }
    }

    /// Traverse a field from every focus value, recording accepted facts
    fn traverse(
        &self,
        focus: &[Value],
        field: &FieldShape,
        facts: &FactSet,
        envelope: &mut FxHashSet<u32>,
    ) -> Result<Trace> {
        let step = if field.inverse {
            Step::inverse(field.predicate.clone())
        } else {
            Step::direct(field.predicate.clone())
        };

        let mut trace = Trace::new();
        for value in focus {
            let mut next: Vec<Value> = Vec::new();
            if let Some(subject) = value.as_iri() {
                if field.inverse {
                    for &idx in facts.matching_in(&field.predicate, subject) {
                        envelope.insert(idx);
                        next.push(Value::Ref(facts.fact(idx).s.clone()));
                    }
                } else {
                    for &idx in facts.matching_out(subject, &field.predicate) {
                        envelope.insert(idx);
                        next.push(facts.fact(idx).o.clone());
                    }
                }
            }
            // Literal focus values have no edges: the nested shape sees an
            // empty focus set
            let nested = self.probe(&next, &field.shape, facts, envelope)?;
            trace.nest(step.clone(), nested);
        }
        Ok(trace)
    }

    /// Check class membership of one focus value, subclass-aware when a
    /// hierarchy is available
    fn check_class(&self, value: &Value, class: &Iri, facts: &FactSet) -> Option<String> {
        let Some(subject) = value.as_iri() else {
            return Some(format!("value {} is not a resource", value));
        };
        let types = facts.types_of(subject);
        let conforms = types.iter().any(|t| match &self.hierarchy {
            Some(hierarchy) => hierarchy.is_within(t, class),
            None => t == class,
        });
        if conforms {
            None
        } else {
            Some(format!("value {} is not an instance of {}", value, class))
        }
    }
}

/// Apply a per-value check across the focus set, collecting issues
fn check_each(focus: &[Value], check: impl Fn(&Value) -> Option<String>) -> Trace {
    let mut trace = Trace::new();
    for value in focus {
        if let Some(issue) = check(value) {
            trace.issue(issue);
        }
    }
    trace
}

fn compile_pattern(full: &str, source: &str) -> Result<Regex> {
    Regex::new(full).map_err(|e| ShapeError::InvalidPattern {
        pattern: source.to_string(),
        message: e.to_string(),
    })
}

/// Compile a keyword expression into a case-insensitive word-stem regex
///
/// Each whitespace-separated keyword must appear, in order, as the prefix of
/// a word in the lexical form.
fn like_regex(keywords: &str) -> Result<Regex> {
    let mut expr = String::from("(?i)");
    for word in keywords.split_whitespace() {
        expr.push_str(".*\\b");
        expr.push_str(&regex::escape(word));
    }
    expr.push_str(".*");
    compile_pattern(&expr, keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use trellis_core::Kind;

    fn iri(name: &str) -> Iri {
        Iri::new(100, name)
    }

    fn person() -> Value {
        Value::Ref(iri("alice"))
    }

    fn facts(list: Vec<(&str, &str, Value)>) -> FactSet {
        FactSet::new(
            list.into_iter()
                .map(|(s, p, o)| trellis_core::Fact::new(iri(s), iri(p), o)),
        )
    }

    #[test]
    fn test_min_count_via_field() {
        let shape = Shape::field(iri("knows"), Shape::min_count(1));
        let validator = Validator::new();

        let two = facts(vec![
            ("alice", "knows", Value::Ref(iri("bob"))),
            ("alice", "knows", Value::Ref(iri("carol"))),
        ]);
        assert!(validator.validate(&person(), &shape, &two).unwrap().is_empty());

        let none = facts(vec![]);
        let trace = validator.validate(&person(), &shape, &none).unwrap();
        assert!(!trace.is_empty());
        let nested = &trace.fields()[&Step::direct(iri("knows"))];
        assert!(nested.issues()[0].contains("at least 1"));
    }

    #[test]
    fn test_max_count() {
        let shape = Shape::field(iri("knows"), Shape::max_count(1));
        let validator = Validator::new();
        let two = facts(vec![
            ("alice", "knows", Value::Ref(iri("bob"))),
            ("alice", "knows", Value::Ref(iri("carol"))),
        ]);
        let trace = validator.validate(&person(), &shape, &two).unwrap();
        let nested = &trace.fields()[&Step::direct(iri("knows"))];
        assert!(nested.issues()[0].contains("at most 1"));
    }

    #[test]
    fn test_inverse_traversal() {
        let shape = Shape::inverse_field(iri("knows"), Shape::min_count(2));
        let validator = Validator::new();
        let incoming = facts(vec![
            ("bob", "knows", Value::Ref(iri("alice"))),
            ("carol", "knows", Value::Ref(iri("alice"))),
        ]);
        assert!(validator
            .validate(&person(), &shape, &incoming)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_datatype_check() {
        let shape = Shape::field(iri("age"), Shape::datatype(Kind::Literal));
        let validator = Validator::new();

        let literal = facts(vec![("alice", "age", Value::Long(42))]);
        assert!(validator
            .validate(&person(), &shape, &literal)
            .unwrap()
            .is_empty());

        let reference = facts(vec![("alice", "age", Value::Ref(iri("forty-two")))]);
        let trace = validator.validate(&person(), &shape, &reference).unwrap();
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_ordering_bounds() {
        let shape = Shape::field(
            iri("age"),
            Shape::and([Shape::min_inclusive(0), Shape::max_exclusive(150)]),
        );
        let validator = Validator::new();

        let ok = facts(vec![("alice", "age", Value::Long(42))]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let out = facts(vec![("alice", "age", Value::Long(150))]);
        let trace = validator.validate(&person(), &shape, &out).unwrap();
        let nested = &trace.fields()[&Step::direct(iri("age"))];
        assert!(nested.issues()[0].contains("must be less than 150"));

        // Incomparable values violate the bound
        let text = facts(vec![("alice", "age", Value::from("old"))]);
        let trace = validator.validate(&person(), &shape, &text).unwrap();
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_cross_type_numeric_bound() {
        let shape = Shape::field(iri("score"), Shape::min_exclusive(3));
        let validator = Validator::new();
        let ok = facts(vec![("alice", "score", Value::Double(3.5))]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());
    }

    #[test]
    fn test_length_bounds_use_lexical_form() {
        let shape = Shape::field(iri("code"), Shape::min_length(3));
        let validator = Validator::new();

        // Numbers count through their canonical lexical form
        let ok = facts(vec![("alice", "code", Value::Long(1234))]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let short = facts(vec![("alice", "code", Value::Long(12))]);
        assert!(!validator
            .validate(&person(), &shape, &short)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_pattern_matches_whole_form() {
        let shape = Shape::field(iri("code"), Shape::pattern("[a-z]+").unwrap());
        let validator = Validator::new();

        let ok = facts(vec![("alice", "code", Value::from("abc"))]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        // A substring match is not enough
        let partial = facts(vec![("alice", "code", Value::from("abc1"))]);
        assert!(!validator
            .validate(&person(), &shape, &partial)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_like_keyword_stems() {
        let shape = Shape::field(iri("title"), Shape::like("sem web").unwrap());
        let validator = Validator::new();

        let ok = facts(vec![(
            "alice",
            "title",
            Value::from("Semantic Web Engineer"),
        )]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let miss = facts(vec![("alice", "title", Value::from("Web Designer"))]);
        assert!(!validator
            .validate(&person(), &shape, &miss)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_stem_prefix() {
        let shape = Shape::field(iri("homepage"), Shape::stem("https://example.org/"));
        let validator = Validator::new();

        let ok = facts(vec![(
            "alice",
            "homepage",
            Value::from("https://example.org/alice"),
        )]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let other = facts(vec![(
            "alice",
            "homepage",
            Value::from("https://example.com/alice"),
        )]);
        assert!(!validator
            .validate(&person(), &shape, &other)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_in_allowed_set() {
        let shape = Shape::field(iri("status"), Shape::within(["active", "retired"]));
        let validator = Validator::new();

        let ok = facts(vec![("alice", "status", Value::from("active"))]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let bad = facts(vec![("alice", "status", Value::from("unknown"))]);
        assert!(!validator
            .validate(&person(), &shape, &bad)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lang_and_localized() {
        let shape = Shape::field(
            iri("label"),
            Shape::and([Shape::lang(["en", "fr"]), Shape::localized()]),
        );
        let validator = Validator::new();

        let ok = facts(vec![
            ("alice", "label", Value::text("Alice", "en")),
            ("alice", "label", Value::text("Alice", "fr")),
        ]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let duplicate = facts(vec![
            ("alice", "label", Value::text("Alice", "en")),
            ("alice", "label", Value::text("Alicia", "en")),
        ]);
        let trace = validator.validate(&person(), &shape, &duplicate).unwrap();
        let nested = &trace.fields()[&Step::direct(iri("label"))];
        assert!(nested.issues()[0].contains("duplicate values for language 'en'"));

        let wrong_lang = facts(vec![("alice", "label", Value::text("Alice", "de"))]);
        assert!(!validator
            .validate(&person(), &shape, &wrong_lang)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_class_with_hierarchy() {
        use trellis_core::namespaces::RDF;
        let rdf_type = Iri::new(RDF, "type");
        let data = FactSet::new(vec![
            trellis_core::Fact::new(iri("alice"), iri("pet"), Value::Ref(iri("rex"))),
            trellis_core::Fact::new(iri("rex"), rdf_type, Value::Ref(iri("Dog"))),
        ]);
        let hierarchy = ClassHierarchy::from_subclass_pairs(vec![(iri("Dog"), iri("Animal"))]);

        let shape = Shape::field(iri("pet"), Shape::class(iri("Animal")));

        // Subclass-aware: Dog is within Animal
        let reasoning = Validator::with_hierarchy(hierarchy);
        let trace = reasoning.validate(&person(), &shape, &data).unwrap();
        // The rdf:type fact itself lies outside the shape envelope
        assert!(trace.fields().is_empty());

        // Without a hierarchy, only an exact class match conforms
        let plain = Validator::new();
        let trace = plain.validate(&person(), &shape, &data).unwrap();
        assert!(!trace.fields().is_empty());
    }

    #[test]
    fn test_or_reports_single_issue() {
        let shape = Shape::field(
            iri("status"),
            Shape::or([Shape::all(["x", "y"]), Shape::all(["x", "z"])]),
        );
        let validator = Validator::new();

        let ok = facts(vec![
            ("alice", "status", Value::from("x")),
            ("alice", "status", Value::from("y")),
        ]);
        assert!(validator.validate(&person(), &shape, &ok).unwrap().is_empty());

        let bad = facts(vec![("alice", "status", Value::from("x"))]);
        let trace = validator.validate(&person(), &shape, &bad).unwrap();
        let nested = &trace.fields()[&Step::direct(iri("status"))];
        assert_eq!(nested.issues().len(), 1);
        assert!(nested.issues()[0].contains("none of the alternatives"));
    }

    #[test]
    fn test_when_branches() {
        // Resources must have a name; literals must be short
        let shape = Shape::field(
            iri("ref"),
            Shape::when(
                Shape::datatype(Kind::Resource),
                Shape::min_count(1),
                Shape::max_length(5),
            ),
        );
        let validator = Validator::new();

        let resource = facts(vec![("alice", "ref", Value::Ref(iri("bob")))]);
        assert!(validator
            .validate(&person(), &shape, &resource)
            .unwrap()
            .is_empty());

        let long_literal = facts(vec![("alice", "ref", Value::from("a long string"))]);
        assert!(!validator
            .validate(&person(), &shape, &long_literal)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_envelope_check() {
        let shape = Shape::field(iri("name"), Shape::min_count(1));
        let validator = Validator::new();

        let with_stray = facts(vec![
            ("alice", "name", Value::from("Alice")),
            ("alice", "shoeSize", Value::Long(38)),
        ]);
        let trace = validator.validate(&person(), &shape, &with_stray).unwrap();
        assert_eq!(trace.issues().len(), 1);
        assert!(trace.issues()[0].contains("outside shape envelope"));
        assert!(trace.issues()[0].contains("shoeSize"));
    }

    #[test]
    fn test_unconstrained_root_skips_envelope_check() {
        let validator = Validator::new();
        let data = facts(vec![("alice", "name", Value::from("Alice"))]);
        let trace = validator
            .validate(&person(), &Shape::anything(), &data)
            .unwrap();
        assert!(trace.is_empty());
    }

    #[test]
    fn test_unresolved_guard_raises() {
        let shape = Shape::field(iri("name"), Shape::guard("task", ["create"]));
        let validator = Validator::new();
        let data = facts(vec![("alice", "name", Value::from("Alice"))]);
        assert!(matches!(
            validator.validate(&person(), &shape, &data),
            Err(ShapeError::UnresolvedGuard { .. })
        ));
    }

    #[test]
    fn test_nested_field_traversal() {
        let shape = Shape::field(
            iri("knows"),
            Shape::and([
                Shape::min_count(1),
                Shape::field(iri("name"), Shape::min_count(1)),
            ]),
        );
        let validator = Validator::new();

        let complete = facts(vec![
            ("alice", "knows", Value::Ref(iri("bob"))),
            ("bob", "name", Value::from("Bob")),
        ]);
        assert!(validator
            .validate(&person(), &shape, &complete)
            .unwrap()
            .is_empty());

        let nameless = facts(vec![("alice", "knows", Value::Ref(iri("bob")))]);
        let trace = validator.validate(&person(), &shape, &nameless).unwrap();
        let knows = &trace.fields()[&Step::direct(iri("knows"))];
        let name = &knows.fields()[&Step::direct(iri("name"))];
        assert!(name.issues()[0].contains("at least 1"));
    }
}
