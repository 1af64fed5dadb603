//! Shape optimization
//!
//! `optimize` rewrites a shape into an equivalent, minimal normal form. The
//! rewrite is pure, terminating (every rule strictly reduces node or
//! duplicate counts) and idempotent: `optimize(optimize(s)) == optimize(s)`.
//!
//! Contradictions that can be proven structurally (an empty intersection of
//! two non-empty required sets, conflicting explicit field labels) are
//! contract errors and raised immediately rather than folded away.
//!
//! Guards must be redacted before optimization; encountering one here is a
//! caller contract violation.

use crate::error::{Result, ShapeError};
use crate::shape::{FieldShape, Shape};
use tracing::debug;
use trellis_core::{Kind, Value};

/// Rewrite a shape into an equivalent, minimal normal form
pub fn optimize(shape: &Shape) -> Result<Shape> {
    match shape {
        Shape::And(children) => optimize_and(children),
        Shape::Or(children) => optimize_or(children),
        Shape::When(c) => {
            let test = optimize(&c.test)?;
            let pass = optimize(&c.pass)?;
            let fail = optimize(&c.fail)?;
            Ok(Shape::when(test, pass, fail))
        }
        Shape::Field(f) => optimize_field(f, false),
        Shape::Link(f) => optimize_field(f, true),
        Shape::Guard(g) => Err(ShapeError::UnresolvedGuard {
            axis: g.axis.clone(),
        }),
        leaf => Ok(leaf.clone()),
    }
}

fn optimize_field(field: &FieldShape, reified: bool) -> Result<Shape> {
    let nested = optimize(&field.shape)?;
    Ok(rebuild_field(field, nested, reified))
}

/// Rebuild a field around a new nested shape, pruning unsatisfiable fields
fn rebuild_field(field: &FieldShape, nested: Shape, reified: bool) -> Shape {
    if nested.is_nothing() {
        return Shape::anything();
    }
    let rebuilt = Box::new(FieldShape {
        predicate: field.predicate.clone(),
        inverse: field.inverse,
        label: field.label.clone(),
        shape: nested,
    });
    if reified {
        Shape::Link(rebuilt)
    } else {
        Shape::Field(rebuilt)
    }
}

fn optimize_and(children: &[Shape]) -> Result<Shape> {
    // Optimize and flatten; an unsatisfiable child collapses the conjunction
    let mut flat: Vec<Shape> = Vec::new();
    for child in children {
        let child = optimize(child)?;
        if child.is_nothing() {
            debug!("conjunction collapsed: unsatisfiable child");
            return Ok(Shape::nothing());
        }
        match child {
            Shape::And(nested) => flat.extend(nested),
            other => flat.push(other),
        }
    }

    // Merge pass: deduplicate and combine compatible constraints,
    // preserving first-occurrence order
    let mut out: Vec<Shape> = Vec::new();
    'next: for child in flat {
        for existing in out.iter_mut() {
            if let Some(merged) = merge_pair(existing, &child)? {
                *existing = merged;
                continue 'next;
            }
        }
        out.push(child);
    }

    // Merged fields may have been pruned to the always-satisfied constant
    out.retain(|s| !s.is_anything());

    Ok(Shape::and(out))
}

fn optimize_or(children: &[Shape]) -> Result<Shape> {
    let mut out: Vec<Shape> = Vec::new();
    for child in children {
        let child = optimize(child)?;
        if child.is_anything() {
            // One alternative accepts everything
            return Ok(Shape::anything());
        }
        if child.is_nothing() {
            continue;
        }
        if !out.contains(&child) {
            out.push(child);
        }
    }
    Ok(Shape::or(out))
}

/// Try to merge two conjuncts into one
///
/// Returns `Ok(None)` when the pair is unrelated and both must be kept.
fn merge_pair(existing: &Shape, incoming: &Shape) -> Result<Option<Shape>> {
    if existing == incoming {
        return Ok(Some(existing.clone()));
    }
    match (existing, incoming) {
        (Shape::Field(a), Shape::Field(b))
            if a.predicate == b.predicate && a.inverse == b.inverse =>
        {
            merge_fields(a, b, false).map(Some)
        }
        (Shape::Link(a), Shape::Link(b))
            if a.predicate == b.predicate && a.inverse == b.inverse =>
        {
            merge_fields(a, b, true).map(Some)
        }
        (Shape::Range(a), Shape::Range(b)) => {
            Ok(Some(Shape::Range(intersect_values("range", a, b)?)))
        }
        (Shape::In(a), Shape::In(b)) => Ok(Some(Shape::In(intersect_values("in", a, b)?))),
        (Shape::Lang(a), Shape::Lang(b)) => Ok(Some(Shape::Lang(intersect_tags(a, b)?))),
        (Shape::MinCount(a), Shape::MinCount(b)) => Ok(Some(Shape::MinCount(*a.max(b)))),
        (Shape::MaxCount(a), Shape::MaxCount(b)) => Ok(Some(Shape::MaxCount(*a.min(b)))),
        (Shape::MinLength(a), Shape::MinLength(b)) => Ok(Some(Shape::MinLength(*a.max(b)))),
        (Shape::MaxLength(a), Shape::MaxLength(b)) => Ok(Some(Shape::MaxLength(*a.min(b)))),
        (Shape::All(a), Shape::All(b)) => Ok(Some(Shape::All(union_values(a, b)))),
        // Narrower datatype wins; unrelated datatypes are both retained
        // (the conjunction is unsatisfiable, reported at validation time)
        (Shape::Datatype(a), Shape::Datatype(b)) => {
            Ok(Kind::narrower(a, b).map(Shape::Datatype))
        }
        _ => Ok(None),
    }
}

/// Merge two fields over the same predicate and direction
fn merge_fields(a: &FieldShape, b: &FieldShape, reified: bool) -> Result<Shape> {
    let label = merge_labels(a, b)?;
    let nested = optimize(&Shape::and([a.shape.clone(), b.shape.clone()]))?;
    debug!(predicate = %a.predicate, "merged duplicate field");
    let merged = FieldShape {
        predicate: a.predicate.clone(),
        inverse: a.inverse,
        label,
        shape: a.shape.clone(),
    };
    Ok(rebuild_field(&merged, nested, reified))
}

/// Prefer an explicit label over none; conflicting explicit labels are a
/// schema authoring error
fn merge_labels(a: &FieldShape, b: &FieldShape) -> Result<Option<String>> {
    match (&a.label, &b.label) {
        (None, None) => Ok(None),
        (Some(label), None) | (None, Some(label)) => Ok(Some(label.clone())),
        (Some(la), Some(lb)) if la == lb => Ok(Some(la.clone())),
        (Some(la), Some(lb)) => Err(ShapeError::LabelConflict {
            predicate: a.predicate.to_string(),
            existing: la.clone(),
            proposed: lb.clone(),
        }),
    }
}

/// Intersect two value sets; an empty operand is the unconstrained identity
fn intersect_values(constraint: &'static str, a: &[Value], b: &[Value]) -> Result<Vec<Value>> {
    if a.is_empty() {
        return Ok(b.to_vec());
    }
    if b.is_empty() {
        return Ok(a.to_vec());
    }
    let result: Vec<Value> = a.iter().filter(|v| b.contains(v)).cloned().collect();
    if result.is_empty() {
        return Err(ShapeError::contradiction(
            constraint,
            format!(
                "no value is shared between {} and {} constrained values",
                a.len(),
                b.len()
            ),
        ));
    }
    Ok(result)
}

/// Intersect two language tag sets; an empty operand accepts any language
fn intersect_tags(a: &[String], b: &[String]) -> Result<Vec<String>> {
    if a.is_empty() {
        return Ok(b.to_vec());
    }
    if b.is_empty() {
        return Ok(a.to_vec());
    }
    let result: Vec<String> = a.iter().filter(|t| b.contains(t)).cloned().collect();
    if result.is_empty() {
        return Err(ShapeError::contradiction(
            "lang",
            format!("no language tag is shared between {:?} and {:?}", a, b),
        ));
    }
    Ok(result)
}

/// Union two value sets, preserving first-occurrence order
fn union_values(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut out = a.to_vec();
    for v in b {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}
