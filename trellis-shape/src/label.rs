//! Field label inference
//!
//! Fields without an explicit label get one derived from the trailing
//! segment of their predicate (the part after the last `/` or `#`), with an
//! `Of` suffix for inverse traversals. Two different fields resolving to the
//! same label are a schema authoring error, unless one of them carries an
//! explicit label, which then owns the name.

use crate::error::{Result, ShapeError};
use crate::shape::{FieldShape, Shape};
use std::collections::BTreeMap;
use trellis_core::Iri;

/// Derive the default label for a predicate traversal
pub fn default_label(predicate: &Iri, inverse: bool) -> String {
    let name = predicate.name_str();
    let segment = name.rsplit(['/', '#']).next().unwrap_or(name);
    if inverse {
        format!("{}Of", segment)
    } else {
        segment.to_string()
    }
}

/// The resolved label of a field: explicit if present, inferred otherwise
pub fn field_label(field: &FieldShape) -> String {
    field
        .label
        .clone()
        .unwrap_or_else(|| default_label(&field.predicate, field.inverse))
}

/// Collect the fields and links declared at this shape's level
///
/// Descends through conjunctions, disjunctions and conditionals but never
/// crosses a field boundary: a nested field belongs to the traversed
/// value's level, not this one. The second tuple element marks reified
/// (link) traversals.
pub fn collect_fields(shape: &Shape) -> Vec<(&FieldShape, bool)> {
    let mut out = Vec::new();
    collect_into(shape, &mut out);
    out
}

fn collect_into<'a>(shape: &'a Shape, out: &mut Vec<(&'a FieldShape, bool)>) {
    match shape {
        Shape::Field(f) => out.push((f, false)),
        Shape::Link(f) => out.push((f, true)),
        Shape::And(children) | Shape::Or(children) => {
            for child in children {
                collect_into(child, out);
            }
        }
        Shape::When(c) => {
            collect_into(&c.test, out);
            collect_into(&c.pass, out);
            collect_into(&c.fail, out);
        }
        _ => {}
    }
}

/// Resolve the labels of all fields at this shape's level
///
/// Returns the label → field map the codec encodes with. Raises
/// [`ShapeError::LabelCollision`] when two different fields claim the same
/// label, unless exactly one of them is explicitly labelled: the explicit
/// label wins and the colliding inferred field is left out of the map.
pub fn field_labels(shape: &Shape) -> Result<BTreeMap<String, &FieldShape>> {
    let fields = collect_fields(shape);

    // Explicit labels claim their names first
    let mut explicit: BTreeMap<String, &FieldShape> = BTreeMap::new();
    for &(field, _) in &fields {
        if let Some(label) = &field.label {
            match explicit.get(label.as_str()) {
                Some(existing) if !same_traversal(existing, field) => {
                    return Err(ShapeError::LabelCollision {
                        label: label.clone(),
                        first: existing.predicate.to_string(),
                        second: field.predicate.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    explicit.insert(label.clone(), field);
                }
            }
        }
    }

    // Inferred labels fill the rest; an explicit claim shadows them
    let mut out = explicit.clone();
    let mut inferred: BTreeMap<String, &FieldShape> = BTreeMap::new();
    for &(field, _) in &fields {
        if field.label.is_some() {
            continue;
        }
        let label = default_label(&field.predicate, field.inverse);
        if explicit.contains_key(&label) {
            continue;
        }
        match inferred.get(label.as_str()) {
            Some(existing) if !same_traversal(existing, field) => {
                return Err(ShapeError::LabelCollision {
                    label,
                    first: existing.predicate.to_string(),
                    second: field.predicate.to_string(),
                });
            }
            Some(_) => {}
            None => {
                inferred.insert(label.clone(), field);
                out.insert(label, field);
            }
        }
    }

    Ok(out)
}

fn same_traversal(a: &FieldShape, b: &FieldShape) -> bool {
    a.predicate == b.predicate && a.inverse == b.inverse
}
