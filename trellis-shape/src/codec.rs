//! Codec boundary views
//!
//! Derived, read-only views over an optimized, redacted shape for the
//! external encoder: per-field labels and nested shapes, repeatability, and
//! constant-value detection. The encoder uses these to pick property names,
//! decide between single values and arrays, and omit metadata the shape
//! already fixes.

use crate::error::Result;
use crate::label::{collect_fields, field_label, field_labels};
use crate::shape::Shape;
use trellis_core::{Iri, Value};

/// One encodable field of a shape
#[derive(Debug)]
pub struct FieldInfo<'a> {
    /// Resolved label (explicit or inferred)
    pub label: String,
    /// Traversed predicate
    pub predicate: &'a Iri,
    /// Traversal direction
    pub inverse: bool,
    /// Whether this is a reified-edge (link) traversal
    pub reified: bool,
    /// Constraint on the traversed values
    pub shape: &'a Shape,
    /// Whether more than one value may appear
    pub repeatable: bool,
}

/// The encodable fields of a shape, in declaration order
///
/// Raises on label collisions; a field whose inferred label is claimed by an
/// explicitly labelled field is omitted.
pub fn fields(shape: &Shape) -> Result<Vec<FieldInfo<'_>>> {
    let labels = field_labels(shape)?;
    let mut out = Vec::new();
    for (field, reified) in collect_fields(shape) {
        let label = field_label(field);
        let owns = labels
            .get(label.as_str())
            .is_some_and(|owner| std::ptr::eq(*owner, field));
        if owns {
            out.push(FieldInfo {
                label,
                predicate: &field.predicate,
                inverse: field.inverse,
                reified,
                shape: &field.shape,
                repeatable: is_repeatable(&field.shape),
            });
        }
    }
    Ok(out)
}

/// The conjuncts a shape unconditionally requires
///
/// A conjunction exposes its children; any other shape is its own single
/// conjunct. Alternatives and conditional branches are not unconditional,
/// so they contribute nothing here.
fn conjuncts(shape: &Shape) -> &[Shape] {
    match shape {
        Shape::And(children) => children,
        other => std::slice::from_ref(other),
    }
}

/// The tightest unconditional maximum cardinality, if any
pub fn max_count(shape: &Shape) -> Option<usize> {
    conjuncts(shape)
        .iter()
        .filter_map(|s| match s {
            Shape::MaxCount(n) => Some(*n),
            _ => None,
        })
        .min()
}

/// The tightest unconditional minimum cardinality, if any
pub fn min_count(shape: &Shape) -> Option<usize> {
    conjuncts(shape)
        .iter()
        .filter_map(|s| match s {
            Shape::MinCount(n) => Some(*n),
            _ => None,
        })
        .max()
}

/// Whether a shape admits more than one value
///
/// No maximum cardinality, or one above 1, means the encoder must use an
/// array form.
pub fn is_repeatable(shape: &Shape) -> bool {
    max_count(shape).map_or(true, |n| n > 1)
}

/// The single value a shape fixes, if any
///
/// After optimization, a singleton allowed or required set pins the value;
/// the encoder can omit it from instance output.
pub fn constant_value(shape: &Shape) -> Option<&Value> {
    conjuncts(shape).iter().find_map(|s| match s {
        Shape::All(vs) | Shape::In(vs) | Shape::Range(vs) if vs.len() == 1 => Some(&vs[0]),
        _ => None,
    })
}
