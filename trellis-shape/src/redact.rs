//! Shape redaction
//!
//! Redaction specializes an abstract shape for a concrete request context:
//! every [`Guard`](crate::shape::Shape::Guard) is resolved to a constant
//! according to the values enabled on its axis, and the surrounding tree is
//! rebuilt around the results. Redaction never inspects fact data: it is a
//! pure function of the shape and the caller's declared context.
//!
//! The intended pipeline builds the abstract shape once, then per request:
//! redact, optimize, validate. Redaction leaves collapsed branches behind
//! (pruned fields, empty conjunctions); `optimize` folds them away.

use crate::shape::{FieldShape, Shape};
use rustc_hash::FxHashMap;
use trellis_core::Value;

/// Caller-declared request context: axis identifier → enabled values
///
/// Typical axes are an operation kind, a view name, or security roles.
/// An axis absent from the context is "not applicable": guards on it fail
/// closed.
#[derive(Clone, Debug, Default)]
pub struct Context {
    axes: FxHashMap<String, Vec<Value>>,
}

impl Context {
    /// Create an empty context (all guards fail closed)
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable values for an axis
    pub fn with(
        mut self,
        axis: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.axes
            .entry(axis.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// The values enabled for an axis, if the axis is present
    pub fn enabled(&self, axis: &str) -> Option<&[Value]> {
        self.axes.get(axis).map(|v| v.as_slice())
    }
}

/// Resolve all guards in a shape against a request context
///
/// A guard passes (becomes the always-satisfied shape) when the context
/// enables at least one of its accepted values on its axis; otherwise it
/// becomes the unsatisfiable shape. All other nodes are rebuilt around
/// their redacted children.
pub fn redact(shape: &Shape, ctx: &Context) -> Shape {
    match shape {
        Shape::Guard(g) => {
            let passes = ctx
                .enabled(&g.axis)
                .is_some_and(|enabled| g.values.iter().any(|v| enabled.contains(v)));
            if passes {
                Shape::anything()
            } else {
                Shape::nothing()
            }
        }
        Shape::And(children) => Shape::and(children.iter().map(|c| redact(c, ctx))),
        Shape::Or(children) => Shape::or(children.iter().map(|c| redact(c, ctx))),
        Shape::When(c) => Shape::when(
            redact(&c.test, ctx),
            redact(&c.pass, ctx),
            redact(&c.fail, ctx),
        ),
        Shape::Field(f) => rebuild(f, redact(&f.shape, ctx), false),
        Shape::Link(f) => rebuild(f, redact(&f.shape, ctx), true),
        leaf => leaf.clone(),
    }
}

fn rebuild(field: &FieldShape, nested: Shape, reified: bool) -> Shape {
    if nested.is_nothing() {
        // The whole field is hidden in this context
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

impl Shape {
    /// Resolve all guards against a request context
    ///
    /// See [`redact`].
    pub fn redact(&self, ctx: &Context) -> Shape {
        redact(self, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Iri;

    fn iri(name: &str) -> Iri {
        Iri::new(100, name)
    }

    #[test]
    fn test_guard_passes_on_enabled_value() {
        let shape = Shape::guard("task", ["create"]);
        let ctx = Context::new().with("task", ["create"]);
        assert!(shape.redact(&ctx).is_anything());
    }

    #[test]
    fn test_guard_fails_on_other_value() {
        let shape = Shape::guard("task", ["create"]);
        let ctx = Context::new().with("task", ["delete"]);
        assert!(shape.redact(&ctx).is_nothing());
    }

    #[test]
    fn test_guard_fails_closed_on_missing_axis() {
        let shape = Shape::guard("task", ["create"]);
        let ctx = Context::new().with("role", ["admin"]);
        assert!(shape.redact(&ctx).is_nothing());
    }

    #[test]
    fn test_guard_intersects_value_sets() {
        let shape = Shape::guard("role", ["editor", "admin"]);
        let ctx = Context::new().with("role", ["viewer", "admin"]);
        assert!(shape.redact(&ctx).is_anything());
    }

    #[test]
    fn test_guarded_field_disappears() {
        let shape = Shape::field(
            iri("salary"),
            Shape::and([Shape::guard("role", ["admin"]), Shape::min_count(1)]),
        );

        let admin = Context::new().with("role", ["admin"]);
        match shape.redact(&admin) {
            Shape::Field(f) => assert_eq!(f.shape, Shape::MinCount(1)),
            other => panic!("expected field, got {:?}", other),
        }

        let visitor = Context::new().with("role", ["visitor"]);
        assert!(shape.redact(&visitor).is_anything());
    }

    #[test]
    fn test_guarded_conjunct_collapses_conjunction() {
        let shape = Shape::And(vec![
            Shape::guard("mode", ["verify"]),
            Shape::min_count(1),
        ]);
        let ctx = Context::new().with("mode", ["relax"]);
        assert!(shape.redact(&ctx).is_nothing());
    }

    #[test]
    fn test_redaction_is_pure_and_transparent() {
        let shape = Shape::or([
            Shape::field(iri("name"), Shape::min_count(1)),
            Shape::field(iri("label"), Shape::min_count(1)),
        ]);
        let ctx = Context::new();
        // No guards anywhere: redaction is the identity
        assert_eq!(shape.redact(&ctx), shape);
    }

    #[test]
    fn test_when_test_redaction_selects_branch() {
        let shape = Shape::when(
            Shape::guard("view", ["detail"]),
            Shape::field(iri("bio"), Shape::min_count(1)),
            Shape::anything(),
        );

        let detail = Context::new().with("view", ["detail"]);
        match shape.redact(&detail) {
            Shape::Field(f) => assert_eq!(f.predicate, iri("bio")),
            other => panic!("expected field, got {:?}", other),
        }

        let digest = Context::new().with("view", ["digest"]);
        assert!(shape.redact(&digest).is_anything());
    }
}
