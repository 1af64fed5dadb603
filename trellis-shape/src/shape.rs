//! The shape algebra
//!
//! A [`Shape`] is an immutable constraint tree over graph data. Shapes are
//! built through smart constructors that validate arguments and apply cheap
//! local collapses at construction time; heavier rewriting belongs to
//! [`optimize`](crate::optimize).
//!
//! The closed variant set is matched exhaustively throughout the engine, so
//! adding a variant makes the compiler flag every site that needs a case.
//!
//! Two constant shapes anchor the algebra:
//! - [`Shape::anything`]: the empty conjunction, satisfied by any data
//! - [`Shape::nothing`]: the empty disjunction, satisfied by no data

use crate::error::{Result, ShapeError};
use trellis_core::{Iri, Kind, Value};

/// An immutable constraint tree over graph data
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Conjunction: every child must hold (ordered, duplicates collapsed)
    And(Vec<Shape>),
    /// Disjunction: at least one child must hold
    Or(Vec<Shape>),
    /// Conditional: if `test` holds, `pass` must hold, otherwise `fail`
    When(Box<Conditional>),
    /// Traversal step along a predicate
    Field(Box<FieldShape>),
    /// Traversal step along a reified edge
    Link(Box<FieldShape>),
    /// Values must fall under this kind in the datatype lattice
    Datatype(Kind),
    /// Values must be instances of this class (subclass-aware)
    Class(Iri),
    /// Values must belong to this enumerated set (empty = unconstrained)
    Range(Vec<Value>),
    /// Values must carry one of these language tags (empty = any language)
    Lang(Vec<String>),
    /// At least this many values
    MinCount(usize),
    /// At most this many values
    MaxCount(usize),
    /// Values must be >= this bound
    MinInclusive(Value),
    /// Values must be <= this bound
    MaxInclusive(Value),
    /// Values must be > this bound
    MinExclusive(Value),
    /// Values must be < this bound
    MaxExclusive(Value),
    /// Lexical form at least this long
    MinLength(usize),
    /// Lexical form at most this long
    MaxLength(usize),
    /// Whole lexical form must match this regex
    Pattern(String),
    /// Lexical form must contain these keywords as word stems, in order
    Like(String),
    /// Lexical form must start with this prefix
    Stem(String),
    /// Every listed value must be present among the focus values
    All(Vec<Value>),
    /// At least one listed value must be present among the focus values
    Any(Vec<Value>),
    /// Every focus value must belong to this set (empty = unconstrained)
    In(Vec<Value>),
    /// At most one value per language tag
    Localized,
    /// Deferred condition on a context axis; must be redacted before use
    Guard(Box<GuardShape>),
}

/// Test/pass/fail triple for [`Shape::When`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Conditional {
    pub test: Shape,
    pub pass: Shape,
    pub fail: Shape,
}

/// A predicate traversal step
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldShape {
    /// The predicate to traverse
    pub predicate: Iri,
    /// Traversal direction: false = `(focus, p, ?)`, true = `(?, p, focus)`
    pub inverse: bool,
    /// Explicit user label; when absent one is inferred from the predicate
    pub label: Option<String>,
    /// Constraint on the traversed values
    pub shape: Shape,
}

/// A deferred condition on a caller-context axis
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GuardShape {
    /// Axis identifier (e.g. an operation kind, view, or role axis)
    pub axis: String,
    /// Values of the axis for which the guard passes
    pub values: Vec<Value>,
}

impl Shape {
    /// The always-satisfied shape: the empty conjunction
    pub fn anything() -> Shape {
        Shape::And(Vec::new())
    }

    /// The unsatisfiable shape: the empty disjunction
    pub fn nothing() -> Shape {
        Shape::Or(Vec::new())
    }

    /// Check if this is the always-satisfied constant
    pub fn is_anything(&self) -> bool {
        matches!(self, Shape::And(children) if children.is_empty())
    }

    /// Check if this is the unsatisfiable constant
    pub fn is_nothing(&self) -> bool {
        matches!(self, Shape::Or(children) if children.is_empty())
    }

    /// Conjunction of shapes
    ///
    /// Directly nested conjunctions are flattened, always-satisfied children
    /// dropped, and an unsatisfiable child collapses the whole conjunction.
    /// A singleton unwraps to its only child.
    pub fn and(children: impl IntoIterator<Item = Shape>) -> Shape {
        let mut out = Vec::new();
        for child in children {
            if child.is_nothing() {
                return Shape::nothing();
            }
            match child {
                // Also covers the always-satisfied constant: nothing to add
                Shape::And(nested) => out.extend(nested),
                other => out.push(other),
            }
        }
        if out.len() == 1 {
            out.remove(0)
        } else {
            Shape::And(out)
        }
    }

    /// Disjunction of shapes
    ///
    /// Directly nested disjunctions are flattened and unsatisfiable children
    /// dropped. A singleton unwraps to its only child; no alternatives at
    /// all is the unsatisfiable shape.
    pub fn or(children: impl IntoIterator<Item = Shape>) -> Shape {
        let mut out = Vec::new();
        for child in children {
            match child {
                // Also covers the unsatisfiable constant: nothing to add
                Shape::Or(nested) => out.extend(nested),
                other => out.push(other),
            }
        }
        if out.len() == 1 {
            out.remove(0)
        } else {
            Shape::Or(out)
        }
    }

    /// Conditional shape
    ///
    /// Folds immediately when the test is a constant, or when both branches
    /// are the same shape.
    pub fn when(test: Shape, pass: Shape, fail: Shape) -> Shape {
        if test.is_anything() {
            return pass;
        }
        if test.is_nothing() {
            return fail;
        }
        if pass == fail {
            return pass;
        }
        Shape::When(Box::new(Conditional { test, pass, fail }))
    }

    /// Direct field traversal
    ///
    /// A field whose nested shape is unsatisfiable is pruned to the
    /// always-satisfied shape: no such field may appear, and none is
    /// required.
    pub fn field(predicate: Iri, shape: Shape) -> Shape {
        Self::make_field(predicate, false, None, shape, false)
    }

    /// Inverse field traversal
    pub fn inverse_field(predicate: Iri, shape: Shape) -> Shape {
        Self::make_field(predicate, true, None, shape, false)
    }

    /// Direct reified-edge traversal
    pub fn link(predicate: Iri, shape: Shape) -> Shape {
        Self::make_field(predicate, false, None, shape, true)
    }

    /// Inverse reified-edge traversal
    pub fn inverse_link(predicate: Iri, shape: Shape) -> Shape {
        Self::make_field(predicate, true, None, shape, true)
    }

    fn make_field(
        predicate: Iri,
        inverse: bool,
        label: Option<String>,
        shape: Shape,
        reified: bool,
    ) -> Shape {
        if shape.is_nothing() {
            return Shape::anything();
        }
        let field = Box::new(FieldShape {
            predicate,
            inverse,
            label,
            shape,
        });
        if reified {
            Shape::Link(field)
        } else {
            Shape::Field(field)
        }
    }

    /// Attach an explicit label to a field or link
    ///
    /// Has no effect on other shape variants.
    pub fn labeled(self, label: impl Into<String>) -> Shape {
        match self {
            Shape::Field(mut f) => {
                f.label = Some(label.into());
                Shape::Field(f)
            }
            Shape::Link(mut f) => {
                f.label = Some(label.into());
                Shape::Link(f)
            }
            other => other,
        }
    }

    /// Datatype constraint
    pub fn datatype(kind: Kind) -> Shape {
        Shape::Datatype(kind)
    }

    /// Class membership constraint
    pub fn class(class: Iri) -> Shape {
        Shape::Class(class)
    }

    /// Enumerated allowed-value set
    pub fn range(values: impl IntoIterator<Item = impl Into<Value>>) -> Shape {
        Shape::Range(values.into_iter().map(Into::into).collect())
    }

    /// Accepted language tags
    pub fn lang(tags: impl IntoIterator<Item = impl Into<String>>) -> Shape {
        Shape::Lang(tags.into_iter().map(Into::into).collect())
    }

    /// Minimum cardinality
    pub fn min_count(limit: usize) -> Shape {
        Shape::MinCount(limit)
    }

    /// Maximum cardinality
    pub fn max_count(limit: usize) -> Shape {
        Shape::MaxCount(limit)
    }

    /// Inclusive lower bound
    pub fn min_inclusive(bound: impl Into<Value>) -> Shape {
        Shape::MinInclusive(bound.into())
    }

    /// Inclusive upper bound
    pub fn max_inclusive(bound: impl Into<Value>) -> Shape {
        Shape::MaxInclusive(bound.into())
    }

    /// Exclusive lower bound
    pub fn min_exclusive(bound: impl Into<Value>) -> Shape {
        Shape::MinExclusive(bound.into())
    }

    /// Exclusive upper bound
    pub fn max_exclusive(bound: impl Into<Value>) -> Shape {
        Shape::MaxExclusive(bound.into())
    }

    /// Minimum lexical length
    pub fn min_length(limit: usize) -> Shape {
        Shape::MinLength(limit)
    }

    /// Maximum lexical length
    pub fn max_length(limit: usize) -> Shape {
        Shape::MaxLength(limit)
    }

    /// Whole-form regex constraint
    ///
    /// The expression is compiled here to fail fast on authoring errors; the
    /// validator compiles it again, anchored, when checking values.
    pub fn pattern(expr: impl Into<String>) -> Result<Shape> {
        let expr = expr.into();
        regex::Regex::new(&expr).map_err(|e| ShapeError::InvalidPattern {
            pattern: expr.clone(),
            message: e.to_string(),
        })?;
        Ok(Shape::Pattern(expr))
    }

    /// Keyword stem-match constraint
    pub fn like(keywords: impl Into<String>) -> Result<Shape> {
        let keywords = keywords.into();
        if keywords.trim().is_empty() {
            return Err(ShapeError::invalid_argument(
                "like constraint requires at least one keyword",
            ));
        }
        Ok(Shape::Like(keywords))
    }

    /// Lexical prefix constraint
    pub fn stem(prefix: impl Into<String>) -> Shape {
        Shape::Stem(prefix.into())
    }

    /// All listed values required
    pub fn all(values: impl IntoIterator<Item = impl Into<Value>>) -> Shape {
        Shape::All(values.into_iter().map(Into::into).collect())
    }

    /// At least one listed value required
    pub fn any(values: impl IntoIterator<Item = impl Into<Value>>) -> Shape {
        Shape::Any(values.into_iter().map(Into::into).collect())
    }

    /// Allowed-value set
    pub fn within(values: impl IntoIterator<Item = impl Into<Value>>) -> Shape {
        Shape::In(values.into_iter().map(Into::into).collect())
    }

    /// Uniqueness by language tag
    pub fn localized() -> Shape {
        Shape::Localized
    }

    /// Deferred condition on a context axis
    pub fn guard(
        axis: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Shape {
        Shape::Guard(Box::new(GuardShape {
            axis: axis.into(),
            values: values.into_iter().map(Into::into).collect(),
        }))
    }

    /// Get a short human-readable description of this shape
    pub fn description(&self) -> String {
        match self {
            Shape::And(children) if children.is_empty() => "anything".to_string(),
            Shape::And(children) => format!("and ({} shapes)", children.len()),
            Shape::Or(children) if children.is_empty() => "nothing".to_string(),
            Shape::Or(children) => format!("or ({} alternatives)", children.len()),
            Shape::When(_) => "when".to_string(),
            Shape::Field(f) if f.inverse => format!("field ^{}", f.predicate),
            Shape::Field(f) => format!("field {}", f.predicate),
            Shape::Link(f) if f.inverse => format!("link ^{}", f.predicate),
            Shape::Link(f) => format!("link {}", f.predicate),
            Shape::Datatype(kind) => format!("datatype {}", kind),
            Shape::Class(c) => format!("class {}", c),
            Shape::Range(vs) => format!("range ({} values)", vs.len()),
            Shape::Lang(tags) => format!("lang {:?}", tags),
            Shape::MinCount(n) => format!("minCount {}", n),
            Shape::MaxCount(n) => format!("maxCount {}", n),
            Shape::MinInclusive(v) => format!("minInclusive {}", v),
            Shape::MaxInclusive(v) => format!("maxInclusive {}", v),
            Shape::MinExclusive(v) => format!("minExclusive {}", v),
            Shape::MaxExclusive(v) => format!("maxExclusive {}", v),
            Shape::MinLength(n) => format!("minLength {}", n),
            Shape::MaxLength(n) => format!("maxLength {}", n),
            Shape::Pattern(p) => format!("pattern \"{}\"", p),
            Shape::Like(k) => format!("like \"{}\"", k),
            Shape::Stem(p) => format!("stem \"{}\"", p),
            Shape::All(vs) => format!("all ({} values)", vs.len()),
            Shape::Any(vs) => format!("any ({} values)", vs.len()),
            Shape::In(vs) => format!("in ({} values)", vs.len()),
            Shape::Localized => "localized".to_string(),
            Shape::Guard(g) => format!("guard {}", g.axis),
        }
    }
}
