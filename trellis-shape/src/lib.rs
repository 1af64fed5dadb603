//! Shape algebra and validation engine for Trellis
//!
//! This crate describes structural and content constraints on graph-shaped
//! data and validates, redacts and shapes data against them.
//!
//! # Overview
//!
//! Working with shapes follows a two-phase pipeline:
//! 1. Build an abstract [`Shape`] once, typically as a static schema
//!    definition, using the smart constructors
//! 2. Per request: resolve its guards against the caller's [`Context`]
//!    (`redact`), normalize the result (`optimize`), then walk a fact set
//!    from a focus value (`Validator::validate`) producing a [`Trace`]
//!
//! Shapes are immutable values: cheap to clone, safe to share, and
//! structurally comparable. The [`Trace`] is empty on success; data problems
//! are always reported through it, never as errors. Errors ([`ShapeError`])
//! are reserved for schema authoring and call-order mistakes.
//!
//! # Supported Constraints
//!
//! - Combinators: conjunction, disjunction, conditional
//! - Traversal: direct/inverse fields and reified links, with labels
//! - Value type: datatype lattice kinds, subclass-aware class membership
//! - Cardinality: minimum/maximum count
//! - Value range: inclusive/exclusive ordering bounds
//! - Lexical: length bounds, whole-form patterns, keyword stems, prefixes
//! - Sets: required-all, at-least-one, allowed values
//! - Language: accepted tags, uniqueness by language
//! - Parametric: context-axis guards, resolved by redaction
//!
//! # Example
//!
//! ```ignore
//! use trellis_shape::{optimize, Context, Shape, Validator};
//!
//! // Build the abstract shape once
//! let shape = Shape::and([
//!     Shape::field(name, Shape::and([Shape::min_count(1), Shape::localized()])),
//!     Shape::field(salary, Shape::and([
//!         Shape::guard("role", ["admin"]),
//!         Shape::min_inclusive(0),
//!     ])),
//! ]);
//!
//! // Per request: redact, optimize, validate
//! let ctx = Context::new().with("role", ["admin"]);
//! let concrete = optimize(&shape.redact(&ctx))?;
//!
//! let trace = Validator::new().validate(&focus, &concrete, &facts)?;
//! if !trace.is_empty() {
//!     println!("{}", serde_json::to_string_pretty(&trace)?);
//! }
//! ```

pub mod codec;
mod error;
pub mod label;
mod optimize;
mod redact;
mod shape;
mod trace;
mod validate;

pub use error::{Result, ShapeError};
pub use optimize::optimize;
pub use redact::{redact, Context};
pub use shape::{Conditional, FieldShape, GuardShape, Shape};
pub use trace::{Step, Trace};
pub use validate::Validator;
