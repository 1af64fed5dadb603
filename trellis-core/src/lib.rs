//! Core data model for Trellis
//!
//! This crate provides the value-level building blocks shared by the shape
//! engine:
//!
//! - [`Iri`]: compact identifiers (namespace code + interned local name)
//! - [`Value`]: polymorphic object values with comparison-class ordering
//! - [`Kind`]: the datatype subsumption lattice over value categories
//! - [`Fact`] / [`FactSet`]: an immutable, index-addressed triple set with
//!   direct and inverse pattern lookup
//! - [`ClassHierarchy`]: precomputed transitive subclass closure for
//!   class-membership checks
//!
//! Everything here is an immutable value: cheap to clone, safe to share
//! across threads without synchronization.

mod fact;
mod hierarchy;
mod iri;
mod kind;
mod value;

pub use fact::{Fact, FactSet};
pub use hierarchy::ClassHierarchy;
pub use iri::{Iri, IriInterner};
pub use kind::{dt_family_compatible, Kind};
pub use value::Value;

/// Namespace codes (re-exported from trellis-vocab)
pub use trellis_vocab::namespaces;
