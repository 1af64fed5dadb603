//! Value kind lattice
//!
//! Centralizes the fixed subsumption order over value categories:
//!
//! ```text
//!            Any
//!           /   \
//!     Resource   Literal
//!      /   \        |
//!    Iri  Blank  Datatype(..)
//! ```
//!
//! Concrete datatypes additionally match within numeric families
//! (xsd:integer covers the stored integer family, xsd:double covers
//! xsd:float), so constraints written against the family head accept
//! narrower stored datatypes.

use crate::iri::Iri;
use crate::value::Value;
use std::fmt;
use trellis_vocab::{namespaces, xsd_names};

/// A node in the value-kind lattice
///
/// May be an abstract category (`Any`, `Resource`, `Literal`) or a concrete
/// datatype identified by IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Top: any value
    Any,
    /// Any reference (IRI or blank node)
    Resource,
    /// A named (non-blank) reference
    Iri,
    /// A blank-node reference
    Blank,
    /// Any literal value
    Literal,
    /// A literal with this concrete datatype
    Datatype(Iri),
}

impl Kind {
    /// Check whether this kind subsumes (is equal to or broader than) `other`
    pub fn subsumes(&self, other: &Kind) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (Kind::Any, _) => true,
            (Kind::Resource, Kind::Iri | Kind::Blank) => true,
            (Kind::Literal, Kind::Datatype(_)) => true,
            (Kind::Datatype(a), Kind::Datatype(b)) => dt_family_compatible(a, b),
            _ => false,
        }
    }

    /// The narrower of two kinds, when they are related in the lattice
    ///
    /// Returns `None` for unrelated kinds (e.g. two distinct concrete
    /// datatypes, or `Resource` vs `Literal`).
    pub fn narrower(a: &Kind, b: &Kind) -> Option<Kind> {
        if a.subsumes(b) {
            Some(b.clone())
        } else if b.subsumes(a) {
            Some(a.clone())
        } else {
            None
        }
    }

    /// Check whether a runtime value falls under this kind
    pub fn satisfied_by(&self, value: &Value) -> bool {
        match self {
            Kind::Any => true,
            Kind::Resource => value.is_ref(),
            Kind::Iri => value.as_iri().is_some_and(|iri| !iri.is_blank()),
            Kind::Blank => value.as_iri().is_some_and(|iri| iri.is_blank()),
            Kind::Literal => !value.is_ref(),
            Kind::Datatype(dt) => value
                .datatype()
                .is_some_and(|actual| dt_family_compatible(dt, &actual)),
        }
    }
}

impl Value {
    /// The most specific kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Ref(iri) if iri.is_blank() => Kind::Blank,
            Value::Ref(_) => Kind::Iri,
            other => match other.datatype() {
                Some(dt) => Kind::Datatype(dt),
                None => Kind::Literal,
            },
        }
    }
}

/// Datatype match semantics for literal values.
///
/// Stored integer-family datatypes (xsd:int, xsd:long, ...) satisfy an
/// xsd:integer constraint, and xsd:float satisfies xsd:double.
#[inline]
pub fn dt_family_compatible(expected: &Iri, actual: &Iri) -> bool {
    if expected == actual {
        return true;
    }
    if expected.namespace_code != namespaces::XSD || actual.namespace_code != namespaces::XSD {
        return false;
    }
    match expected.name.as_ref() {
        xsd_names::INTEGER => matches!(
            actual.name.as_ref(),
            xsd_names::INTEGER
                | xsd_names::INT
                | xsd_names::SHORT
                | xsd_names::BYTE
                | xsd_names::LONG
        ),
        xsd_names::DOUBLE => matches!(actual.name.as_ref(), xsd_names::DOUBLE | xsd_names::FLOAT),
        _ => false,
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Any => write!(f, "value"),
            Kind::Resource => write!(f, "resource"),
            Kind::Iri => write!(f, "iri"),
            Kind::Blank => write!(f, "blank"),
            Kind::Literal => write!(f, "literal"),
            Kind::Datatype(dt) => write!(f, "{}", dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xsd(name: &str) -> Iri {
        Iri::new(namespaces::XSD, name)
    }

    #[test]
    fn test_lattice_subsumption() {
        assert!(Kind::Any.subsumes(&Kind::Resource));
        assert!(Kind::Any.subsumes(&Kind::Datatype(xsd("string"))));
        assert!(Kind::Resource.subsumes(&Kind::Iri));
        assert!(Kind::Resource.subsumes(&Kind::Blank));
        assert!(Kind::Literal.subsumes(&Kind::Datatype(xsd("integer"))));

        assert!(!Kind::Resource.subsumes(&Kind::Literal));
        assert!(!Kind::Literal.subsumes(&Kind::Resource));
        assert!(!Kind::Iri.subsumes(&Kind::Resource));
        assert!(!Kind::Datatype(xsd("string")).subsumes(&Kind::Literal));
    }

    #[test]
    fn test_numeric_family_subsumption() {
        assert!(Kind::Datatype(xsd("integer")).subsumes(&Kind::Datatype(xsd("int"))));
        assert!(Kind::Datatype(xsd("double")).subsumes(&Kind::Datatype(xsd("float"))));
        assert!(!Kind::Datatype(xsd("int")).subsumes(&Kind::Datatype(xsd("integer"))));
        assert!(!Kind::Datatype(xsd("string")).subsumes(&Kind::Datatype(xsd("integer"))));
    }

    #[test]
    fn test_narrower() {
        assert_eq!(
            Kind::narrower(&Kind::Resource, &Kind::Iri),
            Some(Kind::Iri)
        );
        assert_eq!(
            Kind::narrower(&Kind::Datatype(xsd("integer")), &Kind::Literal),
            Some(Kind::Datatype(xsd("integer")))
        );
        assert_eq!(
            Kind::narrower(&Kind::Datatype(xsd("string")), &Kind::Datatype(xsd("integer"))),
            None
        );
        assert_eq!(Kind::narrower(&Kind::Resource, &Kind::Literal), None);
    }

    #[test]
    fn test_satisfied_by() {
        let iri_val = Value::Ref(Iri::new(100, "thing"));
        let blank_val = Value::Ref(Iri::blank("b0"));
        let str_val = Value::from("hello");
        let int_val = Value::Long(5);

        assert!(Kind::Any.satisfied_by(&iri_val));
        assert!(Kind::Any.satisfied_by(&str_val));
        assert!(Kind::Resource.satisfied_by(&iri_val));
        assert!(Kind::Resource.satisfied_by(&blank_val));
        assert!(Kind::Iri.satisfied_by(&iri_val));
        assert!(!Kind::Iri.satisfied_by(&blank_val));
        assert!(Kind::Blank.satisfied_by(&blank_val));
        assert!(Kind::Literal.satisfied_by(&str_val));
        assert!(!Kind::Literal.satisfied_by(&iri_val));
        assert!(Kind::Datatype(xsd("integer")).satisfied_by(&int_val));
        assert!(!Kind::Datatype(xsd("integer")).satisfied_by(&str_val));
    }

    #[test]
    fn test_value_kind_classification() {
        assert_eq!(Value::Ref(Iri::new(100, "x")).kind(), Kind::Iri);
        assert_eq!(Value::Ref(Iri::blank("x")).kind(), Kind::Blank);
        assert_eq!(
            Value::Long(1).kind(),
            Kind::Datatype(xsd("integer"))
        );
        assert_eq!(
            Value::from("s").kind(),
            Kind::Datatype(xsd("string"))
        );
    }
}
