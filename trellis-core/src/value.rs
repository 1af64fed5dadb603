//! Value - polymorphic object value type
//!
//! The object position of a fact can hold various types:
//! - References to other subjects (`Ref`)
//! - Strings (plain and language-tagged), integers, floats, booleans
//! - Date/time types, arbitrary-precision decimals
//!
//! ## Ordering
//!
//! Value implements strict total ordering with **numeric class comparison**:
//!
//! 1. **Numeric class**: Long, Double and Decimal are compared mathematically
//!    by value, not by type. For example, `Long(3) < Double(3.5) < Long(4)`.
//!    The type discriminant is only a tie-breaker for equal values.
//!
//! 2. **Temporal class**: DateTime, Date, Time are compared by instant within
//!    one type. Cross-type temporal comparisons are incompatible.
//!
//! 3. **Other types**: Compared by type discriminant first, then by value
//!    within type.
//!
//! `order_cmp` exposes the partial, type-aware order used for bound checks;
//! `Ord` extends it to a total order for use in sorted collections.

use crate::iri::Iri;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use trellis_vocab::{namespaces, rdf_names, xsd_names};

/// Polymorphic value type for fact objects
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Reference to another subject (IRI or blank node)
    Ref(Iri),
    /// Boolean value (xsd:boolean)
    Bool(bool),
    /// 64-bit signed integer (xsd:integer family)
    Long(i64),
    /// 64-bit floating point (xsd:double, xsd:float)
    Double(f64),
    /// Arbitrary precision decimal (xsd:decimal)
    /// Boxed to keep enum size small
    Decimal(Box<BigDecimal>),
    /// XSD date without time-of-day
    Date(NaiveDate),
    /// XSD time without date
    Time(NaiveTime),
    /// XSD dateTime with timezone preservation
    DateTime(DateTime<FixedOffset>),
    /// Plain string value (xsd:string)
    String(String),
    /// Language-tagged string (rdf:langString)
    Text {
        value: String,
        lang: String,
    },
}

impl Value {
    /// Create a language-tagged string value
    pub fn text(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Value::Text {
            value: value.into(),
            lang: lang.into(),
        }
    }

    /// Get the type discriminant for ordering
    ///
    /// Lower discriminant = sorts earlier.
    ///
    /// **Numeric class** (2-4): Long, Double and Decimal are grouped together
    /// and compared by mathematical value; the discriminant is only used as a
    /// tie-breaker when values are equal.
    fn type_discriminant(&self) -> u8 {
        match self {
            Value::Ref(_) => 0,
            Value::Bool(_) => 1,
            // Numeric class: grouped together (2-4)
            Value::Long(_) => 2,
            Value::Double(_) => 3,
            Value::Decimal(_) => 4,
            // Temporal class (5-7)
            Value::Date(_) => 5,
            Value::Time(_) => 6,
            Value::DateTime(_) => 7,
            // String class (8-9)
            Value::String(_) => 8,
            Value::Text { .. } => 9,
        }
    }

    /// Check if this is a reference (IRI or blank node)
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    /// Check if this is any numeric type (Long, Double, Decimal)
    ///
    /// All numeric types form a **comparison class** where values are compared
    /// mathematically, with datatype as a tie-breaker for equal values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Double(_) | Value::Decimal(_))
    }

    /// Check if this is any temporal type (Date, Time, DateTime)
    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::Time(_) | Value::DateTime(_))
    }

    /// Check if this is a string type (plain or language-tagged)
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_) | Value::Text { .. })
    }

    /// Try to get as i64
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64 (converts Long to f64)
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as string reference (plain or language-tagged)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Text { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Try to get as IRI reference
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Value::Ref(iri) => Some(iri),
            _ => None,
        }
    }

    /// The language tag, for language-tagged strings
    pub fn lang(&self) -> Option<&str> {
        match self {
            Value::Text { lang, .. } => Some(lang),
            _ => None,
        }
    }

    /// The concrete datatype identifier of a literal value
    ///
    /// Returns `None` for references, which have a node kind instead.
    pub fn datatype(&self) -> Option<Iri> {
        let (code, name) = match self {
            Value::Ref(_) => return None,
            Value::Bool(_) => (namespaces::XSD, xsd_names::BOOLEAN),
            Value::Long(_) => (namespaces::XSD, xsd_names::INTEGER),
            Value::Double(_) => (namespaces::XSD, xsd_names::DOUBLE),
            Value::Decimal(_) => (namespaces::XSD, xsd_names::DECIMAL),
            Value::Date(_) => (namespaces::XSD, xsd_names::DATE),
            Value::Time(_) => (namespaces::XSD, xsd_names::TIME),
            Value::DateTime(_) => (namespaces::XSD, xsd_names::DATE_TIME),
            Value::String(_) => (namespaces::XSD, xsd_names::STRING),
            Value::Text { .. } => (namespaces::RDF, rdf_names::LANG_STRING),
        };
        Some(Iri::new(code, name))
    }

    /// Compare two numeric values mathematically.
    ///
    /// Returns `None` if either value is not numeric. Within the numeric
    /// class the comparison is total: NaN falls back to bit comparison.
    pub fn numeric_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            // === Fast paths: same type ===
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a
                .partial_cmp(b)
                .or_else(|| Some(a.to_bits().cmp(&b.to_bits()))),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),

            // === Long vs Double ===
            (Value::Long(a), Value::Double(b)) => {
                if i64_fits_f64(*a) {
                    (*a as f64).partial_cmp(b)
                } else {
                    // Large i64: promote both to BigDecimal for exact comparison
                    let a_dec = BigDecimal::from(*a);
                    BigDecimal::try_from(*b)
                        .ok()
                        .map(|b_dec| a_dec.cmp(&b_dec))
                }
            }
            (Value::Double(_), Value::Long(_)) => other.numeric_cmp(self).map(Ordering::reverse),

            // === Long vs Decimal ===
            (Value::Long(a), Value::Decimal(b)) => Some(BigDecimal::from(*a).cmp(b)),
            (Value::Decimal(a), Value::Long(b)) => Some((**a).cmp(&BigDecimal::from(*b))),

            // === Double vs Decimal ===
            (Value::Double(a), Value::Decimal(b)) => {
                BigDecimal::try_from(*a).ok().map(|a_dec| a_dec.cmp(b))
            }
            (Value::Decimal(_), Value::Double(_)) => other.numeric_cmp(self).map(Ordering::reverse),

            // Not both numeric
            _ => None,
        }
    }

    /// Compare two temporal values by instant (same temporal type only).
    ///
    /// Returns `None` for cross-type comparisons (e.g., Date vs DateTime),
    /// consistent with XSD semantics where these are distinct types.
    pub fn temporal_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Type-aware partial comparison for ordering bounds.
    ///
    /// Numeric values compare mathematically across types, temporal values by
    /// instant within one type, strings lexically. Incompatible pairs return
    /// `None`.
    pub fn order_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_numeric() && other.is_numeric() {
            return self.numeric_cmp(other);
        }
        if self.is_temporal() && other.is_temporal() {
            return self.temporal_cmp(other);
        }
        if let (Value::Bool(a), Value::Bool(b)) = (self, other) {
            return Some(a.cmp(b));
        }
        match (self.as_str(), other.as_str()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Canonical lexical form of this value
    ///
    /// Used for length and lexical-match checks; numbers and temporal values
    /// are included via their canonical textual representation, references
    /// via their full IRI.
    pub fn lexical_form(&self) -> String {
        match self {
            Value::Ref(iri) => iri.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(v) => v.normalized().to_string(),
            Value::Date(v) => v.to_string(),
            Value::Time(v) => v.to_string(),
            Value::DateTime(v) => v.to_rfc3339(),
            Value::String(s) => s.clone(),
            Value::Text { value, .. } => value.clone(),
        }
    }

    /// Compare values of the same discriminant
    fn same_type_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a
                .partial_cmp(b)
                .unwrap_or_else(|| a.to_bits().cmp(&b.to_bits())),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (
                Value::Text { value: a, lang: la },
                Value::Text { value: b, lang: lb },
            ) => a.cmp(b).then_with(|| la.cmp(lb)),
            // Unreachable: discriminants are equal
            _ => Ordering::Equal,
        }
    }
}

/// Check if i64 is exactly representable as f64 (within 2^53)
fn i64_fits_f64(v: i64) -> bool {
    const MAX_SAFE: i64 = 1 << 53;
    v.abs() <= MAX_SAFE
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numeric class: compare mathematically, discriminant breaks ties
        if self.is_numeric() && other.is_numeric() {
            if let Some(ord) = self.numeric_cmp(other) {
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
        self.type_discriminant()
            .cmp(&other.type_discriminant())
            .then_with(|| self.same_type_cmp(other))
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Canonical quiet-NaN bit pattern for deterministic hashing
        const CANONICAL_NAN_BITS: u64 = 0x7ff8_0000_0000_0000;

        self.type_discriminant().hash(state);
        match self {
            Value::Ref(iri) => iri.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Double(v) => {
                // Normalize NaN and -0.0/+0.0 so hash agrees with equality
                let bits = if v.is_nan() {
                    CANONICAL_NAN_BITS
                } else if *v == 0.0 {
                    0u64
                } else {
                    v.to_bits()
                };
                bits.hash(state);
            }
            Value::Decimal(v) => v.normalized().to_string().hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            // Hash by instant: equal instants with different offsets compare equal
            Value::DateTime(v) => v.timestamp_micros().hash(state),
            Value::String(s) => s.hash(state),
            Value::Text { value, lang } => {
                value.hash(state);
                lang.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text { value, lang } => write!(f, "\"{}\"@{}", value, lang),
            Value::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.lexical_form()),
        }
    }
}

impl From<Iri> for Value {
    fn from(iri: Iri) -> Self {
        Value::Ref(iri)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Long(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(Box::new(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_numeric_class_comparison() {
        // Long(3) < Double(3.5) < Long(4)
        assert!(Value::Long(3) < Value::Double(3.5));
        assert!(Value::Double(3.5) < Value::Long(4));

        // Mathematically equal values tie-break by discriminant
        assert!(Value::Long(3) < Value::Double(3.0));
        assert_ne!(Value::Long(3), Value::Double(3.0));
    }

    #[test]
    fn test_numeric_cmp_decimal() {
        let dec = Value::from(BigDecimal::from_str("3.25").unwrap());
        assert_eq!(
            Value::Long(3).numeric_cmp(&dec),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Double(3.25).numeric_cmp(&dec),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_nan_total_order() {
        let nan = Value::Double(f64::NAN);
        // Comparison never panics and is reflexively equal
        assert_eq!(nan.cmp(&nan), Ordering::Equal);
        assert_eq!(nan, nan.clone());
    }

    #[test]
    fn test_temporal_cmp_same_type_only() {
        let d1 = Value::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let d2 = Value::from(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(d1.temporal_cmp(&d2), Some(Ordering::Less));

        let t = Value::from(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(d1.temporal_cmp(&t), None);
    }

    #[test]
    fn test_order_cmp_incompatible() {
        assert_eq!(Value::Long(1).order_cmp(&Value::from("1")), None);
        assert_eq!(
            Value::from("a").order_cmp(&Value::from("b")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_lexical_forms() {
        assert_eq!(Value::Long(42).lexical_form(), "42");
        assert_eq!(Value::Bool(true).lexical_form(), "true");
        assert_eq!(Value::from("hi").lexical_form(), "hi");
        assert_eq!(Value::text("salut", "fr").lexical_form(), "salut");
        let d = Value::from(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(d.lexical_form(), "2024-03-09");
    }

    #[test]
    fn test_lang_tags() {
        assert_eq!(Value::text("hello", "en").lang(), Some("en"));
        assert_eq!(Value::from("hello").lang(), None);
    }

    #[test]
    fn test_datatype_assignment() {
        use trellis_vocab::namespaces::{RDF, XSD};
        assert_eq!(
            Value::Long(1).datatype(),
            Some(Iri::new(XSD, "integer"))
        );
        assert_eq!(
            Value::text("x", "en").datatype(),
            Some(Iri::new(RDF, "langString"))
        );
        assert_eq!(Value::Ref(Iri::new(100, "x")).datatype(), None);
    }
}
