//! The value domain shared by group keys, count values and sort keys.
//!
//! All values flowing through one aggregation run belong to a single
//! total-ordered domain. A document lacking the relevant field yields no
//! value at all; this is modelled with `Option` rather than a sentinel, so
//! equality, ordering and hashing have one uniform definition.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A group key: either a present [`OwnedValue`], or `None` for a document
/// that lacks the field. `None` sorts before every present value.
pub type GroupKey = Option<OwnedValue>;

/// An owned value of the grouping domain.
///
/// `F64` ordering uses `total_cmp`, and equality/hashing go through the bit
/// representation, so `F64` values are usable as exact lookup keys like the
/// other variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OwnedValue {
    /// A UTF-8 string value.
    Str(String),
    /// An arbitrary byte value.
    Bytes(Vec<u8>),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A 64-bit float.
    F64(f64),
}

impl OwnedValue {
    /// Returns a borrowed view over this value.
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            OwnedValue::Str(val) => ValueRef::Str(val),
            OwnedValue::Bytes(val) => ValueRef::Bytes(val),
            OwnedValue::I64(val) => ValueRef::I64(*val),
            OwnedValue::U64(val) => ValueRef::U64(*val),
            OwnedValue::F64(val) => ValueRef::F64(*val),
        }
    }

    // Values of one run all share a domain; the rank only pins down a stable
    // order in the degenerate mixed case.
    fn domain_rank(&self) -> u8 {
        match self {
            OwnedValue::Str(_) => 0,
            OwnedValue::Bytes(_) => 1,
            OwnedValue::I64(_) => 2,
            OwnedValue::U64(_) => 3,
            OwnedValue::F64(_) => 4,
        }
    }
}

impl PartialEq for OwnedValue {
    fn eq(&self, other: &OwnedValue) -> bool {
        match (self, other) {
            (OwnedValue::Str(left), OwnedValue::Str(right)) => left == right,
            (OwnedValue::Bytes(left), OwnedValue::Bytes(right)) => left == right,
            (OwnedValue::I64(left), OwnedValue::I64(right)) => left == right,
            (OwnedValue::U64(left), OwnedValue::U64(right)) => left == right,
            (OwnedValue::F64(left), OwnedValue::F64(right)) => {
                left.to_bits() == right.to_bits()
            }
            _ => false,
        }
    }
}

impl Eq for OwnedValue {}

impl Hash for OwnedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain_rank().hash(state);
        match self {
            OwnedValue::Str(val) => val.hash(state),
            OwnedValue::Bytes(val) => val.hash(state),
            OwnedValue::I64(val) => val.hash(state),
            OwnedValue::U64(val) => val.hash(state),
            OwnedValue::F64(val) => val.to_bits().hash(state),
        }
    }
}

impl Ord for OwnedValue {
    fn cmp(&self, other: &OwnedValue) -> Ordering {
        match (self, other) {
            (OwnedValue::Str(left), OwnedValue::Str(right)) => left.cmp(right),
            (OwnedValue::Bytes(left), OwnedValue::Bytes(right)) => left.cmp(right),
            (OwnedValue::I64(left), OwnedValue::I64(right)) => left.cmp(right),
            (OwnedValue::U64(left), OwnedValue::U64(right)) => left.cmp(right),
            (OwnedValue::F64(left), OwnedValue::F64(right)) => left.total_cmp(right),
            (left, right) => left.domain_rank().cmp(&right.domain_rank()),
        }
    }
}

impl PartialOrd for OwnedValue {
    fn partial_cmp(&self, other: &OwnedValue) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for OwnedValue {
    fn from(val: &str) -> OwnedValue {
        OwnedValue::Str(val.to_string())
    }
}

impl From<String> for OwnedValue {
    fn from(val: String) -> OwnedValue {
        OwnedValue::Str(val)
    }
}

impl From<&[u8]> for OwnedValue {
    fn from(val: &[u8]) -> OwnedValue {
        OwnedValue::Bytes(val.to_vec())
    }
}

impl From<i64> for OwnedValue {
    fn from(val: i64) -> OwnedValue {
        OwnedValue::I64(val)
    }
}

impl From<u64> for OwnedValue {
    fn from(val: u64) -> OwnedValue {
        OwnedValue::U64(val)
    }
}

impl From<f64> for OwnedValue {
    fn from(val: f64) -> OwnedValue {
        OwnedValue::F64(val)
    }
}

/// A borrowed, short-lived view over a value.
///
/// A `ValueRef` handed out by an accessor is only valid until the next
/// document is read. Anything that outlives the current document must go
/// through [`ValueRef::into_owned`] first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    /// A UTF-8 string value.
    Str(&'a str),
    /// An arbitrary byte value.
    Bytes(&'a [u8]),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A 64-bit float.
    F64(f64),
}

impl ValueRef<'_> {
    /// Copies the view into an owned value.
    pub fn into_owned(self) -> OwnedValue {
        match self {
            ValueRef::Str(val) => OwnedValue::Str(val.to_string()),
            ValueRef::Bytes(val) => OwnedValue::Bytes(val.to_vec()),
            ValueRef::I64(val) => OwnedValue::I64(val),
            ValueRef::U64(val) => OwnedValue::U64(val),
            ValueRef::F64(val) => OwnedValue::F64(val),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use proptest::prelude::*;

    use super::{GroupKey, OwnedValue};

    fn hash_of(key: &GroupKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_absent_sorts_first() {
        let absent: GroupKey = None;
        assert!(absent < Some(OwnedValue::Str(String::new())));
        assert!(absent < Some(OwnedValue::I64(i64::MIN)));
        assert!(absent < Some(OwnedValue::F64(f64::NEG_INFINITY)));
    }

    #[test]
    fn test_f64_equality_is_bitwise() {
        assert_eq!(OwnedValue::F64(f64::NAN), OwnedValue::F64(f64::NAN));
        assert_ne!(OwnedValue::F64(0.0), OwnedValue::F64(-0.0));
        assert_eq!(
            hash_of(&Some(OwnedValue::F64(f64::NAN))),
            hash_of(&Some(OwnedValue::F64(f64::NAN)))
        );
    }

    #[test]
    fn test_str_equality_is_exact() {
        assert_ne!(
            OwnedValue::Str("a".to_string()),
            OwnedValue::Str("A".to_string())
        );
        assert_ne!(
            OwnedValue::Str("1".to_string()),
            OwnedValue::Bytes(b"1".to_vec())
        );
    }

    proptest! {
        #[test]
        fn proptest_i64_order_matches_native(left in any::<i64>(), right in any::<i64>()) {
            prop_assert_eq!(
                OwnedValue::I64(left).cmp(&OwnedValue::I64(right)),
                left.cmp(&right)
            );
        }

        #[test]
        fn proptest_bytes_order_matches_native(left in any::<Vec<u8>>(), right in any::<Vec<u8>>()) {
            prop_assert_eq!(
                OwnedValue::Bytes(left.clone()).cmp(&OwnedValue::Bytes(right.clone())),
                left.cmp(&right)
            );
        }

        #[test]
        fn proptest_eq_implies_same_hash(val in any::<i64>()) {
            let left: GroupKey = Some(OwnedValue::I64(val));
            let right = left.clone();
            prop_assert_eq!(hash_of(&left), hash_of(&right));
        }
    }
}
