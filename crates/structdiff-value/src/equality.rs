//! Cycle-safe structural equality and multiset keying for values.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::scalar::Scalar;
use crate::value::Value;

/// Structural equality over two value trees.
///
/// Scalar typing is strict (an `I32(1)` never equals an `I64(1)`); floats
/// compare by value, so NaN is not equal to itself. References compare by
/// identity first, then structurally; a (left, right) identity pair that is
/// re-entered is assumed equal, so comparison of cyclic graphs terminates.
/// Opaques compare by payload identity.
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    deep_equal_guarded(left, right, &mut HashSet::new())
}

fn deep_equal_guarded(
    left: &Value,
    right: &Value,
    visited: &mut HashSet<(usize, usize)>,
) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Scalar(a), Value::Scalar(b)) => a == b,
        (Value::Seq(a), Value::Seq(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| deep_equal_guarded(x, y, visited))
        }
        (Value::Map(a), Value::Map(b)) => {
            if a.len() != b.len() {
                return false;
            }
            for (key, value) in a {
                let mut matched = false;
                for (peer_key, peer_value) in b {
                    if deep_equal_guarded(key, peer_key, visited)
                        && deep_equal_guarded(value, peer_value, visited)
                    {
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    return false;
                }
            }
            true
        }
        (Value::Struct(a), Value::Struct(b)) => {
            a.type_name() == b.type_name()
                && a.fields().len() == b.fields().len()
                && a.fields().iter().zip(b.fields()).all(|(fa, fb)| {
                    fa.name() == fb.name()
                        && deep_equal_guarded(fa.value(), fb.value(), visited)
                })
        }
        (Value::Ref(a), Value::Ref(b)) => match (a.target(), b.target()) {
            (None, None) => true,
            (Some(l), Some(r)) => {
                if Rc::ptr_eq(l, r) {
                    return true;
                }
                let pair = (Rc::as_ptr(l) as usize, Rc::as_ptr(r) as usize);
                if !visited.insert(pair) {
                    return true;
                }
                let equal = deep_equal_guarded(&l.borrow(), &r.borrow(), visited);
                visited.remove(&pair);
                equal
            }
            _ => false,
        },
        (Value::Opaque(a), Value::Opaque(b)) => {
            a.type_name() == b.type_name() && a.same_identity(b)
        }
        _ => false,
    }
}

/// Whether a value can serve as a multiset key.
///
/// Scalars and null key by value, structs by their (all-hashable) fields,
/// references and opaques by identity. Sequences and maps are not hashable,
/// mirroring which element types support by-value matching at all.
pub fn is_hashable(value: &Value) -> bool {
    match value {
        Value::Null | Value::Scalar(_) | Value::Ref(_) | Value::Opaque(_) => true,
        Value::Seq(_) | Value::Map(_) => false,
        Value::Struct(s) => s.fields().iter().all(|f| is_hashable(f.value())),
    }
}

/// Hash/equality key over hashable values.
///
/// Floats key by bit pattern so the key stays consistent with its hash:
/// identical-bit NaNs reconcile as equal, `0.0` and `-0.0` do not. Must
/// only be built for values where [`is_hashable`] holds.
#[derive(Clone, Copy, Debug)]
pub struct ValueKey<'a>(pub &'a Value);

impl PartialEq for ValueKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        key_equal(self.0, other.0)
    }
}

impl Eq for ValueKey<'_> {}

impl Hash for ValueKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self.0, state);
    }
}

fn key_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Scalar(a), Value::Scalar(b)) => scalar_key_equal(a, b),
        (Value::Struct(a), Value::Struct(b)) => {
            a.type_name() == b.type_name()
                && a.fields().len() == b.fields().len()
                && a.fields()
                    .iter()
                    .zip(b.fields())
                    .all(|(fa, fb)| fa.name() == fb.name() && key_equal(fa.value(), fb.value()))
        }
        (Value::Ref(a), Value::Ref(b)) => (a.is_nil() && b.is_nil()) || a.same_identity(b),
        (Value::Opaque(a), Value::Opaque(b)) => {
            a.type_name() == b.type_name() && a.same_identity(b)
        }
        _ => false,
    }
}

fn scalar_key_equal(left: &Scalar, right: &Scalar) -> bool {
    match (left, right) {
        (Scalar::F32(a), Scalar::F32(b)) => a.to_bits() == b.to_bits(),
        (Scalar::F64(a), Scalar::F64(b)) => a.to_bits() == b.to_bits(),
        _ => left == right,
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => state.write_u8(0),
        Value::Scalar(s) => {
            state.write_u8(1);
            hash_scalar(s, state);
        }
        Value::Struct(s) => {
            state.write_u8(2);
            s.type_name().hash(state);
            state.write_usize(s.fields().len());
            for field in s.fields() {
                field.name().hash(state);
                hash_value(field.value(), state);
            }
        }
        Value::Ref(r) => {
            state.write_u8(3);
            state.write_usize(r.identity().unwrap_or(0));
        }
        Value::Opaque(o) => {
            state.write_u8(4);
            o.type_name().hash(state);
            state.write_usize(Rc::as_ptr(o.payload()) as *const () as usize);
        }
        // Not hashable; collapse to the discriminant so the key is at least
        // well-defined if one slips through.
        Value::Seq(_) => state.write_u8(5),
        Value::Map(_) => state.write_u8(6),
    }
}

fn hash_scalar<H: Hasher>(scalar: &Scalar, state: &mut H) {
    match scalar {
        Scalar::Bool(v) => {
            state.write_u8(0);
            v.hash(state);
        }
        Scalar::Char(v) => {
            state.write_u8(1);
            v.hash(state);
        }
        Scalar::Str(v) => {
            state.write_u8(2);
            v.hash(state);
        }
        Scalar::I8(v) => {
            state.write_u8(3);
            state.write_i8(*v);
        }
        Scalar::I16(v) => {
            state.write_u8(4);
            state.write_i16(*v);
        }
        Scalar::I32(v) => {
            state.write_u8(5);
            state.write_i32(*v);
        }
        Scalar::I64(v) => {
            state.write_u8(6);
            state.write_i64(*v);
        }
        Scalar::U8(v) => {
            state.write_u8(7);
            state.write_u8(*v);
        }
        Scalar::U16(v) => {
            state.write_u8(8);
            state.write_u16(*v);
        }
        Scalar::U32(v) => {
            state.write_u8(9);
            state.write_u32(*v);
        }
        Scalar::U64(v) => {
            state.write_u8(10);
            state.write_u64(*v);
        }
        Scalar::F32(v) => {
            state.write_u8(11);
            state.write_u32(v.to_bits());
        }
        Scalar::F64(v) => {
            state.write_u8(12);
            state.write_u64(v.to_bits());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::structure::StructValue;

    fn user(name: &str, age: i64) -> Value {
        Value::from(
            StructValue::new("User")
                .with_field("name", name)
                .with_field("age", age),
        )
    }

    #[test]
    fn scalars_compare_by_value_and_kind() {
        assert!(deep_equal(&Value::from(1i64), &Value::from(1i64)));
        assert!(!deep_equal(&Value::from(1i64), &Value::from(2i64)));
        assert!(!deep_equal(&Value::from(1i64), &Value::from(1i32)));
        assert!(!deep_equal(&Value::from(1i64), &Value::from("1")));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert!(!deep_equal(&Value::from(f64::NAN), &Value::from(f64::NAN)));
    }

    #[test]
    fn sequences_compare_pairwise() {
        assert!(deep_equal(&Value::seq([1i64, 2, 3]), &Value::seq([1i64, 2, 3])));
        assert!(!deep_equal(&Value::seq([1i64, 2, 3]), &Value::seq([1i64, 3, 2])));
        assert!(!deep_equal(&Value::seq([1i64, 2]), &Value::seq([1i64, 2, 3])));
    }

    #[test]
    fn maps_compare_order_insensitively() {
        let a = Value::map([("x", 1i64), ("y", 2)]);
        let b = Value::map([("y", 2i64), ("x", 1)]);
        let c = Value::map([("x", 1i64), ("y", 3)]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn structs_compare_by_name_and_fields() {
        assert!(deep_equal(&user("Alice", 30), &user("Alice", 30)));
        assert!(!deep_equal(&user("Alice", 30), &user("Bob", 30)));

        let other_type = Value::from(
            StructValue::new("Person")
                .with_field("name", "Alice")
                .with_field("age", 30i64),
        );
        assert!(!deep_equal(&user("Alice", 30), &other_type));
    }

    #[test]
    fn refs_compare_structurally_across_cells() {
        let a = Value::reference(user("Alice", 30));
        let b = Value::reference(user("Alice", 30));
        let c = Value::reference(user("Bob", 30));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(deep_equal(&Value::nil_ref(), &Value::nil_ref()));
        assert!(!deep_equal(&Value::nil_ref(), &a));
    }

    #[test]
    fn cyclic_graphs_terminate() {
        // node -> node, on both sides, independently built.
        let make = |name: &str| {
            let cell = Rc::new(RefCell::new(Value::Null));
            let node = StructValue::new("Node")
                .with_field("name", name)
                .with_field("next", Value::shared(&cell));
            *cell.borrow_mut() = Value::Struct(node);
            Value::shared(&cell)
        };

        assert!(deep_equal(&make("self"), &make("self")));
        assert!(!deep_equal(&make("self"), &make("other")));
    }

    #[test]
    fn opaques_compare_by_identity() {
        let chan = Value::channel("jobs");
        let same = chan.clone();
        let other = Value::channel("jobs");
        assert!(deep_equal(&chan, &same));
        assert!(!deep_equal(&chan, &other));
    }

    #[test]
    fn hashability() {
        assert!(is_hashable(&Value::Null));
        assert!(is_hashable(&Value::from(1i64)));
        assert!(is_hashable(&user("Alice", 30)));
        assert!(is_hashable(&Value::nil_ref()));
        assert!(!is_hashable(&Value::seq([1i64])));
        assert!(!is_hashable(&Value::map([("k", 1i64)])));

        let holds_seq = Value::from(StructValue::new("Bag").with_field("items", Value::seq([1i64])));
        assert!(!is_hashable(&holds_seq));
    }

    #[test]
    fn value_keys_count_duplicates() {
        let values = [
            Value::from(1i64),
            Value::from(2i64),
            Value::from(2i64),
            Value::from(3i64),
        ];
        let mut counts: HashMap<ValueKey<'_>, usize> = HashMap::new();
        for v in &values {
            *counts.entry(ValueKey(v)).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&ValueKey(&Value::from(2i64))], 2);
    }

    #[test]
    fn float_keys_are_bitwise() {
        let nan_a = Value::from(f64::NAN);
        let nan_b = Value::from(f64::NAN);
        assert_eq!(ValueKey(&nan_a), ValueKey(&nan_b));

        let pos = Value::from(0.0f64);
        let neg = Value::from(-0.0f64);
        assert_ne!(ValueKey(&pos), ValueKey(&neg));
    }

    fn arb_scalar() -> impl Strategy<Value = Scalar> {
        prop_oneof![
            any::<bool>().prop_map(Scalar::Bool),
            any::<i64>().prop_map(Scalar::I64),
            any::<u32>().prop_map(Scalar::U32),
            (-1e9..1e9f64).prop_map(Scalar::F64),
            "[a-z]{0,8}".prop_map(Scalar::Str),
        ]
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            arb_scalar().prop_map(Value::Scalar),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Seq),
                prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..3)
                    .prop_map(|entries| Value::map(entries)),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|fields| {
                    let mut record = StructValue::new("Arb");
                    for (name, value) in fields {
                        record = record.with_field(name, value);
                    }
                    Value::Struct(record)
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn deep_equal_is_reflexive(value in arb_value()) {
            prop_assert!(deep_equal(&value, &value));
        }

        #[test]
        fn deep_equal_is_symmetric(a in arb_value(), b in arb_value()) {
            prop_assert_eq!(deep_equal(&a, &b), deep_equal(&b, &a));
        }
    }
}
