//! Cross-width numeric equality.
//!
//! Consulted only when numeric widening is enabled and two scalars have
//! different kinds. Equality is exact: integers widen losslessly within
//! their class, signed-vs-unsigned requires a non-negative signed value,
//! and integer-vs-float requires the float to represent the integer
//! exactly. There is no epsilon tolerance and NaN is never equal to
//! itself.

use structdiff_value::{Scalar, ScalarKind};

/// Classification of numeric scalar kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NumericClass {
    Signed,
    Unsigned,
    Float,
}

/// Classify a scalar kind, or `None` for non-numeric kinds.
pub(crate) fn class_of(kind: ScalarKind) -> Option<NumericClass> {
    match kind {
        ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64 => {
            Some(NumericClass::Signed)
        }
        ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 => {
            Some(NumericClass::Unsigned)
        }
        ScalarKind::F32 | ScalarKind::F64 => Some(NumericClass::Float),
        ScalarKind::Bool | ScalarKind::Char | ScalarKind::Str => None,
    }
}

/// Whether both scalars are numeric.
pub(crate) fn both_numeric(left: &Scalar, right: &Scalar) -> bool {
    left.is_numeric() && right.is_numeric()
}

/// Exact value equality across numeric widths and classes.
///
/// Returns `false` when either scalar is non-numeric.
pub(crate) fn widened_equal(left: &Scalar, right: &Scalar) -> bool {
    let (Some(lc), Some(rc)) = (class_of(left.kind()), class_of(right.kind())) else {
        return false;
    };

    match (lc, rc) {
        (NumericClass::Signed, NumericClass::Signed) => left.as_signed() == right.as_signed(),
        (NumericClass::Unsigned, NumericClass::Unsigned) => {
            left.as_unsigned() == right.as_unsigned()
        }
        (NumericClass::Float, NumericClass::Float) => left
            .as_float()
            .zip(right.as_float())
            .is_some_and(|(a, b)| a == b),
        (NumericClass::Signed, NumericClass::Unsigned) => left
            .as_signed()
            .zip(right.as_unsigned())
            .is_some_and(|(i, u)| signed_unsigned_equal(i, u)),
        (NumericClass::Unsigned, NumericClass::Signed) => left
            .as_unsigned()
            .zip(right.as_signed())
            .is_some_and(|(u, i)| signed_unsigned_equal(i, u)),
        (NumericClass::Signed, NumericClass::Float) => left
            .as_signed()
            .zip(right.as_float())
            .is_some_and(|(i, f)| float_equals_signed(f, i)),
        (NumericClass::Float, NumericClass::Signed) => left
            .as_float()
            .zip(right.as_signed())
            .is_some_and(|(f, i)| float_equals_signed(f, i)),
        (NumericClass::Unsigned, NumericClass::Float) => left
            .as_unsigned()
            .zip(right.as_float())
            .is_some_and(|(u, f)| float_equals_unsigned(f, u)),
        (NumericClass::Float, NumericClass::Unsigned) => left
            .as_float()
            .zip(right.as_unsigned())
            .is_some_and(|(f, u)| float_equals_unsigned(f, u)),
    }
}

fn signed_unsigned_equal(i: i64, u: u64) -> bool {
    i >= 0 && i as u64 == u
}

// 2^63 and 2^64; both exactly representable as f64. The strict upper bound
// keeps the cast below exact.
const SIGNED_BOUND: f64 = 9_223_372_036_854_775_808.0;
const UNSIGNED_BOUND: f64 = 18_446_744_073_709_551_616.0;

fn float_equals_signed(f: f64, i: i64) -> bool {
    f.is_finite() && f.trunc() == f && f >= -SIGNED_BOUND && f < SIGNED_BOUND && f as i64 == i
}

fn float_equals_unsigned(f: f64, u: u64) -> bool {
    f.is_finite() && f.trunc() == f && f >= 0.0 && f < UNSIGNED_BOUND && f as u64 == u
}
