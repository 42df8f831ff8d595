use std::fmt;

/// A leaf value.
///
/// Numeric scalars carry their width so that cross-width comparison is an
/// explicit policy decision rather than an accident of representation: an
/// `I32(1)` and an `I64(1)` are different runtime types until the engine is
/// told to widen them.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// The kind of a scalar, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    Str,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Scalar {
    /// The kind of this scalar.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Char(_) => ScalarKind::Char,
            Scalar::Str(_) => ScalarKind::Str,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
        }
    }

    /// Returns `true` for numeric kinds (integers and floats).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scalar::Bool(_) | Scalar::Char(_) | Scalar::Str(_))
    }

    /// Signed integer payload widened to `i64`.
    pub fn as_signed(&self) -> Option<i64> {
        match self {
            Scalar::I8(v) => Some(i64::from(*v)),
            Scalar::I16(v) => Some(i64::from(*v)),
            Scalar::I32(v) => Some(i64::from(*v)),
            Scalar::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned integer payload widened to `u64`.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Scalar::U8(v) => Some(u64::from(*v)),
            Scalar::U16(v) => Some(u64::from(*v)),
            Scalar::U32(v) => Some(u64::from(*v)),
            Scalar::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload widened to `f64`. The `f32` to `f64` widening is exact.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::F32(v) => Some(f64::from(*v)),
            Scalar::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this is the zero value of its kind.
    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Bool(v) => !v,
            Scalar::Char(v) => *v == '\0',
            Scalar::Str(v) => v.is_empty(),
            Scalar::I8(v) => *v == 0,
            Scalar::I16(v) => *v == 0,
            Scalar::I32(v) => *v == 0,
            Scalar::I64(v) => *v == 0,
            Scalar::U8(v) => *v == 0,
            Scalar::U16(v) => *v == 0,
            Scalar::U32(v) => *v == 0,
            Scalar::U64(v) => *v == 0,
            Scalar::F32(v) => *v == 0.0,
            Scalar::F64(v) => *v == 0.0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Char(v) => write!(f, "{v}"),
            Scalar::Str(v) => f.write_str(v),
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Scalar::Bool(true).kind(), ScalarKind::Bool);
        assert_eq!(Scalar::I32(1).kind(), ScalarKind::I32);
        assert_eq!(Scalar::U64(1).kind(), ScalarKind::U64);
        assert_eq!(Scalar::F64(1.0).kind(), ScalarKind::F64);
        assert_eq!(Scalar::Str("x".into()).kind(), ScalarKind::Str);
    }

    #[test]
    fn equality_is_width_strict() {
        assert_ne!(Scalar::I32(1), Scalar::I64(1));
        assert_ne!(Scalar::U8(1), Scalar::U16(1));
        assert_eq!(Scalar::I64(1), Scalar::I64(1));
    }

    #[test]
    fn signed_widening() {
        assert_eq!(Scalar::I8(-5).as_signed(), Some(-5));
        assert_eq!(Scalar::I64(i64::MAX).as_signed(), Some(i64::MAX));
        assert_eq!(Scalar::U8(5).as_signed(), None);
        assert_eq!(Scalar::F64(5.0).as_signed(), None);
    }

    #[test]
    fn unsigned_widening() {
        assert_eq!(Scalar::U16(65535).as_unsigned(), Some(65535));
        assert_eq!(Scalar::I16(1).as_unsigned(), None);
    }

    #[test]
    fn float_widening_is_exact() {
        assert_eq!(Scalar::F32(3.5).as_float(), Some(3.5));
        assert_eq!(Scalar::F64(3.5).as_float(), Some(3.5));
        assert_eq!(Scalar::I64(3).as_float(), None);
    }

    #[test]
    fn zero_values() {
        assert!(Scalar::Bool(false).is_zero());
        assert!(Scalar::Str(String::new()).is_zero());
        assert!(Scalar::I32(0).is_zero());
        assert!(Scalar::F64(0.0).is_zero());
        assert!(Scalar::Char('\0').is_zero());
        assert!(!Scalar::Bool(true).is_zero());
        assert!(!Scalar::I32(-1).is_zero());
        assert!(!Scalar::Str(" ".into()).is_zero());
    }

    #[test]
    fn numeric_classification() {
        assert!(Scalar::I8(0).is_numeric());
        assert!(Scalar::U64(0).is_numeric());
        assert!(Scalar::F32(0.0).is_numeric());
        assert!(!Scalar::Bool(false).is_numeric());
        assert!(!Scalar::Str("1".into()).is_numeric());
        assert!(!Scalar::Char('1').is_numeric());
    }

    #[test]
    fn display_is_bare() {
        assert_eq!(Scalar::Str("hello".into()).to_string(), "hello");
        assert_eq!(Scalar::I64(-7).to_string(), "-7");
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::F64(3.5).to_string(), "3.5");
    }
}
