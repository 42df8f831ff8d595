//! The dynamic value tree and its runtime type identity.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::scalar::{Scalar, ScalarKind};
use crate::structure::StructValue;

/// Type name of timestamp opaques built by [`Value::timestamp`].
pub const TIMESTAMP_TYPE: &str = "Timestamp";
/// Type name of callable opaques built by [`Value::callable`].
pub const CALLABLE_TYPE: &str = "Callable";
/// Type name of channel opaques built by [`Value::channel`].
pub const CHANNEL_TYPE: &str = "Channel";

/// A dynamically-typed value tree: the input shape for structural
/// comparison.
///
/// The variants form a closed set of structural kinds; externally-defined
/// types that cannot be decomposed travel as [`Value::Opaque`] and are
/// compared by pluggable handlers.
#[derive(Clone, Debug)]
pub enum Value {
    /// The untyped absent value.
    Null,
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered sequence; the element type is erased.
    Seq(Vec<Value>),
    /// Insertion-ordered key/value entries. Keys are expected to be unique;
    /// duplicate keys match by first occurrence.
    Map(Vec<(Value, Value)>),
    /// A named record with ordered fields.
    Struct(StructValue),
    /// A shared, possibly cyclic reference to another value.
    Ref(RefValue),
    /// An externally-defined value the engine cannot decompose.
    Opaque(OpaqueValue),
}

impl Value {
    /// Build a sequence from anything convertible to values.
    pub fn seq<T, I>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Build a mapping from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wrap a value in a fresh reference cell.
    pub fn reference(target: Value) -> Value {
        Value::Ref(RefValue::new(target))
    }

    /// A reference to an existing shared cell. Use this to build shared or
    /// cyclic graphs: create the cell first, point references at it, then
    /// fill it in.
    pub fn shared(cell: &Rc<RefCell<Value>>) -> Value {
        Value::Ref(RefValue::from_shared(Rc::clone(cell)))
    }

    /// A nil reference with no declared pointee type.
    pub fn nil_ref() -> Value {
        Value::Ref(RefValue::nil())
    }

    /// A nil reference with a declared pointee type name.
    pub fn nil_ref_of(type_name: impl Into<String>) -> Value {
        Value::Ref(RefValue::nil_of(type_name))
    }

    /// A timestamp opaque; compared by instant by the stock timestamp
    /// handler.
    pub fn timestamp(instant: DateTime<Utc>) -> Value {
        let repr = instant.to_rfc3339();
        Value::Opaque(OpaqueValue::new(TIMESTAMP_TYPE, Rc::new(instant), repr))
    }

    /// A callable opaque; compared by identity.
    pub fn callable(name: impl Into<String>) -> Value {
        let name = name.into();
        Value::Opaque(OpaqueValue::new(
            CALLABLE_TYPE,
            Rc::new(()),
            format!("fn {name}"),
        ))
    }

    /// A channel opaque; compared by identity.
    pub fn channel(name: impl Into<String>) -> Value {
        let name = name.into();
        Value::Opaque(OpaqueValue::new(
            CHANNEL_TYPE,
            Rc::new(()),
            format!("chan {name}"),
        ))
    }

    /// Whether this is the untyped absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is a leaf value.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// The scalar payload, if this is a leaf.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The record payload, if this is a struct.
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Borrowed runtime type identity.
    pub fn type_tag(&self) -> TypeTag<'_> {
        match self {
            Value::Null => TypeTag::Null,
            Value::Scalar(s) => TypeTag::Scalar(s.kind()),
            Value::Seq(_) => TypeTag::Seq,
            Value::Map(_) => TypeTag::Map,
            Value::Struct(s) => TypeTag::Struct(s.type_name()),
            Value::Ref(r) => TypeTag::Ref(r.type_name()),
            Value::Opaque(o) => TypeTag::Opaque(o.type_name()),
        }
    }

    /// Owned, hashable runtime type identity.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Value::Null => TypeKey::Null,
            Value::Scalar(s) => TypeKey::Scalar(s.kind()),
            Value::Seq(_) => TypeKey::Seq,
            Value::Map(_) => TypeKey::Map,
            Value::Struct(s) => TypeKey::Struct(s.type_name().to_string()),
            Value::Ref(_) => TypeKey::Ref,
            Value::Opaque(o) => TypeKey::Opaque(o.type_name().to_string()),
        }
    }

    /// Whether this is the zero value of its kind: null, zero scalars, nil
    /// references, and structs whose fields are all zero. Sequences, maps,
    /// and opaques are never zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Scalar(s) => s.is_zero(),
            Value::Seq(_) | Value::Map(_) | Value::Opaque(_) => false,
            Value::Struct(s) => s.fields().iter().all(|f| f.value().is_zero()),
            Value::Ref(r) => r.is_nil(),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Value {
        Value::Scalar(s)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Value {
        Value::Struct(s)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<char> for Value {
    fn from(v: char) -> Value {
        Value::Scalar(Scalar::Char(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Scalar(Scalar::Str(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Scalar(Scalar::Str(v))
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Value {
        Value::Scalar(Scalar::I8(v))
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Value {
        Value::Scalar(Scalar::I16(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Scalar(Scalar::I32(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Scalar(Scalar::I64(v))
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Value {
        Value::Scalar(Scalar::U8(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Value {
        Value::Scalar(Scalar::U16(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Value {
        Value::Scalar(Scalar::U32(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        Value::Scalar(Scalar::U64(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Scalar(Scalar::F32(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Scalar(Scalar::F64(v))
    }
}

/// A shared, possibly cyclic reference to another value.
///
/// Identity is the address of the shared cell; two references built from
/// the same cell are identical, structurally-equal references built from
/// different cells are not.
#[derive(Clone)]
pub struct RefValue {
    target: Option<Rc<RefCell<Value>>>,
    type_name: Option<String>,
}

impl RefValue {
    /// Wrap a value in a fresh cell.
    pub fn new(target: Value) -> Self {
        Self {
            target: Some(Rc::new(RefCell::new(target))),
            type_name: None,
        }
    }

    /// A reference to an existing shared cell.
    pub fn from_shared(cell: Rc<RefCell<Value>>) -> Self {
        Self {
            target: Some(cell),
            type_name: None,
        }
    }

    /// A nil reference with no declared pointee type.
    pub fn nil() -> Self {
        Self {
            target: None,
            type_name: None,
        }
    }

    /// A nil reference with a declared pointee type name.
    pub fn nil_of(type_name: impl Into<String>) -> Self {
        Self {
            target: None,
            type_name: Some(type_name.into()),
        }
    }

    /// Attach a declared pointee type name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// The shared cell, or `None` for a nil reference.
    pub fn target(&self) -> Option<&Rc<RefCell<Value>>> {
        self.target.as_ref()
    }

    /// Whether this reference is nil.
    pub fn is_nil(&self) -> bool {
        self.target.is_none()
    }

    /// The declared pointee type name, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// The cell address, or `None` for a nil reference.
    pub fn identity(&self) -> Option<usize> {
        self.target.as_ref().map(|rc| Rc::as_ptr(rc) as usize)
    }

    /// Whether both references point at the same cell. Nil references have
    /// no identity and never share one.
    pub fn same_identity(&self, other: &RefValue) -> bool {
        match (&self.target, &other.target) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for RefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shallow on purpose: the target may be cyclic.
        match &self.target {
            Some(rc) => write!(f, "RefValue({:p})", Rc::as_ptr(rc)),
            None => f.write_str("RefValue(nil)"),
        }
    }
}

/// An externally-defined value carried opaquely through the value tree.
///
/// Without a type handler, opaques compare by payload identity, the way
/// channels and callables do in practice; a handler can do better (the
/// stock timestamp handler compares instants).
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: String,
    payload: Rc<dyn Any>,
    repr: String,
}

impl OpaqueValue {
    /// Wrap a payload under a type name, with a display representation.
    pub fn new(type_name: impl Into<String>, payload: Rc<dyn Any>, repr: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            payload,
            repr: repr.into(),
        }
    }

    /// The opaque type name handlers match on.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The raw payload.
    pub fn payload(&self) -> &Rc<dyn Any> {
        &self.payload
    }

    /// Downcast the payload to a concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// The display representation.
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Whether both opaques carry the same payload allocation.
    pub fn same_identity(&self, other: &OpaqueValue) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({}: {})", self.type_name, self.repr)
    }
}

/// Borrowed runtime type identity of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeTag<'a> {
    Null,
    Scalar(ScalarKind),
    Seq,
    Map,
    Struct(&'a str),
    Ref(Option<&'a str>),
    Opaque(&'a str),
}

impl TypeTag<'_> {
    /// Whether two tags denote the same runtime type.
    ///
    /// Sequences and maps erase their element types and always match each
    /// other; a reference without a declared pointee name matches any
    /// reference.
    pub fn matches(&self, other: &TypeTag<'_>) -> bool {
        match (self, other) {
            (TypeTag::Null, TypeTag::Null)
            | (TypeTag::Seq, TypeTag::Seq)
            | (TypeTag::Map, TypeTag::Map) => true,
            (TypeTag::Scalar(a), TypeTag::Scalar(b)) => a == b,
            (TypeTag::Struct(a), TypeTag::Struct(b)) => a == b,
            (TypeTag::Ref(a), TypeTag::Ref(b)) => match (a, b) {
                (Some(x), Some(y)) => x == y,
                _ => true,
            },
            (TypeTag::Opaque(a), TypeTag::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// Owned, hashable form of [`TypeTag`], used to key per-type configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Null,
    Scalar(ScalarKind),
    Seq,
    Map,
    Struct(String),
    Ref,
    Opaque(String),
}
