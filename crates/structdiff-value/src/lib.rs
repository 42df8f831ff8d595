//! Dynamic value model for the structdiff engine.
//!
//! This crate provides the value tree the comparison engine operates on: a
//! closed set of structural kinds (scalars, sequences, maps, structs,
//! references, opaques) with explicit runtime type identity, per-field
//! comparison directives, cycle-safe structural equality, and cycle-safe
//! rendering.
//!
//! # Key Types
//!
//! - [`Value`] / [`Scalar`] — the dynamically-typed value tree
//! - [`StructValue`] / [`FieldValue`] — named records with per-field
//!   directive strings (`ignore`, `ignoreOrder`, `id`)
//! - [`RefValue`] — shared, possibly cyclic references with identity
//! - [`OpaqueValue`] — externally-defined values compared by handlers
//! - [`TypeTag`] / [`TypeKey`] — runtime type identity
//! - [`deep_equal`] — cycle-safe structural equality

pub mod equality;
pub mod scalar;
pub mod structure;
pub mod value;

mod display;

pub use equality::{deep_equal, is_hashable, ValueKey};
pub use scalar::{Scalar, ScalarKind};
pub use structure::{directive, has_directive, FieldValue, StructValue};
pub use value::{
    OpaqueValue, RefValue, TypeKey, TypeTag, Value, CALLABLE_TYPE, CHANNEL_TYPE, TIMESTAMP_TYPE,
};
