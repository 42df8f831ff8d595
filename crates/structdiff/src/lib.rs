//! Structural comparison engine for dynamically-shaped values.
//!
//! Computes an ordered list of typed diff records between two [`Value`]
//! trees: every field, element, or key that differs, with its path, change
//! kind, and both sides of the change. Comparison is cycle-safe, policy is
//! explicit per call, and the result is immutable once returned.
//!
//! # Key Types
//!
//! - [`compare`] / [`compare_with_options`] — the entry points
//! - [`DiffReport`] / [`DiffRecord`] / [`ChangeKind`] — the result model
//! - [`CompareOptions`] — matching policy: ignored fields, identity fields,
//!   order-insensitive sequences, numeric widening, depth limit
//! - [`TypeHandler`] — pluggable comparison for opaque types (timestamps,
//!   callables, channels by default)
//!
//! Rendering lives in [`render`]: a line-oriented `Display` on
//! [`DiffReport`] and a structured JSON form.

pub mod engine;
pub mod error;
pub mod handlers;
pub mod options;
pub mod record;
pub mod render;

mod mapping;
mod numeric;
mod sequence;

pub use engine::{compare, compare_with_options};
pub use error::{DiffError, DiffResult};
pub use handlers::{
    default_type_handlers, CallableHandler, ChannelHandler, TimestampHandler, TypeHandler,
};
pub use options::{ComparatorFn, CompareOptions};
pub use record::{ChangeKind, DiffRecord, DiffReport};

pub use structdiff_value as value;
pub use structdiff_value::Value;
