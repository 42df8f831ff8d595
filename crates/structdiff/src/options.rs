//! Comparison configuration.

use std::collections::HashMap;
use std::rc::Rc;

use structdiff_value::{TypeKey, Value};

use crate::handlers::{default_type_handlers, TypeHandler};

/// A user-supplied equality function for one exact type.
///
/// Returns `Ok(true)` when the two values are equal. An `Err` aborts the
/// whole comparison: no partial report is produced.
pub type ComparatorFn = Rc<dyn Fn(&Value, &Value) -> Result<bool, String>>;

/// Configuration for a comparison call.
///
/// The options value is read-only during a comparison; all mutable
/// traversal state lives in a context created fresh per call. Every knob
/// is independent; the last programmatic assignment wins.
pub struct CompareOptions {
    /// Fields to skip, matched three ways against each field: exact field
    /// name (`"meta"`), full dotted path (`"user.meta"`), or type-qualified
    /// name (`"User.meta"`). Whole paths can also be skipped before
    /// dispatch.
    pub ignored_fields: Vec<String>,
    /// Ordered fallback identity field names for struct matching, consulted
    /// when no field carries an `id` directive. The first named field with
    /// a non-zero value wins.
    pub id_field_names: Vec<String>,
    /// Ignore element order when comparing sequences.
    pub ignore_seq_order: bool,
    /// Treat numeric scalars of different widths (or of signed/unsigned/
    /// float class) as comparable by exact value.
    pub numeric_widening: bool,
    /// Per-type equality overrides, keyed by exact runtime type.
    pub custom_comparators: HashMap<TypeKey, ComparatorFn>,
    /// Pluggable handlers for opaque or special types; the first handler
    /// claiming a type wins.
    pub type_handlers: Vec<Box<dyn TypeHandler>>,
    /// Recursion depth limit; `0` means unlimited. Subtrees beyond the
    /// limit are silently treated as equal, so callers that need to detect
    /// truncation must check the configured depth themselves.
    pub max_depth: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignored_fields: Vec::new(),
            id_field_names: Vec::new(),
            ignore_seq_order: false,
            numeric_widening: false,
            custom_comparators: HashMap::new(),
            type_handlers: default_type_handlers(),
            max_depth: 0,
        }
    }
}

impl CompareOptions {
    /// Register a custom comparator for one exact type.
    pub fn with_comparator(
        mut self,
        key: TypeKey,
        comparator: impl Fn(&Value, &Value) -> Result<bool, String> + 'static,
    ) -> Self {
        self.custom_comparators.insert(key, Rc::new(comparator));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_install_stock_handlers() {
        let options = CompareOptions::default();
        assert!(!options.type_handlers.is_empty());
        assert!(options.ignored_fields.is_empty());
        assert!(!options.ignore_seq_order);
        assert!(!options.numeric_widening);
        assert_eq!(options.max_depth, 0);
    }

    #[test]
    fn with_comparator_registers_by_type() {
        let options = CompareOptions::default()
            .with_comparator(TypeKey::Scalar(structdiff_value::ScalarKind::F64), |_, _| {
                Ok(true)
            });
        assert_eq!(options.custom_comparators.len(), 1);
    }
}
