//! The recursive comparison dispatcher.
//!
//! Routes a (path, left, right) triple to the right strategy: nil handling,
//! type-mismatch reporting, custom comparators, the type-handler registry,
//! and the per-kind comparators for structs, sequences, maps, and
//! references. All discovered differences accumulate into one append-only
//! record list owned by the top-level call.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, trace};

use structdiff_value::{deep_equal, directive, RefValue, StructValue, Value};

use crate::error::{DiffError, DiffResult};
use crate::numeric;
use crate::options::CompareOptions;
use crate::record::{ChangeKind, DiffRecord, DiffReport};

/// Compare two values with default options.
pub fn compare(left: &Value, right: &Value) -> DiffResult<DiffReport> {
    compare_with_options(left, right, &CompareOptions::default())
}

/// Compare two values with explicit options.
///
/// On error no partial report is returned: a failed comparator or handler
/// means the reliability of everything beneath it is unknown.
pub fn compare_with_options(
    left: &Value,
    right: &Value,
    options: &CompareOptions,
) -> DiffResult<DiffReport> {
    let mut comparator = Comparator::new(options);
    comparator.compare_values("", left, right)?;
    let report = DiffReport {
        records: comparator.records,
    };
    debug!(differences = report.len(), "comparison finished");
    Ok(report)
}

/// Mutable traversal state for one top-level comparison call.
///
/// Created fresh per call and discarded at the end. Must not be shared
/// across concurrent calls; the public entry points never do.
struct TraversalContext {
    visited_pairs: HashSet<(usize, usize)>,
    depth: usize,
}

pub(crate) struct Comparator<'a> {
    pub(crate) options: &'a CompareOptions,
    ignored: HashSet<&'a str>,
    ctx: TraversalContext,
    pub(crate) records: Vec<DiffRecord>,
}

impl<'a> Comparator<'a> {
    fn new(options: &'a CompareOptions) -> Self {
        let ignored = options.ignored_fields.iter().map(String::as_str).collect();
        Self {
            options,
            ignored,
            ctx: TraversalContext {
                visited_pairs: HashSet::new(),
                depth: 0,
            },
            records: Vec::new(),
        }
    }

    pub(crate) fn compare_values(
        &mut self,
        path: &str,
        left: &Value,
        right: &Value,
    ) -> DiffResult<()> {
        if self.options.max_depth > 0 {
            if self.ctx.depth >= self.options.max_depth {
                // Silent truncation: the subtree is treated as equal.
                return Ok(());
            }
            self.ctx.depth += 1;
            let outcome = self.dispatch(path, left, right);
            self.ctx.depth -= 1;
            outcome
        } else {
            self.dispatch(path, left, right)
        }
    }

    fn dispatch(&mut self, path: &str, left: &Value, right: &Value) -> DiffResult<()> {
        if self.ignored.contains(path) {
            return Ok(());
        }

        // Shared substructure cannot differ from itself; skip without
        // re-traversing.
        if let (Value::Ref(l), Value::Ref(r)) = (left, right) {
            if l.same_identity(r) {
                return Ok(());
            }
        }
        if let (Value::Opaque(l), Value::Opaque(r)) = (left, right) {
            if l.type_name() == r.type_name() && l.same_identity(r) {
                return Ok(());
            }
        }

        match (left.is_null(), right.is_null()) {
            (true, true) => return Ok(()),
            (true, false) => {
                self.records.push(value_record(path, None, Some(right)));
                return Ok(());
            }
            (false, true) => {
                self.records.push(value_record(path, Some(left), None));
                return Ok(());
            }
            (false, false) => {}
        }

        let left_tag = left.type_tag();
        if !left_tag.matches(&right.type_tag()) {
            // Nil references agree regardless of their declared types.
            if let (Value::Ref(l), Value::Ref(r)) = (left, right) {
                if l.is_nil() && r.is_nil() {
                    return Ok(());
                }
            }
            if self.options.numeric_widening {
                if let (Value::Scalar(ls), Value::Scalar(rs)) = (left, right) {
                    if numeric::both_numeric(ls, rs) {
                        if !numeric::widened_equal(ls, rs) {
                            self.records
                                .push(value_record(path, Some(left), Some(right)));
                        }
                        return Ok(());
                    }
                }
            }
            // A type mismatch is one atomic difference, never recursed into.
            self.records
                .push(value_record(path, Some(left), Some(right)));
            return Ok(());
        }

        let options = self.options;
        if let Some(comparator) = options.custom_comparators.get(&left.type_key()) {
            trace!(path, "dispatching to custom comparator");
            let equal = comparator(left, right).map_err(|message| DiffError::Comparator {
                path: path.to_string(),
                message,
            })?;
            if !equal {
                self.records
                    .push(value_record(path, Some(left), Some(right)));
            }
            return Ok(());
        }

        for handler in &options.type_handlers {
            if handler.can_handle(&left_tag) {
                trace!(path, handler = handler.name(), "dispatching to type handler");
                return handler
                    .compare(path, left, right, &mut self.records)
                    .map_err(|message| DiffError::Handler {
                        name: handler.name().to_string(),
                        path: path.to_string(),
                        message,
                    });
            }
        }

        match (left, right) {
            (Value::Struct(l), Value::Struct(r)) => self.compare_structs(path, l, r),
            (Value::Seq(l), Value::Seq(r)) => {
                self.compare_sequences(path, l, r, options.ignore_seq_order)
            }
            (Value::Map(l), Value::Map(r)) => self.compare_mappings(path, l, r),
            (Value::Ref(l), Value::Ref(r)) => self.compare_refs(path, l, r),
            _ => {
                if !deep_equal(left, right) {
                    self.records
                        .push(value_record(path, Some(left), Some(right)));
                }
                Ok(())
            }
        }
    }

    fn compare_structs(
        &mut self,
        path: &str,
        left: &StructValue,
        right: &StructValue,
    ) -> DiffResult<()> {
        if let (Some(left_id), Some(right_id)) =
            (self.object_identity(left), self.object_identity(right))
        {
            if !deep_equal(&left_id, &right_id) {
                // Different entities: field-level differences would be noise.
                self.records.push(DiffRecord::Field {
                    path: path.to_string(),
                    left: Some(Value::Struct(left.clone())),
                    right: Some(Value::Struct(right.clone())),
                    field_name: String::new(),
                    change: ChangeKind::IdentityMismatch,
                });
                return Ok(());
            }
        }

        let struct_name = left.type_name();
        for field in left.fields() {
            if !field.is_public() {
                continue;
            }
            let field_path = join_path(path, field.name());
            if self.field_ignored(&field_path, field.name(), struct_name)
                || field.has_directive(directive::IGNORE)
            {
                continue;
            }

            let Some(peer) = right.field(field.name()) else {
                self.records.push(DiffRecord::Field {
                    path: field_path,
                    left: Some(field.value().clone()),
                    right: None,
                    field_name: field.name().to_string(),
                    change: ChangeKind::Removed,
                });
                continue;
            };

            let (left_value, right_value) = (field.value(), peer.value());
            if let (Value::Seq(ls), Value::Seq(rs)) = (left_value, right_value) {
                let unordered =
                    self.options.ignore_seq_order || field.has_directive(directive::IGNORE_ORDER);
                self.compare_sequences(&field_path, ls, rs, unordered)?;
                continue;
            }
            if deep_equal(left_value, right_value) {
                continue;
            }
            if same_kind_scalars(left_value, right_value) {
                self.records.push(DiffRecord::Field {
                    path: field_path,
                    left: Some(left_value.clone()),
                    right: Some(right_value.clone()),
                    field_name: field.name().to_string(),
                    change: ChangeKind::Updated,
                });
            } else {
                // Nested shapes recurse so their differences get fully
                // decomposed paths.
                self.compare_values(&field_path, left_value, right_value)?;
            }
        }

        for field in right.fields() {
            if !field.is_public() || left.field(field.name()).is_some() {
                continue;
            }
            let field_path = join_path(path, field.name());
            if self.field_ignored(&field_path, field.name(), struct_name)
                || field.has_directive(directive::IGNORE)
            {
                continue;
            }
            self.records.push(DiffRecord::Field {
                path: field_path,
                left: None,
                right: Some(field.value().clone()),
                field_name: field.name().to_string(),
                change: ChangeKind::Added,
            });
        }

        Ok(())
    }

    /// The value identifying which entity a record represents: an `id`
    /// directive takes priority, then the configured identity field names
    /// in order. Zero values never identify.
    fn object_identity(&self, value: &StructValue) -> Option<Value> {
        for field in value.fields() {
            if field.is_public() && field.has_directive(directive::ID) && !field.value().is_zero() {
                return Some(field.value().clone());
            }
        }
        for name in &self.options.id_field_names {
            if let Some(field) = value.field(name) {
                if field.is_public() && !field.value().is_zero() {
                    return Some(field.value().clone());
                }
            }
        }
        None
    }

    fn field_ignored(&self, field_path: &str, field_name: &str, struct_name: &str) -> bool {
        if self.ignored.is_empty() {
            return false;
        }
        if self.ignored.contains(field_path) || self.ignored.contains(field_name) {
            return true;
        }
        !struct_name.is_empty()
            && self
                .ignored
                .contains(format!("{struct_name}.{field_name}").as_str())
    }

    fn compare_refs(&mut self, path: &str, left: &RefValue, right: &RefValue) -> DiffResult<()> {
        match (left.target(), right.target()) {
            (None, None) => Ok(()),
            (None, Some(r)) => {
                let target = r.borrow();
                self.compare_values(path, &Value::Null, &target)
            }
            (Some(l), None) => {
                let target = l.borrow();
                self.compare_values(path, &target, &Value::Null)
            }
            (Some(l), Some(r)) => {
                let pair = (Rc::as_ptr(l) as usize, Rc::as_ptr(r) as usize);
                if !self.ctx.visited_pairs.insert(pair) {
                    // Re-entered a pair mid-traversal: a true cycle, assumed
                    // equal rather than re-derived.
                    trace!(path, "reference cycle, assuming equal");
                    return Ok(());
                }
                let (left_target, right_target) = (l.borrow(), r.borrow());
                let outcome = self.compare_values(path, &left_target, &right_target);
                // The pop pairs with the push on every exit path so the same
                // pair can be revisited via a different acyclic route.
                self.ctx.visited_pairs.remove(&pair);
                outcome
            }
        }
    }
}

pub(crate) fn same_kind_scalars(left: &Value, right: &Value) -> bool {
    matches!(
        (left, right),
        (Value::Scalar(a), Value::Scalar(b)) if a.kind() == b.kind()
    )
}

pub(crate) fn value_record(path: &str, left: Option<&Value>, right: Option<&Value>) -> DiffRecord {
    DiffRecord::Value {
        path: path.to_string(),
        left: left.cloned(),
        right: right.cloned(),
    }
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}
