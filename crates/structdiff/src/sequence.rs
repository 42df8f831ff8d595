//! Sequence comparison: position-aligned diffing and the order-insensitive
//! matching strategies.
//!
//! Order-insensitive matching picks its strategy by size and element
//! hashability: unhashable or tiny inputs use first-unmatched scanning,
//! larger hashable inputs use per-value count reconciliation, which handles
//! duplicate elements correctly. Order-insensitive differences never carry
//! a position.

use std::collections::HashMap;

use structdiff_value::{deep_equal, is_hashable, Value, ValueKey};

use crate::engine::{same_kind_scalars, Comparator};
use crate::error::DiffResult;
use crate::record::{ChangeKind, DiffRecord};

/// At or below this length, order-insensitive matching always scans;
/// building count maps costs more than it saves.
const SMALL_SEQUENCE_LEN: usize = 5;

impl Comparator<'_> {
    pub(crate) fn compare_sequences(
        &mut self,
        path: &str,
        left: &[Value],
        right: &[Value],
        ignore_order: bool,
    ) -> DiffResult<()> {
        if ignore_order {
            self.compare_sequences_unordered(path, left, right);
            return Ok(());
        }

        for index in 0..left.len().max(right.len()) {
            match (left.get(index), right.get(index)) {
                (Some(l), Some(r)) => {
                    if same_kind_scalars(l, r) {
                        if !deep_equal(l, r) {
                            self.records.push(DiffRecord::Element {
                                path: path.to_string(),
                                left: Some(l.clone()),
                                right: Some(r.clone()),
                                index,
                                change: ChangeKind::Updated,
                            });
                        }
                    } else {
                        let element_path = format!("{path}[{index}]");
                        self.compare_values(&element_path, l, r)?;
                    }
                }
                (Some(l), None) => self.records.push(DiffRecord::Element {
                    path: path.to_string(),
                    left: Some(l.clone()),
                    right: None,
                    index,
                    change: ChangeKind::Removed,
                }),
                (None, Some(r)) => self.records.push(DiffRecord::Element {
                    path: path.to_string(),
                    left: None,
                    right: Some(r.clone()),
                    index,
                    change: ChangeKind::Added,
                }),
                (None, None) => {}
            }
        }
        Ok(())
    }

    fn compare_sequences_unordered(&mut self, path: &str, left: &[Value], right: &[Value]) {
        let hashable = left.iter().chain(right).all(is_hashable);
        if !hashable || (left.len() <= SMALL_SEQUENCE_LEN && right.len() <= SMALL_SEQUENCE_LEN) {
            self.match_elements_scanning(path, left, right);
        } else {
            self.reconcile_element_counts(path, left, right);
        }
    }

    /// For each left element, consume the first unmatched structurally-equal
    /// right element. Quadratic; used for small or unhashable element sets.
    fn match_elements_scanning(&mut self, path: &str, left: &[Value], right: &[Value]) {
        let mut right_matched = vec![false; right.len()];
        for l in left {
            let mut found = false;
            for (j, r) in right.iter().enumerate() {
                if !right_matched[j] && deep_equal(l, r) {
                    right_matched[j] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                self.records.push(DiffRecord::Value {
                    path: path.to_string(),
                    left: Some(l.clone()),
                    right: None,
                });
            }
        }
        for (j, r) in right.iter().enumerate() {
            if !right_matched[j] {
                self.records.push(DiffRecord::Value {
                    path: path.to_string(),
                    left: None,
                    right: Some(r.clone()),
                });
            }
        }
    }

    /// Per-value count reconciliation. Not a set difference: each surplus
    /// occurrence emits its own record, so duplicate elements reconcile
    /// correctly. Emission follows input order.
    fn reconcile_element_counts(&mut self, path: &str, left: &[Value], right: &[Value]) {
        let mut right_counts: HashMap<ValueKey<'_>, usize> = HashMap::with_capacity(right.len());
        for r in right {
            *right_counts.entry(ValueKey(r)).or_insert(0) += 1;
        }
        for l in left {
            match right_counts.get_mut(&ValueKey(l)) {
                Some(count) if *count > 0 => *count -= 1,
                _ => self.records.push(DiffRecord::Value {
                    path: path.to_string(),
                    left: Some(l.clone()),
                    right: None,
                }),
            }
        }

        let mut left_counts: HashMap<ValueKey<'_>, usize> = HashMap::with_capacity(left.len());
        for l in left {
            *left_counts.entry(ValueKey(l)).or_insert(0) += 1;
        }
        for r in right {
            match left_counts.get_mut(&ValueKey(r)) {
                Some(count) if *count > 0 => *count -= 1,
                _ => self.records.push(DiffRecord::Value {
                    path: path.to_string(),
                    left: None,
                    right: Some(r.clone()),
                }),
            }
        }
    }
}
