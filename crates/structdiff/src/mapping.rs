//! Mapping comparison: key-wise diff with added/removed/updated entries.

use std::mem;

use structdiff_value::{deep_equal, Value};

use crate::engine::{same_kind_scalars, Comparator};
use crate::error::DiffResult;
use crate::numeric;
use crate::record::{ChangeKind, DiffRecord};

impl Comparator<'_> {
    pub(crate) fn compare_mappings(
        &mut self,
        path: &str,
        left: &[(Value, Value)],
        right: &[(Value, Value)],
    ) -> DiffResult<()> {
        for (key, left_value) in left {
            let Some(right_value) = lookup(right, key) else {
                self.records.push(DiffRecord::Entry {
                    path: path.to_string(),
                    left: Some(left_value.clone()),
                    right: None,
                    key: key.clone(),
                    change: ChangeKind::Removed,
                });
                continue;
            };

            if !left_value.type_tag().matches(&right_value.type_tag()) {
                if self.widened_equality(left_value, right_value) {
                    continue;
                }
                self.records.push(DiffRecord::Entry {
                    path: path.to_string(),
                    left: Some(left_value.clone()),
                    right: Some(right_value.clone()),
                    key: key.clone(),
                    change: ChangeKind::Updated,
                });
                continue;
            }

            if same_kind_scalars(left_value, right_value) {
                if !deep_equal(left_value, right_value) {
                    self.records.push(DiffRecord::Entry {
                        path: path.to_string(),
                        left: Some(left_value.clone()),
                        right: Some(right_value.clone()),
                        key: key.clone(),
                        change: ChangeKind::Updated,
                    });
                }
                continue;
            }

            // Complex entry values recurse through a scratch buffer so the
            // nested differences land under their own sub-paths before being
            // spliced into the outer report.
            let entry_path = format!("{path}[{key}]");
            let outer = mem::take(&mut self.records);
            let outcome = self.compare_values(&entry_path, left_value, right_value);
            let nested = mem::replace(&mut self.records, outer);
            self.records.extend(nested);
            outcome?;
        }

        for (key, right_value) in right {
            if lookup(left, key).is_none() {
                self.records.push(DiffRecord::Entry {
                    path: path.to_string(),
                    left: None,
                    right: Some(right_value.clone()),
                    key: key.clone(),
                    change: ChangeKind::Added,
                });
            }
        }

        Ok(())
    }

    fn widened_equality(&self, left: &Value, right: &Value) -> bool {
        if !self.options.numeric_widening {
            return false;
        }
        match (left, right) {
            (Value::Scalar(l), Value::Scalar(r)) => {
                numeric::both_numeric(l, r) && numeric::widened_equal(l, r)
            }
            _ => false,
        }
    }
}

fn lookup<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(candidate, _)| deep_equal(candidate, key))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use structdiff_value::StructValue;

    use crate::engine::{compare, compare_with_options};
    use crate::options::CompareOptions;
    use crate::record::{ChangeKind, DiffRecord};
    use crate::Value;

    #[test]
    fn equal_mappings_produce_no_diff() {
        let a = Value::map([("x", 1i64), ("y", 2)]);
        let b = Value::map([("y", 2i64), ("x", 1)]);
        assert!(compare(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn updated_removed_added_entries() {
        let left = Value::map([("a", 1i64), ("b", 2), ("c", 3)]);
        let right = Value::map([("a", 1i64), ("b", 4), ("d", 5)]);

        let report = compare(&left, &right).unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report.updates(), 1);
        assert_eq!(report.removals(), 1);
        assert_eq!(report.additions(), 1);

        let updated = report
            .iter()
            .find(|r| r.effective_change() == ChangeKind::Updated)
            .unwrap();
        match updated {
            DiffRecord::Entry {
                key, left, right, ..
            } => {
                assert_eq!(key.to_string(), "b");
                assert_eq!(left.as_ref().unwrap().to_string(), "2");
                assert_eq!(right.as_ref().unwrap().to_string(), "4");
            }
            other => panic!("expected Entry record, got {other:?}"),
        }

        let removed = report
            .iter()
            .find(|r| r.effective_change() == ChangeKind::Removed)
            .unwrap();
        match removed {
            DiffRecord::Entry { key, right, .. } => {
                assert_eq!(key.to_string(), "c");
                assert!(right.is_none());
            }
            other => panic!("expected Entry record, got {other:?}"),
        }
    }

    #[test]
    fn complex_entry_values_decompose_into_sub_paths() {
        let left = Value::map([(
            "owner",
            Value::from(StructValue::new("User").with_field("name", "Alice")),
        )]);
        let right = Value::map([(
            "owner",
            Value::from(StructValue::new("User").with_field("name", "Bob")),
        )]);

        let report = compare(&left, &right).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].path(), "[owner].name");
    }

    #[test]
    fn nested_map_paths_compose() {
        let make = |n: i64| Value::map([("outer", Value::map([("inner", n)]))]);
        let report = compare(&make(1), &make(2)).unwrap();
        assert_eq!(report.len(), 1);
        match &report.records[0] {
            DiffRecord::Entry { path, key, .. } => {
                assert_eq!(path, "[outer]");
                assert_eq!(key.to_string(), "inner");
            }
            other => panic!("expected Entry record, got {other:?}"),
        }
    }

    #[test]
    fn entry_type_change_is_an_update() {
        let left = Value::map([("v", Value::from(42i64))]);
        let right = Value::map([("v", Value::from("forty-two"))]);
        let report = compare(&left, &right).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].change(), Some(ChangeKind::Updated));
    }

    #[test]
    fn widened_numeric_entries_can_agree() {
        let left = Value::map([("count", Value::from(42i32)), ("total", Value::from(100i64))]);
        let right = Value::map([("count", Value::from(42i64)), ("total", Value::from(100u64))]);

        assert_eq!(compare(&left, &right).unwrap().len(), 2);

        let options = CompareOptions {
            numeric_widening: true,
            ..Default::default()
        };
        assert!(compare_with_options(&left, &right, &options)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn non_string_keys_render_into_paths() {
        let left = Value::map([(7i64, "seven")]);
        let right = Value::map([(7i64, "SEVEN")]);
        let report = compare(&left, &right).unwrap();
        assert_eq!(report.len(), 1);
        match &report.records[0] {
            DiffRecord::Entry { key, .. } => assert_eq!(key.to_string(), "7"),
            other => panic!("expected Entry record, got {other:?}"),
        }
    }

    #[test]
    fn empty_mappings() {
        let empty = Value::map::<&str, i64, _>([]);
        assert!(compare(&empty, &empty).unwrap().is_empty());

        let report = compare(&empty, &Value::map([("k", 1i64)])).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].effective_change(), ChangeKind::Added);
    }

    #[test]
    fn null_entry_values() {
        let left = Value::map([("k", Value::Null)]);
        let right = Value::map([("k", Value::Null)]);
        assert!(compare(&left, &right).unwrap().is_empty());

        let right = Value::map([("k", Value::from(1i64))]);
        let report = compare(&left, &right).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].change(), Some(ChangeKind::Updated));
    }
}
