//! Diff records and the report they accumulate into.

use serde::{Deserialize, Serialize};

use structdiff_value::Value;

/// The kind of change a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Present only on the right side.
    #[serde(rename = "ADDED")]
    Added,
    /// Present only on the left side.
    #[serde(rename = "REMOVED")]
    Removed,
    /// Present on both sides with different values.
    #[serde(rename = "UPDATED")]
    Updated,
    /// Two records carry different identity fields; their other fields were
    /// not compared.
    #[serde(rename = "ID_MISMATCH")]
    IdentityMismatch,
}

impl ChangeKind {
    /// The wire name used in rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "ADDED",
            ChangeKind::Removed => "REMOVED",
            ChangeKind::Updated => "UPDATED",
            ChangeKind::IdentityMismatch => "ID_MISMATCH",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let human = match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Updated => "updated",
            ChangeKind::IdentityMismatch => "id mismatch",
        };
        f.write_str(human)
    }
}

/// A single reported difference between the left and right value.
///
/// All variants share a path and the two sides of the change; exactly one
/// side is absent when the change is an addition or a removal.
#[derive(Clone, Debug)]
pub enum DiffRecord {
    /// A root-level or leaf mismatch. The change kind is implied: an absent
    /// side means addition or removal, both sides present means update.
    Value {
        path: String,
        left: Option<Value>,
        right: Option<Value>,
    },
    /// A struct field update, addition, removal, or identity mismatch. The
    /// path includes the field name; for identity mismatches the path is
    /// the struct's own path and `field_name` is empty.
    Field {
        path: String,
        left: Option<Value>,
        right: Option<Value>,
        field_name: String,
        change: ChangeKind,
    },
    /// A sequence element change. The path is the sequence's path; the
    /// position is carried separately.
    Element {
        path: String,
        left: Option<Value>,
        right: Option<Value>,
        index: usize,
        change: ChangeKind,
    },
    /// A mapping entry change. The path is the mapping's path; the key is
    /// carried separately.
    Entry {
        path: String,
        left: Option<Value>,
        right: Option<Value>,
        key: Value,
        change: ChangeKind,
    },
}

impl DiffRecord {
    /// The path the record is attributed to.
    pub fn path(&self) -> &str {
        match self {
            DiffRecord::Value { path, .. }
            | DiffRecord::Field { path, .. }
            | DiffRecord::Element { path, .. }
            | DiffRecord::Entry { path, .. } => path,
        }
    }

    /// The left-hand value, absent for additions.
    pub fn left(&self) -> Option<&Value> {
        match self {
            DiffRecord::Value { left, .. }
            | DiffRecord::Field { left, .. }
            | DiffRecord::Element { left, .. }
            | DiffRecord::Entry { left, .. } => left.as_ref(),
        }
    }

    /// The right-hand value, absent for removals.
    pub fn right(&self) -> Option<&Value> {
        match self {
            DiffRecord::Value { right, .. }
            | DiffRecord::Field { right, .. }
            | DiffRecord::Element { right, .. }
            | DiffRecord::Entry { right, .. } => right.as_ref(),
        }
    }

    /// The explicit change kind; `None` for base value records.
    pub fn change(&self) -> Option<ChangeKind> {
        match self {
            DiffRecord::Value { .. } => None,
            DiffRecord::Field { change, .. }
            | DiffRecord::Element { change, .. }
            | DiffRecord::Entry { change, .. } => Some(*change),
        }
    }

    /// The change kind with the base variant's implied kind resolved: an
    /// absent left side is an addition, an absent right side a removal,
    /// both present an update.
    pub fn effective_change(&self) -> ChangeKind {
        match self.change() {
            Some(change) => change,
            None => match (self.left(), self.right()) {
                (None, Some(_)) => ChangeKind::Added,
                (Some(_), None) => ChangeKind::Removed,
                _ => ChangeKind::Updated,
            },
        }
    }
}

/// All differences found by one comparison call.
///
/// Owned by the call that produced it and never mutated after it returns.
#[derive(Clone, Debug, Default)]
pub struct DiffReport {
    /// The ordered list of discovered differences.
    pub records: Vec<DiffRecord>,
}

impl DiffReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no differences were found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of differences.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if any difference was found.
    pub fn has_differences(&self) -> bool {
        !self.records.is_empty()
    }

    /// Number of additions.
    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    /// Number of removals.
    pub fn removals(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    /// Number of updates.
    pub fn updates(&self) -> usize {
        self.count(ChangeKind::Updated)
    }

    /// Number of identity mismatches.
    pub fn identity_mismatches(&self) -> usize {
        self.count(ChangeKind::IdentityMismatch)
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, DiffRecord> {
        self.records.iter()
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.records
            .iter()
            .filter(|r| r.effective_change() == kind)
            .count()
    }
}

impl<'a> IntoIterator for &'a DiffReport {
    type Item = &'a DiffRecord;
    type IntoIter = std::slice::Iter<'a, DiffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
