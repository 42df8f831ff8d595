//! Rendering of diff reports: a line-oriented text summary and a structured
//! JSON form. Pure presentation; no comparison logic.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map as JsonMap, Number, Value as Json};

use structdiff_value::{Scalar, Value};

use crate::record::{ChangeKind, DiffRecord, DiffReport};

impl fmt::Display for DiffReport {
    /// One line per record: `<CHANGE> <path>[index|key]: <left> -> <right>`,
    /// with the absent arrow side omitted for additions and removals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No differences found");
        }
        writeln!(f, "Found {} differences:", self.len())?;
        for record in &self.records {
            write_record_line(f, record)?;
        }
        Ok(())
    }
}

fn write_record_line(f: &mut fmt::Formatter<'_>, record: &DiffRecord) -> fmt::Result {
    let change = record.effective_change();
    match record {
        DiffRecord::Value { path, .. } | DiffRecord::Field { path, .. } => {
            if path.is_empty() {
                write!(f, "{}:", change.as_str())?;
            } else {
                write!(f, "{} {}:", change.as_str(), path)?;
            }
        }
        DiffRecord::Element { path, index, .. } => {
            write!(f, "{} {}[{}]:", change.as_str(), path, index)?;
        }
        DiffRecord::Entry { path, key, .. } => {
            write!(f, "{} {}[{}]:", change.as_str(), path, key)?;
        }
    }
    match change {
        ChangeKind::Added => writeln!(f, " {}", side(record.right())),
        ChangeKind::Removed => writeln!(f, " {}", side(record.left())),
        ChangeKind::Updated | ChangeKind::IdentityMismatch => {
            writeln!(f, " {} -> {}", side(record.left()), side(record.right()))
        }
    }
}

fn side(value: Option<&Value>) -> String {
    value.map_or_else(|| "<nil>".to_string(), Value::to_string)
}

impl DiffReport {
    /// The structured JSON form: an array of change objects with
    /// `{type, path, leftValue, rightValue, key|index|fieldName, change}`.
    /// An empty report yields an empty array.
    pub fn to_json(&self) -> Json {
        Json::Array(self.records.iter().map(record_to_json).collect())
    }

    /// The structured JSON form, pretty-printed.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| "[]".to_string())
    }
}

fn record_to_json(record: &DiffRecord) -> Json {
    let mut object = JsonMap::new();
    match record {
        DiffRecord::Value { path, .. } => {
            object.insert("type".to_string(), Json::String("value".to_string()));
            object.insert("path".to_string(), Json::String(path.clone()));
        }
        DiffRecord::Field {
            path, field_name, ..
        } => {
            object.insert("type".to_string(), Json::String("struct".to_string()));
            object.insert(
                "path".to_string(),
                Json::String(parent_path(path, field_name)),
            );
            object.insert("fieldName".to_string(), Json::String(field_name.clone()));
        }
        DiffRecord::Element { path, index, .. } => {
            object.insert("type".to_string(), Json::String("slice".to_string()));
            object.insert("path".to_string(), Json::String(path.clone()));
            object.insert("index".to_string(), Json::Number(Number::from(*index)));
        }
        DiffRecord::Entry { path, key, .. } => {
            object.insert("type".to_string(), Json::String("map".to_string()));
            object.insert("path".to_string(), Json::String(path.clone()));
            object.insert("key".to_string(), Json::String(key.to_string()));
        }
    }
    if let Some(left) = record.left() {
        object.insert("leftValue".to_string(), value_to_json(left, &mut Vec::new()));
    }
    if let Some(right) = record.right() {
        object.insert(
            "rightValue".to_string(),
            value_to_json(right, &mut Vec::new()),
        );
    }
    object.insert(
        "change".to_string(),
        Json::String(record.effective_change().as_str().to_string()),
    );
    Json::Object(object)
}

/// The record path with its trailing field name split off.
fn parent_path(path: &str, field_name: &str) -> String {
    if !field_name.is_empty() {
        if path == field_name {
            return String::new();
        }
        if let Some(parent) = path
            .strip_suffix(field_name)
            .and_then(|prefix| prefix.strip_suffix('.'))
        {
            return parent.to_string();
        }
    }
    path.to_string()
}

/// Render a value into JSON, dereferencing references cycle-safely.
fn value_to_json(value: &Value, rendering: &mut Vec<usize>) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Scalar(s) => scalar_to_json(s),
        Value::Seq(items) => {
            Json::Array(items.iter().map(|v| value_to_json(v, rendering)).collect())
        }
        Value::Map(entries) => {
            let mut object = JsonMap::new();
            for (key, entry) in entries {
                object.insert(key.to_string(), value_to_json(entry, rendering));
            }
            Json::Object(object)
        }
        Value::Struct(s) => {
            let mut object = JsonMap::new();
            for field in s.fields() {
                if field.is_public() {
                    object.insert(
                        field.name().to_string(),
                        value_to_json(field.value(), rendering),
                    );
                }
            }
            Json::Object(object)
        }
        Value::Ref(r) => match r.target() {
            None => Json::Null,
            Some(cell) => {
                let identity = Rc::as_ptr(cell) as usize;
                if rendering.contains(&identity) {
                    return Json::String("<cycle>".to_string());
                }
                rendering.push(identity);
                let rendered = value_to_json(&cell.borrow(), rendering);
                rendering.pop();
                rendered
            }
        },
        Value::Opaque(o) => Json::String(o.repr().to_string()),
    }
}

fn scalar_to_json(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Bool(v) => Json::Bool(*v),
        Scalar::Char(v) => Json::String(v.to_string()),
        Scalar::Str(v) => Json::String(v.clone()),
        Scalar::I8(v) => Json::Number(Number::from(*v)),
        Scalar::I16(v) => Json::Number(Number::from(*v)),
        Scalar::I32(v) => Json::Number(Number::from(*v)),
        Scalar::I64(v) => Json::Number(Number::from(*v)),
        Scalar::U8(v) => Json::Number(Number::from(*v)),
        Scalar::U16(v) => Json::Number(Number::from(*v)),
        Scalar::U32(v) => Json::Number(Number::from(*v)),
        Scalar::U64(v) => Json::Number(Number::from(*v)),
        Scalar::F32(v) => Number::from_f64(f64::from(*v)).map_or(Json::Null, Json::Number),
        Scalar::F64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
    }
}
