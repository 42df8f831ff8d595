//! Human-readable value rendering.
//!
//! References are rendered transparently; a reference cell that is already
//! being rendered prints as `<cycle>` so cyclic graphs terminate.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendering = Vec::new();
        format_value(self, f, &mut rendering)
    }
}

fn format_value(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    rendering: &mut Vec<usize>,
) -> fmt::Result {
    match value {
        Value::Null => f.write_str("<nil>"),
        Value::Scalar(s) => write!(f, "{s}"),
        Value::Seq(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                format_value(item, f, rendering)?;
            }
            f.write_str("]")
        }
        Value::Map(entries) => {
            f.write_str("{")?;
            for (i, (key, entry)) in entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                format_value(key, f, rendering)?;
                f.write_str(": ")?;
                format_value(entry, f, rendering)?;
            }
            f.write_str("}")
        }
        Value::Struct(s) => {
            write!(f, "{}", s.type_name())?;
            if s.fields().is_empty() {
                return f.write_str(" {}");
            }
            f.write_str(" { ")?;
            for (i, field) in s.fields().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", field.name())?;
                format_value(field.value(), f, rendering)?;
            }
            f.write_str(" }")
        }
        Value::Ref(r) => match r.target() {
            None => f.write_str("<nil>"),
            Some(cell) => {
                let identity = Rc::as_ptr(cell) as usize;
                if rendering.contains(&identity) {
                    return f.write_str("<cycle>");
                }
                rendering.push(identity);
                let outcome = format_value(&cell.borrow(), f, rendering);
                rendering.pop();
                outcome
            }
        },
        Value::Opaque(o) => f.write_str(o.repr()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::structure::StructValue;

    #[test]
    fn scalars_render_bare() {
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "<nil>");
    }

    #[test]
    fn containers_render_recursively() {
        assert_eq!(Value::seq([1i64, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(Value::map([("a", 1i64)]).to_string(), "{a: 1}");
        let user = Value::from(
            StructValue::new("User")
                .with_field("name", "Alice")
                .with_field("age", 30i64),
        );
        assert_eq!(user.to_string(), "User { name: Alice, age: 30 }");
        assert_eq!(Value::from(StructValue::new("Unit")).to_string(), "Unit {}");
    }

    #[test]
    fn references_render_transparently() {
        assert_eq!(Value::reference(Value::from(5i64)).to_string(), "5");
        assert_eq!(Value::nil_ref().to_string(), "<nil>");
    }

    #[test]
    fn cycles_render_with_marker() {
        let cell = Rc::new(RefCell::new(Value::Null));
        let node = StructValue::new("Node")
            .with_field("name", "self")
            .with_field("next", Value::shared(&cell));
        *cell.borrow_mut() = Value::Struct(node);

        let rendered = Value::shared(&cell).to_string();
        assert_eq!(rendered, "Node { name: self, next: <cycle> }");
    }
}
