//! Named record values and their per-field comparison directives.

use crate::value::Value;

/// Tokens recognized in a field's directive string. Unknown tokens are
/// silently ignored so directive strings stay forward-compatible.
pub mod directive {
    /// Skip the field entirely during comparison.
    pub const IGNORE: &str = "ignore";
    /// Compare the field's sequence value without regard to element order.
    pub const IGNORE_ORDER: &str = "ignoreOrder";
    /// The field identifies which entity the record represents.
    pub const ID: &str = "id";
}

/// Exact-token membership test over a comma-separated directive string.
///
/// Tokens are trimmed before matching; there are no substring matches, so a
/// directive of `"ignoreOrder"` does not activate `"ignore"`.
pub fn has_directive(tag: &str, token: &str) -> bool {
    if tag.is_empty() {
        return false;
    }
    tag.split(',').any(|part| part.trim() == token)
}

/// A named record value with ordered fields.
#[derive(Clone, Debug)]
pub struct StructValue {
    type_name: String,
    fields: Vec<FieldValue>,
}

impl StructValue {
    /// Create an empty record of the given type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a public field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(FieldValue::new(name, value));
        self
    }

    /// Append a public field carrying a directive string.
    pub fn with_tagged_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        tag: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldValue::tagged(name, value, tag));
        self
    }

    /// Append a non-public field. Private fields are never compared.
    pub fn with_private_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(FieldValue::private(name, value));
        self
    }

    /// The record's type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One field of a [`StructValue`].
#[derive(Clone, Debug)]
pub struct FieldValue {
    name: String,
    value: Value,
    public: bool,
    tag: String,
}

impl FieldValue {
    /// A public field with no directives.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            public: true,
            tag: String::new(),
        }
    }

    /// A public field with a directive string.
    pub fn tagged(
        name: impl Into<String>,
        value: impl Into<Value>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            public: true,
            tag: tag.into(),
        }
    }

    /// A non-public field.
    pub fn private(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            public: false,
            tag: String::new(),
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the field is public. Non-public fields are skipped without
    /// ever reading their value.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// The raw directive string.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the directive string contains the given token exactly.
    pub fn has_directive(&self, token: &str) -> bool {
        has_directive(&self.tag, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_exact_token_match() {
        assert!(has_directive("ignore", directive::IGNORE));
        assert!(has_directive("id,ignoreOrder", directive::IGNORE_ORDER));
        assert!(has_directive("id, ignoreOrder", directive::IGNORE_ORDER));
        assert!(has_directive("  id  ,ignore", directive::ID));
    }

    #[test]
    fn directive_no_substring_match() {
        assert!(!has_directive("ignoreOrder", directive::IGNORE));
        assert!(!has_directive("ignores", directive::IGNORE));
        assert!(!has_directive("myid", directive::ID));
    }

    #[test]
    fn directive_empty_tag_matches_nothing() {
        assert!(!has_directive("", directive::IGNORE));
        assert!(!has_directive("", ""));
    }

    #[test]
    fn directive_unknown_tokens_are_inert() {
        let field = FieldValue::tagged("meta", "x", "whatever,ignore,future-token");
        assert!(field.has_directive(directive::IGNORE));
        assert!(!field.has_directive("future"));
    }

    #[test]
    fn builder_preserves_declaration_order() {
        let record = StructValue::new("User")
            .with_field("name", "Alice")
            .with_tagged_field("id", 7i64, "id")
            .with_private_field("secret", "hidden");

        let names: Vec<&str> = record.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["name", "id", "secret"]);
        assert!(record.field("id").is_some());
        assert!(record.field("missing").is_none());
        assert!(!record.field("secret").map_or(true, FieldValue::is_public));
    }
}
