use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form option metadata (type, label, size, tip, options ...).
///
/// Key order is preserved so records render in the order they were declared.
pub type Attributes = Map<String, Value>;

/// Attribute key holding the field type tag.
pub const TYPE_KEY: &str = "type";

/// Serialized key holding the user-supplied value.
pub const VALUE_KEY: &str = "value";

/// Form field type, resolved from the `type` attribute of an option record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Single checkbox.
    Checkbox,
    /// File picker.
    File,
    /// Number input.
    Number,
    /// Masked text input.
    Password,
    /// Drop-down list.
    Select,
    /// Plain text input.
    Text,
    /// Any tag this crate does not know about. Passed through unchanged.
    Other(String),
}

impl FieldType {
    /// Resolve a field type from its tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "checkbox" => FieldType::Checkbox,
            "file" => FieldType::File,
            "number" => FieldType::Number,
            "password" => FieldType::Password,
            "select" => FieldType::Select,
            "text" => FieldType::Text,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// The tag used in option attributes.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
            FieldType::Number => "number",
            FieldType::Password => "password",
            FieldType::Select => "select",
            FieldType::Text => "text",
            FieldType::Other(tag) => tag,
        }
    }

    /// The "nothing entered yet" value for this field type.
    ///
    /// Text-like inputs fall back to an empty string, inputs where an empty
    /// string would be a real selection fall back to `None`. The asymmetry is
    /// what lets rendered markup tell "never set" apart from "cleared".
    pub fn default_value(&self) -> Option<Value> {
        match self {
            FieldType::Checkbox | FieldType::Password | FieldType::Text => {
                Some(Value::String(String::new()))
            }
            FieldType::File | FieldType::Number | FieldType::Select | FieldType::Other(_) => None,
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::from_tag(tag)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named configuration field: metadata plus an optional user value.
///
/// Serializes flat, the way the options table stores it:
/// `{"type": "text", "label": "Key", "size": 50, "value": "abc"}`.
/// `value` is omitted entirely until a user has supplied one. A stored
/// `"value": null` reads back as `Some(Value::Null)`, not as "never set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// Metadata attributes. Never contains [`VALUE_KEY`].
    #[serde(flatten)]
    pub attributes: Attributes,
    /// User-supplied value, if any.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

/// A `value` key that is present is a value, even when it is `null`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl OptionRecord {
    /// Build a record from metadata alone.
    ///
    /// A `value` entry in `attributes` is metadata-shaped noise from a
    /// round-tripped record and is dropped.
    pub fn from_attributes(mut attributes: Attributes) -> Self {
        if attributes.remove(VALUE_KEY).is_some() {
            warn!("ignoring `value` supplied as option metadata");
        }
        Self {
            attributes,
            value: None,
        }
    }

    /// Build a record holding only a value, for keys seen before their config.
    pub fn from_value(value: Value) -> Self {
        Self {
            attributes: Attributes::new(),
            value: Some(value),
        }
    }

    /// Builder-style value setter.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Field type from the `type` attribute, if declared as a string.
    pub fn field_type(&self) -> Option<FieldType> {
        self.attributes
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .map(FieldType::from_tag)
    }

    /// String attribute lookup (`label`, `tip` ...).
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// The stored value, or the field type's default when none was supplied.
    pub fn normalised_value(&self) -> Option<Value> {
        match &self.value {
            Some(v) => Some(v.clone()),
            None => self.field_type().and_then(|t| t.default_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: Value) -> Attributes {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_field_type_tags() {
        for tag in ["checkbox", "file", "number", "password", "select", "text"] {
            assert_eq!(FieldType::from_tag(tag).as_str(), tag);
        }
        assert_eq!(
            FieldType::from_tag("colour"),
            FieldType::Other("colour".to_string())
        );
        assert_eq!(FieldType::from("colour").to_string(), "colour");
    }

    #[test]
    fn test_default_value_asymmetry() {
        let empty = Some(Value::String(String::new()));
        assert_eq!(FieldType::Checkbox.default_value(), empty);
        assert_eq!(FieldType::Password.default_value(), empty);
        assert_eq!(FieldType::Text.default_value(), empty);
        assert_eq!(FieldType::File.default_value(), None);
        assert_eq!(FieldType::Number.default_value(), None);
        assert_eq!(FieldType::Select.default_value(), None);
        assert_eq!(FieldType::Other("range".into()).default_value(), None);
    }

    #[test]
    fn test_record_serializes_flat_without_value() {
        let record = OptionRecord::from_attributes(attrs(json!({
            "type": "text",
            "label": "Key",
            "size": 50
        })));
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out, json!({"type": "text", "label": "Key", "size": 50}));

        let out = serde_json::to_value(record.with_value("abc12345")).unwrap();
        assert_eq!(
            out,
            json!({"type": "text", "label": "Key", "size": 50, "value": "abc12345"})
        );
    }

    #[test]
    fn test_record_deserialize_splits_value() {
        let record: OptionRecord =
            serde_json::from_value(json!({"type": "number", "size": 10, "value": 4})).unwrap();
        assert_eq!(record.value, Some(json!(4)));
        assert!(!record.attributes.contains_key(VALUE_KEY));
        assert_eq!(record.field_type(), Some(FieldType::Number));

        let record: OptionRecord = serde_json::from_value(json!({"type": "file"})).unwrap();
        assert_eq!(record.value, None);
    }

    #[test]
    fn test_null_value_is_kept() {
        let record: OptionRecord =
            serde_json::from_str(r#"{"type": "select", "value": null}"#).unwrap();
        assert_eq!(record.value, Some(Value::Null));
        assert!(!record.attributes.contains_key(VALUE_KEY));

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"type":"select","value":null}"#);
        assert_eq!(serde_json::from_str::<OptionRecord>(&text).unwrap(), record);
    }

    #[test]
    fn test_from_attributes_drops_value() {
        crate::init_test_logger();
        let record = OptionRecord::from_attributes(attrs(json!({
            "type": "text",
            "value": "stale"
        })));
        assert_eq!(record.value, None);
        assert!(!record.attributes.contains_key(VALUE_KEY));
    }

    #[test]
    fn test_normalised_value() {
        let text = OptionRecord::from_attributes(attrs(json!({"type": "text"})));
        assert_eq!(text.normalised_value(), Some(json!("")));
        assert_eq!(
            text.clone().with_value("x").normalised_value(),
            Some(json!("x"))
        );

        let select = OptionRecord::from_attributes(attrs(json!({"type": "select"})));
        assert_eq!(select.normalised_value(), None);

        let untyped = OptionRecord::from_value(json!(3));
        assert_eq!(untyped.field_type(), None);
        assert_eq!(untyped.normalised_value(), Some(json!(3)));
    }
}
