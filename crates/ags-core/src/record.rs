//! Record domain model.
//!
//! A record is a schema-less document mirrored from the content source: a
//! stable id plus an ordered bag of named fields. Field values are restricted
//! to a closed set of kinds rather than arbitrary JSON, so everything
//! downstream (translation, hierarchy building) can match exhaustively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Field holding the ordered child-id relation.
pub const RELATION_FIELD: &str = "Sub-item";
/// Field holding the level classifier; values containing "sub" mark a record
/// as excluded from the hierarchy.
pub const LEVEL_FIELD: &str = "Level";
/// Field holding the numeric ordering; absent means "sort last".
pub const ORDER_FIELD: &str = "#";
/// Optional display symbol surfaced in the tree.
pub const SYMBOL_FIELD: &str = "Symbol";
/// Optional category surfaced in the tree.
pub const CATEGORY_FIELD: &str = "Category";

/// A single field value.
///
/// Stored documents carry fields in this tagged shape, e.g.
/// `{"kind": "title", "value": "Health"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Title(String),
    Text(String),
    Select(String),
    Number(f64),
    Flag(bool),
    Relation(Vec<String>),
    Null,
}

impl FieldValue {
    /// Decode a stored JSON value. The tagged shape takes precedence; plain
    /// JSON scalars are accepted too so hand-written documents still sync.
    /// Returns `None` for shapes outside the closed set.
    pub fn from_json(value: &Value) -> Option<Self> {
        if value.is_object() {
            return serde_json::from_value(value.clone()).ok();
        }
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(flag) => Some(Self::Flag(*flag)),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::Relation),
            Value::Object(_) => None,
        }
    }

    /// The textual content of string-like kinds.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Title(text) | Self::Text(text) | Self::Select(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }
}

/// A record from the document store: stable id plus ordered fields.
/// The id is split out at the decode boundary; `fields` never contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Decode a stored document's fields, skipping the `_id` key.
    pub fn from_document(
        id: String,
        document: &serde_json::Map<String, Value>,
    ) -> Result<Self, DecodeError> {
        let mut fields = IndexMap::new();
        for (name, value) in document {
            if name == "_id" {
                continue;
            }
            let field =
                FieldValue::from_json(value).ok_or_else(|| DecodeError::UnsupportedValue {
                    field: name.clone(),
                    value: value.to_string(),
                })?;
            fields.insert(name.clone(), field);
        }
        Ok(Self { id, fields })
    }

    /// Display name: the first title-kind field, in field order.
    pub fn title(&self) -> Option<&str> {
        self.fields.values().find_map(|value| match value {
            FieldValue::Title(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Textual content of a named field, if it has a string-like kind.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_str)
    }

    /// Numeric ordering key; records without one sort last.
    pub fn order(&self) -> f64 {
        self.fields
            .get(ORDER_FIELD)
            .and_then(FieldValue::as_number)
            .unwrap_or(f64::INFINITY)
    }

    /// Whether the level classifier marks this record as a sub-level entry.
    pub fn is_sub_level(&self) -> bool {
        self.field_str(LEVEL_FIELD)
            .map(|level| level.to_lowercase().contains("sub"))
            .unwrap_or(false)
    }

    /// Ordered child ids from the relation field, when present.
    pub fn relation_ids(&self) -> Option<&[String]> {
        match self.fields.get(RELATION_FIELD) {
            Some(FieldValue::Relation(ids)) => Some(ids),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_field_roundtrip() {
        let value = FieldValue::Title("Health".to_string());
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!({"kind": "title", "value": "Health"}));
        assert_eq!(FieldValue::from_json(&encoded), Some(value));
    }

    #[test]
    fn test_plain_scalar_fallback() {
        assert_eq!(
            FieldValue::from_json(&json!("hello")),
            Some(FieldValue::Text("hello".to_string()))
        );
        assert_eq!(
            FieldValue::from_json(&json!(2.5)),
            Some(FieldValue::Number(2.5))
        );
        assert_eq!(
            FieldValue::from_json(&json!(true)),
            Some(FieldValue::Flag(true))
        );
        assert_eq!(
            FieldValue::from_json(&json!(["a", "b"])),
            Some(FieldValue::Relation(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(FieldValue::from_json(&json!(null)), Some(FieldValue::Null));
    }

    #[test]
    fn test_unsupported_shapes_rejected() {
        assert_eq!(FieldValue::from_json(&json!({"nested": {"deep": 1}})), None);
        assert_eq!(FieldValue::from_json(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_from_document_skips_id() {
        let document = json!({
            "_id": "abc",
            "Name": {"kind": "title", "value": "Health"},
            "#": 3,
        });
        let record = Record::from_document("abc".to_string(), document.as_object().unwrap()).unwrap();
        assert_eq!(record.id, "abc");
        assert!(!record.fields.contains_key("_id"));
        assert_eq!(record.title(), Some("Health"));
        assert_eq!(record.order(), 3.0);
    }

    #[test]
    fn test_sub_level_is_case_insensitive_substring() {
        let record = Record::new("r1")
            .with_field(LEVEL_FIELD, FieldValue::Select("Sub-Area".to_string()));
        assert!(record.is_sub_level());

        let record = Record::new("r2")
            .with_field(LEVEL_FIELD, FieldValue::Select("SUBLEVEL".to_string()));
        assert!(record.is_sub_level());

        let record =
            Record::new("r3").with_field(LEVEL_FIELD, FieldValue::Select("Area".to_string()));
        assert!(!record.is_sub_level());
    }

    #[test]
    fn test_missing_order_sorts_last() {
        assert_eq!(Record::new("r1").order(), f64::INFINITY);
    }
}
