//! Change event model and raw feed-event decoding.
//!
//! The change feed delivers events as raw JSON shaped like
//! `{operationType, documentKey._id, fullDocument?, updateDescription?}`.
//! Decoding enforces the event invariants: updates carry only deltas,
//! inserts and replaces carry the full record, deletes carry only the id.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::record::{FieldValue, Record};

/// Mutation kind carried by a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    Insert,
    Replace,
    Update,
    Delete,
}

impl ChangeOperation {
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        match raw {
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(DecodeError::UnknownOperation(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A single decoded mutation of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub operation: ChangeOperation,
    pub record_id: String,
    /// Present for insert and replace only.
    pub full_record: Option<Record>,
    /// Delta fields for update; empty otherwise.
    pub updated_fields: IndexMap<String, FieldValue>,
    /// Field names removed by an update; empty otherwise.
    pub removed_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    operation_type: String,
    document_key: Option<RawKey>,
    full_document: Option<Value>,
    update_description: Option<RawUpdate>,
}

#[derive(Debug, Deserialize)]
struct RawKey {
    #[serde(rename = "_id")]
    id: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUpdate {
    #[serde(default)]
    updated_fields: serde_json::Map<String, Value>,
    #[serde(default)]
    removed_fields: Vec<String>,
}

impl ChangeEvent {
    /// Decode a raw change-feed event.
    pub fn from_raw(raw: &Value) -> Result<Self, DecodeError> {
        let raw: RawEvent = serde_json::from_value(raw.clone())
            .map_err(|err| DecodeError::Malformed(err.to_string()))?;

        let operation = ChangeOperation::parse(&raw.operation_type)?;
        let key = raw
            .document_key
            .ok_or(DecodeError::MissingField("documentKey"))?;
        let record_id = record_id_from_json(&key.id)?;

        match operation {
            ChangeOperation::Insert | ChangeOperation::Replace => {
                let document = raw
                    .full_document
                    .ok_or(DecodeError::MissingField("fullDocument"))?;
                let document = document
                    .as_object()
                    .ok_or_else(|| DecodeError::Malformed("fullDocument is not an object".into()))?;
                let record = Record::from_document(record_id.clone(), document)?;
                Ok(Self {
                    operation,
                    record_id,
                    full_record: Some(record),
                    updated_fields: IndexMap::new(),
                    removed_fields: Vec::new(),
                })
            }
            ChangeOperation::Update => {
                let description = raw.update_description.unwrap_or_default();
                let mut updated_fields = IndexMap::new();
                for (name, value) in &description.updated_fields {
                    if name == "_id" {
                        continue;
                    }
                    // Dotted paths would be partial writes into a field's
                    // tagged shape; they cannot be reconstructed here.
                    if name.contains('.') {
                        return Err(DecodeError::UnsupportedValue {
                            field: name.clone(),
                            value: "nested update path".to_string(),
                        });
                    }
                    let field = FieldValue::from_json(value).ok_or_else(|| {
                        DecodeError::UnsupportedValue {
                            field: name.clone(),
                            value: value.to_string(),
                        }
                    })?;
                    updated_fields.insert(name.clone(), field);
                }
                Ok(Self {
                    operation,
                    record_id,
                    full_record: None,
                    updated_fields,
                    removed_fields: description.removed_fields,
                })
            }
            ChangeOperation::Delete => Ok(Self {
                operation,
                record_id,
                full_record: None,
                updated_fields: IndexMap::new(),
                removed_fields: Vec::new(),
            }),
        }
    }
}

/// Extract a string id from a document key value, accepting extended-JSON
/// ObjectIds (`{"$oid": "..."}`) alongside plain strings and numbers.
pub fn record_id_from_json(value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(id) => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        Value::Object(object) => object
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| DecodeError::BadId(value.to_string())),
        other => Err(DecodeError::BadId(other.to_string())),
    }
}
