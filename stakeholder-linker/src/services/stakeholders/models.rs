use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::SchemaConfig;

/// A stakeholder row as fetched from Dataverse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stakeholder {
    pub id: String,
    pub name: String,
    pub contact_info: String,
}

impl Stakeholder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, contact_info: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact_info: contact_info.into(),
        }
    }

    /// Coerce a raw Web API record using the configured attribute names.
    ///
    /// The id is required; a missing name or contact info becomes an empty
    /// string. Non-string scalars are stringified.
    pub fn from_record(record: &Value, schema: &SchemaConfig) -> Option<Self> {
        let id = string_field(record, &schema.stakeholder_id).filter(|id| !id.trim().is_empty())?;
        Some(Self {
            id,
            name: string_field(record, &schema.stakeholder_name).unwrap_or_default(),
            contact_info: string_field(record, &schema.stakeholder_contact_info).unwrap_or_default(),
        })
    }
}

fn string_field(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Payload for the association workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRequest {
    pub parent_id: String,
    pub member_ids: Vec<String>,
}

impl AssociationRequest {
    /// Render as `{ "<parent_field>": id, "<member_field>": [ids] }`
    pub fn to_payload(&self, parent_field: &str, member_field: &str) -> Value {
        let mut body = Map::new();
        body.insert(parent_field.to_string(), Value::String(self.parent_id.clone()));
        body.insert(
            member_field.to_string(),
            Value::Array(self.member_ids.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(body)
    }
}
