//! The record envelope stored in caches and mirrored remotely.

use crate::{FieldMap, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name of the record identifier in serialized forms.
pub const ID_FIELD: &str = "id";

/// Field name of the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Field name of the last-update timestamp.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A single expense, invoice or budget line.
///
/// Only the identity and timestamp envelope is typed. Domain attributes
/// (amount, date, counterparty, ...) live in [`fields`](Record::fields)
/// and pass through the sync layer opaquely, so the schema can evolve
/// without touching it. On the wire the envelope and the fields share one
/// flat JSON object, matching the persisted legacy shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique within one tenant and collection.
    pub id: RecordId,
    /// Creation time in canonical textual form, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last-update time in canonical textual form, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Open domain attributes.
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    /// Create a record from open fields.
    ///
    /// The envelope owns `id`, `createdAt` and `updatedAt`; stray copies
    /// inside `fields` would serialize twice, so they are hoisted out.
    /// Textual timestamps found in the map are kept.
    pub fn new(id: impl Into<RecordId>, mut fields: FieldMap) -> Self {
        fields.remove(ID_FIELD);
        let created_at = take_string(&mut fields, CREATED_AT_FIELD);
        let updated_at = take_string(&mut fields, UPDATED_AT_FIELD);
        Self {
            id: id.into(),
            created_at,
            updated_at,
            fields,
        }
    }

    /// Stamp both timestamps with a creation time.
    pub fn stamp_created(&mut self, timestamp: impl Into<String>) {
        let timestamp = timestamp.into();
        self.created_at = Some(timestamp.clone());
        self.updated_at = Some(timestamp);
    }

    /// Overlay `fields` onto the record and stamp the update time.
    ///
    /// Envelope keys inside `fields` are ignored; unrelated existing
    /// attributes are kept.
    pub fn merge_fields(&mut self, fields: &FieldMap, updated_at: impl Into<String>) {
        for (name, value) in fields {
            if name == ID_FIELD || name == CREATED_AT_FIELD || name == UPDATED_AT_FIELD {
                continue;
            }
            self.fields.insert(name.clone(), value.clone());
        }
        self.updated_at = Some(updated_at.into());
    }

    /// Look up a domain attribute.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

fn take_string(fields: &mut FieldMap, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(timestamp)) => Some(timestamp),
        _ => None,
    }
}
