//! Typed operations over a [`DocumentDatabase`].
//!
//! This is the boundary where backend failures stop propagating upward as
//! surprises: every function logs the failure and returns a [`RemoteError`]
//! for the coordinator to fall back on.

use super::{DocumentDatabase, RemoteDocument, USER_ID_FIELD};
use crate::clock;
use crate::error::RemoteError;
use serde_json::Value;
use std::cmp::Ordering;
use upsen_core::{CollectionPath, FieldMap, Record, RecordId, TenantId, ID_FIELD};

/// Fetch every record under `path`, newest first.
///
/// Server timestamps are folded into the canonical textual form. Documents
/// without a creation stamp sort last, keeping their backend order.
pub async fn fetch_all<D: DocumentDatabase>(
    db: &D,
    path: &CollectionPath,
) -> Result<Vec<Record>, RemoteError> {
    let mut documents = db.fetch_all(path).await.map_err(|e| {
        tracing::warn!("Remote fetch failed for {}: {}", path, e);
        e
    })?;

    documents.sort_by(newest_first);

    Ok(documents.into_iter().map(into_record).collect())
}

/// Create a record remotely, returning the server-assigned id.
///
/// Two round trips: the create, then a patch writing the assigned id back
/// onto the document, so the stored `id` field always equals the path
/// segment. A failed patch fails the whole call.
pub async fn add<D: DocumentDatabase>(
    db: &D,
    path: &CollectionPath,
    tenant: &TenantId,
    mut fields: FieldMap,
) -> Result<RecordId, RemoteError> {
    fields.insert(USER_ID_FIELD.to_string(), Value::String(tenant.to_string()));

    let id = db.add(path, fields).await.map_err(|e| {
        tracing::warn!("Remote add failed for {}: {}", path, e);
        e
    })?;

    let mut patch = FieldMap::new();
    patch.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    db.update(&path.doc(id.clone()), patch).await.map_err(|e| {
        tracing::warn!("Id patch failed for {}/{}: {}", path, id, e);
        e
    })?;

    Ok(id)
}

/// Merge `fields` into the remote record `id`.
pub async fn update<D: DocumentDatabase>(
    db: &D,
    path: &CollectionPath,
    id: &str,
    fields: FieldMap,
) -> Result<(), RemoteError> {
    db.update(&path.doc(id), fields).await.map_err(|e| {
        tracing::warn!("Remote update failed for {}/{}: {}", path, id, e);
        e
    })
}

/// Delete the remote record `id`.
pub async fn remove<D: DocumentDatabase>(
    db: &D,
    path: &CollectionPath,
    id: &str,
) -> Result<(), RemoteError> {
    db.delete(&path.doc(id)).await.map_err(|e| {
        tracing::warn!("Remote delete failed for {}/{}: {}", path, id, e);
        e
    })
}

// The sort is stable, so documents tied on creation time (and the
// unstamped tail) keep their backend order.
fn newest_first(a: &RemoteDocument, b: &RemoteDocument) -> Ordering {
    match (&a.created_at, &b.created_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn into_record(document: RemoteDocument) -> Record {
    let mut record = Record::new(document.id, document.fields);
    if let Some(timestamp) = document.created_at {
        record.created_at = Some(clock::canonical(timestamp));
    }
    if let Some(timestamp) = document.updated_at {
        record.updated_at = Some(clock::canonical(timestamp));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn doc(id: &str, created_ms: Option<i64>) -> RemoteDocument {
        RemoteDocument {
            id: id.to_string(),
            fields: FieldMap::new(),
            created_at: created_ms.map(|ms| Utc.timestamp_millis_opt(ms).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn into_record_folds_server_timestamps() {
        let mut fields = FieldMap::new();
        fields.insert("amount".to_string(), json!(42));
        let document = RemoteDocument {
            id: "e-1".to_string(),
            fields,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()),
            updated_at: None,
        };

        let record = into_record(document);
        assert_eq!(record.id, "e-1");
        assert_eq!(
            record.created_at.as_deref(),
            Some("2024-01-31T23:59:59.000Z")
        );
        assert_eq!(record.updated_at, None);
        assert_eq!(record.field("amount"), Some(&json!(42)));
    }

    #[test]
    fn into_record_hoists_patched_back_id_field() {
        let mut fields = FieldMap::new();
        fields.insert("id".to_string(), json!("e-1"));
        fields.insert("amount".to_string(), json!(7));
        let record = into_record(doc_with_fields("e-1", fields));

        assert_eq!(record.id, "e-1");
        assert!(record.field("id").is_none());
    }

    fn doc_with_fields(id: &str, fields: FieldMap) -> RemoteDocument {
        RemoteDocument {
            id: id.to_string(),
            fields,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn sort_order_is_newest_first_with_unstamped_last() {
        let mut documents = vec![
            doc("old", Some(1_000)),
            doc("unstamped-1", None),
            doc("new", Some(9_000)),
            doc("unstamped-2", None),
            doc("mid", Some(5_000)),
        ];

        documents.sort_by(newest_first);

        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old", "unstamped-1", "unstamped-2"]);
    }
}
