//! Integration tests for the migration utilities.
//!
//! The legacy layout is seeded directly into the in-memory database; the
//! runs copy into the current layout and the checks read both.

use serde_json::{json, Value};
use upsen_core::{Collection, CollectionPath, FieldMap, Record, TenantId};
use upsen_sync::{local, migrate, DocumentDatabase, MemoryDatabase, MemoryStore, RemoteDocument};

fn fields(pairs: &[(&str, Value)]) -> FieldMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn tenant() -> TenantId {
    TenantId::new("c-1")
}

fn legacy_path(collection: Collection) -> CollectionPath {
    CollectionPath::legacy(tenant(), collection)
}

fn current_path(collection: Collection) -> CollectionPath {
    CollectionPath::current(tenant(), collection)
}

async fn fetch_current(db: &MemoryDatabase, collection: Collection) -> Vec<RemoteDocument> {
    db.fetch_all(&current_path(collection)).await.unwrap()
}

// ============================================================================
// Legacy migration
// ============================================================================

#[tokio::test]
async fn migrates_every_legacy_document_and_keeps_the_source() {
    let db = MemoryDatabase::new();
    for i in 0..3i64 {
        db.seed(
            &legacy_path(Collection::Expenses),
            format!("e-{}", i),
            fields(&[("amount", json!(i * 10))]),
            1_000 * (i + 1),
        );
    }

    let report = migrate::migrate_legacy(&db, &tenant()).await;

    assert!(report.is_complete());
    assert_eq!(report.migrated(), 3);
    let expenses = &report.collections[0];
    assert_eq!(expenses.collection, Collection::Expenses);
    assert_eq!(expenses.migrated, 3);
    assert_eq!(expenses.total, 3);

    // Copy, not move: both layouts now hold the documents.
    assert_eq!(db.len(&current_path(Collection::Expenses)), 3);
    assert_eq!(db.len(&legacy_path(Collection::Expenses)), 3);

    // Untouched collections report zero out of zero.
    let budgets = &report.collections[3];
    assert_eq!(budgets.collection, Collection::Budgets);
    assert_eq!(budgets.migrated, 0);
    assert_eq!(budgets.total, 0);
    assert!(budgets.error.is_none());
}

#[tokio::test]
async fn migration_stamps_provenance_fields() {
    let db = MemoryDatabase::new();
    db.seed(
        &legacy_path(Collection::InvoicesIssued),
        "inv-1",
        fields(&[("amount", json!(250)), ("client", json!("ACME"))]),
        1_706_745_600_000,
    );

    migrate::migrate_legacy(&db, &tenant()).await;

    let docs = fetch_current(&db, Collection::InvoicesIssued).await;
    assert_eq!(docs.len(), 1);
    let copied = &docs[0];
    assert_eq!(copied.id, "inv-1"); // id preserved
    assert_eq!(copied.fields["amount"], json!(250));
    assert_eq!(copied.fields["client"], json!("ACME"));
    assert_eq!(
        copied.fields["originalCreatedAt"],
        json!("2024-02-01T00:00:00.000Z")
    );
    assert_eq!(copied.fields["userId"], json!("c-1"));
    assert!(copied.fields.contains_key("migratedAt"));
}

#[tokio::test]
async fn rerunning_migration_copies_nothing_new() {
    let db = MemoryDatabase::new();
    for i in 0..4i64 {
        db.seed(
            &legacy_path(Collection::Budgets),
            format!("b-{}", i),
            fields(&[("amount", json!(i))]),
            1_000 * (i + 1),
        );
    }

    let first = migrate::migrate_legacy(&db, &tenant()).await;
    let second = migrate::migrate_legacy(&db, &tenant()).await;

    assert_eq!(first.migrated(), 4);
    assert_eq!(second.migrated(), 0);
    assert!(second.is_complete());
    assert_eq!(second.collections[3].total, 4); // source still counted
    assert_eq!(db.len(&current_path(Collection::Budgets)), 4);
}

#[tokio::test]
async fn partially_migrated_collection_gets_only_the_missing_documents() {
    let db = MemoryDatabase::new();
    db.seed(
        &legacy_path(Collection::Expenses),
        "e-1",
        fields(&[("amount", json!(1))]),
        1_000,
    );
    db.seed(
        &legacy_path(Collection::Expenses),
        "e-2",
        fields(&[("amount", json!(2))]),
        2_000,
    );
    // e-1 already made it across in an interrupted earlier run.
    db.seed(
        &current_path(Collection::Expenses),
        "e-1",
        fields(&[("amount", json!(1))]),
        5_000,
    );

    let report = migrate::migrate_legacy(&db, &tenant()).await;

    assert_eq!(report.collections[0].migrated, 1);
    assert_eq!(report.collections[0].total, 2);
    assert_eq!(db.len(&current_path(Collection::Expenses)), 2);
}

#[tokio::test]
async fn one_collection_failing_leaves_the_others_alone() {
    let db = MemoryDatabase::new();
    db.seed(
        &legacy_path(Collection::Expenses),
        "e-1",
        fields(&[("amount", json!(1))]),
        1_000,
    );
    // Reads work, writes are denied: only collections with something to
    // copy fail.
    db.set_read_only(true);

    let report = migrate::migrate_legacy(&db, &tenant()).await;

    assert!(!report.is_complete());
    let expenses = &report.collections[0];
    assert!(expenses.error.as_deref().unwrap().contains("permission denied"));
    assert_eq!(expenses.migrated, 0);
    assert_eq!(expenses.total, 1);

    // Nothing landed, and the empty collections still completed.
    assert_eq!(db.len(&current_path(Collection::Expenses)), 0);
    assert!(report.collections[1..].iter().all(|c| c.error.is_none()));
}

#[tokio::test]
async fn unreachable_database_fails_every_collection_without_panicking() {
    let db = MemoryDatabase::new();
    db.set_available(false);

    let report = migrate::migrate_legacy(&db, &tenant()).await;

    assert!(!report.is_complete());
    assert_eq!(report.migrated(), 0);
    assert_eq!(report.collections.len(), 4);
    assert!(report.collections.iter().all(|c| c.error.is_some()));
}

// ============================================================================
// Migration check
// ============================================================================

#[tokio::test]
async fn check_reports_need_per_collection() {
    let db = MemoryDatabase::new();
    db.seed(
        &legacy_path(Collection::Expenses),
        "e-1",
        fields(&[("amount", json!(1))]),
        1_000,
    );
    db.seed(
        &current_path(Collection::Budgets),
        "b-1",
        fields(&[("amount", json!(2))]),
        1_000,
    );

    let statuses = migrate::check_migration(&db, &tenant()).await;
    assert_eq!(statuses.len(), 4);

    let expenses = &statuses[0];
    assert_eq!(expenses.legacy_count, 1);
    assert_eq!(expenses.current_count, 0);
    assert!(expenses.needs_migration);

    // Data already in the current layout means no migration need.
    let budgets = &statuses[3];
    assert_eq!(budgets.legacy_count, 0);
    assert_eq!(budgets.current_count, 1);
    assert!(!budgets.needs_migration);
}

#[tokio::test]
async fn check_after_migration_reports_done() {
    let db = MemoryDatabase::new();
    db.seed(
        &legacy_path(Collection::Expenses),
        "e-1",
        fields(&[("amount", json!(1))]),
        1_000,
    );

    migrate::migrate_legacy(&db, &tenant()).await;
    let statuses = migrate::check_migration(&db, &tenant()).await;

    assert!(statuses.iter().all(|s| !s.needs_migration));
}

#[tokio::test]
async fn check_treats_unreachable_paths_as_empty() {
    let db = MemoryDatabase::new();
    db.set_available(false);

    let statuses = migrate::check_migration(&db, &tenant()).await;
    assert!(statuses
        .iter()
        .all(|s| s.legacy_count == 0 && s.current_count == 0 && !s.needs_migration));
}

// ============================================================================
// Local push
// ============================================================================

#[tokio::test]
async fn push_uploads_only_records_the_remote_is_missing() {
    let kv = MemoryStore::new();
    let db = MemoryDatabase::new();

    // One record is already remote, one was created offline.
    db.seed(
        &current_path(Collection::Expenses),
        "e-remote",
        fields(&[("amount", json!(1))]),
        1_000,
    );
    let mut offline = Record::new(
        "local-1706745600000-ab12cd34",
        fields(&[("amount", json!(2))]),
    );
    offline.stamp_created("2024-02-01T00:00:00.000Z");
    let already_synced = Record::new("e-remote", fields(&[("amount", json!(1))]));
    local::write_all(
        &kv,
        Collection::Expenses,
        &tenant(),
        &[offline, already_synced],
    );

    let report = migrate::push_local(&kv, &db, &tenant()).await;

    assert!(report.is_complete());
    assert_eq!(report.migrated(), 1);
    assert_eq!(report.collections[0].total, 2);

    let docs = fetch_current(&db, Collection::Expenses).await;
    assert_eq!(docs.len(), 2);
    let pushed = docs
        .iter()
        .find(|d| d.id == "local-1706745600000-ab12cd34")
        .unwrap();
    assert_eq!(pushed.fields["amount"], json!(2));
    assert_eq!(pushed.fields["userId"], json!("c-1"));
    assert_eq!(
        pushed.fields["originalCreatedAt"],
        json!("2024-02-01T00:00:00.000Z")
    );
    assert!(pushed.fields.contains_key("migratedAt"));
}

#[tokio::test]
async fn push_leaves_the_local_cache_untouched() {
    let kv = MemoryStore::new();
    let db = MemoryDatabase::new();
    let record = Record::new("local-1-aa", fields(&[("amount", json!(9))]));
    local::write_all(&kv, Collection::Budgets, &tenant(), &[record.clone()]);

    migrate::push_local(&kv, &db, &tenant()).await;

    let cached = local::read(&kv, Collection::Budgets, &tenant());
    assert_eq!(cached, vec![record]);
}

#[tokio::test]
async fn push_with_empty_caches_does_nothing() {
    let kv = MemoryStore::new();
    let db = MemoryDatabase::new();

    let report = migrate::push_local(&kv, &db, &tenant()).await;

    assert!(report.is_complete());
    assert_eq!(report.migrated(), 0);
    for collection in Collection::ALL {
        assert_eq!(db.len(&current_path(collection)), 0);
    }
}

#[tokio::test]
async fn push_failure_reports_but_keeps_the_cache() {
    let kv = MemoryStore::new();
    let db = MemoryDatabase::new();
    let record = Record::new("local-1-aa", fields(&[("amount", json!(9))]));
    local::write_all(&kv, Collection::Expenses, &tenant(), &[record.clone()]);
    db.set_read_only(true);

    let report = migrate::push_local(&kv, &db, &tenant()).await;

    assert!(!report.is_complete());
    assert_eq!(report.collections[0].migrated, 0);
    assert_eq!(local::read(&kv, Collection::Expenses, &tenant()), vec![record]);
}
