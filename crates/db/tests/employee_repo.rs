//! Integration tests for `EmployeeRepo` and `SqlRecordStore` against an
//! in-memory SQLite database with the real migrations applied.

use std::collections::HashSet;

use assert_matches::assert_matches;
use herald_core::error::CoreError;
use herald_core::record::NotificationStatus;
use herald_core::store::{PendingRecordSource, StatusTransition};
use herald_core::template::MessageTemplate;
use herald_core::types::RecordId;
use herald_db::repositories::EmployeeRepo;
use herald_db::{in_memory_pool, DbPool, SqlRecordStore};

async fn seed(pool: &DbPool) -> (i64, i64, i64, i64) {
    let null_flag = EmployeeRepo::create(pool, "0241111111", None).await.unwrap();
    let pending = EmployeeRepo::create(pool, "0242222222", Some(NotificationStatus::Pending))
        .await
        .unwrap();
    let sent = EmployeeRepo::create(pool, "0243333333", Some(NotificationStatus::Sent))
        .await
        .unwrap();
    let failed = EmployeeRepo::create(pool, "0244444444", Some(NotificationStatus::Failed))
        .await
        .unwrap();
    (null_flag, pending, sent, failed)
}

// ---------------------------------------------------------------------------
// Test: only NULL and 'N' rows are pending
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_pending_excludes_sent_and_failed() {
    let pool = in_memory_pool().await.unwrap();
    let (null_flag, pending, _, _) = seed(&pool).await;

    let ids: HashSet<i64> = EmployeeRepo::list_pending(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.employee_id)
        .collect();

    assert_eq!(ids, HashSet::from([null_flag, pending]));
}

// ---------------------------------------------------------------------------
// Test: the conditional update wins exactly once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_status_only_changes_matching_rows() {
    let pool = in_memory_pool().await.unwrap();
    let (null_flag, _, sent, _) = seed(&pool).await;

    let first = EmployeeRepo::update_status(
        &pool,
        null_flag,
        NotificationStatus::Pending,
        NotificationStatus::Sent,
    )
    .await
    .unwrap();
    let second = EmployeeRepo::update_status(
        &pool,
        null_flag,
        NotificationStatus::Pending,
        NotificationStatus::Sent,
    )
    .await
    .unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 0);

    // Already-sent rows are never matched as pending.
    let untouched = EmployeeRepo::update_status(
        &pool,
        sent,
        NotificationStatus::Pending,
        NotificationStatus::Sent,
    )
    .await
    .unwrap();
    assert_eq!(untouched, 0);

    let row = EmployeeRepo::find_by_id(&pool, null_flag).await.unwrap().unwrap();
    assert_eq!(row.status().unwrap(), NotificationStatus::Sent);
}

#[tokio::test]
async fn update_status_on_missing_row_affects_nothing() {
    let pool = in_memory_pool().await.unwrap();
    let affected = EmployeeRepo::update_status(
        &pool,
        9_999,
        NotificationStatus::Pending,
        NotificationStatus::Sent,
    )
    .await
    .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn count_with_status_treats_null_as_pending() {
    let pool = in_memory_pool().await.unwrap();
    seed(&pool).await;

    assert_eq!(
        EmployeeRepo::count_with_status(&pool, NotificationStatus::Pending)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        EmployeeRepo::count_with_status(&pool, NotificationStatus::Sent)
            .await
            .unwrap(),
        1
    );
}

// ---------------------------------------------------------------------------
// Test: SqlRecordStore renders records and enforces forward-only transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_store_fetches_pending_records_with_rendered_bodies() {
    let pool = in_memory_pool().await.unwrap();
    let (null_flag, pending, _, _) = seed(&pool).await;
    let store = SqlRecordStore::new(pool, MessageTemplate::new("Hi {phone} ({id})").unwrap());

    let records = store.fetch_pending().await.unwrap();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.status, NotificationStatus::Pending);
        assert_eq!(
            record.message_body,
            format!("Hi {} ({})", record.destination_address, record.id)
        );
    }
    let ids: HashSet<RecordId> = records.iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        HashSet::from([RecordId::new(null_flag), RecordId::new(pending)])
    );
}

#[tokio::test]
async fn record_store_refuses_backward_transitions() {
    let pool = in_memory_pool().await.unwrap();
    let (_, _, sent, _) = seed(&pool).await;
    let store = SqlRecordStore::new(pool.clone(), MessageTemplate::default());

    let result = store
        .transition_status(
            RecordId::new(sent),
            NotificationStatus::Sent,
            NotificationStatus::Pending,
        )
        .await;
    assert_matches!(result, Err(CoreError::InvalidTransition { .. }));

    let row = EmployeeRepo::find_by_id(&pool, sent).await.unwrap().unwrap();
    assert_eq!(row.status().unwrap(), NotificationStatus::Sent);
}

#[tokio::test]
async fn record_store_reports_unavailable_when_pool_is_closed() {
    let pool = in_memory_pool().await.unwrap();
    let store = SqlRecordStore::new(pool.clone(), MessageTemplate::default());
    pool.close().await;

    assert_matches!(
        store.fetch_pending().await,
        Err(CoreError::StoreUnavailable(_))
    );
}
