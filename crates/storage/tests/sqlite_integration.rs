use chrono::Duration;
use quiz_core::model::ProgressLedger;
use quiz_core::time::fixed_now;
use storage::repository::{ProgressRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_fresh_store_reports_not_found() {
    let repo = connect("memdb_fresh").await;
    assert!(matches!(
        repo.load_ledger().await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_entries_and_clicks() {
    let repo = connect("memdb_roundtrip").await;
    let day = fixed_now().date_naive();

    let mut ledger = ProgressLedger::new();
    ledger.append(0.6, 300.0, Some(30.0), day).unwrap();
    ledger.append(0.9, 240.5, None, day).unwrap();
    ledger.record_registration_click(fixed_now());
    repo.save_ledger(&ledger).await.unwrap();

    let loaded = repo.load_ledger().await.unwrap();
    assert_eq!(loaded, ledger);
}

#[tokio::test]
async fn sqlite_appends_only_new_attempts() {
    let repo = connect("memdb_append_only").await;
    let day = fixed_now().date_naive();

    let mut ledger = ProgressLedger::new();
    ledger.append(0.5, 60.0, None, day).unwrap();
    repo.save_ledger(&ledger).await.unwrap();

    ledger
        .append(0.7, 50.0, None, day + Duration::days(1))
        .unwrap();
    repo.save_ledger(&ledger).await.unwrap();
    // Saving the same ledger again is a no-op for entries.
    repo.save_ledger(&ledger).await.unwrap();

    let loaded = repo.load_ledger().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.entries()[1].date(), day + Duration::days(1));
}

#[tokio::test]
async fn sqlite_rejects_stale_ledger() {
    let repo = connect("memdb_stale").await;
    let day = fixed_now().date_naive();

    let mut ahead = ProgressLedger::new();
    ahead.append(0.5, 60.0, None, day).unwrap();
    ahead.append(0.5, 60.0, None, day).unwrap();
    repo.save_ledger(&ahead).await.unwrap();

    let mut stale = ProgressLedger::new();
    stale.append(1.0, 10.0, None, day).unwrap();
    let err = repo.save_ledger(&stale).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let loaded = repo.load_ledger().await.unwrap();
    assert_eq!(loaded, ahead);
}

#[tokio::test]
async fn storage_sqlite_wires_progress_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    let mut ledger = ProgressLedger::new();
    ledger.record_registration_click(fixed_now());
    storage.progress.save_ledger(&ledger).await.unwrap();

    let loaded = storage.progress.load_ledger().await.unwrap();
    assert_eq!(loaded.registration_clicks(), 1);
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn second_writer_of_same_attempt_gets_conflict() {
    let url = "sqlite:file:memdb_two_writers?mode=memory&cache=shared";
    let first = SqliteRepository::connect(url).await.expect("connect");
    first.migrate().await.expect("migrate");
    let second = SqliteRepository::connect(url).await.expect("connect");
    let day = fixed_now().date_naive();

    // Both start from the same (empty) store.
    assert!(matches!(first.load_ledger().await, Err(StorageError::NotFound)));
    assert!(matches!(second.load_ledger().await, Err(StorageError::NotFound)));

    let mut a = ProgressLedger::new();
    a.append(0.2, 30.0, None, day).unwrap();
    let mut b = ProgressLedger::new();
    b.append(1.0, 20.0, None, day).unwrap();

    first.save_ledger(&a).await.unwrap();
    let err = second.save_ledger(&b).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let stored = second.load_ledger().await.unwrap();
    assert_eq!(stored, a);

    // After reloading, the second writer appends on top.
    let mut rebased = stored;
    rebased.append(1.0, 20.0, None, day).unwrap();
    second.save_ledger(&rebased).await.unwrap();
    assert_eq!(first.load_ledger().await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_registration_clicks_add_up() {
    let url = "sqlite:file:memdb_two_clickers?mode=memory&cache=shared";
    let first = SqliteRepository::connect(url).await.expect("connect");
    first.migrate().await.expect("migrate");
    let second = SqliteRepository::connect(url).await.expect("connect");

    let mut seed = ProgressLedger::new();
    for _ in 0..5 {
        seed.record_registration_click(fixed_now());
    }
    first.save_ledger(&seed).await.unwrap();

    let mut a = first.load_ledger().await.unwrap();
    let mut b = second.load_ledger().await.unwrap();
    assert_eq!(a.record_registration_click(fixed_now()), 6);
    let later = fixed_now() + Duration::seconds(30);
    assert_eq!(b.record_registration_click(later), 6);

    first.save_ledger(&a).await.unwrap();
    second.save_ledger(&b).await.unwrap();

    let stored = first.load_ledger().await.unwrap();
    assert_eq!(stored.registration_clicks(), 7);
    assert_eq!(stored.last_registration_click(), Some(later));
}

#[tokio::test]
async fn plain_memory_url_keeps_its_schema() {
    let storage = Storage::sqlite("sqlite::memory:").await.expect("storage");
    let day = fixed_now().date_naive();

    let mut ledger = ProgressLedger::new();
    ledger.append(0.4, 90.0, Some(18.0), day).unwrap();
    storage.progress.save_ledger(&ledger).await.unwrap();
    storage.progress.save_ledger(&ledger).await.unwrap();

    assert_eq!(storage.progress.load_ledger().await.unwrap(), ledger);
}
