use super::*;
use crawl_core::test_support::{new_reference, seed_reference};
use crawl_core::ReferenceState;
use tempfile::tempdir;

#[test]
fn fresh_open_reports_not_resuming() {
    let dir = tempdir().unwrap();
    let (store, resuming) = CrawlStore::open(dir.path(), true).unwrap();
    assert!(!resuming);
    assert!(store.is_queue_empty());
    assert!(store.is_cache_empty());
}

#[test]
fn queue_then_dequeue_moves_reference_to_active() {
    let dir = tempdir().unwrap();
    let (store, _) = CrawlStore::open(dir.path(), false).unwrap();

    store.queue(seed_reference("https://a")).unwrap();
    assert_eq!(store.queued_count(), 1);

    let dequeued = store.next_queued().unwrap().unwrap();
    assert_eq!(dequeued.reference, "https://a");
    assert_eq!(store.queued_count(), 0);
    assert_eq!(store.active_count(), 1);
}

#[test]
fn processed_reference_clears_active_and_populates_cache() {
    let dir = tempdir().unwrap();
    let (store, _) = CrawlStore::open(dir.path(), false).unwrap();

    store.queue(seed_reference("https://a")).unwrap();
    store.next_queued().unwrap();

    let mut processed = new_reference("https://a");
    processed.state = Some(ReferenceState::New);
    store.processed(processed).unwrap();

    assert_eq!(store.active_count(), 0);
    assert_eq!(store.processed_count(), 1);
    assert!(store.get_cached("https://a").is_none(), "cache is populated on reopen, not on processed()");
}

#[test]
fn reopening_without_resume_carries_good_state_into_cache() {
    let dir = tempdir().unwrap();
    {
        let (store, _) = CrawlStore::open(dir.path(), false).unwrap();
        store.queue(seed_reference("https://a")).unwrap();
        store.next_queued().unwrap();
        let mut processed = new_reference("https://a");
        processed.state = Some(ReferenceState::New);
        store.processed(processed).unwrap();
        store.close().unwrap();
    }

    let (store, resuming) = CrawlStore::open(dir.path(), false).unwrap();
    assert!(!resuming);
    assert!(store.get_cached("https://a").is_some());
    assert_eq!(store.processed_count(), 0, "fresh start drains processed_valid into cached");
}

#[test]
fn reopening_with_resume_requeues_abandoned_active_work() {
    let dir = tempdir().unwrap();
    {
        let (store, _) = CrawlStore::open(dir.path(), false).unwrap();
        store.queue(seed_reference("https://a")).unwrap();
        store.next_queued().unwrap();
        // crash: never call processed() or close()
    }

    let (store, resuming) = CrawlStore::open(dir.path(), true).unwrap();
    assert!(resuming);
    assert_eq!(store.queued_count(), 1);
    assert_eq!(store.active_count(), 0);
}

#[test]
fn resume_requested_but_no_prior_state_is_not_resuming() {
    let dir = tempdir().unwrap();
    let (_store, resuming) = CrawlStore::open(dir.path(), true).unwrap();
    assert!(!resuming);
}

#[test]
fn export_then_import_round_trips_cached_entries() {
    let dir = tempdir().unwrap();
    let export_path = dir.path().join("export.json");
    {
        let (store, _) = CrawlStore::open(dir.path(), false).unwrap();
        store.queue(seed_reference("https://a")).unwrap();
        store.next_queued().unwrap();
        let mut processed = new_reference("https://a");
        processed.state = Some(ReferenceState::New);
        store.processed(processed).unwrap();
        store.export_to(&export_path).unwrap();
    }

    let restore_dir = tempdir().unwrap();
    import_store(restore_dir.path(), &export_path).unwrap();

    // Resume (rather than fresh-start) so the imported processed_valid
    // entry is preserved as-is rather than drained into cached.
    let (store, _) = CrawlStore::open(restore_dir.path(), true).unwrap();
    assert_eq!(store.processed_count(), 1);
}

#[test]
fn checkpoint_triggers_after_enough_mutating_events() {
    let dir = tempdir().unwrap();
    let (store, _) = CrawlStore::open(dir.path(), false).unwrap();

    for i in 0..(CHECKPOINT_EVERY as usize + 5) {
        store.queue(seed_reference(&format!("https://a/{i}"))).unwrap();
    }
    // Give a background checkpoint a chance to be reaped on a later mutation.
    store.queue(seed_reference("https://trigger-reap")).unwrap();
    store.close().unwrap();

    let checkpoint_path = dir.path().join("checkpoint.snap.zst");
    assert!(checkpoint_path.exists());
}
