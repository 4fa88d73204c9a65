//! Integration tests for the file watcher
//!
//! These tests use temporary directories and real filesystem operations
//! to validate the watcher's behavior in realistic scenarios.

use std::path::{Path, PathBuf};
use std::time::Duration;
use stubwatch_core::ChangeBatch;
use stubwatch_watcher::{FileWatcher, WatcherConfig};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Helper to create a test file
async fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.unwrap();
    }
    tokio::fs::write(&path, content).await.unwrap();
    path
}

async fn start_watcher(dir: &TempDir) -> (FileWatcher, mpsc::Receiver<ChangeBatch>) {
    let config = WatcherConfig::builder().debounce_ms(100).build();
    let mut watcher = FileWatcher::new(config).unwrap();
    let batches = watcher.watch(dir.path()).await.unwrap();

    // Wait a bit for watcher to stabilize
    tokio::time::sleep(Duration::from_millis(100)).await;
    (watcher, batches)
}

/// Receive batches until `predicate` holds for the accumulated paths
async fn collect_until<F>(batches: &mut mpsc::Receiver<ChangeBatch>, predicate: F) -> Vec<ChangeBatch>
where
    F: Fn(&[ChangeBatch]) -> bool,
{
    let mut received = Vec::new();
    while !predicate(&received) {
        let batch = timeout(Duration::from_secs(3), batches.recv())
            .await
            .expect("timed out waiting for change batch")
            .expect("watcher channel closed");
        received.push(batch);
    }
    received
}

fn mentions(batches: &[ChangeBatch], path: &str) -> bool {
    batches
        .iter()
        .any(|batch| batch.all_paths().any(|p| p == Path::new(path)))
}

#[tokio::test]
async fn test_file_creation_detection() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut batches) = start_watcher(&temp_dir).await;

    create_test_file(&temp_dir, "user.rb", "class User; end").await;

    let received = collect_until(&mut batches, |b| mentions(b, "user.rb")).await;
    let last = received.last().unwrap();
    assert!(
        last.added.contains(&PathBuf::from("user.rb"))
            || last.modified.contains(&PathBuf::from("user.rb")),
        "unexpected batch {last:?}"
    );
}

#[tokio::test]
async fn test_paths_are_relative_to_root() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::create_dir_all(temp_dir.path().join("app/models"))
        .await
        .unwrap();
    let (_watcher, mut batches) = start_watcher(&temp_dir).await;

    create_test_file(&temp_dir, "app/models/order.rb", "class Order; end").await;

    let received = collect_until(&mut batches, |b| mentions(b, "app/models/order.rb")).await;
    for batch in &received {
        for path in batch.all_paths() {
            assert!(path.is_relative(), "absolute path in batch: {path:?}");
        }
    }
}

#[tokio::test]
async fn test_file_deletion_detection() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "schema.rb", "ActiveRecord::Schema").await;
    let (_watcher, mut batches) = start_watcher(&temp_dir).await;

    tokio::fs::remove_file(&file).await.unwrap();

    let received = collect_until(&mut batches, |b| {
        b.iter()
            .any(|batch| batch.removed.contains(&PathBuf::from("schema.rb")))
    })
    .await;
    assert!(!received.is_empty());
}

#[tokio::test]
async fn test_debouncing_groups_burst_into_one_batch() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut batches) = start_watcher(&temp_dir).await;

    for i in 0..5 {
        create_test_file(&temp_dir, &format!("model_{i}.rb"), "class M; end").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let received = collect_until(&mut batches, |b| {
        (0..5).all(|i| mentions(b, &format!("model_{i}.rb")))
    })
    .await;

    // Each file appears once per batch and the burst lands in very few batches
    for batch in &received {
        let mut paths: Vec<_> = batch.all_paths().collect();
        let before = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), before, "duplicate path in {batch:?}");
    }
    assert!(received.len() <= 2, "burst split into {} batches", received.len());
}

#[tokio::test]
async fn test_ignore_patterns() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut batches) = start_watcher(&temp_dir).await;

    create_test_file(&temp_dir, ".user.rb.swp", "swap").await;
    create_test_file(&temp_dir, "tmp/cache/entry", "cache").await;
    create_test_file(&temp_dir, "marker.rb", "class Marker; end").await;

    let received = collect_until(&mut batches, |b| mentions(b, "marker.rb")).await;
    assert!(!mentions(&received, ".user.rb.swp"));
    assert!(!mentions(&received, "tmp/cache/entry"));
}

#[tokio::test]
async fn test_stop_closes_channel() {
    let temp_dir = TempDir::new().unwrap();
    let (mut watcher, mut batches) = start_watcher(&temp_dir).await;

    watcher.stop().await.unwrap();

    // Pending timers hold senders until they fire; the channel closes after that
    let closed = timeout(Duration::from_secs(3), async {
        while batches.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
}
