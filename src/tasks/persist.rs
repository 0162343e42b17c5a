//! Persistence Task
//!
//! Background task that periodically writes the name store to disk.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::store::NameStore;

/// How long shutdown waits for the task before aborting it
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the running persistence task.
///
/// Dropping the handle without calling [`PersistenceWorker::shutdown`] signals
/// the task to stop but skips the final flush.
#[derive(Debug)]
pub struct PersistenceWorker {
    store: Arc<NameStore>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PersistenceWorker {
    /// Stops the task and performs the final flush.
    ///
    /// The task gets [`SHUTDOWN_TIMEOUT`] to exit before it is aborted. The
    /// store is closed afterwards, so later `add` calls are rejected.
    /// Returns whether the final flush wrote the file.
    pub async fn shutdown(self) -> Result<bool, StoreError> {
        let _ = self.shutdown_tx.send(true);

        let mut handle = self.handle;
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle).await {
            Ok(Ok(())) => debug!("Persistence task stopped"),
            Ok(Err(err)) => warn!("Persistence task ended abnormally: {}", err),
            Err(_) => {
                warn!(
                    "Persistence task did not stop within {:?}, aborting",
                    SHUTDOWN_TIMEOUT
                );
                handle.abort();
            }
        }

        let store = self.store;
        let written = tokio::task::spawn_blocking(move || store.close())
            .await
            .map_err(|err| StoreError::Io(std::io::Error::other(err)))??;
        if written {
            info!("Final flush completed");
        }
        Ok(written)
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that flushes the store whenever it is dirty.
///
/// The task wakes every `period`, checks the dirty flag and, if set, runs
/// [`NameStore::flush`] on the blocking pool. A failed flush is logged and
/// left for the next tick; there is no retry limit or backoff.
///
/// # Arguments
/// * `store` - Shared name store
/// * `period` - Time between checks
///
/// # Returns
/// A [`PersistenceWorker`] used to stop the task during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(NameStore::load("names.json"));
/// let worker = spawn_persistence_task(store.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// worker.shutdown().await?;
/// ```
pub fn spawn_persistence_task(store: Arc<NameStore>, period: Duration) -> PersistenceWorker {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let task_store = Arc::clone(&store);

    let handle = tokio::spawn(async move {
        info!("Auto-save task started (interval: {:?})", period);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so the first check
        // happens one full period after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    flush_if_dirty(&task_store).await;
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Auto-save task shutting down");
                        break;
                    }
                }
            }
        }
    });

    PersistenceWorker {
        store,
        shutdown_tx,
        handle,
    }
}

async fn flush_if_dirty(store: &Arc<NameStore>) {
    if !store.is_dirty() {
        debug!("Auto-save: no changes to persist");
        return;
    }

    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.flush()).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => error!("Auto-save failed, will retry next interval: {}", err),
        Err(err) => error!("Auto-save flush panicked: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NameRecord;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn test_store() -> (Arc<NameStore>, TempDir) {
        let dir = TempDir::new().expect("TempDir creation should succeed");
        let store = Arc::new(NameStore::load(dir.path().join("names.json")));
        (store, dir)
    }

    fn record() -> NameRecord {
        NameRecord::new("Padraig", "Walsh", "Padraig Walsh", "10.0.0.1")
    }

    #[tokio::test]
    async fn test_task_flushes_dirty_store() {
        let (store, _dir) = test_store();
        store.add(record()).unwrap();

        let worker = spawn_persistence_task(store.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;

        assert!(!store.is_dirty(), "Dirty store should have been flushed");
        assert!(store.path().exists());
        assert_eq!(store.stats().flushes, 1);

        worker.shutdown().await.unwrap();
    }

    async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    #[tokio::test]
    async fn test_task_retries_failed_flush() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes every flush fail
        let path = dir.path().join("names.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), "x").unwrap();

        let store = Arc::new(NameStore::load(&path));
        store.add(record()).unwrap();
        let worker = spawn_persistence_task(store.clone(), Duration::from_millis(50));

        assert!(
            wait_for(Duration::from_secs(2), || store.stats().failed_flushes >= 1).await,
            "Worker should have attempted a flush"
        );
        assert!(store.is_dirty(), "Failed flush must leave the store dirty");
        assert_eq!(store.stats().flushes, 0);

        fs::remove_dir_all(&path).unwrap();

        assert!(
            wait_for(Duration::from_secs(2), || !store.is_dirty()).await,
            "A later tick should flush once the path is writable"
        );
        assert_eq!(store.stats().flushes, 1);
        assert_eq!(NameStore::load(&path).count(), 1);

        worker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_task_skips_clean_store() {
        let (store, _dir) = test_store();

        let worker = spawn_persistence_task(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!store.path().exists(), "Clean store should not be written");
        assert_eq!(store.stats().flushes, 0);

        worker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_is_prompt() {
        let (store, _dir) = test_store();
        let worker = spawn_persistence_task(store, Duration::from_secs(300));

        let started = Instant::now();
        worker.shutdown().await.unwrap();

        assert!(
            started.elapsed() < Duration::from_secs(1),
            "Shutdown should not wait out the interval"
        );
    }

    #[tokio::test]
    async fn test_shutdown_performs_final_flush() {
        let (store, _dir) = test_store();
        let worker = spawn_persistence_task(store.clone(), Duration::from_secs(300));

        store.add(record()).unwrap();
        let written = worker.shutdown().await.unwrap();

        assert!(written);
        assert!(!store.is_dirty());
        let reloaded = NameStore::load(store.path());
        assert_eq!(reloaded.count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_clean_store_writes_nothing() {
        let (store, _dir) = test_store();
        let worker = spawn_persistence_task(store.clone(), Duration::from_secs(300));

        assert!(!worker.shutdown().await.unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_task_exits_after_signal() {
        let (store, _dir) = test_store();
        let worker = spawn_persistence_task(store.clone(), Duration::from_secs(300));
        assert!(!worker.is_finished());

        let _ = worker.shutdown_tx.send(true);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(worker.is_finished(), "Task should exit after shutdown signal");
    }
}
