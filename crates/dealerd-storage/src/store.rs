//! The `GameStore` trait and its implementations.
//!
//! Two stores are provided: [`JsonStore`] persists records as JSON
//! lines in an append-only file, and [`MemoryStore`] keeps them in a
//! vec for tests. Both serialize writes behind an internal
//! `tokio::sync::Mutex` — concurrent sessions can share one handle
//! without any external locking discipline.

use std::future::Future;
use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{GameRecord, RecordFilter, StorageError};

/// Persists finalized game records and answers queries over them.
///
/// `append` must be safe under concurrent calls from many session
/// tasks. `query` is read-only and used by the analytics side.
///
/// The methods are spelled as desugared `async fn` so the returned
/// futures are `Send` — session handlers run inside `tokio::spawn`,
/// which needs that bound on everything they await. Implementations
/// can still use plain `async fn`.
pub trait GameStore: Send + Sync + 'static {
    /// Appends one finalized record.
    fn append(
        &self,
        record: &GameRecord,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Returns every stored record matching `filter`, in append order.
    fn query(
        &self,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<Vec<GameRecord>, StorageError>> + Send;
}

/// A shared handle delegates to the store it wraps, so one store can
/// serve many session tasks.
impl<S: GameStore> GameStore for std::sync::Arc<S> {
    async fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        self.as_ref().append(record).await
    }

    async fn query(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<GameRecord>, StorageError> {
        self.as_ref().query(filter).await
    }
}

// ---------------------------------------------------------------------------
// JsonStore
// ---------------------------------------------------------------------------

/// A JSON-lines file store: one record per line, append-only.
///
/// The mutex guards the file across tasks; each append opens, writes
/// and flushes under the lock so interleaved sessions can never tear
/// each other's lines.
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    /// Creates a store backed by the file at `path`. The file is
    /// created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file's path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl GameStore for JsonStore {
    async fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::debug!(
            team = %record.team_name,
            rounds = record.rounds.len(),
            "game record persisted"
        );
        Ok(())
    }

    async fn query(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<GameRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            // No file yet means no games have been recorded.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let record: GameRecord = serde_json::from_str(line)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<GameRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored so far.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns `true` if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl GameStore for MemoryStore {
    async fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn query(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<GameRecord>, StorageError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}
