use std::sync::Arc;

use quiz_core::history::{HISTORY_CAP, assign_unique_id, prepend_capped};
use quiz_core::model::{Attempt, AttemptId};

use crate::codec::{decode_attempts, encode_attempts};
use crate::repository::{BlobStore, StorageError};

/// Key the history blob is stored under unless configured otherwise.
pub const DEFAULT_HISTORY_KEY: &str = "quiz_mcq_history_v2";

/// Append-only, capped list of past attempts stored as one blob.
///
/// The list is kept newest-insert-first: `append` puts the new attempt at the
/// front and truncates the tail to the cap.
#[derive(Clone)]
pub struct HistoryStore {
    blobs: Arc<dyn BlobStore>,
    key: String,
    cap: usize,
}

impl HistoryStore {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            key: DEFAULT_HISTORY_KEY.to_owned(),
            cap: HISTORY_CAP,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Override the retention cap. A cap of zero is raised to one.
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored attempts, newest-insert-first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be read or is corrupted.
    pub async fn list(&self) -> Result<Vec<Attempt>, StorageError> {
        let blob = self.blobs.read_blob(&self.key).await?;
        decode_attempts(blob.as_deref())
    }

    /// Insert `attempt` at the front and persist the capped list.
    ///
    /// Returns the stored copy, whose id is suffixed if another stored attempt
    /// already used it. An unreadable or corrupted existing list is replaced
    /// rather than blocking the write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated list cannot be encoded or written.
    pub async fn append(&self, attempt: &Attempt) -> Result<Attempt, StorageError> {
        let existing = match self.list().await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "discarding unreadable history");
                Vec::new()
            }
        };
        let stored = assign_unique_id(&existing, attempt.clone());
        if stored.id() != attempt.id() {
            tracing::debug!(requested = %attempt.id(), assigned = %stored.id(), "attempt id already taken");
        }
        let updated = prepend_capped(existing, stored.clone(), self.cap);
        let blob = encode_attempts(&updated)?;
        self.blobs.write_blob(&self.key, &blob).await?;
        tracing::debug!(key = %self.key, len = updated.len(), "history written");
        Ok(stored)
    }

    /// Fetch one attempt by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no attempt has that id, or other
    /// storage errors from `list`.
    pub async fn get(&self, id: &AttemptId) -> Result<Attempt, StorageError> {
        self.list()
            .await?
            .into_iter()
            .find(|a| a.id() == id)
            .ok_or(StorageError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use chrono::Duration;
    use quiz_core::model::{ChapterFilter, Mode, Question};
    use quiz_core::time::fixed_now;

    fn attempt(offset_ms: i64) -> Attempt {
        Attempt::record(
            fixed_now() + Duration::milliseconds(offset_ms),
            Mode::Practice,
            &ChapterFilter::All,
            &[Question::new("Q", ["a", "b"], "a")],
            vec![Some("a".into())],
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn keeps_most_recent_fifty_newest_first() {
        let store = HistoryStore::new(Arc::new(InMemoryRepository::new()));
        for i in 0..57 {
            store.append(&attempt(i)).await.unwrap();
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 50);
        let offsets: Vec<i64> = listed
            .iter()
            .map(|a| (a.timestamp() - fixed_now()).num_milliseconds())
            .collect();
        let expected: Vec<i64> = (7..57).rev().collect();
        assert_eq!(offsets, expected);
    }

    #[tokio::test]
    async fn same_millisecond_appends_keep_distinct_ids() {
        let store = HistoryStore::new(Arc::new(InMemoryRepository::new()));
        let first = store.append(&attempt(0)).await.unwrap();
        let second = store.append(&attempt(0)).await.unwrap();

        assert_eq!(first.id().as_str(), "attempt_1700000000000");
        assert_eq!(second.id().as_str(), "attempt_1700000000000_2");
        assert_eq!(store.get(first.id()).await.unwrap(), first);
        assert_eq!(store.get(second.id()).await.unwrap(), second);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn append_replaces_corrupted_blob() {
        let repo = InMemoryRepository::new();
        repo.write_blob(DEFAULT_HISTORY_KEY, "{oops").await.unwrap();
        let store = HistoryStore::new(Arc::new(repo));

        assert!(store.list().await.is_err());
        store.append(&attempt(0)).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_finds_by_id_and_keys_are_isolated() {
        let repo: Arc<dyn BlobStore> = Arc::new(InMemoryRepository::new());
        let store = HistoryStore::new(Arc::clone(&repo));
        let other = HistoryStore::new(repo).with_key("other");
        let first = attempt(1);
        store.append(&first).await.unwrap();

        assert_eq!(store.get(first.id()).await.unwrap(), first);
        assert!(matches!(
            other.get(first.id()).await,
            Err(StorageError::NotFound)
        ));
    }
}
