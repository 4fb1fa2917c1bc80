use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::analytics::{ChapterStats, aggregate_by_chapter};
use quiz_core::history::{HistorySort, sort_attempts};
use quiz_core::model::{Attempt, AttemptId, Mode};
use storage::HistoryStore;
use storage::repository::{BlobStore, InMemoryRepository, StorageError};

/// Presentation-agnostic list item for a past attempt.
///
/// No pre-formatted strings; the UI formats timestamps and durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    pub chapter: String,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    pub duration_sec: Option<u32>,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            id: attempt.id().clone(),
            timestamp: attempt.timestamp(),
            mode: attempt.mode(),
            chapter: attempt.chapter().to_owned(),
            score: attempt.score(),
            total: attempt.total(),
            percent: attempt.percent(),
            duration_sec: attempt.duration_sec(),
        }
    }
}

/// Best-effort facade over the history store.
///
/// History never blocks quiz-taking: read failures come back as an empty list
/// and write failures are logged and reported as `None`.
#[derive(Clone)]
pub struct HistoryService {
    store: HistoryStore,
}

impl HistoryService {
    #[must_use]
    pub fn new(store: HistoryStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn from_blobs(blobs: Arc<dyn BlobStore>) -> Self {
        Self::new(HistoryStore::new(blobs))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_blobs(Arc::new(InMemoryRepository::new()))
    }

    /// Persist a finished attempt. Returns the stored copy, or `None` if the
    /// write failed.
    pub async fn record(&self, attempt: &Attempt) -> Option<Attempt> {
        match self.store.append(attempt).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::warn!(id = %attempt.id(), error = %err, "could not save attempt");
                None
            }
        }
    }

    /// Stored attempts, newest-insert-first, or an empty list if unreadable.
    pub async fn list(&self) -> Vec<Attempt> {
        match self.store.list().await {
            Ok(attempts) => attempts,
            Err(err) => {
                tracing::warn!(key = self.store.key(), error = %err, "history unavailable");
                Vec::new()
            }
        }
    }

    pub async fn list_sorted(&self, order: HistorySort) -> Vec<Attempt> {
        sort_attempts(&self.list().await, order)
    }

    pub async fn list_items(&self, order: HistorySort) -> Vec<AttemptListItem> {
        self.list_sorted(order)
            .await
            .iter()
            .map(AttemptListItem::from_attempt)
            .collect()
    }

    pub async fn get(&self, id: &AttemptId) -> Option<Attempt> {
        match self.store.get(id).await {
            Ok(attempt) => Some(attempt),
            Err(StorageError::NotFound) => None,
            Err(err) => {
                tracing::warn!(%id, error = %err, "history unavailable");
                None
            }
        }
    }

    /// Per-chapter accuracy, recomputed from the stored history.
    pub async fn chapter_stats(&self) -> Vec<ChapterStats> {
        aggregate_by_chapter(&self.list().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::model::{ChapterFilter, Question};
    use quiz_core::time::fixed_now;

    struct BrokenBlobs;

    #[async_trait]
    impl BlobStore for BrokenBlobs {
        async fn read_blob(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }

        async fn write_blob(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }
    }

    fn attempt(offset_secs: i64, selected: &str) -> Attempt {
        Attempt::record(
            fixed_now() + Duration::seconds(offset_secs),
            Mode::Practice,
            &ChapterFilter::All,
            &[
                Question::new("Q1", ["a", "b"], "a").with_chapter("Money"),
                Question::new("Q2", ["a", "b"], "a").with_chapter("Trade"),
            ],
            vec![Some(selected.into()), Some("a".into())],
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn broken_storage_degrades_to_empty() {
        let service = HistoryService::from_blobs(Arc::new(BrokenBlobs));
        assert_eq!(service.record(&attempt(0, "a")).await, None);
        assert!(service.list().await.is_empty());
        assert!(service.chapter_stats().await.is_empty());
    }

    #[tokio::test]
    async fn lists_sorted_items_and_finds_by_id() {
        let service = HistoryService::in_memory();
        let low = attempt(0, "b");
        let high = attempt(1, "a");
        assert_eq!(service.record(&low).await.as_ref(), Some(&low));
        assert_eq!(service.record(&high).await.as_ref(), Some(&high));

        let by_score = service.list_items(HistorySort::ScoreAsc).await;
        assert_eq!(by_score[0].percent, 50);
        assert_eq!(by_score[1].percent, 100);

        let oldest = service.list_items(HistorySort::DateAsc).await;
        assert_eq!(oldest[0].id, *low.id());

        assert_eq!(service.get(high.id()).await, Some(high));
        assert_eq!(service.get(&AttemptId::new("missing")).await, None);
    }

    #[tokio::test]
    async fn chapter_stats_cover_all_attempts() {
        let service = HistoryService::in_memory();
        service.record(&attempt(0, "b")).await;
        service.record(&attempt(1, "a")).await;

        let stats = service.chapter_stats().await;
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].chapter, "Money");
        assert_eq!((stats[0].correct, stats[0].total, stats[0].pct), (1, 2, 50));
        assert_eq!((stats[1].correct, stats[1].total, stats[1].pct), (2, 2, 100));
    }
}
