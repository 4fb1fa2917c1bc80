use std::sync::Arc;

use storage::HistoryStore;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::question_source::QuestionLoader;
use crate::sessions::{HistoryService, QuizLoopService};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    history: Arc<HistoryService>,
    quiz_loop: Arc<QuizLoopService>,
    questions: Arc<QuestionLoader>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        history_key: &str,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, history_key))
    }

    /// Build services over a process-local store. Nothing survives a restart.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, storage::DEFAULT_HISTORY_KEY)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, history_key: &str) -> Self {
        let store = HistoryStore::new(Arc::clone(&storage.blobs)).with_key(history_key);
        let history = HistoryService::new(store);
        let quiz_loop = Arc::new(QuizLoopService::new(clock, history.clone()));
        Self {
            clock,
            history: Arc::new(history),
            quiz_loop,
            questions: Arc::new(QuestionLoader::new(clock)),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionLoader> {
        Arc::clone(&self.questions)
    }
}
