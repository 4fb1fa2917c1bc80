use rand::Rng;

use quiz_core::countdown::Tick;
use quiz_core::model::{Attempt, ChapterFilter, Mode, QuestionList};

use super::plan::{filter_by_chapter, sample_n};
use super::service::{QuizSession, SubmitOutcome};
use super::view::HistoryService;
use crate::Clock;
use crate::error::SessionError;

/// Result of submitting a session through the loop service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub attempt: Attempt,
    /// False when the session had already been submitted; nothing was written.
    pub newly_submitted: bool,
    /// Whether history accepted the attempt. Always false for repeat submits.
    pub persisted: bool,
}

/// Result of feeding one timer pulse to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    Running(u32),
    /// Time ran out and the session was auto-submitted.
    Expired(SubmitResult),
    Idle,
}

/// Orchestrates session start, timer ticks, and submission with persistence.
///
/// History is written at most once per session, at the first submit.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    history: HistoryService,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, history: HistoryService) -> Self {
        Self { clock, history }
    }

    #[must_use]
    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    /// Start an untimed run over every question in `chapter`.
    ///
    /// Returns the number of questions in the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the filter leaves no questions.
    pub fn start_practice(
        &self,
        session: &mut QuizSession,
        bank: &QuestionList,
        chapter: ChapterFilter,
    ) -> Result<usize, SessionError> {
        let questions = filter_by_chapter(bank.as_slice(), &chapter);
        session.start(Mode::Practice, chapter, questions, self.clock.now())?;
        Ok(session.total())
    }

    /// Start a timed run over a random sample of `requested` questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the filter leaves no questions.
    pub fn start_test(
        &self,
        session: &mut QuizSession,
        bank: &QuestionList,
        chapter: ChapterFilter,
        requested: usize,
    ) -> Result<usize, SessionError> {
        self.start_test_with_rng(session, bank, chapter, requested, &mut rand::rng())
    }

    /// `start_test` with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the filter leaves no questions.
    pub fn start_test_with_rng<R: Rng + ?Sized>(
        &self,
        session: &mut QuizSession,
        bank: &QuestionList,
        chapter: ChapterFilter,
        requested: usize,
        rng: &mut R,
    ) -> Result<usize, SessionError> {
        let pool = filter_by_chapter(bank.as_slice(), &chapter);
        let questions = sample_n(&pool, requested, rng);
        session.start(Mode::Test, chapter, questions, self.clock.now())?;
        Ok(session.total())
    }

    /// Submit the session and, on the first submit only, append to history.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` if the session was never started.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<SubmitResult, SessionError> {
        match session.submit(self.clock.now())? {
            SubmitOutcome::Submitted(attempt) => match self.history.record(&attempt).await {
                Some(stored) => {
                    session.replace_attempt(stored.clone());
                    Ok(SubmitResult {
                        attempt: stored,
                        newly_submitted: true,
                        persisted: true,
                    })
                }
                None => Ok(SubmitResult {
                    attempt,
                    newly_submitted: true,
                    persisted: false,
                }),
            },
            SubmitOutcome::AlreadySubmitted => {
                tracing::debug!("ignoring repeated submit");
                let attempt = session.attempt().cloned().ok_or(SessionError::NotRunning)?;
                Ok(SubmitResult {
                    attempt,
                    newly_submitted: false,
                    persisted: false,
                })
            }
        }
    }

    /// Advance the session countdown by one second, auto-submitting on expiry.
    ///
    /// # Errors
    ///
    /// Propagates errors from the automatic submit.
    pub async fn tick(&self, session: &mut QuizSession) -> Result<TickResult, SessionError> {
        match session.tick() {
            Tick::Running(remaining) => Ok(TickResult::Running(remaining)),
            Tick::Expired => {
                tracing::info!("time is up, submitting");
                Ok(TickResult::Expired(self.submit(session).await?))
            }
            Tick::Idle => Ok(TickResult::Idle),
        }
    }

    /// Return home: stop the countdown and drop the run without saving.
    pub fn abandon(&self, session: &mut QuizSession) {
        session.abandon();
    }
}
