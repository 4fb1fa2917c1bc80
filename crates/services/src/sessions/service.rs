use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use quiz_core::countdown::{Countdown, Tick, time_for_questions};
use quiz_core::model::{Attempt, ChapterFilter, Mode, Question, percent};

use super::progress::{PaletteEntry, QuestionStatus, SessionProgress};
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session.
///
/// `Running` is only ever entered through [`QuizSession::start`], which
/// installs a fresh question set and clears all per-question state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Submitted,
}

/// Direction for [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// Result of calling [`QuizSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First submission; carries the attempt snapshot to persist.
    Submitted(Attempt),
    /// The session was already submitted. Nothing new to persist.
    AlreadySubmitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one practice or test run.
///
/// Holds the active question set, the cursor, and per-question answer, mark
/// and skip state. A skip is recorded only when the cursor leaves a question
/// that is neither answered nor marked; answering clears it again.
pub struct QuizSession {
    state: SessionState,
    mode: Mode,
    chapter: ChapterFilter,
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, String>,
    marked: BTreeSet<usize>,
    skipped: BTreeSet<usize>,
    countdown: Option<Countdown>,
    started_at: Option<DateTime<Utc>>,
    attempt: Option<Attempt>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::NotStarted,
            mode: Mode::Practice,
            chapter: ChapterFilter::All,
            questions: Vec::new(),
            current: 0,
            answers: BTreeMap::new(),
            marked: BTreeSet::new(),
            skipped: BTreeSet::new(),
            countdown: None,
            started_at: None,
            attempt: None,
        }
    }

    /// Begin a run over `questions`.
    ///
    /// In test mode the countdown is set to `round(len * 1.2 * 60)` seconds.
    /// Starting over a running or submitted session discards its state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty; the session is
    /// left untouched.
    pub fn start(
        &mut self,
        mode: Mode,
        chapter: ChapterFilter,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.reset();
        self.countdown = mode
            .is_timed()
            .then(|| Countdown::start(time_for_questions(questions.len())));
        self.mode = mode;
        self.chapter = chapter;
        self.questions = questions;
        self.started_at = Some(started_at);
        self.state = SessionState::Running;

        tracing::info!(
            mode = %self.mode,
            chapter = %self.chapter,
            total = self.questions.len(),
            seconds = ?self.remaining_seconds(),
            "session started"
        );
        Ok(())
    }

    /// Select `option` for the question at `index`, retracting any skip mark.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning`, `SessionError::IndexOutOfRange`, or
    /// `SessionError::InvalidOption` if `option` is not one of the choices.
    pub fn select_option(&mut self, index: usize, option: &str) -> Result<(), SessionError> {
        let question = self.running_question(index)?;
        if !question.has_option(option) {
            return Err(SessionError::InvalidOption { index });
        }
        self.answers.insert(index, option.to_owned());
        self.skipped.remove(&index);
        Ok(())
    }

    /// Remove the answer at `index`. Marks and skips are left alone.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` or `SessionError::IndexOutOfRange`.
    pub fn clear_response(&mut self, index: usize) -> Result<(), SessionError> {
        self.running_question(index)?;
        self.answers.remove(&index);
        Ok(())
    }

    /// Flip the review flag at `index` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` or `SessionError::IndexOutOfRange`.
    pub fn toggle_mark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.running_question(index)?;
        if self.marked.remove(&index) {
            Ok(false)
        } else {
            self.marked.insert(index);
            Ok(true)
        }
    }

    /// Move one question back or forward, clamped to the set.
    ///
    /// Returns the new cursor position.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside a running session.
    pub fn advance(&mut self, step: Step) -> Result<usize, SessionError> {
        self.ensure_running()?;
        self.mark_skip_on_leave();
        let last = self.questions.len() - 1;
        self.current = match step {
            Step::Previous => self.current.saturating_sub(1),
            Step::Next => (self.current + 1).min(last),
        };
        Ok(self.current)
    }

    /// Move the cursor straight to `index` (palette navigation).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` or `SessionError::IndexOutOfRange`;
    /// on error nothing is marked.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.running_question(index)?;
        self.mark_skip_on_leave();
        self.current = index;
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Tick::Expired` exactly once per timed session; the caller is
    /// expected to submit in response. Practice sessions always return
    /// `Tick::Idle`.
    pub fn tick(&mut self) -> Tick {
        if self.state != SessionState::Running {
            return Tick::Idle;
        }
        match self.countdown.as_mut() {
            Some(countdown) => countdown.tick(),
            None => Tick::Idle,
        }
    }

    /// Finish the session, stop the countdown, and snapshot an attempt.
    ///
    /// Only the first call produces an attempt; later calls (for instance a
    /// manual submit racing timer expiry) return `SubmitOutcome::AlreadySubmitted`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` if the session was never started.
    pub fn submit(&mut self, submitted_at: DateTime<Utc>) -> Result<SubmitOutcome, SessionError> {
        match self.state {
            SessionState::NotStarted => return Err(SessionError::NotRunning),
            SessionState::Submitted => return Ok(SubmitOutcome::AlreadySubmitted),
            SessionState::Running => {}
        }

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }

        let answers = (0..self.questions.len())
            .map(|i| self.answers.get(&i).cloned())
            .collect();
        let attempt = Attempt::record(
            submitted_at,
            self.mode,
            &self.chapter,
            &self.questions,
            answers,
            self.countdown.as_ref().map(Countdown::total),
        )?;

        let elapsed_secs = self
            .started_at
            .map(|started| (submitted_at - started).num_seconds().max(0));
        self.state = SessionState::Submitted;
        self.attempt = Some(attempt.clone());
        tracing::info!(
            id = %attempt.id(),
            score = attempt.score(),
            total = attempt.total(),
            elapsed_secs = ?elapsed_secs,
            "session submitted"
        );
        Ok(SubmitOutcome::Submitted(attempt))
    }

    /// Leave the session without submitting: stop the countdown and reset.
    pub fn abandon(&mut self) {
        if self.state == SessionState::Running {
            tracing::debug!(answered = self.attempted_count(), "session abandoned");
        }
        self.reset();
    }

    fn reset(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }
        *self = Self::new();
    }

    fn mark_skip_on_leave(&mut self) {
        let i = self.current;
        if !self.answers.contains_key(&i) && !self.marked.contains(&i) {
            self.skipped.insert(i);
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            Ok(())
        } else {
            Err(SessionError::NotRunning)
        }
    }

    fn running_question(&self, index: usize) -> Result<&Question, SessionError> {
        self.ensure_running()?;
        self.questions
            .get(index)
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            })
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.state == SessionState::Submitted
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn chapter(&self) -> &ChapterFilter {
        &self.chapter
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    #[must_use]
    pub fn is_skipped(&self, index: usize) -> bool {
        self.skipped.contains(&index)
    }

    #[must_use]
    pub fn attempted_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn unattempted_count(&self) -> usize {
        self.questions.len().saturating_sub(self.attempted_count())
    }

    /// Display status of the question at `index`; `None` if out of range.
    #[must_use]
    pub fn status_of(&self, index: usize) -> Option<QuestionStatus> {
        (index < self.questions.len()).then(|| {
            QuestionStatus::resolve(
                self.answers.contains_key(&index),
                self.marked.contains(&index),
                self.skipped.contains(&index),
            )
        })
    }

    /// Number of answers that match the correct option.
    #[must_use]
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, q)| q.is_correct(self.answer(*i)))
            .count()
    }

    /// Seconds left on the countdown; `None` outside test mode.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    #[must_use]
    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// The attempt produced by the first successful submit.
    #[must_use]
    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    /// Swap in the attempt as history stored it, which may carry a new id.
    pub(crate) fn replace_attempt(&mut self, attempt: Attempt) {
        if self.state == SessionState::Submitted {
            self.attempt = Some(attempt);
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let position = u32::try_from(self.current + 1).unwrap_or(u32::MAX);
        SessionProgress {
            current: self.current,
            total,
            attempted: self.attempted_count(),
            unattempted: self.unattempted_count(),
            percent_through: percent(position, u32::try_from(total).unwrap_or(u32::MAX)),
        }
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteEntry> {
        (0..self.questions.len())
            .filter_map(|index| {
                self.status_of(index).map(|status| PaletteEntry {
                    index,
                    status,
                    is_current: index == self.current,
                })
            })
            .collect()
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("chapter", &self.chapter)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_seconds", &self.remaining_seconds())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
