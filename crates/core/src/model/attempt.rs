use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AttemptId, ChapterFilter, Mode, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("answers ({answers}) and questions ({questions}) are not aligned")]
    LengthMismatch { answers: usize, questions: usize },

    #[error("total ({total}) does not match question count ({questions})")]
    TotalMismatch { total: u32, questions: usize },

    #[error("score ({score}) does not match recomputed score ({expected})")]
    ScoreMismatch { score: u32, expected: u32 },

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },
}

/// Rounded percentage of `part` over `total`; 0 when `total` is 0.
///
/// Halves round up, so 1/8 is 13%.
#[must_use]
pub fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = u64::from(part);
    let total = u64::from(total);
    let rounded = (200 * part + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Snapshot of a question as it was when the attempt was taken.
///
/// Stored redundantly so history review does not depend on the live bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptQuestion {
    #[serde(default)]
    pub chapter: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl AttemptQuestion {
    #[must_use]
    pub fn chapter_label(&self) -> Option<&str> {
        self.chapter.as_deref().filter(|c| !c.is_empty())
    }

    #[must_use]
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.answer.as_str())
    }
}

impl From<&Question> for AttemptQuestion {
    fn from(q: &Question) -> Self {
        Self {
            chapter: q.chapter.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
            answer: q.answer.clone(),
            source: q.source.clone(),
        }
    }
}

/// Immutable record of one submitted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    id: AttemptId,
    timestamp: DateTime<Utc>,
    mode: Mode,
    chapter: String,
    total: u32,
    score: u32,
    percent: u32,
    duration_sec: Option<u32>,
    answers: Vec<Option<String>>,
    questions: Vec<AttemptQuestion>,
}

impl Attempt {
    /// Snapshot a finished session.
    ///
    /// `answers` must be aligned 1:1 with `questions`; the score is computed
    /// here rather than trusted from the caller.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::LengthMismatch` if the slices are not aligned, or
    /// `AttemptError::TooManyQuestions` if the count does not fit in `u32`.
    pub fn record(
        created_at: DateTime<Utc>,
        mode: Mode,
        chapter: &ChapterFilter,
        questions: &[Question],
        answers: Vec<Option<String>>,
        duration_sec: Option<u32>,
    ) -> Result<Self, AttemptError> {
        if answers.len() != questions.len() {
            return Err(AttemptError::LengthMismatch {
                answers: answers.len(),
                questions: questions.len(),
            });
        }
        let total = u32::try_from(questions.len()).map_err(|_| AttemptError::TooManyQuestions {
            len: questions.len(),
        })?;
        let questions: Vec<AttemptQuestion> = questions.iter().map(AttemptQuestion::from).collect();
        let score = score_of(&questions, &answers);

        Ok(Self {
            id: AttemptId::from_time(created_at),
            timestamp: created_at,
            mode,
            chapter: chapter.label().to_owned(),
            total,
            score,
            percent: percent(score, total),
            duration_sec,
            answers,
            questions,
        })
    }

    /// The same record under another identifier.
    #[must_use]
    pub fn with_id(mut self, id: AttemptId) -> Self {
        self.id = id;
        self
    }

    /// Verify the invariants of a record read back from storage.
    ///
    /// # Errors
    ///
    /// Returns the first `AttemptError` found.
    pub fn check(&self) -> Result<(), AttemptError> {
        if self.answers.len() != self.questions.len() {
            return Err(AttemptError::LengthMismatch {
                answers: self.answers.len(),
                questions: self.questions.len(),
            });
        }
        if usize::try_from(self.total).ok() != Some(self.questions.len()) {
            return Err(AttemptError::TotalMismatch {
                total: self.total,
                questions: self.questions.len(),
            });
        }
        let expected = score_of(&self.questions, &self.answers);
        if expected != self.score {
            return Err(AttemptError::ScoreMismatch {
                score: self.score,
                expected,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &AttemptId {
        &self.id
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The chapter filter label the session was started with.
    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn percent(&self) -> u32 {
        self.percent
    }

    #[must_use]
    pub fn duration_sec(&self) -> Option<u32> {
        self.duration_sec
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn questions(&self) -> &[AttemptQuestion] {
        &self.questions
    }

    /// Question snapshots paired with the selected answer.
    pub fn items(&self) -> impl Iterator<Item = (&AttemptQuestion, Option<&str>)> {
        self.questions
            .iter()
            .zip(self.answers.iter().map(Option::as_deref))
    }
}

fn score_of(questions: &[AttemptQuestion], answers: &[Option<String>]) -> u32 {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| q.is_correct(a.as_deref()))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn bank() -> Vec<Question> {
        vec![
            Question::new("Q1", ["a", "b"], "a").with_chapter("Money"),
            Question::new("Q2", ["a", "b"], "b").with_chapter("Trade"),
            Question::new("Q3", ["a", "b", "c"], "c"),
        ]
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn record_scores_only_matching_answers() {
        let attempt = Attempt::record(
            fixed_now(),
            Mode::Practice,
            &ChapterFilter::All,
            &bank(),
            vec![Some("a".into()), None, Some("a".into())],
            None,
        )
        .unwrap();

        assert_eq!(attempt.total(), 3);
        assert_eq!(attempt.score(), 1);
        assert_eq!(attempt.percent(), 33);
        assert_eq!(attempt.chapter(), "All");
        assert_eq!(attempt.duration_sec(), None);
        assert!(attempt.check().is_ok());
    }

    #[test]
    fn record_rejects_misaligned_answers() {
        let err = Attempt::record(
            fixed_now(),
            Mode::Test,
            &ChapterFilter::All,
            &bank(),
            vec![None],
            Some(216),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AttemptError::LengthMismatch {
                answers: 1,
                questions: 3
            }
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let attempt = Attempt::record(
            fixed_now(),
            Mode::Test,
            &ChapterFilter::from_label("Money"),
            &bank()[..1],
            vec![Some("a".into())],
            Some(72),
        )
        .unwrap();

        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["id"], "attempt_1700000000000");
        assert_eq!(json["mode"], "test");
        assert_eq!(json["chapter"], "Money");
        assert_eq!(json["durationSec"], 72);
        assert_eq!(json["answers"][0], "a");
        assert_eq!(json["questions"][0]["chapter"], "Money");
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn check_flags_tampered_score() {
        let attempt = Attempt::record(
            fixed_now(),
            Mode::Practice,
            &ChapterFilter::All,
            &bank(),
            vec![None, None, None],
            None,
        )
        .unwrap();
        let mut json = serde_json::to_value(&attempt).unwrap();
        json["score"] = 3.into();
        let tampered: Attempt = serde_json::from_value(json).unwrap();
        assert!(matches!(
            tampered.check(),
            Err(AttemptError::ScoreMismatch { score: 3, expected: 0 })
        ));
    }
}
