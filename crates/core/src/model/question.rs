use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Shape problems found while checking a question record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,

    #[error("answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// One multiple-choice quiz item, as supplied by the question bank.
///
/// Questions are immutable once loaded. `answer` must equal exactly one entry
/// of `options`; use [`Question::check`] to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub chapter: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Build a question with no chapter, source, or explanation.
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            chapter: None,
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer: answer.into(),
            source: None,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// The chapter label, treating an empty string as absent.
    #[must_use]
    pub fn chapter_label(&self) -> Option<&str> {
        self.chapter.as_deref().filter(|c| !c.is_empty())
    }

    /// Returns true if `option` is one of this question's options.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Returns true if `selected` is the correct answer.
    #[must_use]
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.answer.as_str())
    }

    /// Verify the `answer ∈ options` invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` for an empty option list and
    /// `QuestionError::AnswerNotInOptions` if the answer is missing from it.
    pub fn check(&self) -> Result<(), QuestionError> {
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !self.has_option(&self.answer) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: self.answer.clone(),
            });
        }
        Ok(())
    }
}

//
// ─── QUESTION LIST ────────────────────────────────────────────────────────────
//

/// Normalized question bank handed to the sampler and sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionList {
    questions: Vec<Question>,
}

impl QuestionList {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl From<Vec<Question>> for QuestionList {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_accepts_answer_among_options() {
        let q = Question::new("2 + 2?", ["3", "4"], "4");
        assert!(q.check().is_ok());
    }

    #[test]
    fn check_rejects_missing_answer() {
        let q = Question::new("2 + 2?", ["3", "5"], "4");
        assert_eq!(
            q.check(),
            Err(QuestionError::AnswerNotInOptions {
                answer: "4".into()
            })
        );
    }

    #[test]
    fn check_rejects_empty_options() {
        let q = Question::new("?", Vec::<String>::new(), "x");
        assert_eq!(q.check(), Err(QuestionError::NoOptions));
    }

    #[test]
    fn empty_chapter_is_treated_as_absent() {
        let q = Question::new("?", ["a"], "a").with_chapter("");
        assert_eq!(q.chapter_label(), None);
        let q = q.with_chapter("Demand");
        assert_eq!(q.chapter_label(), Some("Demand"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let q: Question = serde_json::from_str(
            r#"{"question":"Q","options":["a","b"],"answer":"b"}"#,
        )
        .unwrap();
        assert_eq!(q.chapter, None);
        assert_eq!(q.source, None);
        assert!(q.is_correct(Some("b")));
        assert!(!q.is_correct(None));
    }
}
