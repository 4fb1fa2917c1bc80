//! Loading the question bank from a file or an HTTP(S) URL.
//!
//! The payload is normalized here into a [`QuestionList`]; nothing downstream
//! ever sees the raw JSON shape.

use std::fmt;
use std::path::PathBuf;

use reqwest::Client;
use serde_json::Value;

use quiz_core::model::{Question, QuestionList};

use crate::Clock;
use crate::error::QuestionLoadError;

/// Where the question bank lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    File(PathBuf),
    Url(String),
}

impl QuestionSource {
    /// Treat `http://` and `https://` locations as URLs and anything else as a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Append a `v=<millis>` query parameter so intermediary caches serve a fresh copy.
#[must_use]
pub fn cache_busted_url(url: &str, millis: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}v={millis}")
}

/// Top-level payload shapes accepted from the question bank.
#[derive(Debug)]
enum Payload {
    Bare(Vec<Value>),
    Wrapped(Vec<Value>),
    Unrecognized,
}

impl Payload {
    fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Bare(items),
            Value::Object(mut map) => match map.remove("questions") {
                Some(Value::Array(items)) => Self::Wrapped(items),
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }
}

/// Parse a question bank payload.
///
/// Accepts a bare array of questions or an object with a `questions` array.
/// Items that are not valid questions, or whose answer is not among their
/// options, are dropped.
///
/// # Errors
///
/// Returns `QuestionLoadError::Malformed` if `raw` is not JSON at all, and
/// `QuestionLoadError::UnrecognizedShape` for any other JSON shape. Callers
/// that keep running treat the bank as empty.
pub fn parse_question_payload(raw: &str) -> Result<QuestionList, QuestionLoadError> {
    let value: Value = serde_json::from_str(raw)?;
    let items = match Payload::classify(value) {
        Payload::Bare(items) | Payload::Wrapped(items) => items,
        Payload::Unrecognized => {
            tracing::warn!("question bank has no question list");
            return Err(QuestionLoadError::UnrecognizedShape);
        }
    };

    let mut questions = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let question: Question = match serde_json::from_value(item) {
            Ok(question) => question,
            Err(err) => {
                tracing::warn!(index, error = %err, "dropping unreadable question");
                continue;
            }
        };
        if let Err(err) = question.check() {
            tracing::warn!(index, error = %err, "dropping invalid question");
            continue;
        }
        questions.push(question);
    }
    Ok(QuestionList::new(questions))
}

/// Fetches and normalizes the question bank once per call.
#[derive(Clone)]
pub struct QuestionLoader {
    client: Client,
    clock: Clock,
}

impl QuestionLoader {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            client: Client::new(),
            clock,
        }
    }

    /// Read `source` and parse it into a question list.
    ///
    /// # Errors
    ///
    /// Returns `QuestionLoadError` when the source cannot be read, the server
    /// answers with a non-success status, or the body is not a question bank.
    pub async fn load(&self, source: &QuestionSource) -> Result<QuestionList, QuestionLoadError> {
        let body = match source {
            QuestionSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| QuestionLoadError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            QuestionSource::Url(url) => {
                let url = cache_busted_url(url, self.clock.now().timestamp_millis());
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(QuestionLoadError::HttpStatus(response.status()));
                }
                response.text().await?
            }
        };

        let questions = parse_question_payload(&body)?;
        tracing::info!(%source, count = questions.len(), "question bank loaded");
        Ok(questions)
    }
}
