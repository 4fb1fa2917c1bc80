//! Pure transforms over the persisted attempt list.

use std::cmp::Reverse;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{Attempt, AttemptId};

/// Number of attempts retained in history.
pub const HISTORY_CAP: usize = 50;

/// Insert `attempt` at the front and drop the oldest entries beyond `cap`.
#[must_use]
pub fn prepend_capped(mut history: Vec<Attempt>, attempt: Attempt, cap: usize) -> Vec<Attempt> {
    history.insert(0, attempt);
    history.truncate(cap);
    history
}

/// Give `attempt` an id no entry of `history` already uses.
///
/// A clashing id gets the smallest free suffix starting at `_2`.
#[must_use]
pub fn assign_unique_id(history: &[Attempt], attempt: Attempt) -> Attempt {
    let taken = |id: &AttemptId| history.iter().any(|a| a.id() == id);
    if !taken(attempt.id()) {
        return attempt;
    }
    let base = attempt.id().clone();
    let id = (2..)
        .map(|n| base.with_suffix(n))
        .find(|id| !taken(id))
        .unwrap_or(base);
    attempt.with_id(id)
}

/// Read-time ordering for the history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySort {
    #[default]
    DateDesc,
    DateAsc,
    ScoreDesc,
    ScoreAsc,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown history sort: {0}")]
pub struct ParseHistorySortError(String);

impl FromStr for HistorySort {
    type Err = ParseHistorySortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "date-desc" | "newest" => Ok(Self::DateDesc),
            "date-asc" | "oldest" => Ok(Self::DateAsc),
            "score-desc" => Ok(Self::ScoreDesc),
            "score-asc" => Ok(Self::ScoreAsc),
            _ => Err(ParseHistorySortError(s.to_owned())),
        }
    }
}

/// Sorted copy of `attempts`. The input is left untouched.
///
/// Sorting is stable, so ties keep their stored (newest-insert-first) order.
#[must_use]
pub fn sort_attempts(attempts: &[Attempt], order: HistorySort) -> Vec<Attempt> {
    let mut sorted = attempts.to_vec();
    match order {
        HistorySort::DateDesc => sorted.sort_by_key(|a| Reverse(a.timestamp())),
        HistorySort::DateAsc => sorted.sort_by_key(Attempt::timestamp),
        HistorySort::ScoreDesc => sorted.sort_by_key(|a| Reverse(a.percent())),
        HistorySort::ScoreAsc => sorted.sort_by_key(Attempt::percent),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterFilter, Mode, Question};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn attempt(offset_secs: i64, correct: usize, total: usize) -> Attempt {
        let questions: Vec<Question> = (0..total)
            .map(|i| Question::new(format!("Q{i}"), ["a", "b"], "a"))
            .collect();
        let answers = (0..total)
            .map(|i| Some(if i < correct { "a" } else { "b" }.to_owned()))
            .collect();
        Attempt::record(
            fixed_now() + Duration::seconds(offset_secs),
            Mode::Practice,
            &ChapterFilter::All,
            &questions,
            answers,
            None,
        )
        .unwrap()
    }

    #[test]
    fn prepend_keeps_newest_first_and_caps() {
        let mut history = Vec::new();
        for i in 0..60 {
            history = prepend_capped(history, attempt(i, 1, 1), HISTORY_CAP);
        }
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history[0].timestamp(), fixed_now() + Duration::seconds(59));
        assert_eq!(
            history[HISTORY_CAP - 1].timestamp(),
            fixed_now() + Duration::seconds(10)
        );
    }

    #[test]
    fn same_millisecond_attempts_get_distinct_ids() {
        let first = attempt(0, 1, 1);
        let mut history = vec![first.clone()];

        let second = assign_unique_id(&history, attempt(0, 0, 1));
        assert_eq!(second.id().as_str(), "attempt_1700000000000_2");
        assert_eq!(second.score(), 0);
        history = prepend_capped(history, second, HISTORY_CAP);

        let third = assign_unique_id(&history, attempt(0, 1, 1));
        assert_eq!(third.id().as_str(), "attempt_1700000000000_3");

        let later = attempt(1, 1, 1);
        assert_eq!(assign_unique_id(&history, later.clone()), later);
    }

    #[test]
    fn sorts_by_date_and_score_without_mutating() {
        let stored = vec![attempt(2, 1, 4), attempt(1, 4, 4), attempt(3, 2, 4)];

        let newest = sort_attempts(&stored, HistorySort::DateDesc);
        let secs: Vec<_> = newest
            .iter()
            .map(|a| (a.timestamp() - fixed_now()).num_seconds())
            .collect();
        assert_eq!(secs, vec![3, 2, 1]);

        let oldest = sort_attempts(&stored, HistorySort::DateAsc);
        assert_eq!((oldest[0].timestamp() - fixed_now()).num_seconds(), 1);

        let best = sort_attempts(&stored, HistorySort::ScoreDesc);
        let pcts: Vec<_> = best.iter().map(Attempt::percent).collect();
        assert_eq!(pcts, vec![100, 50, 25]);

        let worst = sort_attempts(&stored, HistorySort::ScoreAsc);
        assert_eq!(worst[0].percent(), 25);

        assert_eq!((stored[0].timestamp() - fixed_now()).num_seconds(), 2);
    }

    #[test]
    fn parses_sort_labels() {
        assert_eq!("date-desc".parse(), Ok(HistorySort::DateDesc));
        assert_eq!("score_asc".parse(), Ok(HistorySort::ScoreAsc));
        assert!("sideways".parse::<HistorySort>().is_err());
    }
}
