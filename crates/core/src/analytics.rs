//! Chapter-wise accuracy over the attempt history.

use std::collections::BTreeMap;

use crate::model::{Attempt, UNKNOWN_CHAPTER, percent};

/// Accuracy for one chapter across all attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterStats {
    pub chapter: String,
    pub correct: u32,
    pub total: u32,
    pub pct: u32,
}

/// Bucket every answered-or-not question of every attempt by chapter.
///
/// Questions without a chapter land in `"Unknown"`. Rows come back sorted by
/// chapter label.
#[must_use]
pub fn aggregate_by_chapter(attempts: &[Attempt]) -> Vec<ChapterStats> {
    let mut buckets: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for attempt in attempts {
        for (question, selected) in attempt.items() {
            let chapter = question.chapter_label().unwrap_or(UNKNOWN_CHAPTER);
            let (correct, total) = buckets.entry(chapter).or_insert((0, 0));
            *total = total.saturating_add(1);
            if question.is_correct(selected) {
                *correct = correct.saturating_add(1);
            }
        }
    }

    buckets
        .into_iter()
        .map(|(chapter, (correct, total))| ChapterStats {
            chapter: chapter.to_owned(),
            correct,
            total,
            pct: percent(correct, total),
        })
        .collect()
}
