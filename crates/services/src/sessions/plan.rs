use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use quiz_core::model::{ALL_CHAPTERS, ChapterFilter, Question};

/// Questions passing `filter`, in their original order.
#[must_use]
pub fn filter_by_chapter(questions: &[Question], filter: &ChapterFilter) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| filter.matches(q.chapter.as_deref()))
        .cloned()
        .collect()
}

/// Draw `min(max(n, 1), pool.len())` questions uniformly without replacement.
///
/// The pool is shuffled (Fisher-Yates) and truncated. An empty pool yields an
/// empty sample; callers must refuse to start a session in that case.
pub fn sample_n<R: Rng + ?Sized>(pool: &[Question], n: usize, rng: &mut R) -> Vec<Question> {
    let take = n.max(1).min(pool.len());
    let mut shuffled = pool.to_vec();
    shuffled.as_mut_slice().shuffle(rng);
    shuffled.truncate(take);
    shuffled
}

/// Effective test size for a request against a pool of `available` questions.
///
/// Mirrors `sample_n`: at least one question is requested, and never more than
/// the pool holds. Returns 0 only for an empty pool.
#[must_use]
pub fn resolve_test_size(requested: usize, available: usize) -> usize {
    requested.max(1).min(available)
}

/// Chapter choices for a question bank: `"All"` followed by each distinct,
/// non-empty chapter in first-appearance order.
#[must_use]
pub fn chapters(questions: &[Question]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = vec![ALL_CHAPTERS.to_owned()];
    for chapter in questions.iter().filter_map(Question::chapter_label) {
        if seen.insert(chapter) {
            out.push(chapter.to_owned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bank() -> Vec<Question> {
        vec![
            Question::new("Q1", ["a", "b"], "a").with_chapter("Money"),
            Question::new("Q2", ["a", "b"], "a").with_chapter("Trade"),
            Question::new("Q3", ["a", "b"], "a").with_chapter("Money"),
            Question::new("Q4", ["a", "b"], "a"),
            Question::new("Q5", ["a", "b"], "a").with_chapter(""),
            Question::new("Q6", ["a", "b"], "a").with_chapter("Growth"),
        ]
    }

    #[test]
    fn all_filter_is_identity() {
        let questions = bank();
        assert_eq!(filter_by_chapter(&questions, &ChapterFilter::All), questions);
    }

    #[test]
    fn chapter_filter_keeps_order() {
        let picked = filter_by_chapter(&bank(), &ChapterFilter::from_label("Money"));
        let texts: Vec<_> = picked.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["Q1", "Q3"]);
    }

    #[test]
    fn sample_size_is_bounded_and_distinct() {
        let pool = bank();
        let mut rng = StdRng::seed_from_u64(7);
        for requested in [0, 1, 3, 6, 50] {
            let sample = sample_n(&pool, requested, &mut rng);
            assert_eq!(sample.len(), requested.max(1).min(pool.len()));

            let unique: HashSet<_> = sample.iter().map(|q| q.question.as_str()).collect();
            assert_eq!(unique.len(), sample.len());
            assert!(sample.iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn sampling_empty_pool_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_n(&[], 10, &mut rng).is_empty());
    }

    #[test]
    fn sampling_reaches_every_position() {
        let pool = bank();
        let mut rng = StdRng::seed_from_u64(42);
        let mut firsts = HashSet::new();
        for _ in 0..200 {
            let sample = sample_n(&pool, 1, &mut rng);
            firsts.insert(sample[0].question.clone());
        }
        assert_eq!(firsts.len(), pool.len());
    }

    #[test]
    fn resolves_requested_test_size() {
        assert_eq!(resolve_test_size(0, 10), 1);
        assert_eq!(resolve_test_size(25, 10), 10);
        assert_eq!(resolve_test_size(4, 10), 4);
        assert_eq!(resolve_test_size(4, 0), 0);
    }

    #[test]
    fn chapters_lists_distinct_labels_after_all() {
        assert_eq!(chapters(&bank()), vec!["All", "Money", "Trade", "Growth"]);
        assert_eq!(chapters(&[]), vec!["All"]);
    }
}
