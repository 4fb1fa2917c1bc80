use std::fmt;

/// Label used both for the "no filter" choice and in persisted attempts.
pub const ALL_CHAPTERS: &str = "All";

/// Analytics bucket for questions without a chapter.
pub const UNKNOWN_CHAPTER: &str = "Unknown";

/// Chapter selection applied before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ChapterFilter {
    #[default]
    All,
    Only(String),
}

impl ChapterFilter {
    /// Parse a user-facing label; `"All"` (or an empty label) selects everything.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == ALL_CHAPTERS {
            Self::All
        } else {
            Self::Only(label.to_owned())
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CHAPTERS,
            Self::Only(chapter) => chapter,
        }
    }

    /// Returns true if a question carrying `chapter` passes this filter.
    #[must_use]
    pub fn matches(&self, chapter: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => chapter == Some(wanted.as_str()),
        }
    }
}

impl fmt::Display for ChapterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for ChapterFilter {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_label_round_trips() {
        assert_eq!(ChapterFilter::from_label("All"), ChapterFilter::All);
        assert_eq!(ChapterFilter::from_label("  "), ChapterFilter::All);
        assert_eq!(ChapterFilter::All.label(), "All");
    }

    #[test]
    fn only_matches_exact_chapter() {
        let filter = ChapterFilter::from_label("Money");
        assert!(filter.matches(Some("Money")));
        assert!(!filter.matches(Some("money")));
        assert!(!filter.matches(None));
        assert!(ChapterFilter::All.matches(None));
    }
}
