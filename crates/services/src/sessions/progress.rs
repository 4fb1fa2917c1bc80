use std::fmt;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub current: usize,
    pub total: usize,
    pub attempted: usize,
    pub unattempted: usize,
    /// Position through the set, `round(100 * (current + 1) / total)`.
    pub percent_through: u32,
}

/// Display status of one question, resolved by priority.
///
/// `AttemptedMarked` > `MarkedOnly` > `Skipped` > `Attempted` > `Unattempted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionStatus {
    AttemptedMarked,
    MarkedOnly,
    Skipped,
    Attempted,
    Unattempted,
}

impl QuestionStatus {
    #[must_use]
    pub fn resolve(answered: bool, marked: bool, skipped: bool) -> Self {
        match (answered, marked, skipped) {
            (true, true, _) => Self::AttemptedMarked,
            (false, true, _) => Self::MarkedOnly,
            (false, false, true) => Self::Skipped,
            (true, false, _) => Self::Attempted,
            (false, false, false) => Self::Unattempted,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AttemptedMarked => "attempted_marked",
            Self::MarkedOnly => "marked_only",
            Self::Skipped => "skipped",
            Self::Attempted => "attempted",
            Self::Unattempted => "unattempted",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cell of the question palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: usize,
    pub status: QuestionStatus,
    pub is_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_priority() {
        use QuestionStatus::*;
        assert_eq!(QuestionStatus::resolve(true, true, true), AttemptedMarked);
        assert_eq!(QuestionStatus::resolve(false, true, true), MarkedOnly);
        assert_eq!(QuestionStatus::resolve(false, false, true), Skipped);
        assert_eq!(QuestionStatus::resolve(true, false, true), Attempted);
        assert_eq!(QuestionStatus::resolve(true, false, false), Attempted);
        assert_eq!(QuestionStatus::resolve(false, false, false), Unattempted);
    }
}
