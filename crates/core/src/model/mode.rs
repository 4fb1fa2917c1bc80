use serde::{Deserialize, Serialize};
use std::fmt;

/// How a session is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Untimed pass over the whole (optionally chapter-filtered) set.
    Practice,
    /// Timed pass over a random sample; auto-submits when time runs out.
    Test,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Practice => "practice",
            Mode::Test => "test",
        }
    }

    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Mode::Test)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
