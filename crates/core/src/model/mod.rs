mod attempt;
mod chapter;
mod ids;
mod mode;
mod question;

pub use attempt::{Attempt, AttemptError, AttemptQuestion, percent};
pub use chapter::{ALL_CHAPTERS, ChapterFilter, UNKNOWN_CHAPTER};
pub use ids::AttemptId;
pub use mode::Mode;
pub use question::{Question, QuestionError, QuestionList};
