mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{chapters, filter_by_chapter, resolve_test_size, sample_n};
pub use progress::{PaletteEntry, QuestionStatus, SessionProgress};
pub use service::{QuizSession, SessionState, Step, SubmitOutcome};
pub use view::{AttemptListItem, HistoryService};
pub use workflow::{QuizLoopService, SubmitResult, TickResult};
