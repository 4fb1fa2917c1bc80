#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod export;
pub mod question_source;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, ExportError, QuestionLoadError, SessionError};
pub use question_source::{QuestionLoader, QuestionSource, parse_question_payload};
pub use timer::{Pulse, QuizTimer};

pub use sessions::{
    AttemptListItem, HistoryService, QuizLoopService, QuizSession, SessionState, Step,
    SubmitResult, TickResult,
};
