use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use quiz_core::history::HistorySort;
use storage::DEFAULT_HISTORY_KEY;

/// Terminal multiple-choice quiz with timed tests, history, and analytics.
#[derive(Debug, Parser)]
#[command(name = "quiz", version, about)]
pub struct Cli {
    /// Question bank: a JSON file path or an http(s) URL
    #[arg(long, env = "QUIZ_QUESTIONS", default_value = "questions.json", global = true)]
    pub questions: String,

    /// SQLite database holding the attempt history
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3", global = true)]
    pub db_url: String,

    /// Storage key for the attempt history
    #[arg(long, env = "QUIZ_HISTORY_KEY", default_value = DEFAULT_HISTORY_KEY, global = true)]
    pub history_key: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List chapters in the question bank
    Chapters,

    /// Untimed run over every question in a chapter
    Practice {
        #[arg(long, default_value = "All")]
        chapter: String,
    },

    /// Timed run over a random sample of questions
    Test {
        #[arg(long, default_value = "All")]
        chapter: String,
        /// Number of questions to draw
        #[arg(long, default_value_t = 10)]
        count: usize,
    },

    /// List past attempts
    History {
        /// date-desc, date-asc, score-desc or score-asc
        #[arg(long, default_value = "date-desc")]
        sort: HistorySort,
    },

    /// Review one past attempt question by question
    Show { attempt_id: String },

    /// Per-chapter accuracy across all attempts
    Analytics,

    /// Export one attempt, or the whole history
    Export {
        /// Attempt to export; omit for the history list
        #[arg(long)]
        attempt: Option<String>,
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Report,
}

#[derive(Debug)]
pub enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Turn a database path or URL into an absolute `sqlite://` URL.
///
/// Relative paths, with or without a `sqlite:` or `sqlite://` prefix, are
/// resolved against the current directory. A `?query` suffix is kept.
/// `sqlite::memory:` passes through.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return trimmed.to_owned();
    }

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

/// Make sure the database file and its parent directory exist.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ArgsError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_owned(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|_| invalid())?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|_| invalid())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_absolute_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/quiz.db"),
            "sqlite:///var/quiz.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/quiz.db?mode=rwc"),
            "sqlite:///var/quiz.db?mode=rwc"
        );
    }

    #[test]
    fn relative_sqlite_urls_become_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let expected = format!("sqlite://{}", cwd.join("quiz.sqlite3").display());
        assert_eq!(normalize_sqlite_url("sqlite://quiz.sqlite3"), expected);

        let with_query = normalize_sqlite_url("sqlite://data/quiz.db?mode=rwc");
        assert!(with_query.starts_with("sqlite:///"));
        assert!(with_query.ends_with("/data/quiz.db?mode=rwc"));

        assert_eq!(normalize_sqlite_url("sqlite://"), "sqlite://");
        assert!(prepare_sqlite_file(&normalize_sqlite_url("sqlite://")).is_err());
    }

    #[test]
    fn bare_paths_become_absolute_urls() {
        assert_eq!(normalize_sqlite_url("/tmp/q.db"), "sqlite:///tmp/q.db");
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/q.db"), "sqlite:///tmp/q.db");
        let relative = normalize_sqlite_url("q.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/q.db"));
    }

    #[test]
    fn rejects_urls_without_a_path() {
        assert!(prepare_sqlite_file("sqlite://").is_err());
        assert!(prepare_sqlite_file("postgres://x").is_err());
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn parses_subcommands_and_globals() {
        let cli = Cli::try_parse_from([
            "quiz",
            "test",
            "--chapter",
            "Money",
            "--count",
            "5",
            "--db",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(cli.db_url, "sqlite::memory:");
        match cli.command {
            Command::Test { chapter, count } => {
                assert_eq!(chapter, "Money");
                assert_eq!(count, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["quiz", "history", "--sort", "score-asc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History {
                sort: HistorySort::ScoreAsc
            }
        ));

        let cli = Cli::try_parse_from(["quiz", "export", "--format", "csv"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export {
                attempt: None,
                format: ExportFormat::Csv,
                out: None
            }
        ));
    }
}
