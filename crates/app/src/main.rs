mod config;
mod interactive;
mod render;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quiz_core::countdown::time_for_questions;
use quiz_core::history::HistorySort;
use quiz_core::model::{AttemptId, ChapterFilter, QuestionList};
use quiz_core::time::format_clock;
use services::export::{
    DEFAULT_REPORT_PAGE_SIZE, attempt_csv, attempt_report, history_csv, history_report,
};
use services::session::{chapters, filter_by_chapter, resolve_test_size};
use services::{AppServices, Clock, QuestionSource, QuizSession, SessionError};

use crate::config::{Cli, Command, ExportFormat, normalize_sqlite_url, prepare_sqlite_file};
use crate::interactive::{SessionEnd, run_session};
use crate::render::{analytics_view, history_view, review_view};

/// Rows per page in a history report.
const HISTORY_REPORT_PAGE_SIZE: usize = 20;

async fn load_bank(
    services: &AppServices,
    raw: &str,
) -> Result<QuestionList, Box<dyn std::error::Error>> {
    let source = QuestionSource::parse(raw);
    match services.questions().load(&source).await {
        Ok(bank) => Ok(bank),
        Err(err) => Err(format!("could not load questions from {source}: {err}").into()),
    }
}

async fn take_quiz(
    services: &AppServices,
    session: &mut QuizSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz_loop = services.quiz_loop();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    match run_session(&quiz_loop, session, stdin).await? {
        SessionEnd::Submitted(result) | SessionEnd::Expired(result) => {
            println!("\n{}", review_view(&result.attempt, session.questions()));
            if !result.persisted {
                println!("(this attempt could not be saved to history)");
            }
        }
        SessionEnd::Abandoned => println!("Session abandoned; nothing was saved."),
    }
    Ok(())
}

fn report_empty(err: SessionError) -> Result<(), Box<dyn std::error::Error>> {
    match err {
        SessionError::Empty => {
            println!("No questions available for this selection.");
            Ok(())
        }
        other => Err(other.into()),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Open + migrate SQLite at startup so every subcommand sees the same store.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, Clock::default_clock(), &cli.history_key).await?;

    match cli.command {
        Command::Chapters => {
            let bank = load_bank(&services, &cli.questions).await?;
            for chapter in chapters(bank.as_slice()) {
                let count = filter_by_chapter(bank.as_slice(), &ChapterFilter::from_label(&chapter)).len();
                println!("{chapter} ({count})");
            }
        }
        Command::Practice { chapter } => {
            let bank = load_bank(&services, &cli.questions).await?;
            let mut session = QuizSession::new();
            let chapter = ChapterFilter::from_label(&chapter);
            if let Err(err) = services.quiz_loop().start_practice(&mut session, &bank, chapter) {
                return report_empty(err);
            }
            println!("Practice: {} questions. Type h for help.", session.total());
            take_quiz(&services, &mut session).await?;
        }
        Command::Test { chapter, count } => {
            let bank = load_bank(&services, &cli.questions).await?;
            let chapter = ChapterFilter::from_label(&chapter);
            let available = filter_by_chapter(bank.as_slice(), &chapter).len();
            let using = resolve_test_size(count, available);
            let mut session = QuizSession::new();
            if let Err(err) = services
                .quiz_loop()
                .start_test(&mut session, &bank, chapter, count)
            {
                return report_empty(err);
            }
            println!(
                "Test: requested {count}, using {using}. Time allowed {}. Type h for help.",
                format_clock(time_for_questions(using))
            );
            take_quiz(&services, &mut session).await?;
        }
        Command::History { sort } => {
            let items = services.history().list_items(sort).await;
            print!("{}", history_view(&items));
        }
        Command::Show { attempt_id } => {
            let Some(attempt) = services.history().get(&AttemptId::new(&attempt_id)).await else {
                return Err(format!("no attempt with id {attempt_id}").into());
            };
            print!("{}", review_view(&attempt, &[]));
        }
        Command::Analytics => {
            let stats = services.history().chapter_stats().await;
            print!("{}", analytics_view(&stats));
        }
        Command::Export {
            attempt,
            format,
            out,
        } => {
            let history = services.history();
            let text = match attempt {
                Some(id) => {
                    let Some(attempt) = history.get(&AttemptId::new(&id)).await else {
                        return Err(format!("no attempt with id {id}").into());
                    };
                    match format {
                        ExportFormat::Csv => attempt_csv(&attempt)?,
                        ExportFormat::Report => attempt_report(&attempt, DEFAULT_REPORT_PAGE_SIZE),
                    }
                }
                None => {
                    let attempts = history.list_sorted(HistorySort::DateDesc).await;
                    match format {
                        ExportFormat::Csv => history_csv(&attempts)?,
                        ExportFormat::Report => history_report(&attempts, HISTORY_REPORT_PAGE_SIZE),
                    }
                }
            };
            match out {
                Some(path) => {
                    tokio::fs::write(&path, text).await?;
                    tracing::info!(path = %path.display(), "export written");
                }
                None => print!("{text}"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they never interleave with the quiz on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
