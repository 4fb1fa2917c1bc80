//! CSV and paginated plain-text exports of attempts.

use std::fmt::Write as _;

use quiz_core::model::Attempt;
use quiz_core::time::format_clock;

use crate::error::ExportError;

/// Questions per page in an attempt report.
pub const DEFAULT_REPORT_PAGE_SIZE: usize = 5;

const PAGE_BREAK: char = '\u{0C}';
const NOT_ANSWERED: &str = "Not answered";

/// One row per question: position, chapter, prompt, selection, answer, verdict, source.
///
/// # Errors
///
/// Returns `ExportError` if a record cannot be written.
pub fn attempt_csv(attempt: &Attempt) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "index", "chapter", "question", "selected", "answer", "correct", "source",
    ])?;
    for (index, (question, selected)) in attempt.items().enumerate() {
        let number = (index + 1).to_string();
        writer.write_record([
            number.as_str(),
            question.chapter_label().unwrap_or_default(),
            question.question.as_str(),
            selected.unwrap_or_default(),
            question.answer.as_str(),
            if question.is_correct(selected) { "true" } else { "false" },
            question.source.as_deref().unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

/// One row per attempt, in the order given.
///
/// # Errors
///
/// Returns `ExportError` if a record cannot be written.
pub fn history_csv(attempts: &[Attempt]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "timestamp",
        "mode",
        "chapter",
        "score",
        "total",
        "percent",
        "duration_sec",
    ])?;
    for attempt in attempts {
        writer.write_record([
            attempt.id().to_string(),
            attempt.timestamp().to_rfc3339(),
            attempt.mode().to_string(),
            attempt.chapter().to_owned(),
            attempt.score().to_string(),
            attempt.total().to_string(),
            attempt.percent().to_string(),
            attempt.duration_sec().map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Paginated review of one attempt, `per_page` questions to a page.
///
/// Pages are separated by a form feed and end with a `Page i of n` footer.
#[must_use]
pub fn attempt_report(attempt: &Attempt, per_page: usize) -> String {
    let mut header = String::new();
    let _ = writeln!(header, "Attempt {}", attempt.id());
    let _ = writeln!(
        header,
        "{} | {} | chapter: {}",
        attempt.timestamp().format("%Y-%m-%d %H:%M UTC"),
        attempt.mode(),
        attempt.chapter()
    );
    let _ = writeln!(
        header,
        "Score: {}/{} ({}%){}",
        attempt.score(),
        attempt.total(),
        attempt.percent(),
        attempt
            .duration_sec()
            .map(|d| format!(" | time: {}", format_clock(d)))
            .unwrap_or_default()
    );

    let blocks: Vec<String> = attempt
        .items()
        .enumerate()
        .map(|(index, (question, selected))| {
            let mut block = String::new();
            let verdict = if question.is_correct(selected) {
                "Correct"
            } else {
                "Incorrect"
            };
            let _ = writeln!(block, "Q{}. {} [{verdict}]", index + 1, question.question);
            if let Some(chapter) = question.chapter_label() {
                let _ = writeln!(block, "   Chapter: {chapter}");
            }
            let _ = writeln!(block, "   Your answer: {}", selected.unwrap_or(NOT_ANSWERED));
            let _ = writeln!(block, "   Correct answer: {}", question.answer);
            if let Some(source) = question.source.as_deref().filter(|s| !s.is_empty()) {
                let _ = writeln!(block, "   Source: {source}");
            }
            block
        })
        .collect();

    paginate(&header, &blocks, per_page)
}

/// Paginated table of attempts, `per_page` rows to a page.
#[must_use]
pub fn history_report(attempts: &[Attempt], per_page: usize) -> String {
    let header = format!(
        "{:<22} {:<17} {:<8} {:<20} {:>7} {:>5} {:>8}\n",
        "id", "date", "mode", "chapter", "score", "pct", "time"
    );
    let rows: Vec<String> = attempts
        .iter()
        .map(|attempt| {
            format!(
                "{:<22} {:<17} {:<8} {:<20} {:>7} {:>4}% {:>8}\n",
                attempt.id().as_str(),
                attempt.timestamp().format("%Y-%m-%d %H:%M").to_string(),
                attempt.mode().as_str(),
                attempt.chapter(),
                format!("{}/{}", attempt.score(), attempt.total()),
                attempt.percent(),
                attempt.duration_sec().map(format_clock).unwrap_or_else(|| "-".into()),
            )
        })
        .collect();
    paginate(&header, &rows, per_page)
}

fn paginate(header: &str, blocks: &[String], per_page: usize) -> String {
    let per_page = per_page.max(1);
    let pages: Vec<&[String]> = if blocks.is_empty() {
        vec![blocks]
    } else {
        blocks.chunks(per_page).collect()
    };
    let count = pages.len();

    let mut out = String::new();
    for (i, page) in pages.into_iter().enumerate() {
        if i > 0 {
            out.push(PAGE_BREAK);
        }
        out.push_str(header);
        out.push('\n');
        for block in page {
            out.push_str(block);
        }
        let _ = writeln!(out, "\nPage {} of {count}", i + 1);
    }
    out
}
