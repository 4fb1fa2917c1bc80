//! Plain-text views for the terminal front end.

use std::fmt::Write as _;

use quiz_core::analytics::ChapterStats;
use quiz_core::model::{Attempt, Question};
use quiz_core::time::format_clock;
use services::AttemptListItem;
use services::session::{PaletteEntry, QuestionStatus, QuizSession};

pub const HELP: &str = "\
  1-9      choose an option
  n / p    next / previous question
  g <n>    go to question n
  m        mark or unmark for review
  c        clear the response
  l        show the palette
  s        submit
  q        quit without saving
  h        this help";

fn status_glyph(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::AttemptedMarked => "*",
        QuestionStatus::MarkedOnly => "m",
        QuestionStatus::Skipped => "-",
        QuestionStatus::Attempted => "x",
        QuestionStatus::Unattempted => " ",
    }
}

/// Current question with its options, progress, and remaining time.
pub fn question_view(session: &QuizSession) -> String {
    let mut out = String::new();
    let Some(question) = session.current_question() else {
        return out;
    };
    let progress = session.progress();
    let index = session.current();

    let _ = write!(
        out,
        "\n[{}/{}] {}% through | answered {} | left {}",
        progress.current + 1,
        progress.total,
        progress.percent_through,
        progress.attempted,
        progress.unattempted
    );
    if let Some(countdown) = session.countdown() {
        let _ = write!(out, " | time {}", format_clock(countdown.remaining()));
        if countdown.is_low() {
            out.push_str(" (hurry!)");
        }
    }
    out.push('\n');

    if let Some(chapter) = question.chapter_label() {
        let _ = writeln!(out, "{chapter}");
    }
    let marked = if session.is_marked(index) { " [marked]" } else { "" };
    let _ = writeln!(out, "Q{}. {}{marked}", index + 1, question.question);

    let selected = session.answer(index);
    for (i, option) in question.options.iter().enumerate() {
        let pointer = if selected == Some(option.as_str()) { ">" } else { " " };
        let _ = writeln!(out, " {pointer} {}) {option}", i + 1);
    }
    out
}

pub fn palette_view(palette: &[PaletteEntry]) -> String {
    let mut out = String::new();
    for entry in palette {
        let glyph = status_glyph(entry.status);
        if entry.is_current {
            let _ = write!(out, ">{}[{glyph}] ", entry.index + 1);
        } else {
            let _ = write!(out, "{}[{glyph}] ", entry.index + 1);
        }
    }
    out.push_str("\nlegend: x attempted, * attempted+marked, m marked, - skipped, blank unattempted");
    out
}

/// Per-question verdicts for a finished attempt.
///
/// `bank` supplies explanations when the attempt was just taken; history
/// snapshots do not carry them.
pub fn review_view(attempt: &Attempt, bank: &[Question]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Score: {}/{} ({}%){}",
        attempt.score(),
        attempt.total(),
        attempt.percent(),
        attempt
            .duration_sec()
            .map(|d| format!(" | allotted {}", format_clock(d)))
            .unwrap_or_default()
    );
    for (index, (question, selected)) in attempt.items().enumerate() {
        let verdict = if question.is_correct(selected) {
            "Correct"
        } else {
            "Incorrect"
        };
        let _ = writeln!(out, "\nQ{}. {} [{verdict}]", index + 1, question.question);
        if let Some(chapter) = question.chapter_label() {
            let _ = writeln!(out, "   chapter: {chapter}");
        }
        let _ = writeln!(
            out,
            "   Your: {} | Correct: {}",
            selected.unwrap_or("Not answered"),
            question.answer
        );
        if let Some(source) = question.source.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(out, "   source: {source}");
        }
        if let Some(explanation) = bank
            .get(index)
            .and_then(|q| q.explanation.as_deref())
            .filter(|e| !e.is_empty())
        {
            let _ = writeln!(out, "   {explanation}");
        }
    }
    out
}

pub fn history_view(items: &[AttemptListItem]) -> String {
    if items.is_empty() {
        return "No attempts yet.".to_owned();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{}  {}  {:<8} {:<20} {}/{} ({}%){}",
            item.id,
            item.timestamp.format("%Y-%m-%d %H:%M"),
            item.mode.as_str(),
            item.chapter,
            item.score,
            item.total,
            item.percent,
            item.duration_sec
                .map(|d| format!("  {}", format_clock(d)))
                .unwrap_or_default()
        );
    }
    out
}

pub fn analytics_view(stats: &[ChapterStats]) -> String {
    if stats.is_empty() {
        return "No attempts yet.".to_owned();
    }
    let width = stats.iter().map(|s| s.chapter.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in stats {
        let _ = writeln!(
            out,
            "{:<width$}  {:>4}/{:<4} {:>3}%",
            row.chapter, row.correct, row.total, row.pct
        );
    }
    out
}
