//! Interactive quiz loop: keyboard commands on stdin, countdown pulses from
//! a [`QuizTimer`], both applied to the session on this one task.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use quiz_core::countdown::Countdown;
use quiz_core::time::format_clock;
use services::session::{QuizSession, Step};
use services::{Pulse, QuizLoopService, QuizTimer, SessionError, SubmitResult, TickResult};

use crate::render::{HELP, palette_view, question_view};

/// One line of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Zero-based option index.
    Choose(usize),
    Next,
    Previous,
    /// Zero-based question index.
    Jump(usize),
    Mark,
    Clear,
    Palette,
    Submit,
    Quit,
    Help,
}

impl Input {
    /// Parse a command line. Options and questions are numbered from 1.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Ok(n) = line.parse::<usize>() {
            return n.checked_sub(1).map(Self::Choose);
        }
        if let Some(rest) = line.strip_prefix('g') {
            if let Ok(n) = rest.trim().parse::<usize>() {
                return n.checked_sub(1).map(Self::Jump);
            }
        }
        match line {
            "n" => Some(Self::Next),
            "p" => Some(Self::Previous),
            "m" => Some(Self::Mark),
            "c" => Some(Self::Clear),
            "l" => Some(Self::Palette),
            "s" => Some(Self::Submit),
            "q" => Some(Self::Quit),
            "h" | "?" => Some(Self::Help),
            _ => None,
        }
    }
}

/// How an interactive run ended.
#[derive(Debug)]
pub enum SessionEnd {
    Submitted(SubmitResult),
    /// Time ran out before a manual submit.
    Expired(SubmitResult),
    Abandoned,
}

async fn next_pulse(pulses: &mut Option<UnboundedReceiver<Pulse>>) -> Option<Pulse> {
    match pulses {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Drive a started session until it is submitted, expires, or is abandoned.
///
/// End of input abandons the run.
///
/// # Errors
///
/// Returns an error if reading input fails or an expiry cannot be submitted.
pub async fn run_session<R>(
    quiz_loop: &QuizLoopService,
    session: &mut QuizSession,
    input: R,
) -> Result<SessionEnd, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut timer = QuizTimer::new();
    let mut pulses = session.remaining_seconds().map(|secs| timer.start(secs));
    let mut warned_low = false;

    println!("{}", question_view(session));
    loop {
        tokio::select! {
            Some(Pulse) = next_pulse(&mut pulses) => {
                match quiz_loop.tick(session).await? {
                    TickResult::Running(remaining) => {
                        if !warned_low && session.countdown().is_some_and(Countdown::is_low) {
                            warned_low = true;
                            println!("!! {} left", format_clock(remaining));
                        }
                    }
                    TickResult::Expired(result) => {
                        timer.stop();
                        println!("Time is up.");
                        return Ok(SessionEnd::Expired(result));
                    }
                    TickResult::Idle => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    timer.stop();
                    quiz_loop.abandon(session);
                    return Ok(SessionEnd::Abandoned);
                };
                let Some(input) = Input::parse(&line) else {
                    println!("Unknown command. Type h for help.");
                    continue;
                };
                match apply(quiz_loop, session, input).await {
                    Ok(Some(end)) => {
                        timer.stop();
                        return Ok(end);
                    }
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
            }
        }
    }
}

async fn apply(
    quiz_loop: &QuizLoopService,
    session: &mut QuizSession,
    input: Input,
) -> Result<Option<SessionEnd>, SessionError> {
    let index = session.current();
    match input {
        Input::Choose(option) => {
            let choice = session
                .current_question()
                .and_then(|q| q.options.get(option))
                .cloned()
                .ok_or(SessionError::InvalidOption { index })?;
            session.select_option(index, &choice)?;
        }
        Input::Next => {
            session.advance(Step::Next)?;
        }
        Input::Previous => {
            session.advance(Step::Previous)?;
        }
        Input::Jump(target) => session.jump_to(target)?,
        Input::Mark => {
            session.toggle_mark(index)?;
        }
        Input::Clear => session.clear_response(index)?,
        Input::Palette => {
            println!("{}", palette_view(&session.palette()));
            return Ok(None);
        }
        Input::Help => {
            println!("{HELP}");
            return Ok(None);
        }
        Input::Submit => {
            let result = quiz_loop.submit(session).await?;
            return Ok(Some(SessionEnd::Submitted(result)));
        }
        Input::Quit => {
            quiz_loop.abandon(session);
            return Ok(Some(SessionEnd::Abandoned));
        }
    }
    println!("{}", question_view(session));
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ChapterFilter, Question, QuestionList};
    use quiz_core::time::fixed_clock;
    use services::HistoryService;

    fn bank() -> QuestionList {
        QuestionList::new(vec![
            Question::new("Q1", ["a", "b"], "a"),
            Question::new("Q2", ["a", "b"], "b"),
            Question::new("Q3", ["a", "b"], "a"),
        ])
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("2"), Some(Input::Choose(1)));
        assert_eq!(Input::parse("0"), None);
        assert_eq!(Input::parse(" g 3 "), Some(Input::Jump(2)));
        assert_eq!(Input::parse("g3"), Some(Input::Jump(2)));
        assert_eq!(Input::parse("n"), Some(Input::Next));
        assert_eq!(Input::parse("?"), Some(Input::Help));
        assert_eq!(Input::parse("go"), None);
    }

    #[tokio::test]
    async fn scripted_practice_submits_once() {
        let quiz_loop = QuizLoopService::new(fixed_clock(), HistoryService::in_memory());
        let mut session = QuizSession::new();
        quiz_loop
            .start_practice(&mut session, &bank(), ChapterFilter::All)
            .unwrap();

        let script: &[u8] = b"1\nn\nn\nm\nbogus\n9\ns\n";
        let end = run_session(&quiz_loop, &mut session, script).await.unwrap();

        let SessionEnd::Submitted(result) = end else {
            panic!("expected a submit, got {end:?}");
        };
        assert_eq!(result.attempt.score(), 1);
        assert!(session.is_skipped(1));
        assert!(session.is_marked(2));
        assert_eq!(quiz_loop.history().list().await.len(), 1);
    }

    #[tokio::test]
    async fn end_of_input_abandons_without_saving() {
        let quiz_loop = QuizLoopService::new(fixed_clock(), HistoryService::in_memory());
        let mut session = QuizSession::new();
        quiz_loop
            .start_test(&mut session, &bank(), ChapterFilter::All, 2)
            .unwrap();

        let script: &[u8] = b"1\n";
        let end = run_session(&quiz_loop, &mut session, script).await.unwrap();

        assert!(matches!(end, SessionEnd::Abandoned));
        assert!(!session.is_running());
        assert!(quiz_loop.history().list().await.is_empty());
    }
}
