//! Interactive loop: setup, play, results, repeat.
//!
//! Input and the one-second timer tick are multiplexed with `tokio::select!`
//! on a single task, so the controller never sees concurrent calls.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use quiz_core::model::{QuestionKind, TimeLimit};
use services::{Advance, QuizController, QuizPhase, SessionError, SessionTick};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::render;

type Input = Lines<BufReader<Stdin>>;

/// What one line typed during a question means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    Finish,
    /// One-based display positions.
    Pick(Vec<usize>),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "n" | "next" => return Self::Next,
            "b" | "back" => return Self::Back,
            "q" | "quit" | "finish" => return Self::Finish,
            _ => {}
        }

        let picks: Option<Vec<usize>> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<usize>().ok().filter(|&n| n >= 1))
            .collect();
        match picks {
            Some(picks) if !picks.is_empty() => Self::Pick(picks),
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Run sessions until the user declines another one or stdin closes.
///
/// # Errors
///
/// Fails on terminal I/O errors or an unexpected controller state.
pub async fn run(controller: &mut QuizController, ask_time_limit: bool) -> anyhow::Result<()> {
    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        controller.refresh_best_grade().await;
        if ask_time_limit && !choose_time_limit(controller, &mut input).await? {
            return Ok(());
        }

        controller.start().await.context("starting session")?;
        play(controller, &mut input).await?;
        show_results(controller)?;

        let again = input.next_line().await?.unwrap_or_default();
        if !matches!(again.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            return Ok(());
        }
        controller.restart().await.context("returning to setup")?;
    }
}

/// Returns `false` if the user chose to quit.
async fn choose_time_limit(
    controller: &mut QuizController,
    input: &mut Input,
) -> anyhow::Result<bool> {
    let options: Vec<TimeLimit> = TimeLimit::options().collect();
    loop {
        render::setup(
            &mut io::stdout().lock(),
            controller.best_grade(),
            controller.settings().time_limit(),
        )?;
        let Some(line) = input.next_line().await? else {
            return Ok(false);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(false);
        }
        if line.is_empty() {
            return Ok(true);
        }
        match line.parse::<usize>().ok().and_then(|n| options.get(n.checked_sub(1)?)) {
            Some(&limit) => {
                controller.set_time_limit(limit)?;
                return Ok(true);
            }
            None => render::notice(&mut io::stdout().lock(), "Unknown choice.")?,
        }
    }
}

async fn play(controller: &mut QuizController, input: &mut Input) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    show_question(controller)?;
    flush_events(controller)?;

    while controller.phase() == QuizPhase::Active {
        tokio::select! {
            _ = ticker.tick() => {
                match controller.tick().await {
                    SessionTick::WarningEntered { .. } | SessionTick::Expired => {
                        flush_events(controller)?;
                    }
                    SessionTick::Idle | SessionTick::Running { .. } => {}
                }
            }
            line = input.next_line() => {
                match line? {
                    Some(line) => handle_line(controller, &line).await?,
                    None => {
                        debug!("stdin closed during session");
                        controller.finish_early().await;
                    }
                }
                flush_events(controller)?;
            }
        }
    }
    Ok(())
}

async fn handle_line(controller: &mut QuizController, line: &str) -> anyhow::Result<()> {
    let Some(view) = controller.question_view() else {
        return Ok(());
    };

    let outcome = match Command::parse(line) {
        Command::Next => controller.advance().await.map(|advance| {
            matches!(advance, Advance::Moved { .. })
        }),
        Command::Back => controller.back().map(|_| true),
        Command::Finish => {
            controller.finish_early().await;
            Ok(false)
        }
        Command::Pick(positions) => pick(controller, &view, &positions),
        Command::Unknown(raw) => {
            render::notice(&mut io::stdout().lock(), &format!("Not understood: {raw}"))?;
            Ok(false)
        }
    };

    match outcome {
        Ok(true) => show_question(controller)?,
        Ok(false) => {}
        Err(SessionError::Unanswered) => {
            render::notice(&mut io::stdout().lock(), "Pick an answer first.")?;
        }
        Err(err @ (SessionError::OptionOutOfRange { .. } | SessionError::KindMismatch { .. })) => {
            render::notice(&mut io::stdout().lock(), &err.to_string())?;
        }
        Err(err) => debug!(error = %err, "input ignored"),
    }
    Ok(())
}

/// Map display positions to canonical indices and record them.
fn pick(
    controller: &mut QuizController,
    view: &services::QuestionView,
    positions: &[usize],
) -> Result<bool, SessionError> {
    let mut canonical = Vec::with_capacity(positions.len());
    for &position in positions {
        let index = view
            .canonical_at(position - 1)
            .ok_or(SessionError::OptionOutOfRange {
                question: view.id,
                index: position - 1,
                len: view.options.len(),
            })?;
        canonical.push(index);
    }

    match view.kind {
        QuestionKind::Multiple => {
            for index in canonical {
                controller.toggle_multiple(view.id, index)?;
            }
        }
        QuestionKind::Single => {
            if let Some(&index) = canonical.last() {
                controller.submit_single(view.id, index)?;
            }
        }
        QuestionKind::Dropdown => {
            if let Some(&index) = canonical.last() {
                controller.submit_dropdown(view.id, index)?;
            }
        }
    }
    Ok(true)
}

fn show_question(controller: &QuizController) -> io::Result<()> {
    let (Some(view), Some(progress)) = (controller.question_view(), controller.progress()) else {
        return Ok(());
    };
    render::question(
        &mut io::stdout().lock(),
        &view,
        &progress,
        controller.timer_display().as_ref(),
    )
}

fn flush_events(controller: &mut QuizController) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for event in controller.take_events() {
        render::event(&mut out, &event)?;
    }
    out.flush()
}

fn show_results(controller: &QuizController) -> anyhow::Result<()> {
    let report = controller
        .report()
        .context("session finished without a score report")?;
    render::results(
        &mut io::stdout().lock(),
        report,
        &controller.review(),
        controller.best_grade(),
        controller.is_new_record(),
    )?;
    Ok(())
}
