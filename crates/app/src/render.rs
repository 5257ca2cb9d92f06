//! Plain-text rendering of controller state.
//!
//! Every function writes to an `impl Write` so the output can be checked in tests.

use std::io::{self, Write};

use quiz_core::model::{Grade, QuestionKind, TimeLimit};
use quiz_core::scoring::{QuestionStatus, ScoreReport};
use quiz_core::timer::TimerDisplay;
use services::{FinishReason, QuestionView, ReviewItem, SessionEvent, SessionProgress};

const BAR_WIDTH: usize = 20;

pub fn setup(out: &mut impl Write, best: Option<Grade>, current: TimeLimit) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Quiz ===")?;
    match best {
        Some(grade) => writeln!(out, "Best grade: {grade}")?,
        None => writeln!(out, "Best grade: none yet")?,
    }
    writeln!(out, "Time limit:")?;
    for (i, limit) in TimeLimit::options().enumerate() {
        let marker = if limit == current { '*' } else { ' ' };
        writeln!(out, " {marker}{}) {limit}", i + 1)?;
    }
    write!(out, "Pick a time limit (Enter keeps {current}, q quits): ")?;
    out.flush()
}

pub fn question(
    out: &mut impl Write,
    view: &QuestionView,
    progress: &SessionProgress,
    timer: Option<&TimerDisplay>,
) -> io::Result<()> {
    writeln!(out)?;
    write!(
        out,
        "{} Question {}/{}",
        progress_bar(progress),
        progress.position(),
        progress.total
    )?;
    if let Some(timer) = timer {
        write!(out, "  [{}]{}", timer.text, if timer.warning { " !" } else { "" })?;
    }
    writeln!(out)?;

    writeln!(out, "{}", view.text)?;
    for (position, option) in view.options.iter().enumerate() {
        let mark = match (view.kind, option.selected) {
            (QuestionKind::Multiple, true) => "[x]",
            (QuestionKind::Multiple, false) => "[ ]",
            (_, true) => "(*)",
            (_, false) => "( )",
        };
        writeln!(out, "  {} {mark} {}", position + 1, option.label)?;
    }
    writeln!(out, "{}", hint(view))?;
    out.flush()
}

fn hint(view: &QuestionView) -> &'static str {
    match (view.kind, view.can_advance) {
        (QuestionKind::Multiple, true) => "Toggle more numbers, n = next, b = back, q = finish",
        (QuestionKind::Multiple, false) => "Type numbers to toggle, b = back, q = finish",
        (_, true) => "Pick another number, n = next, b = back, q = finish",
        (_, false) => "Type a number, b = back, q = finish",
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_bar(progress: &SessionProgress) -> String {
    let filled = ((progress.percent() / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn event(out: &mut impl Write, event: &SessionEvent) -> io::Result<()> {
    match event {
        SessionEvent::WarningEntered { remaining_secs } => {
            writeln!(out, "! Only {remaining_secs} seconds left")?;
        }
        SessionEvent::Finished {
            reason: FinishReason::TimeExpired,
            ..
        } => writeln!(out, "Time is up!")?,
        SessionEvent::Started { .. }
        | SessionEvent::Moved { .. }
        | SessionEvent::Finished { .. } => {}
    }
    out.flush()
}

pub fn notice(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{message}")?;
    out.flush()
}

pub fn results(
    out: &mut impl Write,
    report: &ScoreReport,
    review: &[ReviewItem],
    best: Option<Grade>,
    new_record: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Results ===")?;
    writeln!(
        out,
        "Score: {:.2} / {:.2}   Grade: {}",
        report.total_points(),
        report.max_points(),
        report.grade()
    )?;
    writeln!(out, "{}", report.tier().message())?;
    if new_record {
        writeln!(out, "New best grade!")?;
    } else if let Some(best) = best {
        writeln!(out, "Best grade: {best}")?;
    }
    writeln!(
        out,
        "Correct {}  Partial {}  Wrong {}",
        report.count(QuestionStatus::Correct),
        report.count(QuestionStatus::Partial),
        report.count(QuestionStatus::Wrong)
    )?;

    for item in review {
        writeln!(out)?;
        writeln!(
            out,
            "[{}] {} ({:.2}/{:.2})",
            item.status.as_str(),
            item.text,
            item.earned,
            item.max
        )?;
        writeln!(out, "  Your answer:    {}", item.your_answer)?;
        writeln!(out, "  Correct answer: {}", item.correct_answer)?;
    }
    writeln!(out)?;
    write!(out, "Play again? [y/N] ")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;
    use services::sessions::OptionView;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn view(kind: QuestionKind, selected: bool) -> QuestionView {
        QuestionView {
            id: QuestionId::new(1),
            text: "Which?".into(),
            kind,
            points: 1.0,
            options: vec![
                OptionView {
                    canonical: 1,
                    label: "B".into(),
                    selected,
                },
                OptionView {
                    canonical: 0,
                    label: "A".into(),
                    selected: false,
                },
            ],
            can_advance: selected,
        }
    }

    fn progress(index: usize, total: usize) -> SessionProgress {
        SessionProgress {
            index,
            total,
            answered: index,
            is_complete: false,
        }
    }

    #[test]
    fn question_lists_options_in_display_order_with_marks() {
        let text = render(|out| {
            question(out, &view(QuestionKind::Multiple, true), &progress(1, 4), None)
        });
        assert!(text.contains("Question 2/4"));
        assert!(text.contains("1 [x] B"));
        assert!(text.contains("2 [ ] A"));
        assert!(text.contains("n = next"));
    }

    #[test]
    fn question_shows_timer_and_warning() {
        let timer = TimerDisplay {
            remaining_secs: 25,
            text: "00:25".into(),
            warning: true,
        };
        let text = render(|out| {
            question(out, &view(QuestionKind::Single, false), &progress(0, 2), Some(&timer))
        });
        assert!(text.contains("[00:25] !"));
        assert!(text.contains("2 ( ) A"));
        assert!(!text.contains("n = next"));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(&progress(0, 4)), format!("[{}]", "-".repeat(20)));
        assert_eq!(
            progress_bar(&progress(2, 4)),
            format!("[{}{}]", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(progress_bar(&progress(0, 0)), format!("[{}]", "-".repeat(20)));
    }

    #[test]
    fn setup_marks_current_limit() {
        let text = render(|out| setup(out, None, TimeLimit::from_secs(600).unwrap()));
        assert!(text.contains("Best grade: none yet"));
        assert!(text.contains("*3) 10 min"));
        assert!(text.contains(" 1) unlimited"));
    }
}
