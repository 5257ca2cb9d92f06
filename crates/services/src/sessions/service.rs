use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{Answer, AnswerSheet, QuestionId, SessionId, SessionQuestion, TimeLimit};
use quiz_core::scoring::{ScoreReport, ScoringEngine};
use quiz_core::timer::{Countdown, Tick, TimerDisplay};

use super::plan::SessionPlan;
use super::progress::SessionProgress;
use crate::error::SessionError;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// The user advanced past the last question.
    Completed,
    /// The countdown ran out.
    TimeExpired,
    /// The user ended the session before the last question.
    Abandoned,
    /// The session had no questions to begin with.
    Empty,
}

/// Result of trying to move past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Finished,
    /// The session had already ended; nothing changed.
    Ignored,
}

/// Result of a timer tick as seen by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTick {
    Idle,
    Running { remaining_secs: u64, warning: bool },
    WarningEntered { remaining_secs: u64 },
    /// Time ran out on this tick and the session was scored.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz attempt.
///
/// Holds the sampled questions, the cursor, the answer sheet and the countdown.
/// `active` is the single switch both finish paths check, so scoring happens at
/// most once whichever of advance or expiry gets there first.
pub struct QuizSession {
    id: SessionId,
    questions: Vec<SessionQuestion>,
    cursor: usize,
    answers: AnswerSheet,
    countdown: Countdown,
    active: bool,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    finish_reason: Option<FinishReason>,
    report: Option<ScoreReport>,
}

impl QuizSession {
    /// Start a session over `plan`. An empty plan finishes immediately.
    #[must_use]
    pub fn new(plan: SessionPlan, time_limit: TimeLimit, started_at: DateTime<Utc>) -> Self {
        let mut session = Self {
            id: SessionId::new_random(),
            questions: plan.questions,
            cursor: 0,
            answers: AnswerSheet::new(),
            countdown: Countdown::start(time_limit.secs(), started_at),
            active: true,
            started_at,
            finished_at: None,
            finish_reason: None,
            report: None,
        };
        if session.questions.is_empty() {
            session.finish(started_at, FinishReason::Empty);
        }
        session
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current(&self) -> Option<&SessionQuestion> {
        if self.active {
            self.questions.get(self.cursor)
        } else {
            None
        }
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, question: QuestionId) -> Option<&Answer> {
        self.answers.get(question)
    }

    /// Whether "next" should be enabled: the current question has a choice.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current()
            .is_some_and(|sq| self.answers.has_choice(sq.id()))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            index: if self.active { self.cursor } else { self.total() },
            total: self.total(),
            answered: self.answers.answered(),
            is_complete: !self.active,
        }
    }

    #[must_use]
    pub fn timer_display(&self, now: DateTime<Utc>) -> Option<TimerDisplay> {
        self.countdown.display(now)
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Record the answer to a `single` question. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is over, the question is not in it,
    /// the index is out of range or the question takes a set of answers.
    pub fn submit_single(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        self.record_choice(question, index)
    }

    /// Record the answer to a `dropdown` question. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Same conditions as [`QuizSession::submit_single`].
    pub fn submit_dropdown(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        self.record_choice(question, index)
    }

    /// Flip one option of a `multiple` question. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is over, the question is not in it,
    /// the index is out of range or the question takes a single answer.
    pub fn toggle_multiple(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        let sq = self.locate(question, index)?;
        if sq.question().kind().is_single_answer() {
            return Err(SessionError::KindMismatch {
                question,
                kind: sq.question().kind(),
            });
        }
        self.answers.toggle_multiple(question, index);
        Ok(self.can_advance())
    }

    fn record_choice(&mut self, question: QuestionId, index: usize) -> Result<bool, SessionError> {
        let sq = self.locate(question, index)?;
        if !sq.question().kind().is_single_answer() {
            return Err(SessionError::KindMismatch {
                question,
                kind: sq.question().kind(),
            });
        }
        self.answers.record_single(question, index);
        Ok(self.can_advance())
    }

    fn locate(&self, question: QuestionId, index: usize) -> Result<&SessionQuestion, SessionError> {
        if !self.active {
            return Err(SessionError::NotActive);
        }
        let sq = self
            .questions
            .iter()
            .find(|sq| sq.id() == question)
            .ok_or(SessionError::UnknownQuestion(question))?;
        let len = sq.options().len();
        if index >= len {
            return Err(SessionError::OptionOutOfRange {
                question,
                index,
                len,
            });
        }
        Ok(sq)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Move to the next question, or finish after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unanswered` if the current question has no choice yet.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        if !self.active {
            return Ok(Advance::Ignored);
        }
        if !self.can_advance() {
            return Err(SessionError::Unanswered);
        }

        self.cursor += 1;
        if self.cursor >= self.questions.len() {
            self.finish(now, FinishReason::Completed);
            return Ok(Advance::Finished);
        }
        Ok(Advance::Moved { index: self.cursor })
    }

    /// Step back one question; answers already given are kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` once the session is over.
    pub fn back(&mut self) -> Result<usize, SessionError> {
        if !self.active {
            return Err(SessionError::NotActive);
        }
        self.cursor = self.cursor.saturating_sub(1);
        Ok(self.cursor)
    }

    //
    // ─── TIME & FINISH ─────────────────────────────────────────────────────────
    //

    /// Advance the countdown; expiry force-finishes the session.
    pub fn tick(&mut self, now: DateTime<Utc>) -> SessionTick {
        if !self.active {
            return SessionTick::Idle;
        }
        match self.countdown.tick(now) {
            Tick::Idle => SessionTick::Idle,
            Tick::Running {
                remaining_secs,
                warning,
            } => SessionTick::Running {
                remaining_secs,
                warning,
            },
            Tick::WarningEntered { remaining_secs } => {
                SessionTick::WarningEntered { remaining_secs }
            }
            Tick::Expired => {
                if self.finish(now, FinishReason::TimeExpired) {
                    SessionTick::Expired
                } else {
                    SessionTick::Idle
                }
            }
        }
    }

    /// End the session and score it. Returns `false` if it had already ended.
    pub fn finish(&mut self, now: DateTime<Utc>, reason: FinishReason) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.countdown.stop(now);
        self.report = Some(ScoringEngine::score(&self.questions, &self.answers));
        self.finished_at = Some(now);
        self.finish_reason = Some(reason);
        true
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("answered", &self.answers.answered())
            .field("active", &self.active)
            .field("started_at", &self.started_at)
            .field("finish_reason", &self.finish_reason)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AnswerKeyDraft, Question, QuestionKind};
    use quiz_core::scoring::QuestionStatus;
    use quiz_core::time::fixed_now;
    use std::sync::Arc;

    fn question(id: u64, kind: QuestionKind, key: AnswerKeyDraft) -> SessionQuestion {
        let q = Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            kind,
            vec!["a".into(), "b".into(), "c".into()],
            key,
            None,
        )
        .unwrap();
        SessionQuestion::with_order(Arc::new(q), &[2, 0, 1]).unwrap()
    }

    fn plan() -> SessionPlan {
        SessionPlan {
            questions: vec![
                question(1, QuestionKind::Single, AnswerKeyDraft::One(0)),
                question(2, QuestionKind::Multiple, AnswerKeyDraft::Many(vec![0, 1])),
                question(3, QuestionKind::Dropdown, AnswerKeyDraft::One(2)),
            ],
        }
    }

    fn limit(secs: u64) -> TimeLimit {
        TimeLimit::from_secs(secs).unwrap()
    }

    #[test]
    fn next_is_gated_on_an_answer() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        assert!(!session.can_advance());
        assert_eq!(session.advance(fixed_now()), Err(SessionError::Unanswered));

        assert!(session.submit_single(QuestionId::new(1), 0).unwrap());
        assert_eq!(session.advance(fixed_now()), Ok(Advance::Moved { index: 1 }));
    }

    #[test]
    fn toggling_to_empty_disables_next() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        session.submit_single(QuestionId::new(1), 0).unwrap();
        session.advance(fixed_now()).unwrap();

        assert!(session.toggle_multiple(QuestionId::new(2), 1).unwrap());
        assert!(!session.toggle_multiple(QuestionId::new(2), 1).unwrap());
        assert!(session.answer(QuestionId::new(2)).is_none());
    }

    #[test]
    fn answers_are_stored_by_canonical_index() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        let sq = session.current().unwrap().clone();
        // displayed first is canonical 2
        let canonical = sq.canonical_at(0).unwrap();
        session.submit_single(sq.id(), canonical).unwrap();

        assert_eq!(session.answer(sq.id()), Some(&Answer::Choice(2)));
    }

    #[test]
    fn rejects_wrong_kind_unknown_question_and_bad_index() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());

        assert!(matches!(
            session.toggle_multiple(QuestionId::new(1), 0),
            Err(SessionError::KindMismatch { .. })
        ));
        assert!(matches!(
            session.submit_single(QuestionId::new(2), 0),
            Err(SessionError::KindMismatch { .. })
        ));
        assert_eq!(
            session.submit_single(QuestionId::new(99), 0),
            Err(SessionError::UnknownQuestion(QuestionId::new(99)))
        );
        assert!(matches!(
            session.submit_dropdown(QuestionId::new(3), 3),
            Err(SessionError::OptionOutOfRange { index: 3, len: 3, .. })
        ));
    }

    #[test]
    fn back_restores_previous_answer() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        session.submit_single(QuestionId::new(1), 1).unwrap();
        session.advance(fixed_now()).unwrap();

        assert_eq!(session.back(), Ok(0));
        assert_eq!(session.back(), Ok(0));
        assert!(session.can_advance());
        assert_eq!(session.answer(QuestionId::new(1)), Some(&Answer::Choice(1)));
    }

    #[test]
    fn completing_scores_once() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        session.submit_single(QuestionId::new(1), 0).unwrap();
        session.advance(fixed_now()).unwrap();
        session.toggle_multiple(QuestionId::new(2), 0).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_dropdown(QuestionId::new(3), 2).unwrap();

        assert_eq!(session.advance(fixed_now()), Ok(Advance::Finished));
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));

        let report = session.report().unwrap();
        assert_eq!(report.total_points(), 2.5);
        assert_eq!(report.count(QuestionStatus::Partial), 1);

        assert_eq!(session.advance(fixed_now()), Ok(Advance::Ignored));
        assert!(!session.finish(fixed_now(), FinishReason::TimeExpired));
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
        assert_eq!(
            session.submit_single(QuestionId::new(1), 0),
            Err(SessionError::NotActive)
        );
    }

    #[test]
    fn empty_plan_finishes_immediately_at_minimum_grade() {
        let session = QuizSession::new(SessionPlan::default(), limit(300), fixed_now());
        assert!(!session.is_active());
        assert_eq!(session.finish_reason(), Some(FinishReason::Empty));
        assert_eq!(session.report().unwrap().grade().value(), 1.0);
        assert!(!session.countdown().is_ticking());
    }

    #[test]
    fn expiry_force_finishes_with_unanswered_as_zero() {
        let start = fixed_now();
        let mut session = QuizSession::new(plan(), limit(300), start);
        session.submit_single(QuestionId::new(1), 0).unwrap();

        assert_eq!(
            session.tick(start + Duration::seconds(270)),
            SessionTick::WarningEntered { remaining_secs: 30 }
        );
        assert_eq!(session.tick(start + Duration::seconds(300)), SessionTick::Expired);
        assert_eq!(session.finish_reason(), Some(FinishReason::TimeExpired));
        assert_eq!(session.report().unwrap().total_points(), 1.0);

        assert_eq!(session.tick(start + Duration::seconds(301)), SessionTick::Idle);
    }

    #[test]
    fn manual_finish_stops_the_countdown() {
        let start = fixed_now();
        let one_question = SessionPlan {
            questions: vec![question(1, QuestionKind::Single, AnswerKeyDraft::One(0))],
        };
        let mut session = QuizSession::new(one_question, limit(300), start);
        session.submit_single(QuestionId::new(1), 0).unwrap();
        session.advance(start + Duration::seconds(40)).unwrap();

        assert!(!session.countdown().is_ticking());
        let shown = session.timer_display(start + Duration::seconds(200)).unwrap();
        assert_eq!(shown.text, "04:20");
        assert_eq!(session.tick(start + Duration::seconds(900)), SessionTick::Idle);
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
    }

    #[test]
    fn progress_reports_cursor_and_completion() {
        let mut session = QuizSession::new(plan(), TimeLimit::UNLIMITED, fixed_now());
        session.submit_single(QuestionId::new(1), 0).unwrap();
        session.advance(fixed_now()).unwrap();

        let progress = session.progress();
        assert_eq!(progress.index, 1);
        assert_eq!(progress.position(), 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert!(!progress.is_complete);
    }
}
