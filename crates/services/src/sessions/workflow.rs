use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use quiz_core::model::{Grade, QuestionBank, QuestionId, QuizSettings, SessionId, TimeLimit};
use quiz_core::scoring::ScoreReport;
use quiz_core::timer::TimerDisplay;

use super::plan::SessionSampler;
use super::progress::SessionProgress;
use super::service::{Advance, FinishReason, QuizSession, SessionTick};
use super::view::{QuestionView, ReviewItem, review_items};
use crate::Clock;
use crate::best_grade::BestGradeTracker;
use crate::error::SessionError;

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    /// Setup screen: choose a time limit, see the best grade.
    Idle,
    Active,
    /// Scoring done, review visible.
    Finished,
}

/// Transition notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        session: SessionId,
        total: usize,
        time_limit: TimeLimit,
    },
    Moved {
        index: usize,
    },
    WarningEntered {
        remaining_secs: u64,
    },
    Finished {
        reason: FinishReason,
        grade: Grade,
        new_record: bool,
    },
}

/// Drives one quiz at a time through Idle, Active and Finished.
///
/// Owns the current [`QuizSession`]; starting a new one discards the previous
/// session entirely. Every finish path (last `advance`, timer expiry, early
/// finish) scores once and forwards the grade to the best-grade tracker.
pub struct QuizController {
    clock: Clock,
    bank: Option<Arc<QuestionBank>>,
    settings: QuizSettings,
    sampler: SessionSampler,
    tracker: BestGradeTracker,
    rng: StdRng,
    session: Option<QuizSession>,
    phase: QuizPhase,
    best_grade: Option<Grade>,
    last_new_record: bool,
    events: Vec<SessionEvent>,
}

impl QuizController {
    #[must_use]
    pub fn new(settings: QuizSettings, tracker: BestGradeTracker) -> Self {
        Self {
            clock: Clock::default(),
            bank: None,
            sampler: SessionSampler::new(settings.max_questions()),
            settings,
            tracker,
            rng: StdRng::from_os_rng(),
            session: None,
            phase: QuizPhase::Idle,
            best_grade: None,
            last_new_record: false,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Make sampling reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_bank(mut self, bank: Arc<QuestionBank>) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn set_bank(&mut self, bank: Arc<QuestionBank>) {
        self.bank = Some(bank);
    }

    #[must_use]
    pub fn bank(&self) -> Option<&QuestionBank> {
        self.bank.as_deref()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn best_grade(&self) -> Option<Grade> {
        self.best_grade
    }

    /// Whether the last finished session set a new best grade.
    #[must_use]
    pub fn is_new_record(&self) -> bool {
        self.last_new_record
    }

    /// Reload the best grade from storage for the setup screen.
    pub async fn refresh_best_grade(&mut self) -> Option<Grade> {
        self.best_grade = self.tracker.load().await;
        self.best_grade
    }

    /// Choose the time limit for the next session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` while a session is running.
    pub fn set_time_limit(&mut self, time_limit: TimeLimit) -> Result<(), SessionError> {
        if self.phase == QuizPhase::Active {
            return Err(SessionError::AlreadyActive);
        }
        self.settings = self.settings.with_time_limit(time_limit);
        Ok(())
    }

    /// Drain transition events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Sample a fresh session and start its countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoBank` before a bank is set and
    /// `SessionError::AlreadyActive` while a session is running.
    pub async fn start(&mut self) -> Result<SessionId, SessionError> {
        if self.phase == QuizPhase::Active {
            return Err(SessionError::AlreadyActive);
        }
        let bank = self.bank.clone().ok_or(SessionError::NoBank)?;

        let now = self.clock.now();
        let plan = self.sampler.sample(&bank, &mut self.rng);
        let time_limit = self.settings.time_limit();
        let session = QuizSession::new(plan, time_limit, now);
        let id = session.id();
        let total = session.total();

        self.session = Some(session);
        self.phase = QuizPhase::Active;
        self.last_new_record = false;
        self.events.push(SessionEvent::Started {
            session: id,
            total,
            time_limit,
        });
        info!(session = %id, total, %time_limit, "quiz session started");

        // A bank with nothing to sample finishes on the spot.
        if self.session.as_ref().is_some_and(|s| !s.is_active()) {
            self.complete().await;
        }
        Ok(id)
    }

    /// Move past the current question; scores the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session and
    /// `SessionError::Unanswered` if the current question has no choice.
    pub async fn advance(&mut self) -> Result<Advance, SessionError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        let outcome = session.advance(now)?;
        match outcome {
            Advance::Moved { index } => {
                self.events.push(SessionEvent::Moved { index });
            }
            Advance::Finished => self.complete().await,
            Advance::Ignored => debug!("advance ignored after finish"),
        }
        Ok(outcome)
    }

    /// Return to the previous question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` unless a session is running.
    pub fn back(&mut self) -> Result<usize, SessionError> {
        let index = self.active_session_mut()?.back()?;
        self.events.push(SessionEvent::Moved { index });
        Ok(index)
    }

    /// Tick the countdown with the controller clock.
    pub async fn tick(&mut self) -> SessionTick {
        let now = self.clock.now();
        self.tick_at(now).await
    }

    /// Tick the countdown at `now`; expiry finishes and scores the session.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> SessionTick {
        let Some(session) = self.session.as_mut() else {
            return SessionTick::Idle;
        };
        let tick = session.tick(now);
        match tick {
            SessionTick::WarningEntered { remaining_secs } => {
                self.events
                    .push(SessionEvent::WarningEntered { remaining_secs });
            }
            SessionTick::Expired => self.complete().await,
            SessionTick::Idle | SessionTick::Running { .. } => {}
        }
        tick
    }

    /// End the running session now, as if time had run out.
    ///
    /// Returns `false` if no session was running.
    pub async fn force_finish(&mut self) -> bool {
        self.finish_with(FinishReason::TimeExpired).await
    }

    /// End the running session at the user's request; unanswered questions score zero.
    ///
    /// Returns `false` if no session was running.
    pub async fn finish_early(&mut self) -> bool {
        self.finish_with(FinishReason::Abandoned).await
    }

    async fn finish_with(&mut self, reason: FinishReason) -> bool {
        let now = self.clock.now();
        let finished = self
            .session
            .as_mut()
            .is_some_and(|s| s.finish(now, reason));
        if finished {
            self.complete().await;
        }
        finished
    }

    /// Leave the review and go back to setup.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` unless the last session has finished.
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        if self.phase != QuizPhase::Finished {
            return Err(SessionError::NotFinished);
        }
        self.session = None;
        self.phase = QuizPhase::Idle;
        self.last_new_record = false;
        self.refresh_best_grade().await;
        Ok(())
    }

    async fn complete(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(report) = session.report() else {
            return;
        };
        let grade = report.grade();
        let reason = session.finish_reason().unwrap_or(FinishReason::Completed);
        let id = session.id();
        let total_points = report.total_points();
        let max_points = report.max_points();

        self.phase = QuizPhase::Finished;
        let new_record = self.tracker.submit(grade).await;
        if new_record {
            self.best_grade = Some(grade);
        }
        self.last_new_record = new_record;
        self.events.push(SessionEvent::Finished {
            reason,
            grade,
            new_record,
        });
        info!(
            session = %id,
            ?reason,
            total_points,
            max_points,
            %grade,
            new_record,
            "quiz session finished"
        );
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Record a `single` answer by canonical index. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Propagates [`QuizSession::submit_single`] errors.
    pub fn submit_single(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        self.active_session_mut()?.submit_single(question, index)
    }

    /// Flip a `multiple` option by canonical index. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Propagates [`QuizSession::toggle_multiple`] errors.
    pub fn toggle_multiple(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        self.active_session_mut()?.toggle_multiple(question, index)
    }

    /// Record a `dropdown` answer by canonical index. Returns the "can advance" flag.
    ///
    /// # Errors
    ///
    /// Propagates [`QuizSession::submit_dropdown`] errors.
    pub fn submit_dropdown(
        &mut self,
        question: QuestionId,
        index: usize,
    ) -> Result<bool, SessionError> {
        self.active_session_mut()?.submit_dropdown(question, index)
    }

    fn active_session_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        match self.session.as_mut() {
            Some(session) if session.is_active() => Ok(session),
            _ => Err(SessionError::NotActive),
        }
    }

    //
    // ─── VIEWS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn question_view(&self) -> Option<QuestionView> {
        let session = self.session.as_ref()?;
        let current = session.current()?;
        Some(QuestionView::build(current, session.answers()))
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.session.as_ref().is_some_and(QuizSession::can_advance)
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(QuizSession::progress)
    }

    #[must_use]
    pub fn timer_display(&self) -> Option<TimerDisplay> {
        self.session
            .as_ref()
            .and_then(|s| s.timer_display(self.clock.now()))
    }

    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        self.session.as_ref().and_then(QuizSession::report)
    }

    #[must_use]
    pub fn review(&self) -> Vec<ReviewItem> {
        self.report().map(review_items).unwrap_or_default()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
