//! Grading of a finished session.
//!
//! Single-answer questions are all-or-nothing. Multi-select questions earn
//! `max(0, (matches - mistakes) / |correct|)` of their points, so a wrong pick
//! cancels a right one.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{
    Answer, AnswerSheet, CorrectAnswer, FeedbackTier, Grade, Question, QuestionKind,
    SessionQuestion,
};

/// Outcome of a single question.
///
/// Variant order is the review order: correct first, wrong last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Correct,
    Partial,
    Wrong,
}

impl QuestionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Partial => "partial",
            Self::Wrong => "wrong",
        }
    }
}

/// Per-question line of a score report.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionScore {
    pub question: Arc<Question>,
    pub answer: Option<Answer>,
    pub earned: f64,
    pub max: f64,
    pub status: QuestionStatus,
}

/// Full breakdown of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    items: Vec<QuestionScore>,
    total_points: f64,
    max_points: f64,
    grade: Grade,
}

impl ScoreReport {
    /// Per-question results, correct first, then partial, then wrong.
    /// Within a tier the session order is kept.
    #[must_use]
    pub fn items(&self) -> &[QuestionScore] {
        &self.items
    }

    #[must_use]
    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    #[must_use]
    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn tier(&self) -> FeedbackTier {
        self.grade.tier()
    }

    #[must_use]
    pub fn count(&self, status: QuestionStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.items.len()
    }
}

/// Ratio of credit for a multi-select answer, in `0.0..=1.0`.
///
/// An empty `correct` set yields zero instead of dividing by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn partial_credit_ratio(correct: &BTreeSet<usize>, chosen: &BTreeSet<usize>) -> f64 {
    if correct.is_empty() {
        return 0.0;
    }
    let matches = chosen.intersection(correct).count() as f64;
    let mistakes = chosen.difference(correct).count() as f64;
    ((matches - mistakes) / correct.len() as f64).max(0.0)
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Earned points and status for one question.
    #[must_use]
    pub fn score_question(question: &Question, answer: Option<&Answer>) -> (f64, QuestionStatus) {
        let points = question.points();
        match question.kind() {
            QuestionKind::Single | QuestionKind::Dropdown => {
                let hit = match (question.correct_answer(), answer) {
                    (CorrectAnswer::One(correct), Some(Answer::Choice(choice))) => {
                        correct == choice
                    }
                    _ => false,
                };
                if hit {
                    (points, QuestionStatus::Correct)
                } else {
                    (0.0, QuestionStatus::Wrong)
                }
            }
            QuestionKind::Multiple => {
                let correct: BTreeSet<usize> =
                    question.correct_answer().indices().into_iter().collect();
                let chosen: BTreeSet<usize> = answer
                    .map(|a| a.indices().into_iter().collect())
                    .unwrap_or_default();

                let ratio = partial_credit_ratio(&correct, &chosen);
                let status = if ratio >= 1.0 {
                    QuestionStatus::Correct
                } else if ratio > 0.0 {
                    QuestionStatus::Partial
                } else {
                    QuestionStatus::Wrong
                };
                (ratio * points, status)
            }
        }
    }

    /// Score every session question against a snapshot of the answers.
    #[must_use]
    pub fn score(questions: &[SessionQuestion], answers: &AnswerSheet) -> ScoreReport {
        let mut items: Vec<QuestionScore> = questions
            .iter()
            .map(|sq| {
                let answer = answers.get(sq.id()).cloned();
                let (earned, status) = Self::score_question(sq.question(), answer.as_ref());
                QuestionScore {
                    question: sq.shared_question(),
                    answer,
                    earned,
                    max: sq.question().points(),
                    status,
                }
            })
            .collect();

        let total_points: f64 = items.iter().map(|i| i.earned).sum();
        let max_points: f64 = items.iter().map(|i| i.max).sum();

        // stable: keeps session order inside each status tier
        items.sort_by_key(|i| i.status);

        ScoreReport {
            items,
            total_points,
            max_points,
            grade: Grade::from_points(total_points, max_points),
        }
    }
}
