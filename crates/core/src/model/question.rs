use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// Answer shape and scoring rule of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// One option out of a list, shown as buttons.
    Single,
    /// Any number of options; scored with partial credit.
    Multiple,
    /// One option out of a list, shown as a select box.
    Dropdown,
}

impl QuestionKind {
    /// True for kinds whose answer is exactly one canonical index.
    #[must_use]
    pub fn is_single_answer(self) -> bool {
        matches!(self, Self::Single | Self::Dropdown)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Dropdown => "dropdown",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── CORRECT ANSWER ────────────────────────────────────────────────────────────
//

/// Validated answer key, always expressed in canonical option indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectAnswer {
    One(usize),
    Many(BTreeSet<usize>),
}

impl CorrectAnswer {
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::One(correct) => *correct == index,
            Self::Many(set) => set.contains(&index),
        }
    }

    /// Canonical indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::One(index) => vec![*index],
            Self::Many(set) => set.iter().copied().collect(),
        }
    }
}

/// Raw `correctAnswer` field: either a bare index or a list of indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKeyDraft {
    One(usize),
    Many(Vec<usize>),
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id}: text is empty")]
    EmptyText { id: QuestionId },

    #[error("question {id}: no options")]
    NoOptions { id: QuestionId },

    #[error("question {id}: correct answer {index} is out of range ({len} options)")]
    AnswerOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },

    #[error("question {id}: multiple-choice question has no correct options")]
    EmptyCorrectSet { id: QuestionId },

    #[error("question {id}: {kind} question needs exactly one correct answer, got {count}")]
    AnswerShape {
        id: QuestionId,
        kind: QuestionKind,
        count: usize,
    },

    #[error("question {id}: points must be a positive number, got {points}")]
    InvalidPoints { id: QuestionId, points: f64 },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Question record as it arrives from a bank file, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(rename = "question", alias = "text")]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", alias = "correct_answer")]
    pub correct_answer: AnswerKeyDraft,
    #[serde(default)]
    pub points: Option<f64>,
}

impl QuestionDraft {
    /// Validate the record into an immutable `Question`.
    ///
    /// Out-of-range answer indices, empty answer sets and non-positive points are
    /// rejected here so that a loaded bank never contains malformed questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` describing the first problem found.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id;
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText { id });
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }

        let points = match self.points {
            None => 1.0,
            Some(points) if points.is_finite() && points > 0.0 => points,
            Some(points) => return Err(QuestionError::InvalidPoints { id, points }),
        };

        let len = self.options.len();
        let check = |index: usize| {
            if index < len {
                Ok(index)
            } else {
                Err(QuestionError::AnswerOutOfRange { id, index, len })
            }
        };

        let correct = match (self.kind, self.correct_answer) {
            (QuestionKind::Multiple, AnswerKeyDraft::One(index)) => {
                CorrectAnswer::Many(BTreeSet::from([check(index)?]))
            }
            (QuestionKind::Multiple, AnswerKeyDraft::Many(indices)) => {
                if indices.is_empty() {
                    return Err(QuestionError::EmptyCorrectSet { id });
                }
                let set = indices
                    .into_iter()
                    .map(check)
                    .collect::<Result<BTreeSet<_>, _>>()?;
                CorrectAnswer::Many(set)
            }
            (_, AnswerKeyDraft::One(index)) => CorrectAnswer::One(check(index)?),
            (kind, AnswerKeyDraft::Many(indices)) => match indices.as_slice() {
                [index] => CorrectAnswer::One(check(*index)?),
                _ => {
                    return Err(QuestionError::AnswerShape {
                        id,
                        kind,
                        count: indices.len(),
                    });
                }
            },
        };

        Ok(Question {
            id,
            text,
            kind: self.kind,
            options: self.options,
            correct,
            points,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable, validated question definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
    options: Vec<String>,
    correct: CorrectAnswer,
    points: f64,
}

impl Question {
    /// Build and validate a question in one step.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record is malformed.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        correct_answer: AnswerKeyDraft,
        points: Option<f64>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            id,
            text: text.into(),
            kind,
            options,
            correct_answer,
            points,
        }
        .validate()
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_text(&self, canonical: usize) -> Option<&str> {
        self.options.get(canonical).map(String::as_str)
    }

    #[must_use]
    pub fn correct_answer(&self) -> &CorrectAnswer {
        &self.correct
    }

    /// Maximum points this question is worth.
    #[must_use]
    pub fn points(&self) -> f64 {
        self.points
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
