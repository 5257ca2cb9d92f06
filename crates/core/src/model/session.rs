use std::sync::Arc;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionQuestionError {
    #[error("option order is not a permutation of 0..{len}")]
    NotAPermutation { len: usize },
}

/// One option as displayed, remembering where it sits in the original list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffledOption {
    canonical: usize,
    text: String,
}

impl ShuffledOption {
    /// Index in the question's original option list.
    #[must_use]
    pub fn canonical(&self) -> usize {
        self.canonical
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A question assigned to a session together with its display order.
///
/// The order is fixed when the session is built; every render of the question
/// within that session sees the same arrangement.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionQuestion {
    question: Arc<Question>,
    options: Vec<ShuffledOption>,
}

impl SessionQuestion {
    /// Options in their original order.
    #[must_use]
    pub fn in_canonical_order(question: Arc<Question>) -> Self {
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(canonical, text)| ShuffledOption {
                canonical,
                text: text.clone(),
            })
            .collect();
        Self { question, options }
    }

    /// Let `shuffle` reorder the options once; the result is kept for the session.
    #[must_use]
    pub fn with_shuffle(
        question: Arc<Question>,
        shuffle: impl FnOnce(&mut [ShuffledOption]),
    ) -> Self {
        let mut session_question = Self::in_canonical_order(question);
        shuffle(&mut session_question.options);
        session_question
    }

    /// Arrange options by an explicit display order of canonical indices.
    ///
    /// # Errors
    ///
    /// Returns `SessionQuestionError::NotAPermutation` unless `order` lists every
    /// canonical index exactly once.
    pub fn with_order(
        question: Arc<Question>,
        order: &[usize],
    ) -> Result<Self, SessionQuestionError> {
        let len = question.options().len();
        let mut seen = vec![false; len];
        for &index in order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(SessionQuestionError::NotAPermutation { len }),
            }
        }
        if order.len() != len {
            return Err(SessionQuestionError::NotAPermutation { len });
        }

        let options = order
            .iter()
            .map(|&canonical| ShuffledOption {
                canonical,
                text: question.options()[canonical].clone(),
            })
            .collect();
        Ok(Self { question, options })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id()
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn shared_question(&self) -> Arc<Question> {
        Arc::clone(&self.question)
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[ShuffledOption] {
        &self.options
    }

    /// Canonical index of the option shown at `position`.
    #[must_use]
    pub fn canonical_at(&self, position: usize) -> Option<usize> {
        self.options.get(position).map(ShuffledOption::canonical)
    }

    /// Display position of the option with the given canonical index.
    #[must_use]
    pub fn position_of(&self, canonical: usize) -> Option<usize> {
        self.options.iter().position(|o| o.canonical == canonical)
    }

    /// Canonical display order, e.g. `[2, 0, 1]`.
    #[must_use]
    pub fn order(&self) -> Vec<usize> {
        self.options.iter().map(ShuffledOption::canonical).collect()
    }
}
