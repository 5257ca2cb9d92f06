use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BankError {
    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error("invalid question at position {position}: {source}")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: QuestionError,
    },
}

/// Immutable pool of questions a session samples from.
///
/// Questions are shared behind `Arc` so sampled sessions do not copy option lists.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
}

impl QuestionBank {
    /// Build a bank from already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(BankError::DuplicateId(question.id()));
            }
        }

        Ok(Self {
            questions: questions.into_iter().map(Arc::new).collect(),
        })
    }

    /// Validate raw records and build a bank, failing on the first bad record.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidQuestion` for malformed records and
    /// `BankError::DuplicateId` for repeated ids.
    pub fn from_drafts(drafts: impl IntoIterator<Item = QuestionDraft>) -> Result<Self, BankError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| {
                draft
                    .validate()
                    .map_err(|source| BankError::InvalidQuestion { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    #[must_use]
    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Arc<Question>> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{AnswerKeyDraft, QuestionKind};

    fn draft(id: u64, correct: usize) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(id),
            text: format!("Q{id}"),
            kind: QuestionKind::Single,
            options: vec!["a".into(), "b".into()],
            correct_answer: AnswerKeyDraft::One(correct),
            points: None,
        }
    }

    #[test]
    fn builds_bank_from_valid_drafts() {
        let bank = QuestionBank::from_drafts(vec![draft(1, 0), draft(2, 1)]).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(QuestionId::new(2)).unwrap().text(), "Q2");
        assert!(bank.get(QuestionId::new(9)).is_none());
    }

    #[test]
    fn reports_position_of_bad_record() {
        let err = QuestionBank::from_drafts(vec![draft(1, 0), draft(2, 5)]).unwrap_err();
        assert!(matches!(err, BankError::InvalidQuestion { position: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = QuestionBank::from_drafts(vec![draft(1, 0), draft(1, 1)]).unwrap_err();
        assert_eq!(err, BankError::DuplicateId(QuestionId::new(1)));
    }

    #[test]
    fn empty_bank_is_allowed() {
        let bank = QuestionBank::from_drafts(Vec::new()).unwrap();
        assert!(bank.is_empty());
    }
}
