use std::collections::{BTreeSet, HashMap};

use crate::model::ids::QuestionId;

/// A recorded answer, in canonical option indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// `single` / `dropdown` selection.
    Choice(usize),
    /// `multiple` selection; never empty while stored in an `AnswerSheet`.
    Choices(BTreeSet<usize>),
}

impl Answer {
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::Choice(choice) => *choice == index,
            Self::Choices(set) => set.contains(&index),
        }
    }

    /// Selected canonical indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::Choice(choice) => vec![*choice],
            Self::Choices(set) => set.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn has_choice(&self) -> bool {
        match self {
            Self::Choice(_) => true,
            Self::Choices(set) => !set.is_empty(),
        }
    }
}

/// Answers given during one session, keyed by question id.
///
/// A missing entry means the question was never answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: HashMap<QuestionId, Answer>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the answer for `question` with exactly one index.
    pub fn record_single(&mut self, question: QuestionId, index: usize) {
        self.entries.insert(question, Answer::Choice(index));
    }

    /// Flip `index` in the answer set for `question`.
    ///
    /// Returns whether the index is selected afterwards. A set that becomes empty
    /// is dropped, so the question reads as unanswered again.
    pub fn toggle_multiple(&mut self, question: QuestionId, index: usize) -> bool {
        let mut set = match self.entries.remove(&question) {
            Some(Answer::Choices(set)) => set,
            _ => BTreeSet::new(),
        };

        let selected = if set.remove(&index) {
            false
        } else {
            set.insert(index);
            true
        };

        if !set.is_empty() {
            self.entries.insert(question, Answer::Choices(set));
        }
        selected
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<&Answer> {
        self.entries.get(&question)
    }

    #[must_use]
    pub fn has_choice(&self, question: QuestionId) -> bool {
        self.get(question).is_some_and(Answer::has_choice)
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_roundtrips_and_overwrites() {
        let mut sheet = AnswerSheet::new();
        let q = QuestionId::new(1);

        sheet.record_single(q, 2);
        assert_eq!(sheet.get(q), Some(&Answer::Choice(2)));

        sheet.record_single(q, 0);
        assert_eq!(sheet.get(q), Some(&Answer::Choice(0)));
        assert_eq!(sheet.answered(), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sheet = AnswerSheet::new();
        let q = QuestionId::new(4);

        assert!(sheet.toggle_multiple(q, 0));
        assert!(sheet.toggle_multiple(q, 2));
        assert_eq!(sheet.get(q).unwrap().indices(), vec![0, 2]);

        assert!(!sheet.toggle_multiple(q, 0));
        assert_eq!(sheet.get(q).unwrap().indices(), vec![2]);
        assert!(sheet.has_choice(q));
    }

    #[test]
    fn emptied_set_reads_as_unanswered() {
        let mut sheet = AnswerSheet::new();
        let q = QuestionId::new(4);

        sheet.toggle_multiple(q, 1);
        sheet.toggle_multiple(q, 1);

        assert!(sheet.get(q).is_none());
        assert!(!sheet.has_choice(q));
        assert_eq!(sheet.answered(), 0);
    }

    #[test]
    fn unanswered_question_is_absent() {
        let sheet = AnswerSheet::new();
        assert!(sheet.get(QuestionId::new(9)).is_none());
    }
}
