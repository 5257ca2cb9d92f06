use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{DEFAULT_MAX_QUESTIONS, Question, QuestionBank, SessionQuestion};

/// Questions chosen for one session, in presentation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionPlan {
    pub questions: Vec<SessionQuestion>,
}

impl SessionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Draws a bounded random subset of the bank and fixes each question's option order.
#[derive(Debug, Clone, Copy)]
pub struct SessionSampler {
    max_questions: usize,
}

impl Default for SessionSampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUESTIONS)
    }
}

impl SessionSampler {
    #[must_use]
    pub fn new(max_questions: usize) -> Self {
        Self { max_questions }
    }

    #[must_use]
    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Sample `min(max_questions, bank.len())` distinct questions.
    ///
    /// Both the question order and every option order come from `shuffle`, which
    /// is a Fisher–Yates pass: each permutation is equally likely.
    pub fn sample<R: Rng + ?Sized>(&self, bank: &QuestionBank, rng: &mut R) -> SessionPlan {
        let mut pool: Vec<Arc<Question>> = bank.questions().to_vec();
        pool.shuffle(rng);
        pool.truncate(self.max_questions);

        let questions = pool
            .into_iter()
            .map(|question| shuffle_options(question, &mut *rng))
            .collect();
        SessionPlan { questions }
    }
}

fn shuffle_options<R: Rng + ?Sized>(question: Arc<Question>, rng: &mut R) -> SessionQuestion {
    SessionQuestion::with_shuffle(question, |options| options.shuffle(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerKeyDraft, QuestionId, QuestionKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeSet, HashSet};

    fn bank(size: u64) -> QuestionBank {
        let questions = (1..=size)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    QuestionKind::Single,
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    AnswerKeyDraft::One(0),
                    None,
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(questions).unwrap()
    }

    #[test]
    fn session_size_is_min_of_cap_and_bank() {
        let mut rng = StdRng::seed_from_u64(7);
        for (size, cap, expected) in [(50, 21, 21), (3, 21, 3), (0, 21, 0), (5, 5, 5)] {
            let plan = SessionSampler::new(cap).sample(&bank(size), &mut rng);
            assert_eq!(plan.total(), expected, "bank {size}, cap {cap}");
        }
    }

    #[test]
    fn sampled_ids_are_distinct_and_from_bank() {
        let bank = bank(40);
        let plan = SessionSampler::default().sample(&bank, &mut StdRng::seed_from_u64(1));

        let ids: HashSet<QuestionId> = plan.questions.iter().map(SessionQuestion::id).collect();
        assert_eq!(ids.len(), plan.total());
        assert!(ids.iter().all(|id| bank.get(*id).is_some()));
    }

    #[test]
    fn small_bank_is_fully_used() {
        let bank = bank(3);
        let plan = SessionSampler::new(21).sample(&bank, &mut StdRng::seed_from_u64(99));

        let ids: BTreeSet<u64> = plan.questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn option_orders_are_permutations_of_canonical_indices() {
        let plan = SessionSampler::default().sample(&bank(10), &mut StdRng::seed_from_u64(3));
        for sq in &plan.questions {
            let mut order = sq.order();
            order.sort_unstable();
            assert_eq!(order, vec![0, 1, 2, 3]);
            for option in sq.options() {
                assert_eq!(
                    sq.question().option_text(option.canonical()),
                    Some(option.text())
                );
            }
        }
    }

    #[test]
    fn option_shuffle_is_not_always_identity() {
        let plan = SessionSampler::new(30).sample(&bank(30), &mut StdRng::seed_from_u64(5));
        assert!(plan.questions.iter().any(|sq| sq.order() != vec![0, 1, 2, 3]));
    }

    #[test]
    fn same_seed_gives_same_plan() {
        let bank = bank(30);
        let a = SessionSampler::default().sample(&bank, &mut StdRng::seed_from_u64(11));
        let b = SessionSampler::default().sample(&bank, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
