use serde::Serialize;

use quiz_core::model::{Answer, AnswerSheet, Question, QuestionId, QuestionKind, SessionQuestion};
use quiz_core::scoring::{QuestionScore, QuestionStatus, ScoreReport};

/// Text shown in the review for a question the user never answered.
pub const NO_ANSWER: &str = "No answer";

/// Presentation-agnostic view of one question as the user sees it.
///
/// Options are in display order; `canonical` is what answer calls expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub points: f64,
    pub options: Vec<OptionView>,
    pub can_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub canonical: usize,
    pub label: String,
    pub selected: bool,
}

impl QuestionView {
    #[must_use]
    pub fn build(question: &SessionQuestion, answers: &AnswerSheet) -> Self {
        let answer = answers.get(question.id());
        let options = question
            .options()
            .iter()
            .map(|option| OptionView {
                canonical: option.canonical(),
                label: option.text().to_string(),
                selected: answer.is_some_and(|a| a.contains(option.canonical())),
            })
            .collect();

        Self {
            id: question.id(),
            text: question.question().text().to_string(),
            kind: question.question().kind(),
            points: question.question().points(),
            options,
            can_advance: answers.has_choice(question.id()),
        }
    }

    /// Canonical index of the option at a display position.
    #[must_use]
    pub fn canonical_at(&self, position: usize) -> Option<usize> {
        self.options.get(position).map(|o| o.canonical)
    }
}

/// One line of the post-session review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub id: QuestionId,
    pub text: String,
    pub status: QuestionStatus,
    pub your_answer: String,
    pub correct_answer: String,
    pub earned: f64,
    pub max: f64,
}

impl ReviewItem {
    #[must_use]
    pub fn from_score(score: &QuestionScore) -> Self {
        let question = score.question.as_ref();
        Self {
            id: question.id(),
            text: question.text().to_string(),
            status: score.status,
            your_answer: answer_text(question, score.answer.as_ref()),
            correct_answer: option_list(question, &question.correct_answer().indices()),
            earned: score.earned,
            max: score.max,
        }
    }
}

/// Review lines in report order (correct, partial, wrong).
#[must_use]
pub fn review_items(report: &ScoreReport) -> Vec<ReviewItem> {
    report.items().iter().map(ReviewItem::from_score).collect()
}

/// Option texts for canonical indices, joined with `", "`.
#[must_use]
pub fn option_list(question: &Question, indices: &[usize]) -> String {
    indices
        .iter()
        .filter_map(|&i| question.option_text(i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text of the user's answer for display, or [`NO_ANSWER`].
#[must_use]
pub fn answer_text(question: &Question, answer: Option<&Answer>) -> String {
    answer.map_or_else(|| NO_ANSWER.to_string(), |a| option_list(question, &a.indices()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AnswerKeyDraft;
    use quiz_core::scoring::ScoringEngine;
    use std::sync::Arc;

    fn multi() -> Arc<Question> {
        Arc::new(
            Question::new(
                QuestionId::new(7),
                "Pick primes",
                QuestionKind::Multiple,
                vec!["2".into(), "4".into(), "5".into()],
                AnswerKeyDraft::Many(vec![0, 2]),
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn question_view_marks_selected_in_display_order() {
        let sq = SessionQuestion::with_order(multi(), &[2, 1, 0]).unwrap();
        let mut answers = AnswerSheet::new();
        answers.toggle_multiple(sq.id(), 0);

        let view = QuestionView::build(&sq, &answers);
        assert_eq!(view.canonical_at(0), Some(2));
        assert_eq!(
            view.options.iter().map(|o| o.selected).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert!(view.can_advance);
    }

    #[test]
    fn review_renders_answers_and_missing_answer() {
        let sq = SessionQuestion::in_canonical_order(multi());
        let mut answers = AnswerSheet::new();
        let report = ScoringEngine::score(std::slice::from_ref(&sq), &answers);
        let item = &review_items(&report)[0];
        assert_eq!(item.your_answer, NO_ANSWER);
        assert_eq!(item.correct_answer, "2, 5");
        assert_eq!(item.status, QuestionStatus::Wrong);

        answers.toggle_multiple(sq.id(), 0);
        answers.toggle_multiple(sq.id(), 1);
        let report = ScoringEngine::score(std::slice::from_ref(&sq), &answers);
        let item = &review_items(&report)[0];
        assert_eq!(item.your_answer, "2, 4");
        assert_eq!(item.earned, 0.0);
    }

    #[test]
    fn views_serialize_to_json() {
        let sq = SessionQuestion::in_canonical_order(multi());
        let view = QuestionView::build(&sq, &AnswerSheet::new());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "multiple");
        assert_eq!(json["options"][1]["label"], "4");
        assert_eq!(json["can_advance"], false);
    }
}
