mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{SessionPlan, SessionSampler};
pub use progress::SessionProgress;
pub use service::{Advance, FinishReason, QuizSession, SessionTick};
pub use view::{
    NO_ANSWER, OptionView, QuestionView, ReviewItem, answer_text, option_list, review_items,
};
pub use workflow::{QuizController, QuizPhase, SessionEvent};
