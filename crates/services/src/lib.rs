#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_loader;
pub mod best_grade;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use bank_loader::{QuestionBankLoader, parse_bank};
pub use best_grade::{BEST_GRADE_KEY, BestGradeTracker};
pub use error::{AppServicesError, BankLoadError, SessionError};

pub use sessions::{
    Advance, FinishReason, QuestionView, QuizController, QuizPhase, QuizSession, ReviewItem,
    SessionEvent, SessionPlan, SessionProgress, SessionSampler, SessionTick,
};
