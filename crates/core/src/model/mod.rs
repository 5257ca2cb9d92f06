mod answer;
mod bank;
mod grade;
mod ids;
mod question;
mod session;
mod settings;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use answer::{Answer, AnswerSheet};
pub use bank::{BankError, QuestionBank};
pub use grade::{FeedbackTier, Grade, GradeError, GRADE_MAX, GRADE_MIN};
pub use question::{
    AnswerKeyDraft, CorrectAnswer, Question, QuestionDraft, QuestionError, QuestionKind,
};
pub use session::{SessionQuestion, SessionQuestionError, ShuffledOption};
pub use settings::{
    BankSource, QuizSettings, QuizSettingsDraft, SettingsError, TimeLimit, DEFAULT_MAX_QUESTIONS,
};
