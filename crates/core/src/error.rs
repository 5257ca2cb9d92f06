use thiserror::Error;

use crate::model::{BankError, GradeError, QuestionError, SessionQuestionError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    SessionQuestion(#[from] SessionQuestionError),
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
