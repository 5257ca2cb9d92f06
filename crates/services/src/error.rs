//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{BankError, QuestionId, QuestionKind};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading a question bank. All of them are fatal for setup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("cannot read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Errors emitted by session services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no question bank loaded")]
    NoBank,
    #[error("a session is already in progress")]
    AlreadyActive,
    #[error("no active session")]
    NotActive,
    #[error("session has not finished")]
    NotFinished,
    #[error("question {0} is not part of this session")]
    UnknownQuestion(QuestionId),
    #[error("option {index} is out of range for question {question} ({len} options)")]
    OptionOutOfRange {
        question: QuestionId,
        index: usize,
        len: usize,
    },
    #[error("question {question} is a {kind} question")]
    KindMismatch {
        question: QuestionId,
        kind: QuestionKind,
    },
    #[error("current question has no answer yet")]
    Unanswered,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
