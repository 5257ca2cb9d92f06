use std::sync::Arc;

use quiz_core::model::QuizSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::bank_loader::QuestionBankLoader;
use crate::best_grade::BestGradeTracker;
use crate::error::AppServicesError;
use crate::sessions::QuizController;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    loader: QuestionBankLoader,
    best_grade: BestGradeTracker,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services that keep the best grade only for this process.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            clock,
            loader: QuestionBankLoader::new(),
            best_grade: BestGradeTracker::new(Arc::clone(&storage.kv)),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn loader(&self) -> &QuestionBankLoader {
        &self.loader
    }

    #[must_use]
    pub fn best_grade(&self) -> BestGradeTracker {
        self.best_grade.clone()
    }

    /// A fresh controller in the Idle phase.
    #[must_use]
    pub fn controller(&self, settings: QuizSettings) -> QuizController {
        QuizController::new(settings, self.best_grade()).with_clock(self.clock)
    }
}
