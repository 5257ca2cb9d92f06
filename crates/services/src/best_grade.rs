use std::sync::Arc;

use quiz_core::model::Grade;
use storage::repository::KeyValueStore;
use tracing::{debug, warn};

/// Store key holding the best grade as a two-decimal string.
pub const BEST_GRADE_KEY: &str = "quiz.best_grade";

/// Persists the highest grade ever reached.
///
/// Store failures never abort a session: reads degrade to "no record" and
/// failed writes report no new record.
#[derive(Clone)]
pub struct BestGradeTracker {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl BestGradeTracker {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: BEST_GRADE_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Current best grade, or `None` if nothing usable is stored.
    pub async fn load(&self) -> Option<Grade> {
        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "best grade unavailable");
                return None;
            }
        };

        match Grade::parse_persisted(&raw) {
            Ok(grade) => Some(grade),
            Err(err) => {
                warn!(error = %err, "ignoring corrupt best grade");
                None
            }
        }
    }

    /// Record `grade` if it is strictly greater than the stored best.
    /// Returns `true` for a new record.
    pub async fn submit(&self, grade: Grade) -> bool {
        let best = self.load().await.map_or(0.0, Grade::value);
        if grade.value() <= best {
            debug!(grade = %grade, best, "no new best grade");
            return false;
        }

        match self.store.set(&self.key, &grade.to_persisted()).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, grade = %grade, "failed to persist best grade");
                false
            }
        }
    }
}
