/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SessionProgress {
    /// Zero-based cursor position.
    pub index: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Share of questions already passed, for a progress bar (0–100).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.index.min(self.total) as f64 / self.total as f64 * 100.0
    }

    /// One-based position for "Question 3 / 21" labels.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.index + 1).min(self.total)
    }
}
