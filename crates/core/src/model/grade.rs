use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Lowest grade a finished session can earn.
pub const GRADE_MIN: f64 = 1.0;
/// Grade for full credit.
pub const GRADE_MAX: f64 = 10.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum GradeError {
    #[error("grade must be between 0 and 10, got {0}")]
    OutOfRange(f64),

    #[error("invalid persisted grade: {raw:?}")]
    Unparsable { raw: String },
}

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// Score on the 1–10 scale (0 is accepted for persisted values).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Grade(f64);

impl Grade {
    /// Wrap a raw value.
    ///
    /// # Errors
    ///
    /// Returns `GradeError::OutOfRange` for non-finite values or values outside 0–10.
    pub fn new(value: f64) -> Result<Self, GradeError> {
        if value.is_finite() && (0.0..=GRADE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GradeError::OutOfRange(value))
        }
    }

    /// Map earned points linearly onto 1–10: nothing earned is 1, full credit is 10.
    ///
    /// A session worth zero points grades as the minimum.
    #[must_use]
    pub fn from_points(earned: f64, max: f64) -> Self {
        if max <= 0.0 || !max.is_finite() || !earned.is_finite() {
            return Self(GRADE_MIN);
        }
        let ratio = (earned / max).clamp(0.0, 1.0);
        Self(ratio * (GRADE_MAX - GRADE_MIN) + GRADE_MIN)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Value at the persisted granularity of two decimal places.
    #[must_use]
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }

    /// Decimal string used by the best-grade store, e.g. `"7.75"`.
    #[must_use]
    pub fn to_persisted(self) -> String {
        format!("{:.2}", self.0)
    }

    /// Parse a value written by [`Grade::to_persisted`].
    ///
    /// # Errors
    ///
    /// Returns `GradeError` if the text is not a number in range.
    pub fn parse_persisted(raw: &str) -> Result<Self, GradeError> {
        let value = raw.trim().parse::<f64>().map_err(|_| GradeError::Unparsable {
            raw: raw.to_string(),
        })?;
        Self::new(value)
    }

    #[must_use]
    pub fn tier(self) -> FeedbackTier {
        FeedbackTier::from_grade(self)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_persisted(s)
    }
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// User-visible feedback band for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackTier {
    /// grade ≥ 10
    Excellent,
    /// grade ≥ 9
    VeryGood,
    /// grade ≥ 7
    Good,
    /// grade ≥ 5
    Passing,
    /// grade < 5
    NeedsStudy,
}

impl FeedbackTier {
    #[must_use]
    pub fn from_grade(grade: Grade) -> Self {
        let value = grade.value();
        if value >= 10.0 {
            Self::Excellent
        } else if value >= 9.0 {
            Self::VeryGood
        } else if value >= 7.0 {
            Self::Good
        } else if value >= 5.0 {
            Self::Passing
        } else {
            Self::NeedsStudy
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Perfect! You're an expert!",
            Self::VeryGood => "Very good! Almost there.",
            Self::Good => "Good, but keep revising.",
            Self::Passing => "Passing. Review the mistakes below.",
            Self::NeedsStudy => "Keep studying and come back!",
        }
    }
}
