use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Default cap on questions per session.
pub const DEFAULT_MAX_QUESTIONS: usize = 21;

/// Time limits offered on the setup screen, in seconds. `0` is unlimited.
const ALLOWED_TIME_LIMITS: [u64; 8] = [0, 300, 600, 900, 1200, 1800, 2700, 3600];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time limit of {0}s is not one of the offered values")]
    UnsupportedTimeLimit(u64),

    #[error("invalid time limit: {raw:?}")]
    InvalidTimeLimit { raw: String },

    #[error("a session needs room for at least one question")]
    ZeroQuestions,

    #[error("question bank source is empty")]
    EmptyBankSource,

    #[error("unsupported bank URL scheme: {0}")]
    UnsupportedScheme(String),
}

//
// ─── TIME LIMIT ────────────────────────────────────────────────────────────────
//

/// Session time limit chosen from a fixed menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeLimit(u64);

impl TimeLimit {
    pub const UNLIMITED: Self = Self(0);

    /// # Errors
    ///
    /// Returns `SettingsError::UnsupportedTimeLimit` if `secs` is not on the menu.
    pub fn from_secs(secs: u64) -> Result<Self, SettingsError> {
        if ALLOWED_TIME_LIMITS.contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(SettingsError::UnsupportedTimeLimit(secs))
        }
    }

    /// Every selectable limit, unlimited first.
    pub fn options() -> impl Iterator<Item = TimeLimit> {
        ALLOWED_TIME_LIMITS.into_iter().map(Self)
    }

    #[must_use]
    pub fn secs(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            f.write_str("unlimited")
        } else {
            write!(f, "{} min", self.0 / 60)
        }
    }
}

impl FromStr for TimeLimit {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = s
            .trim()
            .parse::<u64>()
            .map_err(|_| SettingsError::InvalidTimeLimit { raw: s.to_string() })?;
        Self::from_secs(secs)
    }
}

//
// ─── QUIZ SETTINGS ─────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    time_limit: TimeLimit,
    max_questions: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QuizSettingsDraft {
    pub time_limit_secs: Option<u64>,
    pub max_questions: Option<usize>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for an unsupported time limit or a zero question cap.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let time_limit = match self.time_limit_secs {
            Some(secs) => TimeLimit::from_secs(secs)?,
            None => TimeLimit::UNLIMITED,
        };
        let max_questions = self.max_questions.unwrap_or(DEFAULT_MAX_QUESTIONS);
        if max_questions == 0 {
            return Err(SettingsError::ZeroQuestions);
        }

        Ok(QuizSettings {
            time_limit,
            max_questions,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    #[must_use]
    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    #[must_use]
    pub fn with_time_limit(mut self, time_limit: TimeLimit) -> Self {
        self.time_limit = time_limit;
        self
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit: TimeLimit::UNLIMITED,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

//
// ─── BANK SOURCE ───────────────────────────────────────────────────────────────
//

/// Where the question bank is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankSource {
    File(PathBuf),
    Http(Url),
}

impl BankSource {
    /// Interpret `raw` as an `http(s)://` URL, a `file://` URL or a plain path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for empty input or URL schemes other than
    /// `http`, `https` and `file`.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SettingsError::EmptyBankSource);
        }

        // Windows drive letters ("C:\...") parse as a one-letter scheme.
        match Url::parse(trimmed) {
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::File)
                    .map_err(|()| SettingsError::UnsupportedScheme("file".into())),
                other => Err(SettingsError::UnsupportedScheme(other.to_string())),
            },
            _ => Ok(Self::File(PathBuf::from(trimmed))),
        }
    }
}

impl fmt::Display for BankSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit_menu_includes_unlimited() {
        let limits: Vec<_> = TimeLimit::options().collect();
        assert_eq!(limits.first(), Some(&TimeLimit::UNLIMITED));
        assert!(limits.contains(&TimeLimit::from_secs(600).unwrap()));
        assert_eq!(TimeLimit::from_secs(600).unwrap().to_string(), "10 min");
        assert_eq!(TimeLimit::UNLIMITED.to_string(), "unlimited");
    }

    #[test]
    fn time_limit_rejects_values_off_the_menu() {
        assert_eq!(
            TimeLimit::from_secs(42),
            Err(SettingsError::UnsupportedTimeLimit(42))
        );
        assert!("ten".parse::<TimeLimit>().is_err());
        assert_eq!("900".parse::<TimeLimit>().unwrap().secs(), 900);
    }

    #[test]
    fn draft_defaults() {
        let settings = QuizSettingsDraft::new().validate().unwrap();
        assert_eq!(settings.max_questions(), DEFAULT_MAX_QUESTIONS);
        assert!(settings.time_limit().is_unlimited());
    }

    #[test]
    fn draft_rejects_zero_questions() {
        let draft = QuizSettingsDraft {
            time_limit_secs: Some(300),
            max_questions: Some(0),
        };
        assert_eq!(draft.validate(), Err(SettingsError::ZeroQuestions));
    }

    #[test]
    fn bank_source_parsing() {
        assert!(matches!(
            BankSource::parse("https://example.com/questions.json").unwrap(),
            BankSource::Http(_)
        ));
        assert_eq!(
            BankSource::parse("data/questions.json").unwrap(),
            BankSource::File(PathBuf::from("data/questions.json"))
        );
        assert_eq!(BankSource::parse("  "), Err(SettingsError::EmptyBankSource));
        assert!(matches!(
            BankSource::parse("ftp://example.com/q.json"),
            Err(SettingsError::UnsupportedScheme(_))
        ));
    }
}
