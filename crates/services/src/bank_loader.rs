use quiz_core::model::{BankSource, QuestionBank, QuestionDraft};
use tracing::{debug, info};

use crate::error::BankLoadError;

/// Parse a JSON array of question records and validate it into a bank.
///
/// # Errors
///
/// Returns `BankLoadError::Parse` for malformed JSON and `BankLoadError::Bank`
/// for records that fail validation.
pub fn parse_bank(raw: &str) -> Result<QuestionBank, BankLoadError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(raw)?;
    Ok(QuestionBank::from_drafts(drafts)?)
}

/// Reads the question bank once, from disk or over HTTP.
#[derive(Clone, Default)]
pub struct QuestionBankLoader {
    http: reqwest::Client,
}

impl QuestionBankLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate the bank at `source`.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError` if the source cannot be read or the content is invalid.
    pub async fn load(&self, source: &BankSource) -> Result<QuestionBank, BankLoadError> {
        let raw = match source {
            BankSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| BankLoadError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            BankSource::Http(url) => {
                debug!(%url, "fetching question bank");
                let response = self.http.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(BankLoadError::HttpStatus(status));
                }
                response.text().await?
            }
        };

        let bank = parse_bank(&raw)?;
        info!(source = %source, questions = bank.len(), "question bank loaded");
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{BankError, QuestionId};
    use std::io::Write;

    const BANK: &str = r#"[
        {"id": 1, "question": "2 + 2?", "type": "single", "options": ["3", "4"], "correctAnswer": 1},
        {"id": 2, "question": "Primes", "type": "multiple", "options": ["2", "4", "5"], "correctAnswer": [0, 2], "points": 2},
        {"id": 3, "question": "Capital of France", "type": "dropdown", "options": ["Lyon", "Paris"], "correctAnswer": 1}
    ]"#;

    #[test]
    fn parses_valid_bank() {
        let bank = parse_bank(BANK).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.get(QuestionId::new(2)).unwrap().points(), 2.0);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_bank("{not json"),
            Err(BankLoadError::Parse(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_answer_up_front() {
        let raw = r#"[{"id": 1, "question": "Q", "type": "single", "options": ["a"], "correctAnswer": 4}]"#;
        assert!(matches!(
            parse_bank(raw),
            Err(BankLoadError::Bank(BankError::InvalidQuestion { position: 0, .. }))
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BANK.as_bytes()).unwrap();

        let source = BankSource::File(file.path().to_path_buf());
        let bank = QuestionBankLoader::new().load(&source).await.unwrap();
        assert_eq!(bank.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = BankSource::File("/definitely/not/here/questions.json".into());
        let err = QuestionBankLoader::new().load(&source).await.unwrap_err();
        assert!(matches!(err, BankLoadError::Io { .. }));
    }
}
