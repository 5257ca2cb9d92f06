use clap::Parser;

/// Timed multiple-choice quiz in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "quiz", version, about)]
pub struct Args {
    /// Question bank: a JSON file path or an http(s) URL.
    #[arg(long, env = "QUIZ_BANK")]
    pub bank: String,

    /// Where the best grade is kept (`sqlite::memory:` keeps nothing).
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    pub db_url: String,

    /// Time limit in seconds (0 = unlimited). Skips the setup prompt.
    #[arg(long, env = "QUIZ_TIME_LIMIT")]
    pub time_limit: Option<u64>,

    /// Questions drawn per session.
    #[arg(long, env = "QUIZ_MAX_QUESTIONS")]
    pub max_questions: Option<usize>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}
