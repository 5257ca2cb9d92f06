mod cli;
mod db;
mod logging;
mod render;
mod terminal;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use quiz_core::model::{BankSource, QuizSettingsDraft};
use services::{AppServices, Clock};
use tracing::warn;

use crate::cli::Args;

/// Open `SQLite` storage, or fall back to a process-local store.
///
/// Losing persistence only costs the best grade, so it never stops the quiz.
async fn open_services(db_url: &str, clock: Clock) -> AppServices {
    let db_url = db::normalize_sqlite_url(db_url);
    if let Err(err) = db::prepare_sqlite_file(&db_url) {
        warn!(error = %err, %db_url, "cannot prepare database file; best grade will not be saved");
        return AppServices::in_memory(clock);
    }
    match AppServices::new_sqlite(&db_url, clock).await {
        Ok(services) => services,
        Err(err) => {
            warn!(error = %err, %db_url, "cannot open database; best grade will not be saved");
            AppServices::in_memory(clock)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let settings = QuizSettingsDraft {
        time_limit_secs: args.time_limit,
        max_questions: args.max_questions,
    }
    .validate()
    .context("invalid settings")?;
    let source = BankSource::parse(&args.bank).context("invalid --bank value")?;

    let services = open_services(&args.db_url, Clock::default_clock()).await;
    let bank = services
        .loader()
        .load(&source)
        .await
        .with_context(|| format!("loading question bank from {source}"))?;
    if bank.is_empty() {
        warn!(%source, "question bank is empty");
    }

    let mut controller = services.controller(settings).with_bank(Arc::new(bank));
    terminal::run(&mut controller, args.time_limit.is_none()).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
