pub mod banks;
pub mod history;
pub mod init;
pub mod run;
pub mod validate;

use anyhow::Result;

use quizrun_banks::{create_source, QuizrunConfig};
use quizrun_core::catalog::BankCatalog;
use quizrun_core::traits::BankSource;
use quizrun_store::{FileBackend, HistoryStore};

/// Build the configured bank source and read its manifest.
async fn open_catalog(config: &QuizrunConfig) -> Result<(Box<dyn BankSource>, BankCatalog)> {
    let source = create_source(&config.source)?;
    let catalog = BankCatalog::open(source.as_ref()).await?;
    Ok((source, catalog))
}

fn history_store(config: &QuizrunConfig) -> HistoryStore<FileBackend> {
    HistoryStore::new(FileBackend::new(&config.history_dir))
}
