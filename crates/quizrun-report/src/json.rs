//! JSON export of finished attempts.

use std::path::Path;

use anyhow::{Context, Result};

use quizrun_core::engine::FinishedAttempt;

/// Default file name for an exported attempt, unique per attempt.
pub fn report_file_name(done: &FinishedAttempt) -> String {
    format!(
        "quizrun-{}-{}.json",
        done.record.date.format("%Y%m%d-%H%M%S"),
        done.attempt.id()
    )
}

/// Save a finished attempt as pretty-printed JSON.
pub fn save_json(done: &FinishedAttempt, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(done).context("failed to serialize attempt")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Load a finished attempt saved by [`save_json`].
pub fn load_json(path: &Path) -> Result<FinishedAttempt> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse report JSON")
}
