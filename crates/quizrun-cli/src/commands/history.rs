//! The `quizrun history` and `quizrun reset` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizrun_banks::load_config_from;
use quizrun_report::format_clock;

pub fn execute(limit: usize, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = super::history_store(&config);
    let mut attempts = store.load_attempts();
    attempts.truncate(limit);

    if json {
        let out = serde_json::to_string_pretty(&attempts).context("failed to serialize history")?;
        println!("{out}");
        return Ok(());
    }

    if attempts.is_empty() {
        println!("No attempts recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Mode", "Banks", "Score", "Time", "Difficulty", "Flagged", "Status",
    ]);
    for record in &attempts {
        table.add_row(vec![
            Cell::new(record.date.format("%Y-%m-%d %H:%M")),
            Cell::new(record.mode),
            Cell::new(record.banks.join(", ")),
            Cell::new(format!("{}/{} ({}%)", record.correct, record.count, record.pct)),
            Cell::new(format_clock(record.elapsed_sec as f64)),
            Cell::new(record.difficulty),
            Cell::new(record.flagged.len()),
            Cell::new(if record.auto_time_expired {
                "TIME EXPIRED"
            } else {
                "submitted"
            }),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn reset(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    super::history_store(&config)
        .clear()
        .context("failed to clear history")?;
    println!("History cleared.");
    Ok(())
}
