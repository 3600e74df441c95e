//! The `quizrun banks` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizrun_banks::load_config_from;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (_source, catalog) = super::open_catalog(&config).await?;
    let banks = &catalog.manifest().banks;

    if banks.is_empty() {
        println!("No banks listed. Run `quizrun init` to create a sample bank.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "File", "Questions"]);
    for bank in banks {
        table.add_row(vec![
            Cell::new(&bank.id),
            Cell::new(&bank.title),
            Cell::new(&bank.file),
            Cell::new(
                bank.count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{table}");
    println!("{} bank(s)", banks.len());
    Ok(())
}
