//! The `quizrun validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizrun_banks::load_config_from;

pub async fn execute(bank: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (source, mut catalog) = super::open_catalog(&config).await?;

    let ids: Vec<String> = match bank {
        Some(id) => vec![id],
        None => catalog.manifest().banks.iter().map(|b| b.id.clone()).collect(),
    };
    catalog.ensure_loaded(source.as_ref(), &ids).await?;

    let mut total_dropped = 0;

    for id in &ids {
        let Some(loaded) = catalog.bank(id) else {
            continue;
        };
        println!(
            "Bank: {} ({} kept, {} dropped)",
            loaded.info.title,
            loaded.questions.len(),
            loaded.dropped.len()
        );
        if let Some(declared) = loaded.info.count {
            if declared != loaded.questions.len() as u64 {
                println!("  [{id}] NOTE: manifest declares {declared} questions");
            }
        }
        for dropped in &loaded.dropped {
            println!("  [{id}] record #{}: {}", dropped.position, dropped.reason);
        }
        total_dropped += loaded.dropped.len();
    }

    if total_dropped == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_dropped} record(s) dropped.");
    }

    Ok(())
}
