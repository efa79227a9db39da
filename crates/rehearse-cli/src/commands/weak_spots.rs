//! The `rehearse weak-spots` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use rehearse_core::MemoryStore;
use rehearse_providers::load_config_from;

pub fn execute(user: String, top_k: usize, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let memory = MemoryStore::open(&config.practice.storage_dir, &user)?;

    let counts = memory.weak_spot_counts();
    if counts.is_empty() {
        println!("No weak spots recorded for {user} yet. Finish a practice session first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Topic", "Sessions"]);
    for (rank, (topic, count)) in counts.iter().take(top_k).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(topic),
            Cell::new(count),
        ]);
    }

    println!("Weak spots for {user}:");
    println!("{table}");
    println!("Practice them with: rehearse practice --user {user} --role <ROLE> --mode drill");
    Ok(())
}
