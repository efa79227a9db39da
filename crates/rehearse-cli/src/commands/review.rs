//! The `rehearse review` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use rehearse_core::model::{criterion_means, overall_mean, Criterion, StoredSession};
use rehearse_core::MemoryStore;
use rehearse_providers::load_config_from;
use rehearse_report::{generate_html, render_markdown, write_html_report};

pub fn execute(
    user: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let rendered_by: fn(&StoredSession) -> String = match format.as_str() {
        "text" => render_text,
        "markdown" | "md" => render_markdown,
        "html" => generate_html,
        other => anyhow::bail!("unknown format '{other}', expected text, markdown or html"),
    };

    let config = load_config_from(config_path.as_deref())?;
    let memory = MemoryStore::open(&config.practice.storage_dir, &user)?;
    let Some(session) = memory.get_latest_session() else {
        println!("No sessions recorded for {user} yet.");
        return Ok(());
    };

    match output {
        Some(path) if format == "html" => {
            write_html_report(&session, &path)?;
            eprintln!("Review written to {}", path.display());
        }
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, rendered_by(&session))
                .with_context(|| format!("failed to write review: {}", path.display()))?;
            eprintln!("Review written to {}", path.display());
        }
        None => println!("{}", rendered_by(&session)),
    }
    Ok(())
}

/// Plain-text review with comfy-table score tables.
pub(crate) fn render_text(session: &StoredSession) -> String {
    let summary = &session.summary;
    let mut out = format!(
        "Interview review: {} ({} questions, {})\n\n{}\n",
        summary.role,
        summary.evaluations.len(),
        session.timestamp.format("%Y-%m-%d %H:%M UTC"),
        summary.summary_text.trim()
    );

    if let Some(means) = criterion_means(&summary.evaluations) {
        let mut table = Table::new();
        table.set_header(vec!["Criterion", "Average"]);
        for (criterion, mean) in means {
            table.add_row(vec![
                Cell::new(criterion.title()),
                Cell::new(format!("{mean:.1}")),
            ]);
        }
        if let Some(overall) = overall_mean(&summary.evaluations) {
            table.add_row(vec![Cell::new("Overall"), Cell::new(format!("{overall:.1}"))]);
        }
        out.push_str(&format!("\n{table}\n"));
    }

    if !summary.weak_spot_topics.is_empty() {
        out.push_str(&format!("\nWeak spots: {}\n", summary.weak_spot_topics.join(", ")));
    }
    if !summary.strength_topics.is_empty() {
        out.push_str(&format!("Strengths: {}\n", summary.strength_topics.join(", ")));
    }

    if !summary.evaluations.is_empty() {
        let mut table = Table::new();
        let mut header = vec!["#".to_string(), "Question".to_string()];
        header.extend(Criterion::ALL.iter().map(|c| c.key().to_string()));
        table.set_header(header);
        for (i, evaluation) in summary.evaluations.iter().enumerate() {
            let mut row = vec![Cell::new(i + 1), Cell::new(&evaluation.question)];
            row.extend(
                Criterion::ALL
                    .iter()
                    .map(|c| Cell::new(evaluation.scores.get(*c))),
            );
            table.add_row(row);
        }
        out.push_str(&format!("\n{table}\n"));
    }

    out
}
