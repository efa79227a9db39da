//! The `rehearse roles` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use rehearse_core::bank::{known_roles, questions_for_role};

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Role", "Questions", "Topics"]);

    for role in known_roles() {
        let questions = questions_for_role(role);
        let mut topics: Vec<&str> = questions.iter().map(|q| q.topic.as_str()).collect();
        topics.dedup();
        table.add_row(vec![
            Cell::new(role),
            Cell::new(questions.len()),
            Cell::new(topics.join(", ")),
        ]);
    }

    println!("{table}");
    println!("Any other role uses a general question bank.");
    Ok(())
}
