//! The `rehearse init` command.

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("rehearse.toml");
    if path.exists() {
        println!("rehearse.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, SAMPLE_CONFIG).context("failed to write rehearse.toml")?;
    println!("Created rehearse.toml");

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit rehearse.toml)");
    println!("  2. Run: rehearse roles");
    println!("  3. Run: rehearse practice --user you --role \"Software Engineer\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# rehearse configuration

default_provider = "gemini"
max_retries = 3
retry_delay_ms = 1000

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[practice]
max_questions = 8
storage_dir = "./storage"
drill_topic_count = 5
question_model = "gemini-2.5-flash"
critic_model = "gemini-2.5-flash"
"#;
