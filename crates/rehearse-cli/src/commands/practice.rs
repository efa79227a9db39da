//! The `rehearse practice` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use rehearse_core::bank::is_known_role;
use rehearse_core::model::{Mode, Tone};
use rehearse_core::{
    EvaluatorGateway, FinalizeOutcome, FollowUpGenerator, InterviewSession, MemoryStore,
    SessionProfile, Turn,
};
use rehearse_providers::{create_provider, load_config_from};

use super::review::render_text;

pub async fn execute(
    user: String,
    role: String,
    mode: Mode,
    tone: Tone,
    max_questions: Option<u32>,
    provider_name: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let role = role.trim().to_string();
    anyhow::ensure!(!role.is_empty(), "role must not be empty");

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(n) = max_questions {
        config.practice.max_questions = n;
    }
    config.validate()?;

    let (name, provider_config) = config.provider(provider_name.as_deref())?;
    let provider = create_provider(provider_config)?;
    info!(provider = name, "using provider");

    let memory = MemoryStore::open(&config.practice.storage_dir, &user)?;
    let retry = config.retry_policy();
    let gateway = EvaluatorGateway::new(provider.clone(), config.practice.critic_model.clone())
        .with_retry(retry.clone());
    let generator = FollowUpGenerator::new(provider, config.practice.question_model.clone())
        .with_retry(retry);

    let profile = SessionProfile {
        user_id: user.clone(),
        role: role.clone(),
        mode,
        tone,
        max_questions: config.practice.max_questions,
    };
    let mut session = InterviewSession::new(profile, gateway, generator, memory)
        .with_drill_topic_count(config.practice.drill_topic_count);

    if !is_known_role(&role) {
        println!("No scripted bank for \"{role}\"; using general questions.");
    }
    let first = session.start().await;
    if mode == Mode::Drill {
        if session.drill_topics().is_empty() {
            println!("No weak-spot history yet; running a regular interview.");
        } else {
            println!("Drilling: {}", session.drill_topics().join(", "));
        }
    }
    println!(
        "Mock {role} interview, {} questions. Type each answer on one line.\n",
        config.practice.max_questions
    );
    print_question(1, &first);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(answer) = lines.next_line().await.context("failed to read answer")? else {
            println!("\nInput closed before the interview finished; nothing was saved.");
            return Ok(());
        };

        match session.submit_answer(&answer).await {
            Turn::Question(next) => print_question(session.num_questions_asked(), &next),
            Turn::EmptyAnswer(message) => println!("{message}"),
            Turn::Complete(message) | Turn::AlreadyComplete(message) => {
                println!("\n{message}\n");
                break;
            }
        }
    }

    match session.finalize().await? {
        FinalizeOutcome::Finalized(stored) => println!("{}", render_text(&stored)),
        FinalizeOutcome::NotFinished {
            asked,
            max_questions,
        } => println!("Interview stopped after {asked} of {max_questions} questions."),
    }
    Ok(())
}

fn print_question(number: u32, question: &str) {
    println!("Q{number}: {question}");
}
