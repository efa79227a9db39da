//! Practice settings shared by every front end.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_DRILL_TOPIC_COUNT;

/// Fewest questions a configured session may ask.
pub const MIN_QUESTIONS: u32 = 5;
/// Most questions a configured session may ask.
pub const MAX_QUESTIONS: u32 = 8;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The `[practice]` table of `rehearse.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeConfig {
    #[serde(default = "default_max_questions")]
    pub max_questions: u32,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Weak spots used to seed a drill session.
    #[serde(default = "default_drill_topic_count")]
    pub drill_topic_count: usize,
    /// Model that generates follow-up questions.
    #[serde(default = "default_model")]
    pub question_model: String,
    /// Model that scores answers and writes the session summary.
    #[serde(default = "default_model")]
    pub critic_model: String,
}

fn default_max_questions() -> u32 {
    MAX_QUESTIONS
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./storage")
}

fn default_drill_topic_count() -> usize {
    DEFAULT_DRILL_TOPIC_COUNT
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            max_questions: default_max_questions(),
            storage_dir: default_storage_dir(),
            drill_topic_count: default_drill_topic_count(),
            question_model: default_model(),
            critic_model: default_model(),
        }
    }
}

impl PracticeConfig {
    /// Check the ranges front ends are expected to enforce.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.max_questions),
            "max_questions must be between {MIN_QUESTIONS} and {MAX_QUESTIONS}, got {}",
            self.max_questions
        );
        anyhow::ensure!(
            self.drill_topic_count > 0,
            "drill_topic_count must be at least 1"
        );
        anyhow::ensure!(
            !self.question_model.trim().is_empty() && !self.critic_model.trim().is_empty(),
            "question_model and critic_model must not be empty"
        );
        Ok(())
    }
}
