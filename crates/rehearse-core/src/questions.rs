//! Question source: scripted questions first, generated follow-ups for short answers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bank::questions_for_role;
use crate::model::{Mode, Question, Tone};
use crate::prompts;
use crate::retry::{complete_with_retry, RetryPolicy};
use crate::traits::{CompletionRequest, LlmProvider};

/// Answers longer than this many words move on to a fresh scripted question
/// instead of a generated follow-up.
pub const LONG_ANSWER_WORDS: usize = 60;

/// Served when neither a follow-up nor a scripted question is available.
pub const GENERIC_FOLLOW_UP: &str =
    "Can you tell me more about your experience with that? Please provide specific examples.";

const FOLLOW_UP_TEMPERATURE: f64 = 0.7;
const FOLLOW_UP_MAX_TOKENS: u32 = 256;

/// Produces follow-up questions through an LLM.
#[derive(Clone)]
pub struct FollowUpGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    retry: RetryPolicy,
}

impl FollowUpGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generated question text, or `None` if generation failed.
    async fn generate(&self, system_prompt: String, prompt: String) -> Option<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt,
            prompt,
            max_tokens: FOLLOW_UP_MAX_TOKENS,
            temperature: FOLLOW_UP_TEMPERATURE,
            json_mode: false,
        };
        match complete_with_retry(self.provider.as_ref(), &request, &self.retry).await {
            Ok(text) => Some(text),
            Err(failure) => {
                warn!("failed to generate follow-up question: {failure:?}");
                None
            }
        }
    }
}

/// Per-session question sequencing.
///
/// Scripted questions are served in order through a forward-only cursor, so
/// no scripted question is asked twice in one session.
pub struct QuestionSource {
    role: String,
    tone: Tone,
    mode: Mode,
    topics: Vec<String>,
    scripted: Vec<Question>,
    cursor: usize,
    last_question: Option<String>,
    generator: FollowUpGenerator,
}

impl QuestionSource {
    /// Build a source over the bank for `role`.
    ///
    /// `topics` only matter in drill mode, where questions tagged with any of
    /// them move to the front.
    pub fn new(
        role: &str,
        tone: Tone,
        mode: Mode,
        topics: Vec<String>,
        generator: FollowUpGenerator,
    ) -> Self {
        Self::with_bank(questions_for_role(role), role, tone, mode, topics, generator)
    }

    pub fn with_bank(
        bank: Vec<Question>,
        role: &str,
        tone: Tone,
        mode: Mode,
        topics: Vec<String>,
        generator: FollowUpGenerator,
    ) -> Self {
        let scripted = match mode {
            Mode::Drill if !topics.is_empty() => prioritize(bank, &topics),
            _ => bank,
        };
        Self {
            role: role.to_string(),
            tone,
            mode,
            topics,
            scripted,
            cursor: 0,
            last_question: None,
            generator,
        }
    }

    /// Remaining scripted questions, in serving order.
    pub fn remaining(&self) -> &[Question] {
        &self.scripted[self.cursor..]
    }

    pub fn has_more_scripted(&self) -> bool {
        self.cursor < self.scripted.len()
    }

    fn next_scripted(&mut self) -> Option<String> {
        let question = self.scripted.get(self.cursor)?;
        self.cursor += 1;
        Some(question.text.clone())
    }

    /// The next question to ask.
    ///
    /// `last_answer` is `None` for the opening question. A scripted question
    /// is served while any remain and the last answer was absent or long;
    /// otherwise a follow-up is generated, falling back to the next scripted
    /// question and finally to [`GENERIC_FOLLOW_UP`].
    pub async fn get_next_question(&mut self, last_answer: Option<&str>) -> String {
        let question = self.pick_next(last_answer).await;
        self.last_question = Some(question.clone());
        question
    }

    async fn pick_next(&mut self, last_answer: Option<&str>) -> String {
        let answer = last_answer.map(str::trim).filter(|a| !a.is_empty());

        if last_answer.is_none() {
            if let Some(scripted) = self.next_scripted() {
                return scripted;
            }
        }

        let long_answer = answer.is_some_and(|a| a.split_whitespace().count() > LONG_ANSWER_WORDS);
        if self.has_more_scripted() && (answer.is_none() || long_answer) {
            if let Some(scripted) = self.next_scripted() {
                debug!(long_answer, "serving scripted question");
                return scripted;
            }
        }

        let previous = self
            .last_question
            .clone()
            .unwrap_or_else(|| prompts::OPENING_QUESTION_HINT.to_string());
        let system_prompt =
            prompts::interviewer_system_prompt(&self.role, self.tone, self.mode, &self.topics);
        let prompt = prompts::interviewer_followup_prompt(
            &self.role,
            &previous,
            answer.unwrap_or_default(),
            self.tone,
        );

        if let Some(generated) = self.generator.generate(system_prompt, prompt).await {
            debug!("serving generated follow-up");
            return generated;
        }

        self.next_scripted()
            .unwrap_or_else(|| GENERIC_FOLLOW_UP.to_string())
    }
}

/// Stable partition: questions matching any topic first, the rest after,
/// each group keeping its original order.
fn prioritize(bank: Vec<Question>, topics: &[String]) -> Vec<Question> {
    let (mut prioritized, others): (Vec<_>, Vec<_>) =
        bank.into_iter().partition(|q| q.matches_any_topic(topics));
    prioritized.extend(others);
    prioritized
}
