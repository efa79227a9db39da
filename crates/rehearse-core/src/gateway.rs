//! Evaluator gateway: scores answers and summarizes sessions via an LLM.
//!
//! The gateway never fails. Every call to the external evaluator ends in one
//! of the [`EvaluatorOutcome`] variants, and every variant other than
//! `Success` maps to a deterministic, locally computed fallback.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::model::{overall_mean, Criterion, Evaluation, Scores, NEUTRAL_SCORE};
use crate::prompts;
use crate::retry::{complete_with_retry, CompletionFailure, RetryPolicy};
use crate::traits::{extract_json_payload, CompletionRequest, LlmProvider};

/// Weak spot recorded on a fallback evaluation.
pub const FALLBACK_WEAK_SPOT: &str = "Unable to evaluate - API error";
/// Strength recorded on a fallback evaluation.
pub const FALLBACK_STRENGTH: &str = "Answer recorded";
/// Comments recorded on a fallback evaluation.
pub const FALLBACK_COMMENTS: &str =
    "Evaluation temporarily unavailable. Your answer has been recorded.";
/// Summary used when the evaluator returns an object without `summary_text`.
pub const DEFAULT_SUMMARY_TEXT: &str = "This was a useful practice session. Keep refining your answers and focus on clarity, structure, and concrete examples.";
/// Summary for a session that collected no answers.
pub const EMPTY_SESSION_SUMMARY: &str = "No answers were recorded in this session, so there is nothing to score yet. Start a new session whenever you're ready and take it one question at a time.";
/// How many topics a fallback summary keeps per list.
pub const FALLBACK_TOPIC_LIMIT: usize = 5;

const EVALUATION_TEMPERATURE: f64 = 0.3;
const SUMMARY_TEMPERATURE: f64 = 0.4;
const JSON_MAX_TOKENS: u32 = 512;

/// What came back from one evaluator call.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatorOutcome<T> {
    /// A usable (possibly repaired) payload.
    Success(T),
    /// The call succeeded but the text was not a JSON object.
    MalformedPayload(String),
    /// The evaluator could not be reached or refused the request.
    TransientFailure(String),
    /// The evaluator rejected the content on safety grounds.
    SafetyBlocked(String),
}

/// Evaluation fields as returned by the critic, before the question and
/// answer are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvaluation {
    pub scores: Scores,
    pub weak_spots: Vec<String>,
    pub strengths: Vec<String>,
    pub comments: String,
}

impl ParsedEvaluation {
    pub fn into_evaluation(self, question: &str, answer: &str) -> Evaluation {
        Evaluation {
            question: question.to_string(),
            answer: answer.to_string(),
            scores: self.scores,
            weak_spots: self.weak_spots,
            strengths: self.strengths,
            comments: self.comments,
        }
    }
}

/// Session-level summary produced by the critic.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCore {
    pub summary_text: String,
    pub weak_spot_topics: Vec<String>,
    pub strength_topics: Vec<String>,
}

/// Deterministic stand-in used whenever an answer cannot be scored.
pub fn fallback_evaluation(question: &str, answer: &str, comments: &str) -> Evaluation {
    Evaluation {
        question: question.to_string(),
        answer: answer.to_string(),
        scores: Scores::neutral(),
        weak_spots: vec![FALLBACK_WEAK_SPOT.to_string()],
        strengths: vec![FALLBACK_STRENGTH.to_string()],
        comments: comments.to_string(),
    }
}

/// Summary computed locally from the evaluations already collected.
pub fn fallback_summary(evaluations: &[Evaluation], role: &str) -> SummaryCore {
    if evaluations.is_empty() {
        return empty_session_summary();
    }
    let count = evaluations.len();
    let average = overall_mean(evaluations).unwrap_or(f64::from(NEUTRAL_SCORE));
    let summary_text = format!(
        "You completed a {count}-question interview practice session for the {role} role. \
         Your overall performance averaged {average:.1}/10 across all criteria. \
         Keep practicing: give specific examples and structure your answers with STAR \
         (Situation, Task, Action, Result)."
    );

    SummaryCore {
        summary_text,
        weak_spot_topics: first_unique(
            evaluations.iter().flat_map(|e| e.weak_spots.iter()),
            FALLBACK_TOPIC_LIMIT,
        ),
        strength_topics: first_unique(
            evaluations.iter().flat_map(|e| e.strengths.iter()),
            FALLBACK_TOPIC_LIMIT,
        ),
    }
}

fn empty_session_summary() -> SummaryCore {
    SummaryCore {
        summary_text: EMPTY_SESSION_SUMMARY.to_string(),
        weak_spot_topics: Vec::new(),
        strength_topics: Vec::new(),
    }
}

/// First `limit` distinct non-blank tags, in order of first appearance.
fn first_unique<'a>(tags: impl Iterator<Item = &'a String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        if out.len() == limit {
            break;
        }
        if !tag.trim().is_empty() && seen.insert(tag.as_str()) {
            out.push(tag.clone());
        }
    }
    out
}

/// Parse a critic payload, repairing missing or mistyped fields.
///
/// Returns `None` only when the text is not a JSON object at all.
pub fn parse_evaluation_payload(raw: &str) -> Option<ParsedEvaluation> {
    let object = parse_object(raw)?;

    let score_map = object.get("scores").and_then(Value::as_object);
    let mut scores = Scores::neutral();
    for criterion in Criterion::ALL {
        if let Some(score) = score_map
            .and_then(|m| m.get(criterion.key()))
            .and_then(coerce_score)
        {
            scores.set(criterion, score);
        }
    }

    Some(ParsedEvaluation {
        scores,
        weak_spots: coerce_tags(object.get("weak_spots")),
        strengths: coerce_tags(object.get("strengths")),
        comments: object
            .get("comments")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
    })
}

/// Parse a summary payload, repairing missing or mistyped fields.
pub fn parse_summary_payload(raw: &str) -> Option<SummaryCore> {
    let object = parse_object(raw)?;
    let summary_text = object
        .get("summary_text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUMMARY_TEXT)
        .to_string();

    Some(SummaryCore {
        summary_text,
        weak_spot_topics: coerce_tags(object.get("weak_spot_topics")),
        strength_topics: coerce_tags(object.get("strength_topics")),
    })
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(extract_json_payload(raw)) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Nearest integer score in `0..=10`, accepting numbers and numeric strings.
fn coerce_score(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 10.0) as u8)
}

fn coerce_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Narrow wrapper around the external evaluator.
#[derive(Clone)]
pub struct EvaluatorGateway {
    provider: Arc<dyn LlmProvider>,
    model: String,
    retry: RetryPolicy,
}

impl EvaluatorGateway {
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

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn call_json(
        &self,
        system_prompt: String,
        prompt: String,
        temperature: f64,
    ) -> EvaluatorOutcome<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt,
            prompt,
            max_tokens: JSON_MAX_TOKENS,
            temperature,
            json_mode: true,
        };
        match complete_with_retry(self.provider.as_ref(), &request, &self.retry).await {
            Ok(text) => EvaluatorOutcome::Success(text),
            Err(CompletionFailure::Unavailable(cause)) => EvaluatorOutcome::TransientFailure(cause),
            Err(CompletionFailure::SafetyBlocked(reason)) => {
                EvaluatorOutcome::SafetyBlocked(reason)
            }
        }
    }

    /// Ask the critic to score one answer, without applying any fallback.
    pub async fn request_evaluation(
        &self,
        question: &str,
        answer: &str,
        role: &str,
    ) -> EvaluatorOutcome<ParsedEvaluation> {
        let outcome = self
            .call_json(
                prompts::critic_system_prompt(),
                prompts::critic_user_prompt(question, answer, role),
                EVALUATION_TEMPERATURE,
            )
            .await;
        match outcome {
            EvaluatorOutcome::Success(raw) => match parse_evaluation_payload(&raw) {
                Some(parsed) => EvaluatorOutcome::Success(parsed),
                None => EvaluatorOutcome::MalformedPayload(raw),
            },
            EvaluatorOutcome::MalformedPayload(raw) => EvaluatorOutcome::MalformedPayload(raw),
            EvaluatorOutcome::TransientFailure(cause) => EvaluatorOutcome::TransientFailure(cause),
            EvaluatorOutcome::SafetyBlocked(reason) => EvaluatorOutcome::SafetyBlocked(reason),
        }
    }

    /// Score one answer. Always returns a usable evaluation.
    #[instrument(skip_all, fields(role = %role, model = %self.model))]
    pub async fn evaluate_answer(&self, question: &str, answer: &str, role: &str) -> Evaluation {
        match self.request_evaluation(question, answer, role).await {
            EvaluatorOutcome::Success(parsed) => parsed.into_evaluation(question, answer),
            EvaluatorOutcome::MalformedPayload(raw) => {
                warn!(
                    payload_len = raw.len(),
                    "unparseable evaluation payload, using fallback scores"
                );
                fallback_evaluation(question, answer, FALLBACK_COMMENTS)
            }
            EvaluatorOutcome::TransientFailure(cause) => {
                warn!("evaluation failed: {cause}. Using fallback scores.");
                fallback_evaluation(question, answer, FALLBACK_COMMENTS)
            }
            EvaluatorOutcome::SafetyBlocked(reason) => {
                warn!("evaluation blocked by safety filters: {reason}");
                fallback_evaluation(
                    question,
                    answer,
                    "The evaluator declined to score this answer. Your answer has been recorded.",
                )
            }
        }
    }

    /// Ask the critic for a session summary, without applying any fallback.
    pub async fn request_summary(
        &self,
        evaluations: &[Evaluation],
        role: &str,
    ) -> EvaluatorOutcome<SummaryCore> {
        let evaluations_json =
            serde_json::to_string(evaluations).unwrap_or_else(|_| String::from("[]"));
        let outcome = self
            .call_json(
                prompts::session_summary_system_prompt().to_string(),
                prompts::session_summary_user_prompt(role, &evaluations_json),
                SUMMARY_TEMPERATURE,
            )
            .await;
        match outcome {
            EvaluatorOutcome::Success(raw) => match parse_summary_payload(&raw) {
                Some(core) => EvaluatorOutcome::Success(core),
                None => EvaluatorOutcome::MalformedPayload(raw),
            },
            EvaluatorOutcome::MalformedPayload(raw) => EvaluatorOutcome::MalformedPayload(raw),
            EvaluatorOutcome::TransientFailure(cause) => EvaluatorOutcome::TransientFailure(cause),
            EvaluatorOutcome::SafetyBlocked(reason) => EvaluatorOutcome::SafetyBlocked(reason),
        }
    }

    /// Summarize a session. Always returns a usable summary.
    #[instrument(skip_all, fields(role = %role, answers = evaluations.len()))]
    pub async fn summarize_session(&self, evaluations: &[Evaluation], role: &str) -> SummaryCore {
        if evaluations.is_empty() {
            debug!("no evaluations to summarize");
            return empty_session_summary();
        }
        match self.request_summary(evaluations, role).await {
            EvaluatorOutcome::Success(core) => core,
            EvaluatorOutcome::MalformedPayload(raw) => {
                warn!(
                    payload_len = raw.len(),
                    "unparseable summary payload, using fallback summary"
                );
                fallback_summary(evaluations, role)
            }
            EvaluatorOutcome::TransientFailure(cause) => {
                warn!("session summary failed: {cause}. Using fallback summary.");
                fallback_summary(evaluations, role)
            }
            EvaluatorOutcome::SafetyBlocked(reason) => {
                warn!("session summary blocked by safety filters: {reason}");
                fallback_summary(evaluations, role)
            }
        }
    }
}
