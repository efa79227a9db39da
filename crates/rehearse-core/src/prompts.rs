//! Prompt templates for the interviewer, the critic and the session summary.

use crate::model::{Criterion, Mode, Tone};

/// Opening instruction used when no previous question exists.
pub const OPENING_QUESTION_HINT: &str = "Start the interview with a strong opening question.";

/// Persona prompt for follow-up question generation.
pub fn interviewer_system_prompt(role: &str, tone: Tone, mode: Mode, topics: &[String]) -> String {
    let mode_text = match mode {
        Mode::Normal => "a normal mock interview covering a reasonable breadth of the role.",
        Mode::Drill => {
            "a targeted weak-spot drill focusing heavily on the candidate's weakest topics."
        }
    };

    let topics_text = if topics.is_empty() {
        String::new()
    } else {
        format!(
            "Focus especially on the following topics, weaving them into your questions and follow-ups: {}.\n",
            topics.join(", ")
        )
    };

    format!(
        "You are an AI interviewer for the role: {role}.

Your tone should be {persona}.
You are running {mode_text}

Rules:
- Ask one question at a time.
- Prefer concrete, experience-based questions.
- Keep questions short and clear.
- For weak or shallow answers, ask a follow-up that pushes for more detail.
- Never answer on behalf of the candidate or hint at the answer.
- Avoid generic filler questions.

{topics_text}Respond ONLY with the next interview question to ask the candidate.",
        persona = tone.persona(),
    )
}

/// Prompt asking for a follow-up to the previous question and answer.
pub fn interviewer_followup_prompt(
    role: &str,
    previous_question: &str,
    last_answer: &str,
    tone: Tone,
) -> String {
    format!(
        "You are continuing a mock {role} interview.

The last interview question was:

{previous_question}

The candidate's answer was:

{last_answer}

Either ask one focused follow-up that probes deeper, or move on with a new
question that builds naturally on the previous one. Be crisp and specific,
do not restate the original question, and do not give feedback.

Return ONLY the next question text.
Tone: {tone}."
    )
}

fn rubric_lines() -> String {
    Criterion::ALL
        .iter()
        .map(|c| format!("- {} ({}): {}", c.key(), c.title(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON shape the critic must return.
pub const CRITIC_SCHEMA: &str = r#"{
  "scores": {
    "clarity": int,
    "technical_or_role_fit": int,
    "structure_STAR": int,
    "confidence": int,
    "brevity": int
  },
  "weak_spots": [string],
  "strengths": [string],
  "comments": string
}"#;

/// System prompt for per-answer evaluation.
pub fn critic_system_prompt() -> String {
    format!(
        "You are an expert interview coach acting as an impartial evaluator.
Score each answer from 0 to 10 on these criteria:

{rubric}

Return a STRICT JSON object with exactly this structure:

{CRITIC_SCHEMA}

Rules:
- Be consistent and realistic; use the full 0-10 range.
- weak_spots and strengths are short topic tags such as \"system_design\" or \"STAR_method\", not sentences.
- comments is 2-4 sentences of feedback.
- Do NOT include any text outside the JSON object.",
        rubric = rubric_lines()
    )
}

/// User prompt carrying one question/answer pair.
pub fn critic_user_prompt(question: &str, answer: &str, role: &str) -> String {
    format!(
        "Evaluate the following {role} interview answer.

Question:

{question}

Answer:

{answer}

Return ONLY the JSON object described above."
    )
}

/// System prompt for the session-level summary.
pub fn session_summary_system_prompt() -> &'static str {
    r#"You are an interview coach summarizing a full mock interview session.
You are given per-question evaluations and must produce a concise review.

Return a STRICT JSON object:

{
  "summary_text": string,
  "weak_spot_topics": [string],
  "strength_topics": [string]
}

summary_text is 2-3 short paragraphs of coaching feedback; each topic list holds
3-6 short topic tags. Do NOT include any other keys or any text outside the JSON object."#
}

/// User prompt carrying the serialized evaluations.
pub fn session_summary_user_prompt(role: &str, evaluations_json: &str) -> String {
    format!(
        "You are summarizing a completed mock interview for the role: {role}.

Per-question evaluation data as JSON:

{evaluations_json}

Create the JSON summary object described above."
    )
}
