//! Core data model types for rehearse.
//!
//! Questions, rubric criteria, per-answer evaluations, session summaries and
//! the per-user memory record. Field names match the JSON layout persisted
//! by the memory store and consumed by front ends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score used whenever the evaluator is unavailable or omits a criterion.
pub const NEUTRAL_SCORE: u8 = 6;

/// Upper bound of every rubric score.
pub const MAX_SCORE: u8 = 10;

/// A scripted interview question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The text read to the candidate.
    pub text: String,
    /// Broad topic (e.g. "system_design", "behavioral").
    pub topic: String,
    /// Topic tags matched against weak spots in drill mode.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    pub fn new(text: &str, topic: &str, tags: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            topic: topic.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Whether any tag equals one of `topics`, ignoring ASCII case.
    pub fn matches_any_topic(&self, topics: &[String]) -> bool {
        self.tags
            .iter()
            .any(|tag| topics.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

/// The fixed rubric criteria every answer is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criterion {
    #[serde(rename = "clarity")]
    Clarity,
    #[serde(rename = "technical_or_role_fit")]
    TechnicalOrRoleFit,
    #[serde(rename = "structure_STAR")]
    StructureStar,
    #[serde(rename = "confidence")]
    Confidence,
    #[serde(rename = "brevity")]
    Brevity,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Clarity,
        Criterion::TechnicalOrRoleFit,
        Criterion::StructureStar,
        Criterion::Confidence,
        Criterion::Brevity,
    ];

    /// Wire key used in evaluator payloads and stored records.
    pub fn key(self) -> &'static str {
        match self {
            Criterion::Clarity => "clarity",
            Criterion::TechnicalOrRoleFit => "technical_or_role_fit",
            Criterion::StructureStar => "structure_STAR",
            Criterion::Confidence => "confidence",
            Criterion::Brevity => "brevity",
        }
    }

    /// Human-readable title for review screens.
    pub fn title(self) -> &'static str {
        match self {
            Criterion::Clarity => "Communication Clarity",
            Criterion::TechnicalOrRoleFit => "Technical & Role Fit",
            Criterion::StructureStar => "Structural Integrity (STAR)",
            Criterion::Confidence => "Professional Confidence",
            Criterion::Brevity => "Conciseness",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Criterion::Clarity => {
                "How clearly and logically the candidate expresses their thoughts."
            }
            Criterion::TechnicalOrRoleFit => {
                "How well the answer demonstrates the required technical or role-specific skills."
            }
            Criterion::StructureStar => {
                "How well the answer follows STAR (Situation, Task, Action, Result) or a similar framework."
            }
            Criterion::Confidence => {
                "Perceived confidence, ownership, and decisiveness (without arrogance)."
            }
            Criterion::Brevity => {
                "How concise yet complete the answer is (no rambling, no missing key points)."
            }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn neutral_score() -> u8 {
    NEUTRAL_SCORE
}

/// Rubric scores for one answer, each in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default = "neutral_score")]
    pub clarity: u8,
    #[serde(default = "neutral_score")]
    pub technical_or_role_fit: u8,
    #[serde(rename = "structure_STAR", default = "neutral_score")]
    pub structure_star: u8,
    #[serde(default = "neutral_score")]
    pub confidence: u8,
    #[serde(default = "neutral_score")]
    pub brevity: u8,
}

impl Scores {
    /// Every criterion set to `value` (clamped to the rubric range).
    pub fn uniform(value: u8) -> Self {
        let v = value.min(MAX_SCORE);
        Self {
            clarity: v,
            technical_or_role_fit: v,
            structure_star: v,
            confidence: v,
            brevity: v,
        }
    }

    pub fn neutral() -> Self {
        Self::uniform(NEUTRAL_SCORE)
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::Clarity => self.clarity,
            Criterion::TechnicalOrRoleFit => self.technical_or_role_fit,
            Criterion::StructureStar => self.structure_star,
            Criterion::Confidence => self.confidence,
            Criterion::Brevity => self.brevity,
        }
    }

    pub fn set(&mut self, criterion: Criterion, value: u8) {
        let v = value.min(MAX_SCORE);
        match criterion {
            Criterion::Clarity => self.clarity = v,
            Criterion::TechnicalOrRoleFit => self.technical_or_role_fit = v,
            Criterion::StructureStar => self.structure_star = v,
            Criterion::Confidence => self.confidence = v,
            Criterion::Brevity => self.brevity = v,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u8)> + '_ {
        Criterion::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Mean across the five criteria.
    pub fn mean(&self) -> f64 {
        let total: u32 = self.iter().map(|(_, v)| v as u32).sum();
        total as f64 / Criterion::ALL.len() as f64
    }
}

impl Default for Scores {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Per-criterion means across a set of evaluations.
///
/// Returns `None` for an empty slice so callers never divide by zero.
pub fn criterion_means(evaluations: &[Evaluation]) -> Option<Vec<(Criterion, f64)>> {
    if evaluations.is_empty() {
        return None;
    }
    let n = evaluations.len() as f64;
    Some(
        Criterion::ALL
            .into_iter()
            .map(|c| {
                let sum: u32 = evaluations.iter().map(|e| e.scores.get(c) as u32).sum();
                (c, sum as f64 / n)
            })
            .collect(),
    )
}

/// Arithmetic mean of the per-criterion means.
pub fn overall_mean(evaluations: &[Evaluation]) -> Option<f64> {
    criterion_means(evaluations)
        .map(|means| means.iter().map(|(_, m)| m).sum::<f64>() / means.len() as f64)
}

/// The evaluator's verdict on one answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub weak_spots: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub comments: String,
}

/// Outcome of a finished session, as produced by `finalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub user_id: String,
    pub role: String,
    #[serde(default)]
    pub summary_text: String,
    #[serde(default)]
    pub weak_spot_topics: Vec<String>,
    #[serde(default)]
    pub strength_topics: Vec<String>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
}

/// A session summary as stored in a user's memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// When the summary was appended.
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SessionSummary,
}

/// Everything remembered about one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub user_id: String,
    #[serde(default)]
    pub sessions: Vec<StoredSession>,
    /// Derived from `sessions`; recomputed on every read and write, never
    /// read back from disk.
    #[serde(default, skip_deserializing)]
    pub weak_spots: BTreeMap<String, u32>,
}

impl MemoryRecord {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            sessions: Vec::new(),
            weak_spots: BTreeMap::new(),
        }
    }
}

/// Session variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Breadth-first mock interview.
    #[default]
    Normal,
    /// Questions reordered toward the user's historical weak spots.
    Drill,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "normal"),
            Mode::Drill => write!(f, "drill"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "drill" => Ok(Mode::Drill),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Interviewer persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    #[default]
    Neutral,
    Grilling,
}

impl Tone {
    /// How the persona prompt describes this tone.
    pub fn persona(self) -> &'static str {
        match self {
            Tone::Friendly => "warm, encouraging, and supportive",
            Tone::Neutral => "professional, calm, and balanced",
            Tone::Grilling => "challenging, skeptical, and intense but still respectful",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Friendly => write!(f, "friendly"),
            Tone::Neutral => write!(f, "neutral"),
            Tone::Grilling => write!(f, "grilling"),
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "friendly" => Ok(Tone::Friendly),
            "neutral" => Ok(Tone::Neutral),
            "grilling" => Ok(Tone::Grilling),
            other => Err(format!("unknown tone: {other}")),
        }
    }
}
