//! Interview session orchestration.
//!
//! [`InterviewSession`] drives one mock interview from the first question to
//! the persisted summary. It owns the question source and the evaluations
//! for the session and talks to the evaluator gateway and the memory store
//! once per call. All operations take `&mut self`, so a session never has
//! more than one call in flight.

use anyhow::Result;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::gateway::EvaluatorGateway;
use crate::memory::MemoryStore;
use crate::model::{Evaluation, Mode, SessionSummary, StoredSession, Tone};
use crate::questions::{FollowUpGenerator, QuestionSource};

/// Returned by the answer that completes the interview.
pub const CLOSING_MESSAGE: &str = "Thank you, that concludes this mock interview.";

/// Returned by any answer submitted after the interview is complete.
pub const ALREADY_COMPLETE_MESSAGE: &str =
    "This interview session is already complete. Please start a new session.";

/// Returned when the submitted answer is blank.
pub const EMPTY_ANSWER_MESSAGE: &str =
    "Please type an answer before submitting. Take your time.";

/// How many historical weak spots seed a drill session by default.
pub const DEFAULT_DRILL_TOPIC_COUNT: usize = 5;

/// Who is practicing, for what, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    pub user_id: String,
    pub role: String,
    pub mode: Mode,
    pub tone: Tone,
    pub max_questions: u32,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The answer was scored; here is the next question.
    Question(String),
    /// The answer was scored and it was the last one.
    Complete(String),
    /// The session had already finished; nothing changed.
    AlreadyComplete(String),
    /// The answer was blank; nothing changed.
    EmptyAnswer(String),
}

impl Turn {
    /// Text to show the candidate.
    pub fn message(&self) -> &str {
        match self {
            Turn::Question(m)
            | Turn::Complete(m)
            | Turn::AlreadyComplete(m)
            | Turn::EmptyAnswer(m) => m,
        }
    }

    /// Whether the session is over after this turn.
    pub fn is_final(&self) -> bool {
        matches!(self, Turn::Complete(_) | Turn::AlreadyComplete(_))
    }
}

/// Result of [`InterviewSession::finalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// The summary was generated and appended to the user's memory.
    Finalized(StoredSession),
    /// The interview still has questions left; nothing was stored.
    NotFinished { asked: u32, max_questions: u32 },
}

/// Coarse lifecycle state, for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Finished,
}

enum State {
    NotStarted,
    InProgress {
        source: QuestionSource,
        current_question: String,
        asked: u32,
    },
    Finished {
        asked: u32,
    },
}

/// One mock interview.
pub struct InterviewSession {
    id: Uuid,
    profile: SessionProfile,
    gateway: EvaluatorGateway,
    generator: FollowUpGenerator,
    memory: MemoryStore,
    drill_topic_count: usize,
    drill_topics: Vec<String>,
    evaluations: Vec<Evaluation>,
    state: State,
}

impl InterviewSession {
    /// Create a session. `max_questions` below 1 is raised to 1.
    pub fn new(
        mut profile: SessionProfile,
        gateway: EvaluatorGateway,
        generator: FollowUpGenerator,
        memory: MemoryStore,
    ) -> Self {
        profile.max_questions = profile.max_questions.max(1);
        Self {
            id: Uuid::new_v4(),
            profile,
            gateway,
            generator,
            memory,
            drill_topic_count: DEFAULT_DRILL_TOPIC_COUNT,
            drill_topics: Vec::new(),
            evaluations: Vec::new(),
            state: State::NotStarted,
        }
    }

    pub fn with_drill_topic_count(mut self, count: usize) -> Self {
        self.drill_topic_count = count;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::NotStarted => SessionPhase::NotStarted,
            State::InProgress { .. } => SessionPhase::InProgress,
            State::Finished { .. } => SessionPhase::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == SessionPhase::Finished
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn num_questions_asked(&self) -> u32 {
        match self.state {
            State::NotStarted => 0,
            State::InProgress { asked, .. } | State::Finished { asked } => asked,
        }
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&str> {
        match &self.state {
            State::InProgress {
                current_question, ..
            } => Some(current_question),
            _ => None,
        }
    }

    /// Weak-spot topics the drill was seeded with. Empty outside drill mode.
    pub fn drill_topics(&self) -> &[String] {
        &self.drill_topics
    }

    /// Begin the interview and return the first question.
    ///
    /// Calling it again while a question is pending returns that question.
    #[instrument(skip_all, fields(session = %self.id, user = %self.profile.user_id))]
    pub async fn start(&mut self) -> String {
        match &self.state {
            State::InProgress {
                current_question, ..
            } => return current_question.clone(),
            State::Finished { .. } => return ALREADY_COMPLETE_MESSAGE.to_string(),
            State::NotStarted => {}
        }

        self.drill_topics = match self.profile.mode {
            Mode::Drill => self.memory.get_weak_spots(self.drill_topic_count),
            Mode::Normal => Vec::new(),
        };
        if self.profile.mode == Mode::Drill && self.drill_topics.is_empty() {
            debug!("no weak-spot history, drill uses the plain question order");
        }

        let mut source = QuestionSource::new(
            &self.profile.role,
            self.profile.tone,
            self.profile.mode,
            self.drill_topics.clone(),
            self.generator.clone(),
        );
        let first = source.get_next_question(None).await;

        info!(
            role = %self.profile.role,
            mode = %self.profile.mode,
            tone = %self.profile.tone,
            max_questions = self.profile.max_questions,
            "interview started"
        );
        self.state = State::InProgress {
            source,
            current_question: first.clone(),
            asked: 1,
        };
        first
    }

    /// Score `answer` against the current question and move the interview on.
    ///
    /// Starts the session first if [`start`](Self::start) was never called.
    #[instrument(skip_all, fields(session = %self.id, user = %self.profile.user_id))]
    pub async fn submit_answer(&mut self, answer: &str) -> Turn {
        if self.is_finished() {
            return Turn::AlreadyComplete(ALREADY_COMPLETE_MESSAGE.to_string());
        }
        let answer = answer.trim();
        if answer.is_empty() {
            debug!("blank answer rejected");
            return Turn::EmptyAnswer(EMPTY_ANSWER_MESSAGE.to_string());
        }
        if self.phase() == SessionPhase::NotStarted {
            self.start().await;
        }

        let State::InProgress {
            source,
            current_question,
            asked,
        } = &mut self.state
        else {
            return Turn::AlreadyComplete(ALREADY_COMPLETE_MESSAGE.to_string());
        };

        let evaluation = self
            .gateway
            .evaluate_answer(current_question.as_str(), answer, &self.profile.role)
            .await;
        debug!(question = *asked, mean = evaluation.scores.mean(), "answer scored");
        self.evaluations.push(evaluation);

        if *asked >= self.profile.max_questions {
            let asked = *asked;
            self.state = State::Finished { asked };
            info!(answered = asked, "interview complete");
            return Turn::Complete(CLOSING_MESSAGE.to_string());
        }

        let next = source.get_next_question(Some(answer)).await;
        *current_question = next.clone();
        *asked += 1;
        Turn::Question(next)
    }

    /// Summarize the finished interview and append it to the user's memory.
    ///
    /// Each successful call appends a new session record.
    #[instrument(skip_all, fields(session = %self.id, user = %self.profile.user_id))]
    pub async fn finalize(&mut self) -> Result<FinalizeOutcome> {
        if !self.is_finished() {
            debug!("finalize called before the interview finished");
            return Ok(FinalizeOutcome::NotFinished {
                asked: self.num_questions_asked(),
                max_questions: self.profile.max_questions,
            });
        }

        let core = self
            .gateway
            .summarize_session(&self.evaluations, &self.profile.role)
            .await;
        let summary = SessionSummary {
            user_id: self.profile.user_id.clone(),
            role: self.profile.role.clone(),
            summary_text: core.summary_text,
            weak_spot_topics: core.weak_spot_topics,
            strength_topics: core.strength_topics,
            evaluations: self.evaluations.clone(),
        };
        let stored = self.memory.add_session_summary(&summary)?;
        info!(
            weak_spots = stored.summary.weak_spot_topics.len(),
            "session finalized"
        );
        Ok(FinalizeOutcome::Finalized(stored))
    }
}
