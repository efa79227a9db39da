//! rehearse-core — Interview session engine, evaluator gateway, and weak-spot memory.
//!
//! This crate owns everything with real state in rehearse: the per-session
//! state machine, the question source, the evaluator gateway with its
//! deterministic fallbacks, and the per-user memory that feeds drill mode.

pub mod bank;
pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod model;
pub mod prompts;
pub mod questions;
pub mod retry;
pub mod session;
pub mod traits;
pub mod weak_spots;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PracticeConfig;
pub use error::ProviderError;
pub use gateway::EvaluatorGateway;
pub use memory::MemoryStore;
pub use questions::{FollowUpGenerator, QuestionSource};
pub use session::{FinalizeOutcome, InterviewSession, SessionPhase, SessionProfile, Turn};
