//! Driver-facing error types.
//!
//! Expected conditions (unknown scenario, no active run) are part of the
//! normal API surface and never abort the process; callers match on the
//! variant and carry on.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("scenario not found: {id}")]
    ScenarioNotFound { id: String },

    #[error("no active simulation")]
    NoActiveSimulation,

    #[error("simulation has already completed")]
    AlreadyCompleted,
}
