//! Agent-subsystem error type.

use thiserror::Error;

/// Errors produced by `fr-agents` — population configuration rejected at
/// spawn time.  Stepping itself never fails: routing misses and capacity
/// limits are ordinary outcomes handled in place.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("population configuration error: {0}")]
    Config(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
