//! Simulation-level error type.
//!
//! Everything here is a startup validation failure — per the error design,
//! nothing fails once the first tick runs.

use thiserror::Error;

use fr_agents::AgentError;
use fr_core::CoreError;
use fr_grid::GridError;
use fr_network::NetworkError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Population(#[from] AgentError),
}

pub type SimResult<T> = Result<T, SimError>;
