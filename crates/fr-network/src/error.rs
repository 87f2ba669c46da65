//! Network-subsystem error type.

use thiserror::Error;

use fr_core::NodeId;

/// Errors produced by `fr-network`.
///
/// `NoRoute`/`NoRouteToAny` are expected, recoverable outcomes — callers fall
/// back to the full graph or change strategy.  The remaining variants are
/// construction-time validation failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("no route from {from} to any requested target")]
    NoRouteToAny { from: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {from}-{to} has non-positive length {length}")]
    InvalidEdgeLength { from: NodeId, to: NodeId, length: f64 },

    #[error("road network has no nodes")]
    EmptyNetwork,

    #[error("safe-zone set is empty")]
    EmptySafeZones,

    #[error("hazard threshold must be finite and > 0, got {0}")]
    InvalidThreshold(f64),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
