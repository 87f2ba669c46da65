//! Base error type.
//!
//! Sub-crates define their own error enums (`GridError`, `NetworkError`, …)
//! and either wrap `CoreError` as a variant or convert via `From`.  Routing
//! failures, clamped samples, and capacity skips are ordinary values in this
//! workspace, not errors — only invalid configuration is fatal, and only
//! before the first tick.

use thiserror::Error;

/// Errors produced by `fr-core` itself: configuration rejected at startup.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fr-core` validation.
pub type CoreResult<T> = Result<T, CoreError>;
