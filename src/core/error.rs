//! Typed errors produced by the metrics engine.
//!
//! These are recoverable conditions the caller is expected to branch on,
//! e.g. render "data unavailable" instead of aborting. The engine never
//! logs or retries; application code wraps these in `anyhow` at the edge.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The statement series is too short, or a required scalar is missing.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The growth/discount-rate relationship makes the DCF formula undefined.
    #[error("degenerate growth: {0}")]
    DegenerateGrowth(String),

    /// Caller-supplied valuation assumptions violate their constraints.
    #[error("invalid assumption: {0}")]
    InvalidAssumption(String),
}
