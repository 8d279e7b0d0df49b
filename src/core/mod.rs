//! Core business logic: statement data model, the metrics engine, and the
//! abstractions the surrounding application implements.

pub mod config;
pub mod error;
pub mod fetch;
pub mod log;
pub mod metrics;
pub mod narrative;
pub mod statement;
pub mod valuation;

// Re-export main types for cleaner imports
pub use error::EngineError;
pub use fetch::StatementProvider;
pub use metrics::{Ratio, RatioSet, UndefinedReason, compute_ratios};
pub use narrative::{LlmClient, NewsProvider, NewsSnippet};
pub use statement::{FinancialStatement, StatementSeries};
pub use valuation::{IntrinsicValueEstimate, ValuationAssumptions, compute_intrinsic_value};
