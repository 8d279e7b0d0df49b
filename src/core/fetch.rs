//! Statement fetching abstraction.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::statement::StatementSeries;

/// Fetches normalized financial statements for a ticker. Implementations
/// wrap a third-party data API and are responsible for mapping its wire
/// format onto [`crate::core::statement::FinancialStatement`].
#[async_trait]
pub trait StatementProvider: Send + Sync {
    /// Returns up to `periods` reporting periods, most recent first. The
    /// series may be empty for an unknown ticker.
    async fn fetch_statements(&self, ticker: &str, periods: usize) -> Result<StatementSeries>;
}
