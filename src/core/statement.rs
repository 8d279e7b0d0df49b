//! Financial statement value types consumed by the metrics engine.

use serde::{Deserialize, Serialize};

/// One reporting period's normalized financials for a company.
///
/// All monetary scalars are `Option<f64>`: providers routinely omit line
/// items, and the engine's undefined-ratio convention depends on being able
/// to tell "not reported" apart from zero. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    /// Fiscal label or report date, e.g. "2024-09-28" or "FY2024".
    pub period: String,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub shareholders_equity: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub invested_capital: Option<f64>,
    /// EBIT / operating income.
    pub operating_income: Option<f64>,
    /// Effective tax rate as a fraction, derived or provider-supplied.
    pub tax_rate: Option<f64>,
    pub shares_outstanding: Option<f64>,
}

impl FinancialStatement {
    /// Free cash flow: operating cash flow minus capital expenditures.
    /// `None` when either component is unreported.
    pub fn free_cash_flow(&self) -> Option<f64> {
        match (self.operating_cash_flow, self.capital_expenditure) {
            (Some(ocf), Some(capex)) => Some(ocf - capex),
            _ => None,
        }
    }
}

/// Ordered statements for one ticker, most recent first.
///
/// All periods share one currency and reporting frequency; the series may be
/// empty (unknown ticker) or shorter than the caller requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSeries {
    pub ticker: String,
    pub statements: Vec<FinancialStatement>,
}

impl StatementSeries {
    pub fn new(ticker: impl Into<String>, statements: Vec<FinancialStatement>) -> Self {
        StatementSeries {
            ticker: ticker.into(),
            statements,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Most recent period, if any.
    pub fn latest(&self) -> Option<&FinancialStatement> {
        self.statements.first()
    }

    /// Oldest period, if any.
    pub fn oldest(&self) -> Option<&FinancialStatement> {
        self.statements.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_statement(period: &str) -> FinancialStatement {
        FinancialStatement {
            period: period.to_string(),
            revenue: None,
            net_income: None,
            total_assets: None,
            total_liabilities: None,
            current_assets: None,
            current_liabilities: None,
            shareholders_equity: None,
            operating_cash_flow: None,
            capital_expenditure: None,
            invested_capital: None,
            operating_income: None,
            tax_rate: None,
            shares_outstanding: None,
        }
    }

    #[test]
    fn test_free_cash_flow_derivation() {
        let mut s = empty_statement("2024");
        s.operating_cash_flow = Some(500.0);
        s.capital_expenditure = Some(120.0);
        assert_eq!(s.free_cash_flow(), Some(380.0));
    }

    #[test]
    fn test_free_cash_flow_missing_component() {
        let mut s = empty_statement("2024");
        s.operating_cash_flow = Some(500.0);
        assert_eq!(s.free_cash_flow(), None);

        let mut s = empty_statement("2024");
        s.capital_expenditure = Some(120.0);
        assert_eq!(s.free_cash_flow(), None);
    }

    #[test]
    fn test_series_ordering_accessors() {
        let series = StatementSeries::new(
            "AAPL",
            vec![empty_statement("2024"), empty_statement("2023")],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().period, "2024");
        assert_eq!(series.oldest().unwrap().period, "2023");
    }

    #[test]
    fn test_empty_series() {
        let series = StatementSeries::new("NOPE", vec![]);
        assert!(series.is_empty());
        assert!(series.latest().is_none());
    }
}
