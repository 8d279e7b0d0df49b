//! Ratio computation over a single financial statement.
//!
//! Pure functions: no I/O, no logging, never fails. A ratio that cannot be
//! computed is marked [`Ratio::Undefined`] instead of being substituted with
//! a zero or NaN, so callers must branch on definedness before use.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::statement::FinancialStatement;

/// Why a ratio could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedReason {
    /// The denominator is exactly zero.
    ZeroDenominator,
    /// A required input was not reported for this period.
    MissingInput,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::ZeroDenominator => write!(f, "zero denominator"),
            UndefinedReason::MissingInput => write!(f, "missing input"),
        }
    }
}

/// A computed ratio, or an explicit marker that it is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ratio {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Ratio {
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }

    /// Numerator / denominator with the undefined-marker policy: missing
    /// inputs and zero denominators are marked, negative values pass through.
    fn divide(numerator: Option<f64>, denominator: Option<f64>) -> Ratio {
        let (Some(n), Some(d)) = (numerator, denominator) else {
            return Ratio::Undefined(UndefinedReason::MissingInput);
        };
        if d == 0.0 {
            return Ratio::Undefined(UndefinedReason::ZeroDenominator);
        }
        Ratio::Defined(n / d)
    }
}

/// The computed ratios for one reporting period. Values are fractions, not
/// percentages; presentation is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    pub period: String,
    /// Net income / shareholders' equity.
    pub roe: Ratio,
    /// EBIT x (1 - tax rate) / invested capital.
    pub roic: Ratio,
    /// Total liabilities / shareholders' equity.
    pub debt_to_equity: Ratio,
    /// Current assets / current liabilities.
    pub current_ratio: Ratio,
    /// Net income / revenue.
    pub net_margin: Ratio,
    /// Free cash flow / revenue.
    pub fcf_margin: Ratio,
}

/// Computes all supported ratios for one statement.
///
/// Negative equity is not special-cased: ROE is still computed and the
/// caller interprets the sign. Only an exactly-zero denominator or a missing
/// input yields an undefined marker.
pub fn compute_ratios(statement: &FinancialStatement) -> RatioSet {
    let nopat = match (statement.operating_income, statement.tax_rate) {
        (Some(ebit), Some(tax_rate)) => Some(ebit * (1.0 - tax_rate)),
        _ => None,
    };

    RatioSet {
        period: statement.period.clone(),
        roe: Ratio::divide(statement.net_income, statement.shareholders_equity),
        roic: Ratio::divide(nopat, statement.invested_capital),
        debt_to_equity: Ratio::divide(statement.total_liabilities, statement.shareholders_equity),
        current_ratio: Ratio::divide(statement.current_assets, statement.current_liabilities),
        net_margin: Ratio::divide(statement.net_income, statement.revenue),
        fcf_margin: Ratio::divide(statement.free_cash_flow(), statement.revenue),
    }
}
