//! Discounted cash flow intrinsic-value estimation.
//!
//! Deterministic, double-precision computation over an owned statement
//! series. No I/O, no rounding; presentation-level rounding is the caller's
//! concern.

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::statement::StatementSeries;

/// Minimum number of periods required to derive a cash flow trend.
pub const MIN_PERIODS: usize = 2;

pub const DEFAULT_DISCOUNT_RATE: f64 = 0.09;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.025;
pub const DEFAULT_HORIZON_YEARS: u32 = 5;

/// Caller-supplied DCF assumptions, validated at construction.
///
/// Fields are private so an invalid combination cannot be built; the struct
/// is immutable and constructed once per valuation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    growth_rate: Option<f64>,
    discount_rate: f64,
    terminal_growth_rate: f64,
    horizon_years: u32,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        ValuationAssumptions {
            growth_rate: None,
            discount_rate: DEFAULT_DISCOUNT_RATE,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

impl ValuationAssumptions {
    /// Builds a validated set of assumptions. `growth_rate` is an optional
    /// override; when absent the growth rate is derived from the series.
    pub fn new(
        growth_rate: Option<f64>,
        discount_rate: f64,
        terminal_growth_rate: f64,
        horizon_years: u32,
    ) -> Result<Self, EngineError> {
        if discount_rate <= 0.0 {
            return Err(EngineError::InvalidAssumption(format!(
                "discount rate must be strictly positive, got {discount_rate}"
            )));
        }
        if horizon_years == 0 {
            return Err(EngineError::InvalidAssumption(
                "projection horizon must be at least one year".to_string(),
            ));
        }
        Ok(ValuationAssumptions {
            growth_rate,
            discount_rate,
            terminal_growth_rate,
            horizon_years,
        })
    }

    pub fn growth_rate(&self) -> Option<f64> {
        self.growth_rate
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn terminal_growth_rate(&self) -> f64 {
        self.terminal_growth_rate
    }

    pub fn horizon_years(&self) -> u32 {
        self.horizon_years
    }
}

/// The result of a DCF valuation, together with the assumptions that
/// produced it. Recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicValueEstimate {
    /// Estimated fair value per share.
    pub value_per_share: f64,
    /// Present value of projected cash flows plus terminal value.
    pub total_present_value: f64,
    /// The growth rate actually used (override or derived).
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub horizon_years: u32,
}

/// Estimates intrinsic value per share for a statement series.
///
/// Projects free cash flow forward from the most recent period, decaying the
/// initial growth rate linearly toward the terminal growth rate over the
/// horizon, discounts each year and adds a Gordon-growth terminal value.
pub fn compute_intrinsic_value(
    series: &StatementSeries,
    assumptions: &ValuationAssumptions,
) -> Result<IntrinsicValueEstimate, EngineError> {
    if series.len() < MIN_PERIODS {
        return Err(EngineError::InsufficientData(format!(
            "{} period(s) available for {}, need at least {MIN_PERIODS}",
            series.len(),
            series.ticker
        )));
    }

    let discount_rate = assumptions.discount_rate();
    let terminal_growth = assumptions.terminal_growth_rate();
    if discount_rate <= terminal_growth {
        return Err(EngineError::DegenerateGrowth(format!(
            "discount rate {discount_rate} must exceed terminal growth rate {terminal_growth}"
        )));
    }

    let latest_fcf = series
        .latest()
        .and_then(|s| s.free_cash_flow())
        .ok_or_else(|| {
            EngineError::InsufficientData(
                "free cash flow unavailable for the most recent period".to_string(),
            )
        })?;

    let growth_rate = match assumptions.growth_rate() {
        Some(rate) => rate,
        None => derive_growth_rate(series, latest_fcf)?,
    };

    let horizon = assumptions.horizon_years();
    let mut cash_flow = latest_fcf;
    let mut present_value = 0.0;
    for year in 1..=horizon {
        cash_flow *= 1.0 + decayed_growth(growth_rate, terminal_growth, year, horizon);
        present_value += cash_flow / (1.0 + discount_rate).powi(year as i32);
    }

    // Gordon growth perpetuity beyond the horizon, discounted to present.
    let terminal_value = cash_flow * (1.0 + terminal_growth) / (discount_rate - terminal_growth);
    present_value += terminal_value / (1.0 + discount_rate).powi(horizon as i32);

    let shares = series.latest().and_then(|s| s.shares_outstanding);
    let shares = match shares {
        Some(s) if s != 0.0 => s,
        Some(_) => {
            return Err(EngineError::InsufficientData(
                "shares outstanding is zero in the most recent period".to_string(),
            ));
        }
        None => {
            return Err(EngineError::InsufficientData(
                "shares outstanding unavailable for the most recent period".to_string(),
            ));
        }
    };

    Ok(IntrinsicValueEstimate {
        value_per_share: present_value / shares,
        total_present_value: present_value,
        growth_rate,
        discount_rate,
        terminal_growth_rate: terminal_growth,
        horizon_years: horizon,
    })
}

/// Compound growth between the oldest and newest free cash flow in the
/// series. With two periods this is simply newest/oldest - 1.
fn derive_growth_rate(series: &StatementSeries, latest_fcf: f64) -> Result<f64, EngineError> {
    let oldest_fcf = series
        .oldest()
        .and_then(|s| s.free_cash_flow())
        .ok_or_else(|| {
            EngineError::InsufficientData(
                "free cash flow unavailable for the oldest period".to_string(),
            )
        })?;

    if oldest_fcf <= 0.0 {
        return Err(EngineError::DegenerateGrowth(format!(
            "oldest free cash flow is {oldest_fcf}; supply a growth rate override"
        )));
    }
    if latest_fcf <= 0.0 {
        return Err(EngineError::DegenerateGrowth(format!(
            "latest free cash flow is {latest_fcf}; supply a growth rate override"
        )));
    }

    let spans = (series.len() - 1) as f64;
    Ok((latest_fcf / oldest_fcf).powf(1.0 / spans) - 1.0)
}

/// Linear decay from the initial growth rate at year 1 to the terminal
/// growth rate at the horizon year. A one-year horizon uses the initial
/// rate as-is.
fn decayed_growth(initial: f64, terminal: f64, year: u32, horizon: u32) -> f64 {
    if horizon <= 1 {
        return initial;
    }
    let fraction = (year - 1) as f64 / (horizon - 1) as f64;
    initial + (terminal - initial) * fraction
}
