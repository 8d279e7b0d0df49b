//! Narrative composition: turns engine output into prompts for a hosted
//! language model, plus the abstractions for the model and news search.
//!
//! Prompt building is pure string assembly so it can be tested without a
//! network; the actual model call happens behind [`LlmClient`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::error::EngineError;
use crate::core::metrics::{Ratio, RatioSet};
use crate::core::valuation::IntrinsicValueEstimate;

/// A single news search result used to ground the commentary.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsSnippet {
    pub title: String,
    pub url: String,
    pub content: String,
}

/// Web search for recent company news.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search_news(&self, query: &str, limit: usize) -> Result<Vec<NewsSnippet>>;
}

/// A hosted chat model that completes a system + user prompt pair.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// The Buffett-persona system prompt. Carries the current date so the model
/// does not reason from a stale training cutoff.
pub fn system_prompt(today: NaiveDate) -> String {
    format!(
        "You are an AI financial analyst with expertise in evaluating businesses using \
methods similar to those of Warren Buffett. Your task is to provide short, accurate, \
and concise commentary on company financials and performance.\n\n\
You are given pre-computed financial ratios and a discounted cash flow estimate. \
Do not recompute them; interpret them.\n\n\
When answering:\n\
1. Focus on accurate financial insights grounded in the numbers provided.\n\
2. Use specific figures and percentages when available.\n\
3. If a metric is marked unavailable, say so rather than guessing.\n\
4. Keep your answers short, concise, and to the point.\n\n\
The current date is {}.",
        today.format("%Y-%m-%d")
    )
}

/// Assembles the user prompt from the computed metrics, the valuation
/// outcome and any news snippets.
pub fn build_analysis_prompt(
    ticker: &str,
    ratios: &RatioSet,
    valuation: &Result<IntrinsicValueEstimate, EngineError>,
    news: &[NewsSnippet],
    question: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Analyze {ticker} in the style of Warren Buffett.\n\n\
Latest reported period: {}\n\nFinancial ratios:\n",
        ratios.period
    );

    prompt.push_str(&ratio_line("Return on equity", &ratios.roe, true));
    prompt.push_str(&ratio_line("Return on invested capital", &ratios.roic, true));
    prompt.push_str(&ratio_line("Debt to equity", &ratios.debt_to_equity, false));
    prompt.push_str(&ratio_line("Current ratio", &ratios.current_ratio, false));
    prompt.push_str(&ratio_line("Net margin", &ratios.net_margin, true));
    prompt.push_str(&ratio_line("Free cash flow margin", &ratios.fcf_margin, true));

    match valuation {
        Ok(estimate) => {
            prompt.push_str(&format!(
                "\nIntrinsic value estimate (DCF): {:.2} per share\n\
Assumptions: growth {:.2}%, discount {:.2}%, terminal growth {:.2}%, {}-year horizon\n",
                estimate.value_per_share,
                estimate.growth_rate * 100.0,
                estimate.discount_rate * 100.0,
                estimate.terminal_growth_rate * 100.0,
                estimate.horizon_years
            ));
        }
        Err(e) => {
            prompt.push_str(&format!("\nIntrinsic value estimate unavailable: {e}\n"));
        }
    }

    if !news.is_empty() {
        prompt.push_str("\nRecent news:\n");
        for snippet in news {
            prompt.push_str(&format!("- {}: {}\n", snippet.title, snippet.content));
        }
    }

    match question {
        Some(q) => prompt.push_str(&format!("\nQuestion: {q}\n")),
        None => prompt.push_str(
            "\nGive a brief assessment of business quality and whether the \
valuation looks attractive.\n",
        ),
    }

    prompt
}

fn ratio_line(label: &str, ratio: &Ratio, as_percent: bool) -> String {
    match ratio {
        Ratio::Defined(v) if as_percent => format!("- {label}: {:.2}%\n", v * 100.0),
        Ratio::Defined(v) => format!("- {label}: {v:.2}\n"),
        Ratio::Undefined(reason) => format!("- {label}: not available ({reason})\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::UndefinedReason;

    fn ratio_set() -> RatioSet {
        RatioSet {
            period: "2024-09-28".to_string(),
            roe: Ratio::Defined(0.20),
            roic: Ratio::Defined(0.15),
            debt_to_equity: Ratio::Undefined(UndefinedReason::ZeroDenominator),
            current_ratio: Ratio::Defined(2.5),
            net_margin: Ratio::Defined(0.1),
            fcf_margin: Ratio::Undefined(UndefinedReason::MissingInput),
        }
    }

    #[test]
    fn test_prompt_includes_defined_ratios_as_percent() {
        let prompt = build_analysis_prompt("AAPL", &ratio_set(), &Err(EngineError::InsufficientData("x".into())), &[], None);
        assert!(prompt.contains("Return on equity: 20.00%"));
        assert!(prompt.contains("Return on invested capital: 15.00%"));
        assert!(prompt.contains("Current ratio: 2.50"));
    }

    #[test]
    fn test_prompt_marks_undefined_ratios() {
        let prompt = build_analysis_prompt("AAPL", &ratio_set(), &Err(EngineError::InsufficientData("x".into())), &[], None);
        assert!(prompt.contains("Debt to equity: not available (zero denominator)"));
        assert!(prompt.contains("Free cash flow margin: not available (missing input)"));
        // The undefined marker must never degrade to a numeric zero.
        assert!(!prompt.contains("Debt to equity: 0"));
    }

    #[test]
    fn test_prompt_includes_valuation_and_news() {
        let estimate = IntrinsicValueEstimate {
            value_per_share: 187.5,
            total_present_value: 1875.0,
            growth_rate: 0.21,
            discount_rate: 0.09,
            terminal_growth_rate: 0.025,
            horizon_years: 5,
        };
        let news = vec![NewsSnippet {
            title: "Apple ships new widget".to_string(),
            url: "https://example.com/a".to_string(),
            content: "Strong demand reported.".to_string(),
        }];
        let prompt =
            build_analysis_prompt("AAPL", &ratio_set(), &Ok(estimate), &news, Some("Is it cheap?"));
        assert!(prompt.contains("187.50 per share"));
        assert!(prompt.contains("growth 21.00%"));
        assert!(prompt.contains("Apple ships new widget"));
        assert!(prompt.contains("Question: Is it cheap?"));
    }

    #[test]
    fn test_prompt_surfaces_valuation_error() {
        let prompt = build_analysis_prompt(
            "AAPL",
            &ratio_set(),
            &Err(EngineError::DegenerateGrowth("oldest free cash flow is -5".into())),
            &[],
            None,
        );
        assert!(prompt.contains("Intrinsic value estimate unavailable"));
        assert!(prompt.contains("degenerate growth"));
    }

    #[test]
    fn test_system_prompt_carries_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert!(system_prompt(date).contains("2026-08-28"));
    }
}
