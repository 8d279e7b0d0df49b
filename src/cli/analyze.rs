use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::{ratios, ui};
use crate::core::config::AppConfig;
use crate::core::error::EngineError;
use crate::core::fetch::StatementProvider;
use crate::core::narrative::{self, LlmClient, NewsProvider, NewsSnippet};
use crate::core::valuation::{
    IntrinsicValueEstimate, ValuationAssumptions, compute_intrinsic_value,
};

/// Per-invocation overrides for the analysis pipeline; unset fields fall
/// back to the config file defaults.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub question: Option<String>,
    pub periods: Option<usize>,
    pub growth_rate: Option<f64>,
    pub discount_rate: Option<f64>,
    pub terminal_growth_rate: Option<f64>,
    pub horizon_years: Option<u32>,
    pub no_news: bool,
}

pub async fn run(ticker: &str, options: AnalyzeOptions, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    run_with_config(&config, ticker, &options).await
}

/// The full pipeline: fetch statements, compute ratios and intrinsic value,
/// gather news, and ask the model for Buffett-style commentary.
pub async fn run_with_config(
    config: &AppConfig,
    ticker: &str,
    options: &AnalyzeOptions,
) -> Result<()> {
    info!("Analyzing {ticker}...");

    let provider = super::statement_provider(config)?;
    let llm = super::llm_client(config)?;

    let periods = options.periods.unwrap_or(config.analysis.periods);
    let pb = ui::new_spinner(&format!("Fetching statements for {ticker}"));
    let series = provider.fetch_statements(ticker, periods).await;
    pb.finish_and_clear();
    let series = series?;

    if series.is_empty() {
        anyhow::bail!("No financial statements found for {ticker}");
    }

    let assumptions = ValuationAssumptions::new(
        options.growth_rate,
        options
            .discount_rate
            .unwrap_or(config.analysis.discount_rate),
        options
            .terminal_growth_rate
            .unwrap_or(config.analysis.terminal_growth_rate),
        options
            .horizon_years
            .unwrap_or(config.analysis.horizon_years),
    )?;

    // Latest-period ratios feed the prompt; the full history is rendered.
    let series_ratios = ratios::compute_series_ratios(&series);
    let latest_ratios = &series_ratios[0];
    let valuation = compute_intrinsic_value(&series, &assumptions);

    let news = if options.no_news {
        Vec::new()
    } else {
        fetch_news(config, ticker).await
    };

    let system = narrative::system_prompt(Utc::now().date_naive());
    let user = narrative::build_analysis_prompt(
        ticker,
        latest_ratios,
        &valuation,
        &news,
        options.question.as_deref(),
    );
    debug!("Composed prompt:\n{user}");

    let pb = ui::new_spinner("Thinking...");
    let commentary = llm.complete(&system, &user).await;
    pb.finish_and_clear();
    let commentary = commentary?;

    println!(
        "{}",
        ui::style_text(&format!("Analysis: {ticker}"), ui::StyleType::Title)
    );
    println!("{}", ratios::ratio_table(&series_ratios));
    display_valuation(&valuation);
    ui::print_separator();
    println!("{commentary}");

    Ok(())
}

/// News search is best effort: a failure degrades the commentary but must
/// not abort the analysis.
async fn fetch_news(config: &AppConfig, ticker: &str) -> Vec<NewsSnippet> {
    let provider = match super::news_provider(config) {
        Ok(p) => p,
        Err(e) => {
            warn!("News search unavailable: {e}");
            return Vec::new();
        }
    };

    match provider.search_news(&format!("{ticker} stock news"), 3).await {
        Ok(snippets) => snippets,
        Err(e) => {
            warn!("News search failed for {ticker}: {e}");
            Vec::new()
        }
    }
}

fn display_valuation(valuation: &Result<IntrinsicValueEstimate, EngineError>) {
    match valuation {
        Ok(estimate) => {
            println!(
                "{} {}",
                ui::style_text("Intrinsic value:", ui::StyleType::Label),
                ui::style_text(
                    &format!("{:.2} per share", estimate.value_per_share),
                    ui::StyleType::Value
                )
            );
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "DCF assumptions: growth {:.2}%, discount {:.2}%, terminal {:.2}%, {} years",
                        estimate.growth_rate * 100.0,
                        estimate.discount_rate * 100.0,
                        estimate.terminal_growth_rate * 100.0,
                        estimate.horizon_years
                    ),
                    ui::StyleType::Subtle
                )
            );
        }
        Err(e) => {
            println!(
                "{}",
                ui::style_text(&format!("Intrinsic value unavailable: {e}"), ui::StyleType::Error)
            );
        }
    }
}
