use anyhow::Result;
use comfy_table::{Cell, Table};
use tracing::{debug, info};

use super::ui;
use crate::core::config::AppConfig;
use crate::core::fetch::StatementProvider;
use crate::core::metrics::{RatioSet, compute_ratios};
use crate::core::statement::StatementSeries;

pub async fn run(ticker: &str, periods: Option<usize>, config_path: Option<&str>) -> Result<()> {
    info!("Computing ratios for {ticker}...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = super::statement_provider(&config)?;
    let periods = periods.unwrap_or(config.analysis.periods);

    let pb = ui::new_spinner(&format!("Fetching statements for {ticker}"));
    let series = provider.fetch_statements(ticker, periods).await;
    pb.finish_and_clear();
    let series = series?;

    if series.is_empty() {
        anyhow::bail!("No financial statements found for {ticker}");
    }

    println!(
        "{}",
        ui::style_text(&format!("Financial ratios: {ticker}"), ui::StyleType::Title)
    );
    println!("{}", ratio_table(&compute_series_ratios(&series)));

    Ok(())
}

/// Ratios for every period in the series, most recent first.
pub fn compute_series_ratios(series: &StatementSeries) -> Vec<RatioSet> {
    series.statements.iter().map(compute_ratios).collect()
}

/// One row per metric, one column per reporting period.
pub fn ratio_table(ratio_sets: &[RatioSet]) -> Table {
    let mut table = ui::new_styled_table();

    let mut headers = vec![ui::header_cell("Metric")];
    headers.extend(ratio_sets.iter().map(|r| ui::header_cell(&r.period)));
    table.set_header(headers);

    let rows: [(&str, fn(&RatioSet) -> &crate::core::metrics::Ratio, bool); 6] = [
        ("ROE", |r| &r.roe, true),
        ("ROIC", |r| &r.roic, true),
        ("Debt / Equity", |r| &r.debt_to_equity, false),
        ("Current ratio", |r| &r.current_ratio, false),
        ("Net margin", |r| &r.net_margin, true),
        ("FCF margin", |r| &r.fcf_margin, true),
    ];

    for (label, accessor, as_percent) in rows {
        let mut cells = vec![Cell::new(label)];
        cells.extend(
            ratio_sets
                .iter()
                .map(|r| ui::ratio_cell(accessor(r), as_percent)),
        );
        table.add_row(cells);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::{Ratio, UndefinedReason};

    fn ratio_set(period: &str) -> RatioSet {
        RatioSet {
            period: period.to_string(),
            roe: Ratio::Defined(0.20),
            roic: Ratio::Defined(0.15),
            debt_to_equity: Ratio::Defined(1.6),
            current_ratio: Ratio::Defined(2.5),
            net_margin: Ratio::Defined(0.1),
            fcf_margin: Ratio::Undefined(UndefinedReason::MissingInput),
        }
    }

    #[test]
    fn test_ratio_table_renders_periods_and_values() {
        let table = ratio_table(&[ratio_set("2024-09-28"), ratio_set("2023-09-30")]);
        let rendered = table.to_string();
        assert!(rendered.contains("2024-09-28"));
        assert!(rendered.contains("2023-09-30"));
        assert!(rendered.contains("20.00%"));
        assert!(rendered.contains("1.60"));
    }

    #[test]
    fn test_undefined_ratio_renders_as_na() {
        let rendered = ratio_table(&[ratio_set("2024-09-28")]).to_string();
        assert!(rendered.contains("n/a"));
    }
}
