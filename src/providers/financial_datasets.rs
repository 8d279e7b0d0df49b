use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::core::fetch::StatementProvider;
use crate::core::statement::{FinancialStatement, StatementSeries};

/// Wrapper over the financialdatasets.ai REST API. Fetches the three
/// statement documents for a ticker and joins them by report period into
/// the engine's normalized shape.
pub struct FinancialDatasetsProvider {
    base_url: String,
    api_key: String,
}

impl FinancialDatasetsProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        FinancialDatasetsProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        ticker: &str,
        periods: usize,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting financial data from {}", url);

        let client = reqwest::Client::builder().user_agent("omaha/1.0").build()?;
        let response = client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(&[
                ("ticker", ticker),
                ("period", "annual"),
                ("limit", &periods.to_string()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {} URL: {}", e, ticker, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {} URL: {}",
                response.status(),
                ticker,
                url
            ));
        }

        Ok(response.json::<T>().await?)
    }
}

#[derive(Deserialize, Debug)]
struct IncomeStatementsResponse {
    income_statements: Vec<WireIncomeStatement>,
}

#[derive(Deserialize, Debug, Clone)]
struct WireIncomeStatement {
    report_period: String,
    revenue: Option<f64>,
    net_income: Option<f64>,
    operating_income: Option<f64>,
    income_tax_expense: Option<f64>,
    weighted_average_shares: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct BalanceSheetsResponse {
    balance_sheets: Vec<WireBalanceSheet>,
}

#[derive(Deserialize, Debug, Clone)]
struct WireBalanceSheet {
    report_period: String,
    total_assets: Option<f64>,
    total_liabilities: Option<f64>,
    current_assets: Option<f64>,
    current_liabilities: Option<f64>,
    shareholders_equity: Option<f64>,
    total_debt: Option<f64>,
    cash_and_equivalents: Option<f64>,
    outstanding_shares: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct CashFlowStatementsResponse {
    cash_flow_statements: Vec<WireCashFlowStatement>,
}

#[derive(Deserialize, Debug, Clone)]
struct WireCashFlowStatement {
    report_period: String,
    net_cash_flow_from_operations: Option<f64>,
    capital_expenditure: Option<f64>,
}

/// Effective tax rate from tax expense and pre-tax income. Undefined when
/// pre-tax income is zero or negative; the engine marks dependents instead.
fn derive_tax_rate(net_income: Option<f64>, tax_expense: Option<f64>) -> Option<f64> {
    let (ni, tax) = (net_income?, tax_expense?);
    let pretax = ni + tax;
    if pretax <= 0.0 {
        return None;
    }
    Some(tax / pretax)
}

/// Invested capital when not reported directly: total debt plus equity
/// minus cash and equivalents.
fn derive_invested_capital(sheet: &WireBalanceSheet) -> Option<f64> {
    match (
        sheet.total_debt,
        sheet.shareholders_equity,
        sheet.cash_and_equivalents,
    ) {
        (Some(debt), Some(equity), Some(cash)) => Some(debt + equity - cash),
        _ => None,
    }
}

fn join_statements(
    income: Vec<WireIncomeStatement>,
    balance: Vec<WireBalanceSheet>,
    cash_flow: Vec<WireCashFlowStatement>,
) -> Vec<FinancialStatement> {
    let balance_by_period: BTreeMap<String, WireBalanceSheet> = balance
        .into_iter()
        .map(|b| (b.report_period.clone(), b))
        .collect();
    let cash_flow_by_period: BTreeMap<String, WireCashFlowStatement> = cash_flow
        .into_iter()
        .map(|c| (c.report_period.clone(), c))
        .collect();

    // Income statements drive the series; the API returns them most recent
    // first and periods absent from it carry no usable ratios anyway.
    income
        .into_iter()
        .map(|inc| {
            let sheet = balance_by_period.get(&inc.report_period);
            let flows = cash_flow_by_period.get(&inc.report_period);

            FinancialStatement {
                period: inc.report_period.clone(),
                revenue: inc.revenue,
                net_income: inc.net_income,
                total_assets: sheet.and_then(|s| s.total_assets),
                total_liabilities: sheet.and_then(|s| s.total_liabilities),
                current_assets: sheet.and_then(|s| s.current_assets),
                current_liabilities: sheet.and_then(|s| s.current_liabilities),
                shareholders_equity: sheet.and_then(|s| s.shareholders_equity),
                operating_cash_flow: flows.and_then(|f| f.net_cash_flow_from_operations),
                // The wire format reports capex as a negative cash outflow;
                // the engine expects a positive magnitude.
                capital_expenditure: flows.and_then(|f| f.capital_expenditure).map(f64::abs),
                invested_capital: sheet.and_then(derive_invested_capital),
                operating_income: inc.operating_income,
                tax_rate: derive_tax_rate(inc.net_income, inc.income_tax_expense),
                shares_outstanding: sheet
                    .and_then(|s| s.outstanding_shares)
                    .or(inc.weighted_average_shares),
            }
        })
        .collect()
}

#[async_trait]
impl StatementProvider for FinancialDatasetsProvider {
    #[instrument(
        name = "StatementFetch",
        skip(self),
        fields(ticker = %ticker, periods = periods)
    )]
    async fn fetch_statements(&self, ticker: &str, periods: usize) -> Result<StatementSeries> {
        let (income, balance, cash_flow) = futures::try_join!(
            self.get_json::<IncomeStatementsResponse>(
                "/financials/income-statements",
                ticker,
                periods
            ),
            self.get_json::<BalanceSheetsResponse>("/financials/balance-sheets", ticker, periods),
            self.get_json::<CashFlowStatementsResponse>(
                "/financials/cash-flow-statements",
                ticker,
                periods
            ),
        )?;

        let statements = join_statements(
            income.income_statements,
            balance.balance_sheets,
            cash_flow.cash_flow_statements,
        );
        debug!("Fetched {} statement period(s) for {}", statements.len(), ticker);

        Ok(StatementSeries::new(ticker, statements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, endpoint: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("X-API-KEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mock_full_server() -> MockServer {
        let server = MockServer::start().await;
        mount(
            &server,
            "/financials/income-statements",
            r#"{
                "income_statements": [
                    {
                        "report_period": "2024-09-28",
                        "revenue": 1000.0,
                        "net_income": 100.0,
                        "operating_income": 200.0,
                        "income_tax_expense": 25.0,
                        "weighted_average_shares": 48.0
                    },
                    {
                        "report_period": "2023-09-30",
                        "revenue": 900.0,
                        "net_income": 90.0,
                        "operating_income": 180.0,
                        "income_tax_expense": 10.0,
                        "weighted_average_shares": 50.0
                    }
                ]
            }"#,
        )
        .await;
        mount(
            &server,
            "/financials/balance-sheets",
            r#"{
                "balance_sheets": [
                    {
                        "report_period": "2024-09-28",
                        "total_assets": 2000.0,
                        "total_liabilities": 800.0,
                        "current_assets": 1200.0,
                        "current_liabilities": 480.0,
                        "shareholders_equity": 500.0,
                        "total_debt": 600.0,
                        "cash_and_equivalents": 100.0,
                        "outstanding_shares": 50.0
                    },
                    {
                        "report_period": "2023-09-30",
                        "total_assets": 1800.0,
                        "total_liabilities": 700.0,
                        "current_assets": 1100.0,
                        "current_liabilities": 500.0,
                        "shareholders_equity": 450.0,
                        "total_debt": 550.0,
                        "cash_and_equivalents": 90.0,
                        "outstanding_shares": 52.0
                    }
                ]
            }"#,
        )
        .await;
        mount(
            &server,
            "/financials/cash-flow-statements",
            r#"{
                "cash_flow_statements": [
                    {
                        "report_period": "2024-09-28",
                        "net_cash_flow_from_operations": 300.0,
                        "capital_expenditure": -100.0
                    },
                    {
                        "report_period": "2023-09-30",
                        "net_cash_flow_from_operations": 250.0,
                        "capital_expenditure": -80.0
                    }
                ]
            }"#,
        )
        .await;
        server
    }

    #[tokio::test]
    async fn test_fetch_and_join_statements() {
        let server = mock_full_server().await;
        let provider = FinancialDatasetsProvider::new(&server.uri(), "test-key");

        let series = provider.fetch_statements("AAPL", 2).await.unwrap();
        assert_eq!(series.ticker, "AAPL");
        assert_eq!(series.len(), 2);

        let latest = series.latest().unwrap();
        assert_eq!(latest.period, "2024-09-28");
        assert_eq!(latest.revenue, Some(1000.0));
        assert_eq!(latest.net_income, Some(100.0));
        assert_eq!(latest.shareholders_equity, Some(500.0));
        assert_eq!(latest.current_assets, Some(1200.0));
        assert_eq!(latest.current_liabilities, Some(480.0));
        // Capex comes in as a negative outflow and is normalized.
        assert_eq!(latest.capital_expenditure, Some(100.0));
        assert_eq!(latest.free_cash_flow(), Some(200.0));
        // Invested capital: 600 + 500 - 100.
        assert_eq!(latest.invested_capital, Some(1000.0));
        // Tax rate: 25 / (100 + 25).
        assert_eq!(latest.tax_rate, Some(0.2));
        assert_eq!(latest.shares_outstanding, Some(50.0));

        assert_eq!(series.oldest().unwrap().period, "2023-09-30");
    }

    #[tokio::test]
    async fn test_missing_balance_sheet_period_maps_to_none() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/financials/income-statements",
            r#"{
                "income_statements": [
                    {
                        "report_period": "2024-09-28",
                        "revenue": 1000.0,
                        "net_income": 100.0,
                        "operating_income": 200.0,
                        "income_tax_expense": 25.0,
                        "weighted_average_shares": 48.0
                    }
                ]
            }"#,
        )
        .await;
        mount(&server, "/financials/balance-sheets", r#"{"balance_sheets": []}"#).await;
        mount(
            &server,
            "/financials/cash-flow-statements",
            r#"{"cash_flow_statements": []}"#,
        )
        .await;

        let provider = FinancialDatasetsProvider::new(&server.uri(), "test-key");
        let series = provider.fetch_statements("AAPL", 1).await.unwrap();
        let latest = series.latest().unwrap();
        assert_eq!(latest.total_assets, None);
        assert_eq!(latest.operating_cash_flow, None);
        assert_eq!(latest.free_cash_flow(), None);
        // Falls back to weighted average shares from the income statement.
        assert_eq!(latest.shares_outstanding, Some(48.0));
    }

    #[tokio::test]
    async fn test_unknown_ticker_yields_empty_series() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/financials/income-statements",
            r#"{"income_statements": []}"#,
        )
        .await;
        mount(&server, "/financials/balance-sheets", r#"{"balance_sheets": []}"#).await;
        mount(
            &server,
            "/financials/cash-flow-statements",
            r#"{"cash_flow_statements": []}"#,
        )
        .await;

        let provider = FinancialDatasetsProvider::new(&server.uri(), "test-key");
        let series = provider.fetch_statements("NOPE", 5).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = FinancialDatasetsProvider::new(&server.uri(), "bad-key");
        let result = provider.fetch_statements("AAPL", 5).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP error: 401"));
    }

    #[test]
    fn test_derive_tax_rate_edge_cases() {
        assert_eq!(derive_tax_rate(Some(100.0), Some(25.0)), Some(0.2));
        // Pre-tax loss: no meaningful rate.
        assert_eq!(derive_tax_rate(Some(-50.0), Some(10.0)), None);
        assert_eq!(derive_tax_rate(None, Some(10.0)), None);
        assert_eq!(derive_tax_rate(Some(100.0), None), None);
    }
}
