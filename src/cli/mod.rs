//! Command implementations and terminal rendering.

pub mod analyze;
pub mod chat;
pub mod ratios;
pub mod setup;
pub mod ui;

use anyhow::{Context, Result};

use crate::core::config::{AppConfig, resolve_api_key};
use crate::providers::financial_datasets::FinancialDatasetsProvider;
use crate::providers::gemini::GeminiClient;
use crate::providers::tavily::TavilyProvider;

pub(crate) fn statement_provider(config: &AppConfig) -> Result<FinancialDatasetsProvider> {
    let provider_config = config
        .providers
        .financial_datasets
        .as_ref()
        .context("financial_datasets provider is not configured")?;
    let api_key = resolve_api_key(
        "FINANCIAL_DATASETS_API_KEY",
        provider_config.api_key.as_deref(),
    )?;
    Ok(FinancialDatasetsProvider::new(
        &provider_config.base_url,
        &api_key,
    ))
}

pub(crate) fn llm_client(config: &AppConfig) -> Result<GeminiClient> {
    let provider_config = config
        .providers
        .gemini
        .as_ref()
        .context("gemini provider is not configured")?;
    let api_key = resolve_api_key("GOOGLE_API_KEY", provider_config.api_key.as_deref())?;
    Ok(GeminiClient::new(
        &provider_config.base_url,
        &provider_config.model,
        &api_key,
    ))
}

pub(crate) fn news_provider(config: &AppConfig) -> Result<TavilyProvider> {
    let provider_config = config
        .providers
        .tavily
        .as_ref()
        .context("tavily provider is not configured")?;
    let api_key = resolve_api_key("TAVILY_API_KEY", provider_config.api_key.as_deref())?;
    Ok(TavilyProvider::new(&provider_config.base_url, &api_key))
}
