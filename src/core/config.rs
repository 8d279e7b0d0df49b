//! Application configuration.
//!
//! Base URLs and model names live in a YAML file so tests can point the app
//! at mock servers. API keys are read from the environment first and fall
//! back to the config file.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FinancialDatasetsConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TavilyConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub financial_datasets: Option<FinancialDatasetsConfig>,
    pub gemini: Option<GeminiConfig>,
    pub tavily: Option<TavilyConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            financial_datasets: Some(FinancialDatasetsConfig {
                base_url: "https://api.financialdatasets.ai".to_string(),
                api_key: None,
            }),
            gemini: Some(GeminiConfig {
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: default_gemini_model(),
                api_key: None,
            }),
            tavily: Some(TavilyConfig {
                base_url: "https://api.tavily.com".to_string(),
                api_key: None,
            }),
        }
    }
}

/// Defaults for the analysis pipeline; all overridable from the CLI.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_periods")]
    pub periods: usize,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "default_terminal_growth_rate")]
    pub terminal_growth_rate: f64,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
}

fn default_periods() -> usize {
    5
}

fn default_discount_rate() -> f64 {
    crate::core::valuation::DEFAULT_DISCOUNT_RATE
}

fn default_terminal_growth_rate() -> f64 {
    crate::core::valuation::DEFAULT_TERMINAL_GROWTH_RATE
}

fn default_horizon_years() -> u32 {
    crate::core::valuation::DEFAULT_HORIZON_YEARS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            periods: default_periods(),
            discount_rate: default_discount_rate(),
            terminal_growth_rate: default_terminal_growth_rate(),
            horizon_years: default_horizon_years(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "omaha")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

/// Environment variable first, config value second.
pub fn resolve_api_key(env_var: &str, config_value: Option<&str>) -> Result<String> {
    if let Ok(key) = std::env::var(env_var) {
        if !key.is_empty() {
            return Ok(key);
        }
    }
    config_value
        .map(str::to_string)
        .with_context(|| format!("Missing API key: set {env_var} or add it to the config file"))
}
