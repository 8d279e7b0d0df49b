pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;

use crate::cli::analyze::AnalyzeOptions;

/// Application commands, decoupled from the clap surface so integration
/// tests can drive the app directly.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Fetch statements and display the ratio table.
    Ratios {
        ticker: String,
        periods: Option<usize>,
    },
    /// Full pipeline: ratios, intrinsic value, news, LLM commentary.
    Analyze {
        ticker: String,
        options: AnalyzeOptions,
    },
    /// Interactive analysis loop.
    Chat,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Ratios { ticker, periods } => {
            cli::ratios::run(&ticker, periods, config_path).await
        }
        AppCommand::Analyze { ticker, options } => {
            cli::analyze::run(&ticker, options, config_path).await
        }
        AppCommand::Chat => cli::chat::run(config_path).await,
    }
}
