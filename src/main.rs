use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use omaha::cli::analyze::AnalyzeOptions;
use omaha::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for omaha::AppCommand {
    fn from(cmd: Commands) -> omaha::AppCommand {
        match cmd {
            Commands::Ratios { ticker, periods } => omaha::AppCommand::Ratios { ticker, periods },
            Commands::Analyze {
                ticker,
                question,
                periods,
                growth_rate,
                discount_rate,
                terminal_growth_rate,
                horizon_years,
                no_news,
            } => omaha::AppCommand::Analyze {
                ticker,
                options: AnalyzeOptions {
                    question,
                    periods,
                    growth_rate,
                    discount_rate,
                    terminal_growth_rate,
                    horizon_years,
                    no_news,
                },
            },
            Commands::Chat => omaha::AppCommand::Chat,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display financial ratios for a ticker
    Ratios {
        /// Stock ticker symbol, e.g. AAPL
        ticker: String,

        /// Number of annual reporting periods to fetch
        #[arg(short, long)]
        periods: Option<usize>,
    },
    /// Full Buffett-style analysis with intrinsic value and commentary
    Analyze {
        /// Stock ticker symbol, e.g. AAPL
        ticker: String,

        /// Optional question to focus the commentary on
        #[arg(short, long)]
        question: Option<String>,

        /// Number of annual reporting periods to fetch
        #[arg(short, long)]
        periods: Option<usize>,

        /// Growth rate override (fraction, e.g. 0.05); derived from free
        /// cash flow history when omitted
        #[arg(long)]
        growth_rate: Option<f64>,

        /// Discount rate (fraction)
        #[arg(long)]
        discount_rate: Option<f64>,

        /// Terminal growth rate (fraction)
        #[arg(long)]
        terminal_growth_rate: Option<f64>,

        /// Projection horizon in years
        #[arg(long)]
        horizon_years: Option<u32>,

        /// Skip the news search step
        #[arg(long)]
        no_news: bool,
    },
    /// Interactive analysis session
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => omaha::cli::setup::setup(),
        Some(cmd) => omaha::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
