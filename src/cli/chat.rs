use std::io::{BufRead, IsTerminal};

use anyhow::Result;
use console::Term;
use tracing::debug;

use super::analyze::{self, AnalyzeOptions};
use super::ui;
use crate::core::config::AppConfig;

/// Interactive loop: read a ticker (optionally followed by a question), run
/// the analysis pipeline, print the commentary, repeat.
pub async fn run(config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    let term = Term::stdout();
    println!(
        "{}",
        ui::style_text("Warren Buffett style stock analysis", ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text(
            "Enter a ticker, optionally followed by a question (e.g. \"AAPL is the moat intact?\"). \
Type 'quit' to exit.",
            ui::StyleType::Subtle
        )
    );

    if std::io::stdin().is_terminal() {
        let lines = std::iter::from_fn(|| {
            if term.write_str("> ").is_err() {
                return None;
            }
            Some(term.read_line())
        });
        run_session(&config, lines).await
    } else {
        // Redirected or piped input never produces an interactive read;
        // consume lines until EOF instead of polling the terminal.
        run_session(&config, std::io::stdin().lock().lines()).await
    }
}

/// Drives the session over any line source and stops at end of input or an
/// explicit quit.
async fn run_session<I>(config: &AppConfig, lines: I) -> Result<()>
where
    I: IntoIterator<Item = std::io::Result<String>>,
{
    for line in lines {
        let input = line?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        let (ticker, question) = parse_input(input);
        debug!("Chat input parsed: ticker={ticker} question={question:?}");

        let options = AnalyzeOptions {
            question,
            ..AnalyzeOptions::default()
        };
        if let Err(e) = analyze::run_with_config(config, &ticker, &options).await {
            println!("{}", ui::style_text(&format!("Error: {e:#}"), ui::StyleType::Error));
        }
    }

    Ok(())
}

/// First whitespace-delimited token is the ticker; the rest, if any, is a
/// free-form question.
fn parse_input(input: &str) -> (String, Option<String>) {
    match input.split_once(char::is_whitespace) {
        Some((ticker, rest)) => {
            let rest = rest.trim();
            let question = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (ticker.to_uppercase(), question)
        }
        None => (input.to_uppercase(), None),
    }
}
