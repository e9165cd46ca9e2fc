use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tickwise::agents::{AnalysisOutcome, Controller};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tickwise", about = "Stock ticker analysis with reasoning agents")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tickwise.toml")]
    config: PathBuf,

    /// Analyse these tickers and exit instead of prompting
    #[arg(short, long = "ticker")]
    tickers: Vec<String>,

    /// Pretty-print structured results
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = tickwise::load_config(&cli.config)?;
    let search_api_key = std::env::var(&config.data.search_api_key_env).unwrap_or_default();
    let controller = tickwise::build_controller(&config, search_api_key)
        .context("Failed to build controller")?;

    if cli.tickers.is_empty() {
        interactive(&controller, cli.pretty).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut failed = false;
    for ticker in &cli.tickers {
        let outcome = controller.analyze(ticker).await;
        failed |= !outcome.success();
        report(&outcome, cli.pretty)?;
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn interactive(controller: &Controller, pretty: bool) -> Result<()> {
    println!("Welcome to Tickwise!");
    println!("Analyses stock tickers and provides investment recommendations.");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("\nEnter a stock ticker symbol (e.g., AAPL) or 'quit' to exit: ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line).context("Failed to read from stdin")? == 0 {
            break;
        }
        let ticker = line.trim().to_uppercase();

        if matches!(ticker.as_str(), "QUIT" | "EXIT" | "Q") {
            break;
        }
        if ticker.is_empty() {
            println!("Please enter a valid ticker symbol.");
            continue;
        }

        let outcome = controller.analyze(&ticker).await;
        report(&outcome, pretty)?;
    }

    println!("Thank you for using Tickwise. Goodbye!");
    Ok(())
}

fn report(outcome: &AnalysisOutcome, pretty: bool) -> Result<()> {
    let rule = "-".repeat(80);
    match (&outcome.result, &outcome.error) {
        (Some(result), None) => {
            let body = match result.as_json() {
                Some(value) if !pretty => serde_json::to_string(value)?,
                _ => result.render(),
            };
            println!("\nFinal Results: {body}");
            println!("\n{rule}\nAnalysis for {} completed.\n{rule}", outcome.symbol);
        }
        (_, error) => {
            println!(
                "\n{rule}\nAnalysis for {} failed: {}\n{rule}",
                outcome.symbol,
                error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(())
}
