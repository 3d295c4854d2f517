// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env, parse command-line arguments, set up logging
// 2. Validate the arguments into a FetchConfig
// 3. Run each requested fetch strategy, printing lines as results arrive
// 4. Exit with proper code (0 = ran to completion, 2 = error)
//
// A URL that fails to fetch is not an error for the program: it just gets an
// error line instead of a result line.
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method

use fetchall::cli::Cli;
use fetchall::config::FetchConfig;
use fetchall::fetcher::{self, RunSummary};
use fetchall::logging;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // A missing .env file is the normal case
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init()?;

    let config = FetchConfig::try_from(cli)?;
    let client = config
        .client()
        .context("failed to create HTTP client")?;

    let json = config.json;
    let mut summaries = Vec::with_capacity(config.modes.len());

    for (i, mode) in config.modes.iter().copied().enumerate() {
        if !json && config.is_multi_run() {
            if i > 0 {
                println!();
            }
            println!("{}: Fetching URLs...", mode);
        }

        let summary = fetcher::run(
            mode,
            &client,
            &config.urls,
            config.max_concurrency,
            |report| {
                if !json {
                    println!("{}", report);
                }
            },
        )
        .await;

        if !json {
            println!("{}", summary.elapsed_line());
        }
        summaries.push(summary);
    }

    if json {
        print_json(&summaries)?;
    }

    Ok(0)
}

// A single run prints as one object, `--mode all` as an array of runs
fn print_json(summaries: &[RunSummary]) -> Result<()> {
    let output = match summaries {
        [single] => serde_json::to_string_pretty(single)?,
        all => serde_json::to_string_pretty(all)?,
    };
    println!("{}", output);
    Ok(())
}
