// Copyright 2026 Partfetch Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod audit;
mod cli;
mod details;
mod harvest;
mod parts;
mod renderer;
mod stealth;

#[derive(Parser)]
#[command(
    name = "partfetch",
    about = "Partfetch — harvest catalog part numbers and fetch product details and CAD files",
    version,
    after_help = "Run 'partfetch <command> --help' for details on each command.\n\
                  Typical use: 'partfetch extract NutList.txt' then 'partfetch fetch'."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract part numbers from a text file into a CSV part list
    Extract {
        /// Text file to scan (e.g. "NutList.txt")
        input: PathBuf,
        /// Where to write the part-list CSV
        #[arg(long, short, default_value = "PartNumbers.csv")]
        output: PathBuf,
    },
    /// Visit each part's product page, scrape details, trigger downloads
    Fetch {
        /// Part-list CSV produced by `extract`
        #[arg(long, default_value = "PartNumbers.csv")]
        list: PathBuf,
        /// Root directory for per-part output folders
        #[arg(long, default_value = "part_files")]
        out_dir: PathBuf,
        /// URL prefix the part number is appended to
        #[arg(long, default_value = "https://www.mcmaster.com/")]
        base_url: String,
        /// Seconds to wait after navigation before scraping
        #[arg(long, default_value = "5")]
        page_delay: u64,
        /// Seconds to wait after clicking the download control
        #[arg(long, default_value = "10")]
        download_delay: u64,
        /// Visible text of the download control to click
        #[arg(long, default_value = "Download")]
        download_label: String,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("PARTFETCH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PARTFETCH_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("PARTFETCH_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("PARTFETCH_NO_COLOR", "1");
    }

    // Initialize tracing to stderr; RUST_LOG overrides the default level
    let default_level = if cli.verbose {
        "partfetch=debug"
    } else {
        "partfetch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract { input, output } => cli::extract_cmd::run(&input, &output).await,
        Commands::Fetch {
            list,
            out_dir,
            base_url,
            page_delay,
            download_delay,
            download_label,
        } => {
            let cfg = harvest::HarvestConfig {
                base_url,
                output_dir: out_dir,
                page_delay: std::time::Duration::from_secs(page_delay),
                download_delay: std::time::Duration::from_secs(download_delay),
                download_label,
                ..harvest::HarvestConfig::default()
            };
            cli::fetch_cmd::run(&list, cfg).await
        }
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "partfetch", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
