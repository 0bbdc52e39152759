//! Advisor Control - CLI driver for the course-advising engine.
//!
//! Thin wiring over `advisor_common`: load config and catalog, build the
//! engine, answer questions. The resolution logic itself lives in the
//! library.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "advisorctl")]
#[command(about = "Course advising assistant - hybrid structured/generative query resolution", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the advisor config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question text
        question: Vec<String>,

        /// Session id for accumulated context (generated if omitted)
        #[arg(long)]
        session: Option<String>,

        /// Print the full response record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session; completed/failed courses accumulate
    Repl,

    /// Load and validate a catalog, then report its contents
    Check {
        /// Catalog path (defaults to the configured one)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask { question, session, json } => {
            commands::ask(&config, &question.join(" "), session, json)
        }
        Commands::Repl => commands::repl(&config),
        Commands::Check { path } => commands::check(&config, path),
    }
}
