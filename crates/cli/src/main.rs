//! PHQ-9 screening CLI
//!
//! Query a running screening service, or score a questionnaire offline
//! with the fixed threshold table.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, score, status};

/// PHQ-9 screening CLI
#[derive(Parser)]
#[command(name = "phq9")]
#[command(author, version, about = "CLI for the PHQ-9 depression screening service", long_about = None)]
pub struct Cli {
    /// Service URL (can also be set via PHQ9_API_URL env var)
    #[arg(long, env = "PHQ9_API_URL", default_value = "http://localhost:5001")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify answers with the service's trained model
    Predict {
        /// Answers to q1..q9 in order, each 0-3; missing trailing answers count as 0
        #[arg(required = true, num_args = 1..=9, value_parser = clap::value_parser!(u8).range(0..=3))]
        answers: Vec<u8>,
    },

    /// Show service health and model accuracy
    Health,

    /// Show details of the trained model
    ModelInfo,

    /// Score answers locally with the threshold table
    Score {
        /// Answers to q1..q9 in order, each 0-3; missing trailing answers count as 0
        #[arg(required = true, num_args = 1..=9, value_parser = clap::value_parser!(u8).range(0..=3))]
        answers: Vec<u8>,
    },

    /// Print the severity threshold table
    Bands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        output::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score { answers } => score::score(&answers, cli.format),
        Commands::Bands => score::bands(cli.format),
        Commands::Predict { answers } => {
            let client = client::ApiClient::new(&cli.api_url)?;
            predict::predict(&client, &answers, cli.format).await
        }
        Commands::Health => {
            let client = client::ApiClient::new(&cli.api_url)?;
            status::health(&client, cli.format).await
        }
        Commands::ModelInfo => {
            let client = client::ApiClient::new(&cli.api_url)?;
            status::model_info(&client, cli.format).await
        }
    }
}
