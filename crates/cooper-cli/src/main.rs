mod analyze;
mod guidelines;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cooper-cli")]
#[command(about = "Video emotion and engagement analysis from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find videos for a topic and correlate their emotions with engagement
    Analyze {
        /// Topic to search for
        #[arg(long)]
        query: Option<String>,

        /// Maximum number of videos to analyze (1-20)
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Analyze this single video instead of searching
        #[arg(long)]
        url: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chunk a brand guidelines file and index it into the vector store
    Guidelines {
        /// Path to the guidelines text file
        #[arg(long)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = cooper_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Analyze {
            query,
            limit,
            url,
            json,
        }) => {
            analyze::run_analyze(&config, query.as_deref(), limit, url.as_deref(), json).await?;
        }
        Some(Commands::Guidelines { path }) => {
            guidelines::run_index_guidelines(&config, &path).await?;
        }
        None => println!("cooper-cli ready; run `cooper-cli --help` for commands"),
    }

    Ok(())
}
