use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "planchain")]
#[command(
    version,
    about = "Multi-phase planning workflows driven by chained chat completions"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a planning scenario (interactive menu when none is given)
    Run {
        /// Scenario id: conference, marketing, research, or architecture
        /// (case-insensitive)
        scenario: Option<String>,

        /// Topic or product name; multiple words are joined with spaces
        topic: Vec<String>,

        /// Override the configured model id for this run
        #[arg(long)]
        model: Option<String>,

        /// Directory transcripts are written into
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// JSON scenario definitions to use instead of the built-in table
        #[arg(long)]
        scenarios: Option<PathBuf>,
    },
    /// List the available scenarios and their phases
    List {
        /// JSON scenario definitions to use instead of the built-in table
        #[arg(long)]
        scenarios: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Settings come from the environment; a local .env is honored.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("PLANCHAIN_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Run {
            scenario,
            topic,
            model,
            output_dir,
            scenarios,
        } => {
            cmd::cmd_run(
                scenario.as_deref(),
                topic,
                model.as_deref(),
                output_dir,
                scenarios.as_deref(),
            )
            .await?;
        }
        Commands::List { scenarios } => {
            cmd::cmd_list(scenarios.as_deref())?;
        }
    }

    Ok(())
}
