pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use clap::{Parser, Subcommand};
use config::AnalyzerConfig;
use models::analysis_types::AnalysisResponse;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dish-footprint")]
#[command(about = "Identify a dish from a photo and report its water footprint", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AnalyzerConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single photo
    Analyze { image: PathBuf },
    /// Analyze every photo in a folder
    Batch { folder: PathBuf },
    /// Show the loaded model's preprocessing and tensor layout
    Info,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli.config.clone();
    let analyzer = tokio::task::spawn_blocking(move || config.build()).await??;

    let output = match cli.command {
        Commands::Analyze { image } => {
            let result = commands::analyze::analyze_image(&analyzer, &image)?;
            serde_json::to_string_pretty(&AnalysisResponse::success(result))?
        }
        Commands::Batch { folder } => {
            let report = commands::analyze::analyze_folder(Arc::new(analyzer), folder).await?;
            serde_json::to_string_pretty(&report)?
        }
        Commands::Info => serde_json::to_string_pretty(&commands::analyze::model_info(&analyzer))?,
    };

    println!("{}", output);
    Ok(())
}
