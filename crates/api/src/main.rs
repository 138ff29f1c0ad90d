//! Customer Churn Dashboard - Main Entry Point

use api::config::AppConfig;
use api::{init_logging, load_data, run_server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "churn-dashboard")]
#[command(about = "Customer churn dashboard backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// TOML config file (default: ./churn-dashboard.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Import the six customer CSVs into the database
    LoadData {
        /// TOML config file (default: ./churn-dashboard.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding `<table>.csv` files (overrides data.csv_dir)
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = AppConfig::load(config.as_deref())?;
            init_logging(&config.logging)?;

            info!("=== Churn Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
            run_server(config).await?;
        }
        Commands::LoadData { config, csv_dir } => {
            let config = AppConfig::load(config.as_deref())?;
            init_logging(&config.logging)?;

            let summaries = load_data(&config, csv_dir.as_deref()).await?;
            for summary in &summaries {
                info!("{}: {} rows", summary.table, summary.rows);
            }
            info!("Loaded {} tables", summaries.len());
        }
    }

    Ok(())
}
