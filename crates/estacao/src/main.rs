use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use estacao_core::{config, db, pipeline, store};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-station ETL: normalize raw INMET exports, load Postgres, snapshot features", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full ETL: parse raw exports, deduplicate, snapshot, upsert
    Run(RunArgs),
    /// Create the canonical observation table if it does not exist
    EnsureSchema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory containing the raw station CSV exports
    #[arg(long, default_value = "data/raw")]
    raw_dir: PathBuf,

    /// Destination of the feature-augmented Parquet snapshot
    #[arg(long, default_value = "data/processed/processed_weather_data.parquet")]
    snapshot: PathBuf,

    /// Skip the relational store write (snapshot-only run)
    #[arg(long)]
    skip_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = config::EtlConfig::from_env(args.raw_dir, args.snapshot, args.skip_store)
                .context("DATABASE_URL (or ESTACAO_DATABASE_URL) must be set")?;
            let summary = pipeline::run(&config).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::EnsureSchema => {
            let database_url = config::database_url_from_env()
                .context("DATABASE_URL (or ESTACAO_DATABASE_URL) must be set")?;
            let pool = db::connect(&database_url).await?;
            store::ensure_table(&pool, config::DEFAULT_TABLE).await?;
            pool.close().await;
            info!(table = config::DEFAULT_TABLE, "canonical table ensured");
            Ok(())
        }
    }
}
