use std::env;
use std::path::PathBuf;

use crate::error::Result;

pub const DEFAULT_TABLE: &str = "meteo_data";

/// Explicit configuration for one ETL run, constructed up front and passed
/// to the pipeline entry point. Credentials never flow through per-row code.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    /// Directory scanned for `*.csv` raw exports.
    pub raw_dir: PathBuf,
    /// Destination of the feature-augmented Parquet snapshot.
    pub snapshot_path: PathBuf,
    /// Canonical observation table.
    pub table_name: String,
    /// `None` makes this a snapshot-only run; the store write is skipped.
    pub database_url: Option<String>,
}

impl EtlConfig {
    /// Build a config from the environment. A missing connection string is a
    /// fatal startup error unless the store write was explicitly skipped.
    pub fn from_env(raw_dir: PathBuf, snapshot_path: PathBuf, skip_store: bool) -> Result<Self> {
        let database_url = if skip_store {
            None
        } else {
            Some(database_url_from_env()?)
        };

        Ok(Self {
            raw_dir,
            snapshot_path,
            table_name: DEFAULT_TABLE.to_string(),
            database_url,
        })
    }
}

pub fn database_url_from_env() -> Result<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("ESTACAO_DATABASE_URL"))
        .map_err(Into::into)
}
