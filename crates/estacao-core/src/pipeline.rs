//! The ETL run: discover raw exports, parse each to a canonical frame,
//! combine with last-wins deduplication, augment trend features, write the
//! snapshot, and upsert the canonical series into the store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use estacao_parser::parse_station_csv;

use crate::config::EtlConfig;
use crate::db;
use crate::error::{PipelineError, Result};
use crate::features;
use crate::snapshot;
use crate::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Parsed,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EtlSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_combined: usize,
    pub rows_written: u64,
    pub rows_skipped_null_key: usize,
    pub snapshot_path: String,
    pub reports: Vec<FileReport>,
}

/// Execute one full ETL run against the given configuration.
pub async fn run(config: &EtlConfig) -> Result<EtlSummary> {
    let (frames, reports) = parse_raw_files(&config.raw_dir)?;

    if frames.is_empty() {
        return Err(PipelineError::Processing(format!(
            "no valid station files under {}",
            config.raw_dir.display()
        )));
    }

    let combined = combine_frames(frames)?;
    info!(rows = combined.height(), "combined canonical series ready");

    let augmented = features::augment_features(&combined)?;
    snapshot::write_snapshot(&augmented, &config.snapshot_path)?;
    info!(
        path = %config.snapshot_path.display(),
        rows = augmented.height(),
        "feature snapshot written"
    );

    let store_report = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await?;
            // The connection is owned by this run and closed on both the
            // success and failure paths.
            let result = write_store(&pool, &config.table_name, &combined).await;
            pool.close().await;
            Some(result?)
        }
        None => {
            info!("store write skipped; snapshot-only run");
            None
        }
    };

    let summary = EtlSummary {
        files_processed: reports
            .iter()
            .filter(|r| r.status == FileStatus::Parsed)
            .count(),
        files_skipped: reports
            .iter()
            .filter(|r| r.status == FileStatus::Skipped)
            .count(),
        rows_combined: combined.height(),
        rows_written: store_report.as_ref().map(|r| r.rows_written).unwrap_or(0),
        rows_skipped_null_key: store_report.as_ref().map(|r| r.rows_skipped).unwrap_or(0),
        snapshot_path: config.snapshot_path.display().to_string(),
        reports,
    };

    info!(
        files_processed = summary.files_processed,
        files_skipped = summary.files_skipped,
        rows_combined = summary.rows_combined,
        rows_written = summary.rows_written,
        "ETL run finished"
    );

    Ok(summary)
}

async fn write_store(
    pool: &db::DbPool,
    table: &str,
    combined: &DataFrame,
) -> Result<store::StoreReport> {
    store::ensure_table(pool, table).await?;
    store::write_observations(pool, table, combined).await
}

/// Discover and parse every raw export under `raw_dir`, in sorted path
/// order. Later files win duplicate-key resolution downstream, so the sort
/// makes "most recently re-exported wins" deterministic. File-scoped
/// failures are logged and skipped, never fatal.
fn parse_raw_files(raw_dir: &Path) -> Result<(Vec<DataFrame>, Vec<FileReport>)> {
    let pattern = raw_dir.join("*.csv");
    let pattern = pattern.to_str().ok_or_else(|| {
        PipelineError::Processing("raw directory path is not valid UTF-8".to_string())
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => warn!(error = %err, "unreadable path while scanning raw directory"),
        }
    }
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %raw_dir.display(), "no CSV files found for processing");
    }

    let mut frames = Vec::with_capacity(paths.len());
    let mut reports = Vec::with_capacity(paths.len());

    for path in paths {
        let path_display = path.display().to_string();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(file = %path_display, error = %err, "could not read file; skipping");
                reports.push(FileReport {
                    path: path_display,
                    status: FileStatus::Skipped,
                    rows_read: 0,
                    rows_kept: 0,
                    error: Some(err.to_string()),
                });
                continue;
            }
        };

        match parse_station_csv(&bytes) {
            Ok(parsed) => {
                info!(
                    file = %path_display,
                    dialect = parsed.dialect,
                    rows_read = parsed.rows_read,
                    rows_kept = parsed.df.height(),
                    rows_dropped = parsed.rows_dropped,
                    "parsed raw export"
                );
                reports.push(FileReport {
                    path: path_display,
                    status: FileStatus::Parsed,
                    rows_read: parsed.rows_read,
                    rows_kept: parsed.df.height(),
                    error: None,
                });
                frames.push(parsed.df);
            }
            Err(err) => {
                warn!(file = %path_display, error = %err, "could not parse file; skipping");
                reports.push(FileReport {
                    path: path_display,
                    status: FileStatus::Skipped,
                    rows_read: 0,
                    rows_kept: 0,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok((frames, reports))
}

/// Concatenate the per-file frames, deduplicate on the natural key keeping
/// the last occurrence in processing order, and sort ascending.
fn combine_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let lazies: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();
    let unified = concat(&lazies, UnionArgs::default())?.collect()?;

    let deduped = dedup_last_wins(&unified)?;
    let sorted = deduped
        .lazy()
        .sort(["data", "hora"], SortMultipleOptions::default())
        .collect()?;

    Ok(sorted)
}

/// Keep exactly one row per (data, hora): the one appearing latest in the
/// input. Rows with a missing key component are dropped before grouping, so
/// an incomplete key can never win a duplicate resolution.
pub fn dedup_last_wins(df: &DataFrame) -> Result<DataFrame> {
    let len = df.height();
    let data = df.column("data")?.date()?;
    let hora = df.column("hora")?.as_materialized_series().time()?;

    let mut last_by_key: HashMap<(i32, i64), usize> = HashMap::with_capacity(len);
    for idx in 0..len {
        let (Some(date), Some(time)) = (data.get(idx), hora.get(idx)) else {
            continue;
        };
        last_by_key.insert((date, time), idx);
    }

    let mut keep = vec![false; len];
    for &idx in last_by_key.values() {
        keep[idx] = true;
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    df.filter(&mask).map_err(Into::into)
}
