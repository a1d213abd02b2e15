//! Idempotent persistence of the canonical series.
//!
//! The table-ensure step runs the same create-if-not-exists every run; the
//! write is a batched upsert keyed by (data, hora) with last-write-wins
//! semantics for every non-key column, including overwriting with null.

use chrono::{Duration, NaiveDate, NaiveTime};
use polars::prelude::*;
use tracing::warn;

use estacao_parser::columns::MEASUREMENT_COLUMNS;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};

#[derive(Debug)]
pub struct StoreReport {
    /// Rows affected by the upsert batch.
    pub rows_written: u64,
    /// Rows rejected before the database call because of an incomplete key.
    pub rows_skipped: usize,
}

struct ObservationRow {
    data: NaiveDate,
    hora: NaiveTime,
    measurements: [Option<f64>; MEASUREMENT_COLUMNS.len()],
}

/// Create the canonical observation table if it does not exist. Idempotent;
/// the constraint is identical every run.
pub async fn ensure_table(pool: &DbPool, table: &str) -> Result<()> {
    validate_table_ident(table)?;

    let measurement_defs = MEASUREMENT_COLUMNS
        .iter()
        .map(|name| format!("{name} DOUBLE PRECISION"))
        .collect::<Vec<_>>()
        .join(",\n    ");
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    \
         data DATE NOT NULL,\n    \
         hora TIME NOT NULL,\n    \
         {measurement_defs},\n    \
         PRIMARY KEY (data, hora)\n)"
    );

    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Upsert the canonical columns of `df` into `table`, one transaction for
/// the whole batch. Rows with a null key component are skipped and counted,
/// never aborting the batch; connectivity and authorization failures
/// propagate and are fatal to the run.
pub async fn write_observations(pool: &DbPool, table: &str, df: &DataFrame) -> Result<StoreReport> {
    validate_table_ident(table)?;

    let (rows, rows_skipped) = extract_rows(df)?;
    let sql = upsert_sql(table);

    let mut tx = pool.begin().await?;
    let mut rows_written = 0u64;
    for row in &rows {
        let mut query = sqlx::query(&sql).bind(row.data).bind(row.hora);
        for value in row.measurements {
            query = query.bind(value);
        }
        rows_written += query.execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;

    Ok(StoreReport {
        rows_written,
        rows_skipped,
    })
}

fn upsert_sql(table: &str) -> String {
    let columns = MEASUREMENT_COLUMNS.join(", ");
    let placeholders = (0..MEASUREMENT_COLUMNS.len())
        .map(|i| format!("${}", i + 3))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = MEASUREMENT_COLUMNS
        .iter()
        .map(|name| format!("{name} = EXCLUDED.{name}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} (data, hora, {columns}) \
         VALUES ($1, $2, {placeholders}) \
         ON CONFLICT (data, hora) DO UPDATE SET {updates}"
    )
}

/// Pull typed rows out of the canonical frame, rejecting incomplete keys
/// before any database call — the store-side mirror of the deduplicator's
/// key invariant.
fn extract_rows(df: &DataFrame) -> Result<(Vec<ObservationRow>, usize)> {
    let data = df.column("data")?.date()?;
    let hora = df.column("hora")?.as_materialized_series().time()?;

    let mut measurement_cols = Vec::with_capacity(MEASUREMENT_COLUMNS.len());
    for name in MEASUREMENT_COLUMNS {
        measurement_cols.push(df.column(name)?.f64()?);
    }

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for idx in 0..df.height() {
        let (Some(days), Some(nanos)) = (data.get(idx), hora.get(idx)) else {
            skipped += 1;
            continue;
        };

        let date = epoch + Duration::days(i64::from(days));
        let seconds = (nanos / 1_000_000_000) as u32;
        let nano_rem = (nanos % 1_000_000_000) as u32;
        let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nano_rem) else {
            skipped += 1;
            continue;
        };

        let mut measurements = [None; MEASUREMENT_COLUMNS.len()];
        for (slot, chunked) in measurements.iter_mut().zip(&measurement_cols) {
            *slot = chunked.get(idx);
        }

        rows.push(ObservationRow {
            data: date,
            hora: time,
            measurements,
        });
    }

    if skipped > 0 {
        warn!(
            rows = skipped,
            "skipped rows with incomplete natural key before store write"
        );
    }

    Ok((rows, skipped))
}

fn validate_table_ident(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(PipelineError::Processing(format!(
            "invalid table identifier '{table}'"
        )))
    }
}
