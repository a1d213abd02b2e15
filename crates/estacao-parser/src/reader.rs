use std::collections::HashMap;

use chrono::{NaiveDate, Timelike};
use csv::StringRecord;
use polars::prelude::*;

use crate::coerce;
use crate::columns::{self, CANONICAL_COLUMNS, MEASUREMENT_COLUMNS};
use crate::dialects::{ReadDialect, DIALECTS};
use crate::errors::{DialectAttempt, ParserError};
use crate::model::ParsedStationFile;

/// The 2019+ exports carry a station-metadata preamble before the header
/// row; scan at most this many records for a line that maps to the key
/// columns.
const MAX_PREAMBLE_ROWS: usize = 10;

/// Minimum canonical columns a header must map to before a dialect is
/// accepted: the two key columns plus at least one measurement.
const MIN_MAPPED_COLUMNS: usize = 3;

/// Parse one raw station export into the canonical frame, trying each
/// (encoding, delimiter) candidate in order.
pub fn parse_station_csv(bytes: &[u8]) -> Result<ParsedStationFile, ParserError> {
    let mut attempts = Vec::new();

    for dialect in &DIALECTS {
        match try_dialect(bytes, dialect) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::DialectMismatch { reason, .. }) => {
                attempts.push(DialectAttempt::new(dialect.name, reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingDialect { attempts })
}

fn try_dialect(bytes: &[u8], dialect: &ReadDialect) -> Result<ParsedStationFile, ParserError> {
    let Some(text) = dialect.decode(bytes) else {
        return Err(ParserError::DialectMismatch {
            dialect: dialect.name,
            reason: "file contents are not valid for this encoding".to_string(),
        });
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ParserError::Csv {
            dialect: dialect.name,
            source,
        })?;
        records.push(record);
    }

    let (header_idx, column_indices) = locate_header(dialect, &records)?;
    let data_records = &records[header_idx + 1..];
    if data_records.is_empty() {
        return Err(ParserError::DialectMismatch {
            dialect: dialect.name,
            reason: "header found but the file has no data rows".to_string(),
        });
    }

    build_frame(dialect, data_records, &column_indices)
}

/// Find the header row within the preamble window and map its cells onto
/// canonical column indices. The first raw header mapping to a given
/// canonical name wins; later duplicates are ignored.
fn locate_header(
    dialect: &ReadDialect,
    records: &[StringRecord],
) -> Result<(usize, HashMap<&'static str, usize>), ParserError> {
    for (idx, record) in records.iter().take(MAX_PREAMBLE_ROWS).enumerate() {
        let mut mapped: HashMap<&'static str, usize> = HashMap::new();
        for (field_idx, field) in record.iter().enumerate() {
            let normalized = columns::normalize_header(field);
            let canonical = columns::canonical_name(&normalized);
            if columns::is_canonical(canonical) {
                let canonical = CANONICAL_COLUMNS
                    .iter()
                    .find(|name| **name == canonical)
                    .copied()
                    .unwrap();
                mapped.entry(canonical).or_insert(field_idx);
            }
        }

        if mapped.contains_key("data")
            && mapped.contains_key("hora")
            && mapped.len() >= MIN_MAPPED_COLUMNS
        {
            return Ok((idx, mapped));
        }
    }

    Err(ParserError::DialectMismatch {
        dialect: dialect.name,
        reason: format!(
            "no header row mapping to both 'data' and 'hora' within the first {MAX_PREAMBLE_ROWS} lines"
        ),
    })
}

fn build_frame(
    dialect: &ReadDialect,
    data_records: &[StringRecord],
    column_indices: &HashMap<&'static str, usize>,
) -> Result<ParsedStationFile, ParserError> {
    let capacity = data_records.len();
    let mut dates: Vec<Option<i32>> = Vec::with_capacity(capacity);
    let mut horas: Vec<Option<i64>> = Vec::with_capacity(capacity);
    let mut measurements: HashMap<&'static str, Vec<Option<f64>>> = MEASUREMENT_COLUMNS
        .iter()
        .map(|name| (*name, Vec::with_capacity(capacity)))
        .collect();

    let data_idx = column_indices["data"];
    let hora_idx = column_indices["hora"];

    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for record in data_records {
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows_read += 1;

        let date = record.get(data_idx).and_then(coerce::parse_date);
        let hora = record.get(hora_idx).and_then(coerce::parse_time);

        // Both halves of the natural key must coerce; there is no sensible
        // default for either.
        let (Some(date), Some(hora)) = (date, hora) else {
            rows_dropped += 1;
            continue;
        };

        dates.push(Some(days_since_epoch(date)));
        horas.push(Some(nanos_since_midnight(&hora)));

        for name in MEASUREMENT_COLUMNS {
            let value = column_indices
                .get(name)
                .and_then(|idx| record.get(*idx))
                .and_then(coerce::parse_measurement);
            measurements.get_mut(name).unwrap().push(value);
        }
    }

    if dates.is_empty() {
        return Err(ParserError::EmptyData {
            dialect: dialect.name,
        });
    }

    let validation = |err: PolarsError| ParserError::Validation {
        dialect: dialect.name,
        message: format!("failed to build canonical frame: {err}"),
    };

    let data_series = Series::new("data".into(), dates)
        .cast(&DataType::Date)
        .map_err(validation)?;
    let hora_series = Series::new("hora".into(), horas)
        .cast(&DataType::Time)
        .map_err(validation)?;

    let mut cols: Vec<Column> = Vec::with_capacity(CANONICAL_COLUMNS.len());
    cols.push(data_series.into());
    cols.push(hora_series.into());
    for name in MEASUREMENT_COLUMNS {
        let values = measurements.remove(name).unwrap();
        cols.push(Series::new(name.into(), values).into());
    }

    let df = DataFrame::new(cols).map_err(validation)?;

    Ok(ParsedStationFile {
        df,
        dialect: dialect.name,
        rows_read,
        rows_dropped,
    })
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

fn nanos_since_midnight(time: &chrono::NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * 1_000_000_000 + i64::from(time.nanosecond())
}
