//! Hand-built canonical frames for unit tests. An empty date or time string
//! produces a null key component.

use chrono::{NaiveDate, NaiveTime, Timelike};
use polars::prelude::*;

use estacao_parser::columns::MEASUREMENT_COLUMNS;

/// Row: (data, hora, pressao_atm_estacao, temperatura_ar, umidade_relativa).
/// The remaining measurement columns are filled with nulls.
pub(crate) fn observation_frame(
    rows: &[(&str, &str, Option<f64>, Option<f64>, Option<f64>)],
) -> DataFrame {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

    let dates: Vec<Option<i32>> = rows
        .iter()
        .map(|(date, ..)| {
            if date.is_empty() {
                None
            } else {
                let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
                Some((parsed - epoch).num_days() as i32)
            }
        })
        .collect();

    let horas: Vec<Option<i64>> = rows
        .iter()
        .map(|(_, hora, ..)| {
            if hora.is_empty() {
                None
            } else {
                let parsed = NaiveTime::parse_from_str(hora, "%H:%M").unwrap();
                Some(i64::from(parsed.num_seconds_from_midnight()) * 1_000_000_000)
            }
        })
        .collect();

    let mut cols: Vec<Column> = Vec::new();
    cols.push(
        Series::new("data".into(), dates)
            .cast(&DataType::Date)
            .unwrap()
            .into(),
    );
    cols.push(
        Series::new("hora".into(), horas)
            .cast(&DataType::Time)
            .unwrap()
            .into(),
    );

    for name in MEASUREMENT_COLUMNS {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|(_, _, pressao, temperatura, umidade)| match name {
                "pressao_atm_estacao" => *pressao,
                "temperatura_ar" => *temperatura,
                "umidade_relativa" => *umidade,
                _ => None,
            })
            .collect();
        cols.push(Series::new(name.into(), values).into());
    }

    DataFrame::new(cols).unwrap()
}
