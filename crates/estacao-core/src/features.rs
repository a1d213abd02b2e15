//! Trend features derived from the sorted, deduplicated series.
//!
//! All three features are computed per calendar date. Grouping by date
//! rather than over a global rolling window keeps a derived value from
//! blending readings across a day boundary, which would otherwise plant a
//! spurious pattern at midnight for every date in the series. The derived
//! columns go only to the model-training snapshot, never to the relational
//! store.

use std::collections::VecDeque;

use polars::prelude::*;

use crate::error::Result;

/// Trailing window length (in samples) for the humidity rolling mean.
const HUMIDITY_WINDOW: usize = 6;

/// Lag (in samples) for the temperature change feature.
const TEMP_LAG: usize = 3;

/// Append `pressure_change`, `temp_change_3h` and `humidity_trend` to an
/// already sorted canonical frame. The input must be ordered by
/// (data, hora); the scan resets its state at every date boundary.
pub fn augment_features(df: &DataFrame) -> Result<DataFrame> {
    let len = df.height();

    let data = df.column("data")?.date()?;
    let pressao = df.column("pressao_atm_estacao")?.f64()?;
    let temperatura = df.column("temperatura_ar")?.f64()?;
    let umidade = df.column("umidade_relativa")?.f64()?;

    let mut pressure_change: Vec<f64> = Vec::with_capacity(len);
    let mut temp_change_3h: Vec<f64> = Vec::with_capacity(len);
    let mut humidity_trend: Vec<f64> = Vec::with_capacity(len);

    let mut current_date: Option<i32> = None;
    let mut prev_pressure: Option<f64> = None;
    let mut temps_in_date: Vec<Option<f64>> = Vec::new();
    let mut humidity_window: VecDeque<Option<f64>> = VecDeque::with_capacity(HUMIDITY_WINDOW);

    for idx in 0..len {
        let date = data.get(idx);
        if idx == 0 || date != current_date {
            current_date = date;
            prev_pressure = None;
            temps_in_date.clear();
            humidity_window.clear();
        }

        // First difference of station pressure; first sample of a date, or a
        // missing reading on either side, contributes 0 rather than null.
        let pressure = pressao.get(idx);
        pressure_change.push(match (pressure, prev_pressure) {
            (Some(current), Some(previous)) => current - previous,
            _ => 0.0,
        });
        prev_pressure = pressure;

        // Third-lag difference of air temperature within the same date.
        let temp = temperatura.get(idx);
        let lagged = if temps_in_date.len() >= TEMP_LAG {
            temps_in_date[temps_in_date.len() - TEMP_LAG]
        } else {
            None
        };
        temp_change_3h.push(match (temp, lagged) {
            (Some(current), Some(previous)) => current - previous,
            _ => 0.0,
        });
        temps_in_date.push(temp);

        // Trailing mean of up to HUMIDITY_WINDOW samples; fewer samples at
        // the start of a date use all available. Missing readings occupy a
        // window slot but do not enter the mean.
        if humidity_window.len() == HUMIDITY_WINDOW {
            humidity_window.pop_front();
        }
        humidity_window.push_back(umidade.get(idx));
        let observed: Vec<f64> = humidity_window.iter().flatten().copied().collect();
        humidity_trend.push(if observed.is_empty() {
            0.0
        } else {
            observed.iter().sum::<f64>() / observed.len() as f64
        });
    }

    let mut output = df.clone();
    let mut columns = [
        Series::new("pressure_change".into(), pressure_change).into(),
        Series::new("temp_change_3h".into(), temp_change_3h).into(),
        Series::new("humidity_trend".into(), humidity_trend).into(),
    ];
    output.hstack_mut(columns.as_mut_slice())?;

    Ok(output)
}
