use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::coerce;
use crate::columns::{self, CANONICAL_COLUMNS};
use crate::errors::ParserError;
use crate::parse_station_csv;

fn fixture(path: &str) -> Vec<u8> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn days_since_epoch(year: i32, month: u32, day: u32) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (NaiveDate::from_ymd_opt(year, month, day).unwrap() - epoch).num_days() as i32
}

#[test]
fn parses_latin1_semicolon_export() {
    let bytes = fixture("INMET_SE_A601_2017.csv");
    let parsed = parse_station_csv(&bytes).expect("latin1 export parse failed");

    assert_eq!(parsed.dialect, "latin1-semicolon");
    assert_eq!(parsed.df.get_column_names_str(), CANONICAL_COLUMNS.to_vec());
    assert_eq!(parsed.rows_read, 4);
    assert_eq!(parsed.rows_dropped, 2);
    assert_eq!(parsed.df.height(), 2);

    let data = parsed.df.column("data").unwrap().date().unwrap();
    assert_eq!(data.get(0), Some(days_since_epoch(2017, 1, 1)));

    // decimal comma coerces to a point
    let temp = parsed.df.column("temperatura_ar").unwrap().f64().unwrap();
    assert_eq!(temp.get(0), Some(23.5));

    // -9999 is a sentinel, never a value
    let radiacao = parsed.df.column("radiacao_global").unwrap().f64().unwrap();
    assert_eq!(radiacao.get(0), None);
    assert_eq!(radiacao.get(1), None);
}

#[test]
fn parses_terse_utf8_comma_export() {
    let bytes = fixture("INMET_A701_terse.csv");
    let parsed = parse_station_csv(&bytes).expect("terse export parse failed");

    assert_eq!(parsed.dialect, "utf8-comma");
    assert_eq!(parsed.df.get_column_names_str(), CANONICAL_COLUMNS.to_vec());
    assert_eq!(parsed.df.height(), 2);
    assert_eq!(parsed.rows_dropped, 0);

    let temp = parsed.df.column("temperatura_ar").unwrap().f64().unwrap();
    assert_eq!(temp.get(1), Some(26.1));

    // columns the terse export does not carry come back fully null
    let precip = parsed
        .df
        .column("precipitacao_total")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(precip.null_count(), 2);
}

#[test]
fn parses_preamble_and_utc_hours() {
    let bytes = fixture("INMET_SE_A601_2019.csv");
    let parsed = parse_station_csv(&bytes).expect("2019+ export parse failed");

    assert_eq!(parsed.df.get_column_names_str(), CANONICAL_COLUMNS.to_vec());
    assert_eq!(parsed.df.height(), 3);

    let data = parsed.df.column("data").unwrap().date().unwrap();
    assert_eq!(data.get(0), Some(days_since_epoch(2019, 1, 1)));

    // "0100 UTC" maps to 01:00
    let hora = parsed
        .df
        .column("hora")
        .unwrap()
        .as_materialized_series()
        .time()
        .unwrap();
    assert_eq!(hora.get(1), Some(3_600_000_000_000));

    let pressao = parsed
        .df
        .column("pressao_atm_estacao")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(pressao.get(0), Some(887.6));
}

#[test]
fn drops_rows_with_incomplete_key() {
    let raw = b"data;hora;temperatura_ar\n\
        01/01/2023;12:00;20,0\n\
        01/01/2023;;21,0\n\
        99/99/2023;13:00;22,0\n";
    let parsed = parse_station_csv(raw).expect("inline export parse failed");

    assert_eq!(parsed.rows_read, 3);
    assert_eq!(parsed.rows_dropped, 2);
    assert_eq!(parsed.df.height(), 1);

    let temp = parsed.df.column("temperatura_ar").unwrap().f64().unwrap();
    assert_eq!(temp.get(0), Some(20.0));
}

#[test]
fn rejects_file_without_key_columns() {
    let raw = b"foo;bar;baz\n1;2;3\n";
    let err = parse_station_csv(raw).expect_err("headerless file must be rejected");

    match err {
        ParserError::NoMatchingDialect { attempts } => {
            assert_eq!(attempts.len(), 4);
        }
        other => panic!("expected NoMatchingDialect, got {other:?}"),
    }
}

#[test]
fn rejects_file_whose_rows_all_lack_keys() {
    let raw = b"data;hora;temperatura_ar\n;;20,0\n;;21,0\n";
    let err = parse_station_csv(raw).expect_err("keyless rows must be rejected");
    assert!(matches!(err, ParserError::EmptyData { .. }));
}

#[test]
fn header_variants_converge_on_canonical_name() {
    let accented = columns::normalize_header("Temperatura do Ar (°C)");
    let terse = columns::normalize_header("temperatura_ar");

    assert_eq!(columns::canonical_name(&accented), "temperatura_ar");
    assert_eq!(columns::canonical_name(&terse), "temperatura_ar");
}

#[test]
fn measurement_coercion_handles_locale_and_sentinels() {
    assert_eq!(coerce::parse_measurement("23,5"), Some(23.5));
    assert_eq!(coerce::parse_measurement("23.5"), Some(23.5));
    assert_eq!(coerce::parse_measurement("-9999"), None);
    assert_eq!(coerce::parse_measurement("-9999,0"), None);
    assert_eq!(coerce::parse_measurement(""), None);
    assert_eq!(coerce::parse_measurement("  "), None);
    assert_eq!(coerce::parse_measurement("null"), None);
    assert_eq!(coerce::parse_measurement("NaN"), None);
    assert_eq!(coerce::parse_measurement("not a number"), None);
}

#[test]
fn date_coercion_is_day_first() {
    assert_eq!(
        coerce::parse_date("02/01/2023"),
        NaiveDate::from_ymd_opt(2023, 1, 2)
    );
    assert_eq!(
        coerce::parse_date("2023-01-02"),
        NaiveDate::from_ymd_opt(2023, 1, 2)
    );
    assert_eq!(coerce::parse_date("99/99/2023"), None);
}

#[test]
fn time_coercion_accepts_both_hour_dialects() {
    use chrono::NaiveTime;

    assert_eq!(
        coerce::parse_time("12:00"),
        NaiveTime::from_hms_opt(12, 0, 0)
    );
    assert_eq!(
        coerce::parse_time("0000 UTC"),
        NaiveTime::from_hms_opt(0, 0, 0)
    );
    assert_eq!(
        coerce::parse_time("2300 UTC"),
        NaiveTime::from_hms_opt(23, 0, 0)
    );
    assert_eq!(coerce::parse_time(""), None);
    assert_eq!(coerce::parse_time("25:61"), None);
}
