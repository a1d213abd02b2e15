//! Store round-trip checks against a live Postgres.
//!
//! These are ignored by default; point DATABASE_URL at a scratch database
//! and run `cargo test -p estacao -- --ignored`.

use chrono::{NaiveDate, NaiveTime};
use estacao_core::{db, store};
use estacao_parser::parse_station_csv;
use sqlx::Row;

const TABLE: &str = "meteo_data_roundtrip";

async fn scratch_pool() -> db::DbPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for store tests");
    db::connect(&url).await.expect("failed to connect")
}

fn frame(csv: &str) -> polars::prelude::DataFrame {
    parse_station_csv(csv.as_bytes())
        .expect("inline export parse failed")
        .df
}

#[tokio::test]
#[ignore = "requires a live Postgres"]
async fn upsert_is_idempotent_and_last_write_wins() {
    let pool = scratch_pool().await;

    sqlx::query(&format!("DROP TABLE IF EXISTS {TABLE}"))
        .execute(&pool)
        .await
        .expect("drop scratch table");

    // table-ensure is idempotent
    store::ensure_table(&pool, TABLE).await.expect("ensure");
    store::ensure_table(&pool, TABLE).await.expect("re-ensure");

    let first = frame(
        "data;hora;temperatura_ar;umidade_relativa\n\
         01/01/2023;12:00;20,0;70\n\
         01/01/2023;13:00;21,0;68\n",
    );
    let report = store::write_observations(&pool, TABLE, &first)
        .await
        .expect("first write");
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.rows_skipped, 0);

    // same key, new temperature, humidity now missing
    let second = frame(
        "data;hora;temperatura_ar;umidade_relativa\n\
         01/01/2023;12:00;26,1;\n",
    );
    store::write_observations(&pool, TABLE, &second)
        .await
        .expect("second write");
    store::write_observations(&pool, TABLE, &second)
        .await
        .expect("repeat write");

    let key_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let key_time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let row = sqlx::query(&format!(
        "SELECT temperatura_ar, umidade_relativa FROM {TABLE} WHERE data = $1 AND hora = $2"
    ))
    .bind(key_date)
    .bind(key_time)
    .fetch_one(&pool)
    .await
    .expect("fetch upserted row");

    let temperatura: Option<f64> = row.try_get("temperatura_ar").unwrap();
    let umidade: Option<f64> = row.try_get("umidade_relativa").unwrap();
    assert_eq!(temperatura, Some(26.1));
    // last write wins, including overwriting with null
    assert_eq!(umidade, None);

    let count: i64 = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {TABLE}"))
        .fetch_one(&pool)
        .await
        .expect("count")
        .try_get("n")
        .unwrap();
    assert_eq!(count, 2);

    sqlx::query(&format!("DROP TABLE {TABLE}"))
        .execute(&pool)
        .await
        .expect("cleanup");
    pool.close().await;
}
