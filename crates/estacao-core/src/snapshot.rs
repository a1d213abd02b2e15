//! Columnar snapshot of the feature-augmented series, consumed by the
//! model-training collaborator.

use std::fs::File;
use std::path::Path;

use polars::io::parquet::write::{ParquetCompression, ParquetWriter};
use polars::prelude::*;

use crate::error::Result;

pub fn write_snapshot(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut out = df.clone();
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(&mut out)?;

    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    ParquetReader::new(file).finish().map_err(Into::into)
}
