use polars::prelude::DataFrame;

/// One successfully parsed raw export, already reduced to the canonical
/// column set with typed key columns.
pub struct ParsedStationFile {
    /// Canonical frame: `data` (Date), `hora` (Time), nullable f64
    /// measurements. Rows with an incomplete key are already dropped.
    pub df: DataFrame,
    /// Name of the (encoding, delimiter) candidate that recognized the file.
    pub dialect: &'static str,
    /// Data rows seen after the header, before key filtering.
    pub rows_read: usize,
    /// Rows dropped because `data` or `hora` failed to coerce.
    pub rows_dropped: usize,
}

impl std::fmt::Debug for ParsedStationFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedStationFile")
            .field("dialect", &self.dialect)
            .field("rows_read", &self.rows_read)
            .field("rows_dropped", &self.rows_dropped)
            .field("height", &self.df.height())
            .finish()
    }
}
