pub mod coerce;
pub mod columns;
pub mod dialects;
pub mod errors;
pub mod model;
mod reader;

pub use errors::{DialectAttempt, ParserError};
pub use model::ParsedStationFile;
pub use reader::parse_station_csv;

#[cfg(test)]
mod tests;
