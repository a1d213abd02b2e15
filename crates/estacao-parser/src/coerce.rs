//! Cell-level coercion: locale-aware dates, hour-of-day, and decimal-comma
//! measurements. Anything unparsable becomes missing, never a default value.

use chrono::{NaiveDate, NaiveTime};

/// Sentinel the station firmware emits for a failed measurement.
const MISSING_SENTINEL: f64 = -9999.0;

static DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Parse a calendar date using day-first locale convention, accepting the
/// ISO-style spellings the 2019+ exports switched to.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parse a time-of-day cell. Accepts `HH:MM` (optionally with seconds) and
/// the `HHMM UTC` form used by the 2019+ exports.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let lowered = raw.trim().to_lowercase();
    let trimmed = lowered.strip_suffix(" utc").unwrap_or(&lowered);
    if trimmed.is_empty() {
        return None;
    }
    for fmt in ["%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Some(time);
        }
    }
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return NaiveTime::parse_from_str(trimmed, "%H%M").ok();
    }
    None
}

/// Coerce a measurement cell to f64. Decimal commas are rewritten to points
/// before parsing; empty cells, textual null markers, unparsable values and
/// the `-9999` sentinel all become missing.
pub fn parse_measurement(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return None;
    }

    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(parsed) if (parsed - MISSING_SENTINEL).abs() < f64::EPSILON => None,
        Ok(parsed) => Some(parsed),
        Err(_) => None,
    }
}
