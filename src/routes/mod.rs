pub mod admin;
pub mod public;

use chrono::{NaiveDate, NaiveTime};

use crate::error::BookingError;

pub fn parse_date(value: &str) -> Result<NaiveDate, BookingError> {
    value
        .parse()
        .map_err(|_| BookingError::InvalidInput(format!("bad date '{value}', expected YYYY-MM-DD")))
}

/// Accepts "9:00" or "09:00" and yields the zero-padded form slots are
/// stored under.
pub fn normalize_time(value: &str) -> Result<String, BookingError> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| BookingError::InvalidInput(format!("bad time '{value}', expected HH:MM")))?;
    Ok(time.format("%H:%M").to_string())
}
