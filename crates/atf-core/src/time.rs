//! Instant conversion helpers.
//!
//! Tokens carry `startDate`/`endDate` as epoch seconds; the external data
//! API and the rendered pages consume ISO-8601 strings with millisecond
//! precision (`2020-10-06T07:01:45.000Z`). The conversion multiplies into
//! milliseconds once, here, and nowhere else.

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::error::{CoreError, Result};

const ISO_MILLIS: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Formats an instant as an ISO-8601 string with millisecond precision.
pub fn format_iso_millis(datetime: OffsetDateTime) -> Result<String> {
    Ok(datetime.format(&ISO_MILLIS)?)
}

/// Converts epoch seconds (as carried in token claims) to an ISO-8601 string.
pub fn epoch_seconds_to_iso(seconds: i64) -> Result<String> {
    let datetime = OffsetDateTime::from_unix_timestamp(seconds)?;
    format_iso_millis(datetime)
}

/// The current instant as an ISO-8601 string, for `lastUpdated` stamps.
pub fn now_iso_millis() -> Result<String> {
    format_iso_millis(OffsetDateTime::now_utc())
}

/// Parses an ISO-8601 string produced by this service or the data API.
pub fn parse_iso(value: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| CoreError::invalid_date_time(format!("failed to parse '{value}': {e}")))
}
