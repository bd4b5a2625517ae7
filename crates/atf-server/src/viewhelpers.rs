//! Date formatting for rendered pages.
//!
//! Availability windows travel through the system as ISO-8601 strings;
//! pages show them as "06 October 2020" / "Tuesday 06 October 2020 at
//! 7:01am". Formatting is display-only, so an unparseable value falls back
//! to the raw string rather than failing the page.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use atf_core::parse_iso;

const DATE: &[BorrowedFormatItem<'_>] = format_description!("[day] [month repr:long] [year]");

const DATE_TIME: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:long] [day] [month repr:long] [year] at \
     [hour repr:12 padding:none]:[minute][period case:lower]"
);

pub fn format_date(iso: &str) -> String {
    parse_iso(iso)
        .ok()
        .and_then(|dt| dt.format(&DATE).ok())
        .unwrap_or_else(|| iso.to_string())
}

pub fn format_date_time(iso: &str) -> String {
    parse_iso(iso)
        .ok()
        .and_then(|dt| dt.format(&DATE_TIME).ok())
        .unwrap_or_else(|| iso.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dates_for_display() {
        assert_eq!(format_date("2020-10-06T07:01:45.000Z"), "06 October 2020");
    }

    #[test]
    fn formats_date_times_for_display() {
        assert_eq!(
            format_date_time("2020-10-06T07:01:45.000Z"),
            "Tuesday 06 October 2020 at 7:01am"
        );
    }

    #[test]
    fn falls_back_to_the_raw_value() {
        assert_eq!(format_date("soon"), "soon");
        assert_eq!(format_date_time(""), "");
    }
}
