//! Date parsing for the formats banks actually emit.

use chrono::NaiveDate;

/// Order matters: day-first formats are tried before anything ambiguous,
/// and two-digit years before four-digit ones. `%y` refuses a four-digit
/// year (trailing input), but `%Y` would happily read `"26"` as year 26,
/// so the short form has to win the race.
const FORMATS: &[&str] = &[
    "%d-%m-%y",
    "%d/%m/%y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %b %y",
    "%d %B %y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%y",
    "%d-%B-%y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%Y-%m-%d",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_first_numeric_formats() {
        assert_eq!(parse_date("15-08-2026"), Some(date(2026, 8, 15)));
        assert_eq!(parse_date("15/08/26"), Some(date(2026, 8, 15)));
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(parse_date("15-08-26"), Some(date(2026, 8, 15)));
        assert_eq!(parse_date("01/01/24"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date("7 Mar 26"), Some(date(2026, 3, 7)));
    }

    #[test]
    fn month_name_formats() {
        assert_eq!(parse_date("15 Aug 2026"), Some(date(2026, 8, 15)));
        assert_eq!(parse_date("5-DEC-23"), Some(date(2023, 12, 5)));
        assert_eq!(parse_date("01 January 2024"), Some(date(2024, 1, 1)));
    }

    #[test]
    fn iso_fallback() {
        assert_eq!(parse_date("2026-08-15"), Some(date(2026, 8, 15)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("31-02-2026"), None);
    }
}
