//! Minor-unit money helpers.
//!
//! All persisted amounts are `i64` minor units. These helpers convert to
//! and from major units and render amounts for alert and answer text.

use crate::currency::Currency;

/// Convert a major-unit amount to minor units, rounding half away from zero.
pub fn major_to_minor(major: f64, currency: Currency) -> i64 {
    (major * currency.minor_per_major() as f64).round() as i64
}

pub fn minor_to_major(minor: i64, currency: Currency) -> f64 {
    minor as f64 / currency.minor_per_major() as f64
}

/// Render a minor-unit amount with the currency symbol and thousands
/// separators, e.g. `₹1,23,456.78` becomes `₹123,456.78` (western grouping).
pub fn format_minor(minor: i64, currency: Currency) -> String {
    let negative = minor < 0;
    let abs = minor.unsigned_abs();
    let per_major = currency.minor_per_major() as u64;
    let major = abs / per_major;
    let frac = abs % per_major;

    let digits = major.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if per_major == 1 {
        format!("{sign}{}{grouped}", currency.symbol())
    } else {
        format!("{sign}{}{grouped}.{frac:02}", currency.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_major_amounts() {
        assert_eq!(major_to_minor(12.345, Currency::Inr), 1235);
        assert_eq!(major_to_minor(500.0, Currency::Jpy), 500);
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_minor(123_456_78, Currency::Inr), "₹123,456.78");
        assert_eq!(format_minor(5_00, Currency::Usd), "$5.00");
        assert_eq!(format_minor(-1_50, Currency::Inr), "-₹1.50");
        assert_eq!(format_minor(1_750, Currency::Jpy), "¥1,750");
    }
}
