//! Bank notification SMS parsing.
//!
//! Every field is pulled out by a cascade of patterns tried in order;
//! the first match wins. Banks do not agree on much, so each cascade is
//! a list of the phrasings seen in the wild.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{Direction, amount_minor, dates};

#[derive(Debug, Clone, Default)]
pub struct ParsedSms {
    pub amount_minor: Option<i64>,
    /// ISO code; INR unless a foreign currency marker was found.
    pub currency: &'static str,
    pub direction: Option<Direction>,
    pub merchant: Option<String>,
    pub card_last_digits: Option<String>,
    pub date: Option<NaiveDate>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap_or_else(|e| panic!("bad pattern {p}: {e}")))
        .collect()
}

/// Currency markers, checked before the plain INR amount patterns.
static CURRENCY_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        ("USD", compile(&[r"\$\s*([\d,]+\.?\d*)", r"USD\s*([\d,]+\.?\d*)"])),
        ("EUR", compile(&[r"€\s*([\d,]+\.?\d*)", r"EUR\s*([\d,]+\.?\d*)"])),
        ("GBP", compile(&[r"£\s*([\d,]+\.?\d*)", r"GBP\s*([\d,]+\.?\d*)"])),
        ("AED", compile(&[r"AED\s*([\d,]+\.?\d*)", r"Dhs?\s*([\d,]+\.?\d*)"])),
        (
            "INR",
            compile(&[
                r"₹\s*([\d,]+\.?\d*)",
                r"Rs\.?\s*([\d,]+\.?\d*)",
                r"INR\s*([\d,]+\.?\d*)",
            ]),
        ),
    ]
});

static AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"INR\s*([\d,]+\.?\d*)",
        r"Rs\.?\s*([\d,]+\.?\d*)",
        r"for\s*Rs\.?\s*([\d,]+\.?\d*)",
        r"amount\s*of\s*Rs\.?\s*([\d,]+\.?\d*)",
    ])
});

const DEBIT_KEYWORDS: &[&str] = &[
    "debited",
    "withdrawn",
    "paid",
    "spent",
    "purchase",
    "debit",
];
const CREDIT_KEYWORDS: &[&str] = &[
    "credited",
    "received",
    "deposited",
    "refund",
    "credit",
    "salary",
];

static MERCHANT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"for\s+payment\s+at\s+([A-Za-z0-9\s&\-\.]+)",
        r"withdrawn\s+from\s+ATM\s+at\s+([A-Za-z0-9\s&\-\.]+)",
        r"\bat\s+([A-Za-z0-9\s&\-\.]+?)(?:\s+on|\s+Avl|\s*\.|$)",
        r"\bto\s+([A-Za-z0-9\s&\-\.]+?)(?:\s+on|\s+from|\s*\.|$)",
        r"\bfrom\s+([A-Za-z0-9\s&\-\.]+?)(?:\s+on|\s+Bal|\s*\.|$)",
    ])
});

static CARD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"card\s*ending\s*(\d{4})",
        r"card\s*\*+(\d{4})",
        r"card\s+XX(\d{4})",
        r"a/c\s*XX(\d{4})",
    ])
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
        r"(\d{1,2}\s+[A-Za-z]+\s+\d{2,4})",
        r"on\s+(\d{1,2}-\d{1,2}-\d{4})",
    ])
});

fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn parse_sms(text: &str) -> ParsedSms {
    let mut parsed = ParsedSms {
        currency: "INR",
        ..ParsedSms::default()
    };

    for (code, patterns) in CURRENCY_PATTERNS.iter() {
        if let Some(raw) = first_capture(patterns, text) {
            if let Some(minor) = amount_minor(raw) {
                parsed.currency = code;
                parsed.amount_minor = Some(minor);
                break;
            }
        }
    }
    if parsed.amount_minor.is_none() {
        parsed.amount_minor = first_capture(&AMOUNT_PATTERNS, text).and_then(amount_minor);
    }

    let lowered = text.to_lowercase();
    if DEBIT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        parsed.direction = Some(Direction::Debit);
    } else if CREDIT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        parsed.direction = Some(Direction::Credit);
    }

    parsed.merchant = first_capture(&MERCHANT_PATTERNS, text)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    parsed.card_last_digits = first_capture(&CARD_PATTERNS, text).map(str::to_string);
    parsed.date = first_capture(&DATE_PATTERNS, text).and_then(dates::parse_date);

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_typical_debit_sms() {
        let parsed = parse_sms(
            "Rs. 2,500.00 debited from a/c XX1234 on 15-08-2026 at AMAZON INDIA. Avl bal Rs. 10,000",
        );
        assert_eq!(parsed.amount_minor, Some(250_000));
        assert_eq!(parsed.currency, "INR");
        assert_eq!(parsed.direction, Some(Direction::Debit));
        assert_eq!(parsed.merchant.as_deref(), Some("AMAZON INDIA"));
        assert_eq!(parsed.card_last_digits.as_deref(), Some("1234"));
        assert_eq!(
            parsed.date,
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
    }

    #[test]
    fn parses_a_credit_sms() {
        let parsed = parse_sms("INR 50,000 credited to your account from ACME CORP on 01-08-2026");
        assert_eq!(parsed.amount_minor, Some(5_000_000));
        assert_eq!(parsed.direction, Some(Direction::Credit));
    }

    #[test]
    fn detects_foreign_currency() {
        let parsed = parse_sms("USD 42.50 spent on card ending 9876 at NETFLIX.COM");
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.amount_minor, Some(4_250));
        assert_eq!(parsed.card_last_digits.as_deref(), Some("9876"));
    }

    #[test]
    fn atm_withdrawal_sms() {
        let parsed = parse_sms("Rs 10000 withdrawn from ATM at MG ROAD BRANCH using card *5678");
        assert_eq!(parsed.direction, Some(Direction::Debit));
        assert_eq!(parsed.amount_minor, Some(1_000_000));
        assert_eq!(parsed.card_last_digits.as_deref(), Some("5678"));
    }

    #[test]
    fn non_transactional_text_yields_nothing() {
        let parsed = parse_sms("Your OTP is 482913. Do not share it with anyone.");
        assert_eq!(parsed.amount_minor, None);
        assert_eq!(parsed.direction, None);
    }
}
