//! Receipt OCR post-processing.
//!
//! OCR output is noisy, so nothing here trusts line structure further
//! than it has to: the total is the largest plausible amount anywhere in
//! the text, the merchant is the first shouting line near the top, and
//! items are whatever lines end in a price.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{amount_minor, dates};

/// Receipts below 10 or above 100,000 major units are treated as OCR noise.
const MIN_TOTAL_MINOR: i64 = 10_00;
const MAX_TOTAL_MINOR: i64 = 100_000_00;

#[derive(Debug, Clone)]
pub struct ReceiptItem {
    pub name: String,
    pub price_minor: i64,
}

#[derive(Debug, Clone)]
pub struct ParsedReceipt {
    pub amount_minor: Option<i64>,
    pub merchant: String,
    pub date: Option<NaiveDate>,
    pub items: Vec<ReceiptItem>,
}

static AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)TOTAL[\s:]+(?:Rs\.?|₹)?\s*([\d,]+\.?\d*)",
        r"(?im)Grand\s*Total[\s:]+(?:Rs\.?|₹)?\s*([\d,]+\.?\d*)",
        r"(?im)Amount[\s:]+(?:Rs\.?|₹)?\s*([\d,]+\.?\d*)",
        r"(?im)(?:Rs\.?|₹)\s*([\d,]+\.?\d*)",
        r"(?im)([\d,]+\.?\d*)\s*(?:Rs\.?|₹)",
        r"(?im)\b(\d{1,6}(?:,\d{3})*(?:\.\d{2})?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("bad pattern {p}: {e}")))
    .collect()
});

static ITEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+(\d+(?:\.\d{2})?)\s*$").unwrap_or_else(|e| panic!("bad pattern: {e}"))
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
        r"(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4})",
        r"Date[\s:]+(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("bad pattern {p}: {e}")))
    .collect()
});

const NON_ITEM_WORDS: &[&str] = &["total", "tax", "subtotal", "balance"];

pub fn parse_receipt(text: &str) -> ParsedReceipt {
    ParsedReceipt {
        amount_minor: extract_total(text),
        merchant: extract_merchant(text).unwrap_or_else(|| "Unknown Merchant".to_string()),
        date: extract_date(text),
        items: extract_items(text),
    }
}

/// Largest plausible amount anywhere in the text; totals are usually the
/// biggest number on a receipt. Numbers that are part of a date are
/// skipped, or `15-08-2026` would put a 2,026-rupee total on every
/// receipt.
fn extract_total(text: &str) -> Option<i64> {
    let date_spans: Vec<(usize, usize)> = DATE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| (m.start(), m.end()))
        .collect();
    let inside_date =
        |m: &regex::Match| date_spans.iter().any(|(s, e)| m.start() >= *s && m.end() <= *e);

    AMOUNT_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .filter(|m| !inside_date(m))
        .filter_map(|m| amount_minor(m.as_str()))
        .filter(|minor| (MIN_TOTAL_MINOR..=MAX_TOTAL_MINOR).contains(minor))
        .max()
}

/// First all-uppercase line within the top five lines.
fn extract_merchant(text: &str) -> Option<String> {
    for line in text.lines().take(5) {
        let line = line.trim();
        let has_letters = line.chars().any(|c| c.is_alphabetic());
        let shouting = line.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase());
        if line.len() > 3 && has_letters && shouting {
            return Some(title_case(line));
        }
    }
    None
}

fn extract_items(text: &str) -> Vec<ReceiptItem> {
    text.lines()
        .filter_map(|line| ITEM_LINE.captures(line.trim()))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim().to_string();
            let price_minor = amount_minor(caps.get(2)?.as_str())?;
            let lowered = name.to_lowercase();
            if NON_ITEM_WORDS.iter().any(|w| lowered.contains(w)) {
                return None;
            }
            Some(ReceiptItem { name, price_minor })
        })
        .collect()
}

fn extract_date(text: &str) -> Option<NaiveDate> {
    DATE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1).map(|m| m.as_str()))
        .and_then(dates::parse_date)
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = "\
BIG BAZAAR
MG Road, Bengaluru
Date: 15-08-2026

Rice 5kg 450.00
Sunflower Oil 210.50
Soap 45.00

Subtotal 705.50
Tax 35.28
TOTAL Rs. 740.78
";

    #[test]
    fn picks_the_total_not_the_biggest_item() {
        let parsed = parse_receipt(RECEIPT);
        assert_eq!(parsed.amount_minor, Some(74_078));
    }

    #[test]
    fn the_year_in_the_date_is_not_a_total() {
        let parsed = parse_receipt("CHAI POINT\n15 Aug 2026\nTOTAL Rs. 120.00\n");
        assert_eq!(parsed.amount_minor, Some(12_000));

        let parsed = parse_receipt("CHAI POINT\nDate: 15-08-2026\nTOTAL Rs. 120.00\n");
        assert_eq!(parsed.amount_minor, Some(12_000));
    }

    #[test]
    fn merchant_is_the_first_uppercase_line() {
        let parsed = parse_receipt(RECEIPT);
        assert_eq!(parsed.merchant, "Big Bazaar");
    }

    #[test]
    fn items_exclude_totals_and_tax() {
        let parsed = parse_receipt(RECEIPT);
        let names: Vec<&str> = parsed.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Rice 5kg", "Sunflower Oil", "Soap"]);
        assert_eq!(parsed.items[2].price_minor, 4_500);
    }

    #[test]
    fn reads_the_receipt_date() {
        let parsed = parse_receipt(RECEIPT);
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 8, 15));
    }

    #[test]
    fn empty_text_degrades_gracefully() {
        let parsed = parse_receipt("");
        assert_eq!(parsed.amount_minor, None);
        assert_eq!(parsed.merchant, "Unknown Merchant");
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn implausible_amounts_are_ignored() {
        let parsed = parse_receipt("CORNER SHOP\nTOTAL Rs. 2\n");
        assert_eq!(parsed.amount_minor, None);
    }
}
