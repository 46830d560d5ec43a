//! Extraction of transactions from messy text sources.
//!
//! Three inputs arrive as plain text: bank SMS notifications, the text
//! layer of PDF bank statements (or CSV exports), and OCR output from
//! shop receipts. Each module turns its source into structured rows;
//! [`classify::Categorizer`] then assigns a spending category from the
//! description alone.

pub mod classify;
pub mod dates;
pub mod receipt;
pub mod sms;
pub mod statement;

pub use classify::Categorizer;
pub use receipt::{ParsedReceipt, ReceiptItem, parse_receipt};
pub use sms::{ParsedSms, parse_sms};
pub use statement::{StatementRow, parse_statement_csv, parse_statement_text};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no transactions found in input")]
    Empty,
}

/// Money direction as the source spells it; the caller maps debits to
/// expenses and credits to income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

/// Parse a human-formatted amount (`1,234.56`, `Rs. 500`) into minor units.
pub(crate) fn amount_minor(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .replace("Rs.", "")
        .replace("Rs", "")
        .replace(',', "")
        .trim()
        .to_string();
    let major: f64 = cleaned.parse().ok()?;
    if !major.is_finite() {
        return None;
    }
    Some((major * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_amounts() {
        assert_eq!(amount_minor("1,234.56"), Some(123_456));
        assert_eq!(amount_minor("Rs. 500"), Some(50_000));
        assert_eq!(amount_minor("₹99.90"), Some(9_990));
        assert_eq!(amount_minor("eleven"), None);
    }
}
