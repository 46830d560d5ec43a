//! Bank statement parsing.
//!
//! Two shapes are accepted: the text layer of a PDF statement, where the
//! transaction table survives as columns separated by pipes, tabs or runs
//! of spaces, and plain CSV exports. When no header row can be found the
//! text parser falls back to per-line pattern matching: any line carrying
//! a date is treated as a transaction and its last number as the amount.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{Direction, ExtractError, amount_minor, dates};

#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount_minor: i64,
    pub direction: Direction,
    /// The source line or record, kept for auditing.
    pub raw: String,
}

static DATE_IN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})").unwrap_or_else(|e| panic!("bad pattern: {e}"))
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\d,]+\.?\d*").unwrap_or_else(|e| panic!("bad pattern: {e}"))
});

static COLUMN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").unwrap_or_else(|e| panic!("bad pattern: {e}")));

/// A header or data cell: words separated by single spaces, columns by two
/// or more.
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+(?:\s\S+)*").unwrap_or_else(|e| panic!("bad pattern: {e}")));

/// Standard column names for the headers banks use.
fn canonical_column(header: &str) -> Option<&'static str> {
    match header.trim().to_lowercase().as_str() {
        "date" | "transaction date" | "txn date" | "value date" => Some("date"),
        "description" | "narration" | "particulars" | "details" => Some("description"),
        "debit" | "withdrawal" | "withdrawal amt" | "dr" => Some("debit"),
        "credit" | "deposit" | "deposit amt" | "cr" => Some("credit"),
        "amount" => Some("amount"),
        "balance" | "closing balance" => Some("balance"),
        "type" | "kind" => Some("type"),
        _ => None,
    }
}

fn split_columns(line: &str) -> Vec<String> {
    if line.contains('|') {
        line.split('|').map(|c| c.trim().to_string()).collect()
    } else {
        COLUMN_SPLIT
            .split(line.trim())
            .map(|c| c.trim().to_string())
            .collect()
    }
}

/// Parse the extracted text of a bank statement.
pub fn parse_statement_text(text: &str) -> Vec<StatementRow> {
    if let Some(rows) = parse_with_header(text) {
        return rows;
    }
    // No recognizable table header; scan line by line.
    text.lines().filter_map(parse_loose_line).collect()
}

fn parse_with_header(text: &str) -> Option<Vec<StatementRow>> {
    let mut lines = text.lines();
    let header = lines.by_ref().find(|line| {
        let cells = split_columns(line);
        let mapped: Vec<_> = cells.iter().map(|c| canonical_column(c)).collect();
        cells.len() >= 3
            && mapped.contains(&Some("date"))
            && mapped.contains(&Some("description"))
    })?;

    let extract_cells: Box<dyn Fn(&str) -> Vec<String>> = if header.contains('|') {
        // split('|') keeps empty cells, so indexes stay aligned.
        Box::new(|line: &str| line.split('|').map(|c| c.trim().to_string()).collect())
    } else {
        // Space-aligned tables leave empty cells as nothing at all; slice
        // each row at the header's column offsets instead of splitting.
        let spans = column_spans(header);
        Box::new(move |line: &str| {
            spans
                .iter()
                .map(|(start, end)| slice_lossy(line, *start, *end).trim().to_string())
                .collect()
        })
    };

    let columns: Vec<_> = extract_cells(header)
        .iter()
        .map(|c| canonical_column(c))
        .collect();
    let position = |name: &str| columns.iter().position(|c| *c == Some(name));
    let date_col = position("date")?;
    let description_col = position("description")?;
    let debit_col = position("debit");
    let credit_col = position("credit");
    let amount_col = position("amount");

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells = extract_cells(line);
        let cell = |i: Option<usize>| {
            i.and_then(|i| cells.get(i))
                .map(String::as_str)
                .filter(|c| !c.is_empty())
        };

        let Some(date_raw) = cell(Some(date_col)) else { continue };
        let date = dates::parse_date(date_raw);
        let description = cell(Some(description_col)).unwrap_or("Transaction").to_string();

        let debit = cell(debit_col).and_then(amount_minor).filter(|m| *m > 0);
        let credit = cell(credit_col).and_then(amount_minor).filter(|m| *m > 0);
        let (amount, direction) = match (debit, credit) {
            (Some(amount), _) => (amount, Direction::Debit),
            (None, Some(amount)) => (amount, Direction::Credit),
            (None, None) => {
                let Some(raw) = cell(amount_col).and_then(amount_minor) else {
                    continue;
                };
                if raw >= 0 {
                    (raw, Direction::Debit)
                } else {
                    (-raw, Direction::Credit)
                }
            }
        };
        if amount == 0 {
            continue;
        }
        rows.push(StatementRow {
            date,
            description,
            amount_minor: amount,
            direction,
            raw: line.to_string(),
        });
    }
    Some(rows)
}

/// Byte ranges of each header column, extended to the start of the next
/// column so right-padded values still land in the right cell.
fn column_spans(header: &str) -> Vec<(usize, usize)> {
    let starts: Vec<usize> = CELL.find_iter(header).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = starts.get(i + 1).copied().unwrap_or(usize::MAX);
            (*start, end)
        })
        .collect()
}

/// Slice by byte offsets, nudging both ends onto char boundaries.
fn slice_lossy(line: &str, mut start: usize, mut end: usize) -> &str {
    start = start.min(line.len());
    end = end.min(line.len());
    while start > 0 && !line.is_char_boundary(start) {
        start -= 1;
    }
    while end < line.len() && !line.is_char_boundary(end) {
        end += 1;
    }
    line.get(start..end).unwrap_or("")
}

/// Fallback for statements that lost their table structure: a date plus a
/// trailing number is enough to call a line a transaction.
fn parse_loose_line(line: &str) -> Option<StatementRow> {
    let date_match = DATE_IN_LINE.captures(line)?;
    let amount = NUMBER
        .find_iter(line)
        .filter(|m| m.start() >= date_match.get(0).map(|d| d.end()).unwrap_or(0))
        .filter_map(|m| amount_minor(m.as_str()))
        .filter(|m| *m > 0)
        .last()?;

    let lowered = line.to_lowercase();
    let direction = if lowered.contains("credit") || lowered.contains(" cr") {
        Direction::Credit
    } else {
        Direction::Debit
    };
    Some(StatementRow {
        date: dates::parse_date(date_match.get(1)?.as_str()),
        description: line.trim().to_string(),
        amount_minor: amount,
        direction,
        raw: line.to_string(),
    })
}

/// Parse a CSV export. Column names are matched case-insensitively against
/// the usual bank spellings.
pub fn parse_statement_csv(text: &str) -> Result<Vec<StatementRow>, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<Option<&'static str>> = reader
        .headers()?
        .iter()
        .map(canonical_column)
        .collect();
    let position = |name: &str| headers.iter().position(|c| *c == Some(name));
    let date_col = position("date");
    let description_col = position("description");
    let debit_col = position("debit");
    let credit_col = position("credit");
    let amount_col = position("amount");
    let type_col = position("type");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |i: Option<usize>| i.and_then(|i| record.get(i)).filter(|c| !c.is_empty());

        let description = cell(description_col).unwrap_or("Imported transaction").to_string();
        let date = cell(date_col).and_then(dates::parse_date);

        let debit = cell(debit_col).and_then(amount_minor).filter(|m| *m > 0);
        let credit = cell(credit_col).and_then(amount_minor).filter(|m| *m > 0);
        let (amount, mut direction) = match (debit, credit) {
            (Some(amount), _) => (amount, Direction::Debit),
            (None, Some(amount)) => (amount, Direction::Credit),
            (None, None) => match cell(amount_col).and_then(amount_minor) {
                Some(raw) if raw != 0 => {
                    let direction = if raw > 0 { Direction::Debit } else { Direction::Credit };
                    (raw.abs(), direction)
                }
                _ => continue,
            },
        };

        if let Some(kind) = cell(type_col).map(str::to_lowercase) {
            direction = match kind.as_str() {
                "credit" | "cr" | "income" | "deposit" => Direction::Credit,
                _ => Direction::Debit,
            };
        } else if description.to_lowercase().contains("credit")
            || description.to_lowercase().contains("deposit")
        {
            direction = Direction::Credit;
        }

        rows.push(StatementRow {
            date,
            description,
            amount_minor: amount,
            direction,
            raw: record.iter().collect::<Vec<_>>().join(","),
        });
    }

    if rows.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
HDFC BANK LTD
Statement for August 2026

Date        Narration                  Debit      Credit     Balance
01-08-2026  SALARY ACME CORP                      75,000.00  95,000.00
03-08-2026  UPI-SWIGGY BANGALORE       450.00                94,550.00
05-08-2026  ATM WDL MG ROAD            5,000.00              89,550.00
";

    #[test]
    fn header_table_maps_debit_and_credit_columns() {
        let rows = parse_statement_text(TABLE);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].direction, Direction::Credit);
        assert_eq!(rows[0].amount_minor, 7_500_000);
        assert_eq!(rows[0].description, "SALARY ACME CORP");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 8, 1));

        assert_eq!(rows[1].direction, Direction::Debit);
        assert_eq!(rows[1].amount_minor, 45_000);
    }

    #[test]
    fn pipe_separated_tables_work_too() {
        let text = "\
Date | Description | Amount
02-08-2026 | COFFEE HOUSE | 300.00
04-08-2026 | REFUND STORE | -120.00
";
        let rows = parse_statement_text(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, Direction::Debit);
        assert_eq!(rows[0].amount_minor, 30_000);
        assert_eq!(rows[1].direction, Direction::Credit);
        assert_eq!(rows[1].amount_minor, 12_000);
    }

    #[test]
    fn loose_lines_use_the_last_number_as_amount() {
        let text = "statement fragment\n03/08/2026 POS 1234 GROCERY MART 642.50\n";
        let rows = parse_statement_text(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount_minor, 64_250);
        assert_eq!(rows[0].direction, Direction::Debit);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 8, 3));
    }

    #[test]
    fn csv_with_amount_and_type_columns() {
        let text = "\
date,description,amount,type
2026-08-01,Monthly salary,75000,credit
2026-08-03,Swiggy order,450.00,debit
";
        let rows = parse_statement_csv(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, Direction::Credit);
        assert_eq!(rows[0].amount_minor, 7_500_000);
        assert_eq!(rows[1].direction, Direction::Debit);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2026, 8, 3));
    }

    #[test]
    fn csv_without_rows_is_an_error() {
        assert!(matches!(
            parse_statement_csv("date,description,amount\n"),
            Err(ExtractError::Empty)
        ));
    }
}
