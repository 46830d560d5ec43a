//! Import endpoints: bank SMS, statement text, CSV exports, receipt OCR.
//!
//! Each handler runs the matching extractor, classifies the resulting
//! descriptions and records the rows through the engine. Single-row
//! imports (SMS, receipt) go through `create_transaction` so budget
//! alerts still fire; bulk statement imports skip them.

use api_types::imports::{
    ImportSummary, ParsedReceipt as ParsedReceiptView, ParsedSms as ParsedSmsView, ReceiptImport,
    ReceiptImportResponse, ReceiptItem as ReceiptItemView, SmsImport, SmsImportResponse,
    StatementImport,
};
use api_types::transaction::TransactionKind as ApiKind;
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use engine::ops::NewTransaction;
use engine::transactions::{TransactionKind, TransactionSource};
use extract::{Direction, StatementRow};

use crate::{ServerError, currency, server::ServerState};

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn kind_for(direction: Option<Direction>) -> TransactionKind {
    match direction {
        Some(Direction::Credit) => TransactionKind::Income,
        _ => TransactionKind::Expense,
    }
}

pub async fn sms(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SmsImport>,
) -> Result<(StatusCode, Json<SmsImportResponse>), ServerError> {
    let parsed = extract::parse_sms(&payload.sms_text);
    let amount_minor = parsed
        .amount_minor
        .ok_or_else(|| ServerError::Generic("no amount found in SMS".to_string()))?;
    let sms_currency = engine::Currency::try_from(parsed.currency)?;

    let kind = kind_for(parsed.direction);
    let description = parsed
        .merchant
        .clone()
        .unwrap_or_else(|| "Unknown Transaction".to_string());
    let (category, confidence) = state.categorizer.predict(&description);

    let new = NewTransaction {
        amount_minor,
        currency: sms_currency,
        kind,
        description,
        category_id: None,
        category_name: Some(category.to_string()),
        occurred_at: parsed.date.map(midnight),
        source: TransactionSource::BankSms,
        raw_text: Some(payload.sms_text.clone()),
    };
    let (model, alert) = state.engine.create_transaction(user.id, new).await?;

    let view = ParsedSmsView {
        amount_minor: parsed.amount_minor,
        currency: currency::to_api(sms_currency),
        kind: parsed.direction.map(|d| match kind_for(Some(d)) {
            TransactionKind::Income => ApiKind::Income,
            TransactionKind::Expense => ApiKind::Expense,
        }),
        merchant: parsed.merchant,
        card_last_digits: parsed.card_last_digits,
        date: parsed.date,
    };

    Ok((
        StatusCode::CREATED,
        Json(SmsImportResponse {
            transaction_id: model.id,
            parsed: view,
            category: category.to_string(),
            confidence,
            budget_alert: alert.map(|alert| alert.title),
        }),
    ))
}

fn statement_rows_to_new(
    state: &ServerState,
    rows: Vec<StatementRow>,
    source: TransactionSource,
) -> Vec<NewTransaction> {
    rows.into_iter()
        .map(|row| {
            let (category, _) = state.categorizer.predict(&row.description);
            NewTransaction {
                amount_minor: row.amount_minor,
                currency: engine::Currency::Inr,
                kind: kind_for(Some(row.direction)),
                description: row.description,
                category_id: None,
                category_name: Some(category.to_string()),
                occurred_at: row.date.map(midnight),
                source,
                raw_text: Some(row.raw),
            }
        })
        .collect()
}

/// Import the text layer of a bank statement.
pub async fn statement(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<StatementImport>,
) -> Result<(StatusCode, Json<ImportSummary>), ServerError> {
    let rows = extract::parse_statement_text(&payload.text);
    if rows.is_empty() {
        return Err(ServerError::Generic(
            "no transactions found in statement".to_string(),
        ));
    }

    let new = statement_rows_to_new(&state, rows, TransactionSource::Statement);
    let count = state.engine.import_transactions(user.id, new).await? as usize;

    Ok((
        StatusCode::CREATED,
        Json(ImportSummary {
            message: format!("Imported {count} transactions from statement"),
            count,
        }),
    ))
}

pub async fn csv(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<StatementImport>,
) -> Result<(StatusCode, Json<ImportSummary>), ServerError> {
    let rows = extract::parse_statement_csv(&payload.text)
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    let new = statement_rows_to_new(&state, rows, TransactionSource::Csv);
    let count = state.engine.import_transactions(user.id, new).await? as usize;

    Ok((
        StatusCode::CREATED,
        Json(ImportSummary {
            message: format!("Imported {count} transactions from CSV"),
            count,
        }),
    ))
}

/// Record an expense from receipt OCR text.
pub async fn receipt(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptImport>,
) -> Result<(StatusCode, Json<ReceiptImportResponse>), ServerError> {
    let parsed = extract::parse_receipt(&payload.text);
    let amount_minor = parsed
        .amount_minor
        .ok_or_else(|| ServerError::Generic("no total found on receipt".to_string()))?;

    let (category, confidence) = state.categorizer.predict(&parsed.merchant);

    let new = NewTransaction {
        amount_minor,
        currency: engine::Currency::Inr,
        kind: TransactionKind::Expense,
        description: parsed.merchant.clone(),
        category_id: None,
        category_name: Some(category.to_string()),
        occurred_at: parsed.date.map(midnight),
        source: TransactionSource::Receipt,
        raw_text: Some(payload.text.clone()),
    };
    let (model, alert) = state.engine.create_transaction(user.id, new).await?;

    let view = ParsedReceiptView {
        amount_minor: parsed.amount_minor,
        merchant: parsed.merchant,
        date: parsed.date,
        items: parsed
            .items
            .into_iter()
            .map(|item| ReceiptItemView {
                name: item.name,
                price_minor: item.price_minor,
            })
            .collect(),
    };

    Ok((
        StatusCode::CREATED,
        Json(ReceiptImportResponse {
            transaction_id: model.id,
            parsed: view,
            category: category.to_string(),
            confidence,
            budget_alert: alert.map(|alert| alert.title),
        }),
    ))
}
