//! Transactions API endpoints

use api_types::transaction::{
    ExportQuery, TransactionCreated, TransactionKind as ApiKind, TransactionListQuery,
    TransactionListResponse, TransactionNew, TransactionSource as ApiSource, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use engine::transactions::{TransactionKind, TransactionSource};

use crate::{ServerError, currency, server::ServerState};

pub(crate) fn kind_to_engine(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
    }
}

fn kind_to_api(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Income => ApiKind::Income,
        TransactionKind::Expense => ApiKind::Expense,
    }
}

fn source_to_engine(source: ApiSource) -> TransactionSource {
    match source {
        ApiSource::Manual => TransactionSource::Manual,
        ApiSource::BankSms => TransactionSource::BankSms,
        ApiSource::Statement => TransactionSource::Statement,
        ApiSource::Csv => TransactionSource::Csv,
        ApiSource::Receipt => TransactionSource::Receipt,
    }
}

fn source_to_api(source: TransactionSource) -> ApiSource {
    match source {
        TransactionSource::Manual => ApiSource::Manual,
        TransactionSource::BankSms => ApiSource::BankSms,
        TransactionSource::Statement => ApiSource::Statement,
        TransactionSource::Csv => ApiSource::Csv,
        TransactionSource::Receipt => ApiSource::Receipt,
    }
}

fn view(record: engine::ops::TransactionRecord) -> Result<TransactionView, ServerError> {
    let model = record.model;
    let kind = TransactionKind::try_from(model.kind.as_str())?;
    let source = TransactionSource::try_from(model.source.as_str())?;
    let stored_currency = engine::Currency::try_from(model.currency.as_str())?;

    Ok(TransactionView {
        id: model.id,
        amount_minor: model.amount_minor,
        currency: currency::to_api(stored_currency),
        amount_inr_minor: model.amount_inr_minor,
        exchange_rate: model.exchange_rate,
        description: Some(model.description),
        category_id: model.category_id,
        category: record.category_name,
        occurred_at: model.occurred_at,
        kind: kind_to_api(kind),
        source: source_to_api(source),
        created_at: model.created_at,
    })
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let new = engine::ops::NewTransaction {
        amount_minor: payload.amount_minor,
        currency: currency::to_engine(payload.currency.unwrap_or_default()),
        kind: kind_to_engine(payload.kind),
        description: payload.description.unwrap_or_default(),
        category_id: payload.category_id,
        category_name: None,
        occurred_at: Some(payload.occurred_at),
        source: source_to_engine(payload.source.unwrap_or_default()),
        raw_text: payload.raw_text,
    };

    let (model, alert) = state.engine.create_transaction(user.id, new).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: model.id,
            budget_alert: alert.map(|alert| alert.title),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(50);

    let records = state
        .engine
        .list_transactions(user.id, skip, Some(limit))
        .await?;
    let transactions = records
        .into_iter()
        .map(view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(TransactionListResponse { transactions }))
}

/// Full history as a download, `csv` by default or `json` on request.
pub async fn export(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ServerError> {
    let records = state.engine.list_transactions(user.id, 0, None).await?;
    let views = records
        .into_iter()
        .map(view)
        .collect::<Result<Vec<_>, _>>()?;

    match params.format.as_deref().unwrap_or("csv") {
        "json" => Ok(Json(views).into_response()),
        "csv" => {
            let body = to_csv(&views)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"transactions.csv\"",
                    ),
                ],
                body,
            )
                .into_response())
        }
        other => Err(ServerError::Generic(format!(
            "unsupported export format `{other}`"
        ))),
    }
}

fn to_csv(views: &[TransactionView]) -> Result<String, ServerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "date",
            "description",
            "category",
            "kind",
            "amount",
            "currency",
            "amount_inr",
        ])
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    for tx in views {
        let stored = currency::to_engine(tx.currency);
        writer
            .write_record([
                tx.occurred_at.format("%Y-%m-%d").to_string(),
                tx.description.clone().unwrap_or_default(),
                tx.category.clone().unwrap_or_default(),
                format!("{:?}", tx.kind).to_lowercase(),
                format!("{:.2}", engine::money::minor_to_major(tx.amount_minor, stored)),
                stored.code().to_string(),
                format!(
                    "{:.2}",
                    engine::money::minor_to_major(tx.amount_inr_minor, engine::Currency::Inr)
                ),
            ])
            .map_err(|err| ServerError::Generic(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ServerError::Generic(err.to_string()))
}
