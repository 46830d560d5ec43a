//! Budget endpoints

use api_types::budget::{
    BudgetListQuery, BudgetPeriod as ApiPeriod, BudgetStatusView, BudgetUpsert, BudgetView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use engine::budgets::BudgetPeriod;

use crate::{ServerError, server::ServerState};

const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;

fn period_to_engine(period: ApiPeriod) -> BudgetPeriod {
    match period {
        ApiPeriod::Monthly => BudgetPeriod::Monthly,
        ApiPeriod::Weekly => BudgetPeriod::Weekly,
        ApiPeriod::Yearly => BudgetPeriod::Yearly,
    }
}

fn period_to_api(period: BudgetPeriod) -> ApiPeriod {
    match period {
        BudgetPeriod::Monthly => ApiPeriod::Monthly,
        BudgetPeriod::Weekly => ApiPeriod::Weekly,
        BudgetPeriod::Yearly => ApiPeriod::Yearly,
    }
}

fn view(budget: engine::budgets::Model) -> Result<BudgetView, ServerError> {
    let period = BudgetPeriod::try_from(budget.period.as_str())?;

    Ok(BudgetView {
        id: budget.id,
        category_id: budget.category_id,
        amount_minor: budget.amount_minor,
        period: period_to_api(period),
        alert_threshold: budget.alert_threshold,
        is_active: budget.is_active,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    })
}

/// Create a budget for a category, or replace the existing one.
pub async fn upsert(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetUpsert>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let period = period_to_engine(payload.period.unwrap_or_default());
    let threshold = payload.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);

    let budget = state
        .engine
        .upsert_budget(
            user.id,
            payload.category_id,
            payload.amount_minor,
            period,
            threshold,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(budget)?)))
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<BudgetListQuery>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let active_only = params.active_only.unwrap_or(true);
    let budgets = state.engine.list_budgets(user.id, active_only).await?;

    budgets
        .into_iter()
        .map(|(budget, _)| view(budget))
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

/// Spending of every active budget against its current period.
pub async fn status(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetStatusView>>, ServerError> {
    let statuses = state.engine.budgets_status(user.id).await?;

    Ok(Json(
        statuses
            .into_iter()
            .map(|status| BudgetStatusView {
                budget_id: status.budget_id,
                category_name: status.category_name,
                budget_minor: status.budget_minor,
                spent_minor: status.spent_minor,
                remaining_minor: status.remaining_minor,
                percentage_used: status.percentage_used,
                days_left: status.days_left,
                status: status.status.to_string(),
            })
            .collect(),
    ))
}
