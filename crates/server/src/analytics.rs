//! Analytics endpoints

use api_types::analytics::{
    CategorySpend, Insights, MonthlyPoint, SpendingQuery, TrendQuery,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};

const DEFAULT_TREND_MONTHS: u32 = 6;

/// Expense totals per category, current calendar month by default.
pub async fn spending_by_category(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<SpendingQuery>,
) -> Result<Json<Vec<CategorySpend>>, ServerError> {
    let totals = state
        .engine
        .spending_by_category(user.id, params.start_date, params.end_date)
        .await?;

    Ok(Json(
        totals
            .into_iter()
            .map(|entry| CategorySpend {
                category: entry.category,
                amount_minor: entry.amount_minor,
                percentage: entry.percentage,
            })
            .collect(),
    ))
}

pub async fn monthly_trend(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<TrendQuery>,
) -> Result<Json<Vec<MonthlyPoint>>, ServerError> {
    let months = params.months.unwrap_or(DEFAULT_TREND_MONTHS);
    let points = state.engine.monthly_trend(user.id, months).await?;

    Ok(Json(
        points
            .into_iter()
            .map(|point| MonthlyPoint {
                month: point.month,
                income_minor: point.income_minor,
                expense_minor: point.expense_minor,
                savings_minor: point.savings_minor,
            })
            .collect(),
    ))
}

pub async fn insights(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Insights>, ServerError> {
    let insights = state.engine.insights(user.id).await?;

    Ok(Json(Insights {
        current_month_spending_minor: insights.current_month_spending_minor,
        spending_trend: insights.spending_trend,
        trend_percentage: insights.trend_percentage,
        top_spending_category: insights.top_spending_category,
        recommendations: insights.recommendations,
    }))
}
