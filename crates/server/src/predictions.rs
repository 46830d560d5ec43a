//! Spending prediction endpoints

use api_types::prediction::{
    CategoryPrediction, CategoryPredictionQuery, MonthlyPrediction, PredictionInsights,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};

const DEFAULT_FORECAST_DAYS: u32 = 30;

fn monthly_view(prediction: engine::ops::MonthlyPrediction) -> MonthlyPrediction {
    MonthlyPrediction {
        prediction_minor: prediction.prediction_minor,
        confidence: prediction.confidence,
        trend: prediction.trend,
        avg_monthly_change_minor: prediction.avg_monthly_change_minor,
        historical_average_minor: prediction.historical_average_minor,
        last_month_minor: prediction.last_month_minor,
        message: prediction.message,
    }
}

fn category_view(prediction: engine::ops::CategoryPrediction) -> CategoryPrediction {
    CategoryPrediction {
        category: prediction.category,
        predicted_minor: prediction.predicted_minor,
        predicted_transactions: prediction.predicted_transactions,
    }
}

pub async fn monthly(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MonthlyPrediction>, ServerError> {
    let prediction = state.engine.predict_monthly_spending(user.id).await?;

    Ok(Json(monthly_view(prediction)))
}

pub async fn categories(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CategoryPredictionQuery>,
) -> Result<Json<Vec<CategoryPrediction>>, ServerError> {
    let days = params.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    let predictions = state.engine.predict_category_spending(user.id, days).await?;

    Ok(Json(predictions.into_iter().map(category_view).collect()))
}

pub async fn insights(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<PredictionInsights>, ServerError> {
    let bundle = state.engine.prediction_insights(user.id).await?;

    Ok(Json(PredictionInsights {
        insights: bundle.insights,
        monthly_prediction: monthly_view(bundle.monthly_prediction),
        category_predictions: bundle
            .category_predictions
            .into_iter()
            .map(category_view)
            .collect(),
    }))
}
