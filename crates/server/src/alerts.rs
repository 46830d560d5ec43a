//! Alert endpoints

use api_types::alert::{AlertListQuery, AlertView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(alert: engine::alerts::Model) -> AlertView {
    AlertView {
        id: alert.id,
        alert_type: alert.alert_type,
        title: alert.title,
        message: alert.message,
        is_read: alert.is_read,
        created_at: alert.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<AlertListQuery>,
) -> Result<Json<Vec<AlertView>>, ServerError> {
    let unread_only = params.unread_only.unwrap_or(false);
    let alerts = state.engine.list_alerts(user.id, unread_only).await?;

    Ok(Json(alerts.into_iter().map(view).collect()))
}

pub async fn mark_read(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<AlertView>, ServerError> {
    let alert = state.engine.mark_alert_read(user.id, alert_id).await?;

    Ok(Json(view(alert)))
}
