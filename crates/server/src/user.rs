//! Account registration and login endpoints

use api_types::user::{LoginUser, RegisterUser, UserView};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub(crate) fn view(user: engine::users::Model) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        username: user.username,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

/// Create an account. The engine seeds the default categories alongside.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register(&payload.email, &payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

/// Check credentials without touching any other resource. The API itself is
/// stateless; clients keep sending Basic auth on every request.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    Ok(Json(view(user)))
}
