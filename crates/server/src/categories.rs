//! Category endpoints

use api_types::category::{CategoryCreate, CategoryView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

fn view(category: engine::categories::Model) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        is_default: category.is_default,
        icon: category.icon,
        color: category.color,
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories(user.id).await?;

    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            user.id,
            &payload.name,
            payload.icon.as_deref(),
            payload.color.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(category))))
}
