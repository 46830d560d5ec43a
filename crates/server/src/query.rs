//! Free-text query endpoint

use api_types::query::{QueryAnswer, QueryRequest};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn ask(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryAnswer>, ServerError> {
    let answer = state.engine.answer_query(user.id, &payload.query).await?;

    Ok(Json(QueryAnswer {
        query: answer.query,
        answer: answer.answer,
        data: answer.data,
    }))
}
