use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use serde_json::json;

use std::sync::Arc;

use crate::{
    alerts, analytics, budgets, categories, currency, imports, predictions, query, transactions,
    user,
};
use engine::Engine;
use extract::Categorizer;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub categorizer: Arc<Categorizer>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // A missing or malformed header is as unauthenticated as a bad password.
    let auth_header = auth_header.ok_or(StatusCode::UNAUTHORIZED)?;
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .verify_credentials(auth_header.username(), auth_header.password())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Build the full application router. Everything except registration,
/// login and the health probe sits behind Basic auth.
pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(user::register))
        .route("/auth/login", post(user::login));

    Router::new()
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/transactions/export", get(transactions::export))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/import/sms", post(imports::sms))
        .route("/import/statement", post(imports::statement))
        .route("/import/csv", post(imports::csv))
        .route("/import/receipt", post(imports::receipt))
        .route("/budgets", post(budgets::upsert).get(budgets::list))
        .route("/budgets/status", get(budgets::status))
        .route("/alerts", get(alerts::list))
        .route("/alerts/{id}/read", put(alerts::mark_read))
        .route("/analytics/spending", get(analytics::spending_by_category))
        .route("/analytics/trend", get(analytics::monthly_trend))
        .route("/analytics/insights", get(analytics::insights))
        .route("/predictions/monthly", get(predictions::monthly))
        .route("/predictions/categories", get(predictions::categories))
        .route("/predictions/insights", get(predictions::insights))
        .route("/currency/rates", get(currency::rates))
        .route("/currency/supported", get(currency::supported))
        .route("/currency/convert", post(currency::convert))
        .route("/query", post(query::ask))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .merge(public)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        categorizer: Arc::new(Categorizer::new()),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
