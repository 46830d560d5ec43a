use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use extract::Categorizer;
use migration::MigratorTrait;
use server::{ServerState, router};

const USERNAME: &str = "alice";
const PASSWORD: &str = "correct horse";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();

    router(ServerState {
        engine: Arc::new(engine),
        categorizer: Arc::new(Categorizer::new()),
    })
}

async fn app_with_user() -> Router {
    let app = app().await;
    let res = send(
        &app,
        request("POST", "/auth/register", false)
            .body(Body::from(
                json!({
                    "email": "alice@example.com",
                    "username": USERNAME,
                    "password": PASSWORD,
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(res.0, StatusCode::CREATED);
    app
}

fn request(method: &str, uri: &str, authed: bool) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if authed {
        let token = STANDARD.encode(format!("{USERNAME}:{PASSWORD}"));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
    }
    builder
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, request("GET", uri, true).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        request("POST", uri, true)
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn category_id(app: &Router, name: &str) -> String {
    let (status, body) = get(app, "/categories").await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_str())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(
        &app,
        request("GET", "/health", false).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = app_with_user().await;
    let (status, _) = send(
        &app,
        request("GET", "/transactions", false)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_checks_the_password() {
    let app = app_with_user().await;
    let (status, body) = post(
        &app,
        "/auth/login",
        json!({ "username": USERNAME, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], USERNAME);

    let (status, _) = post(
        &app,
        "/auth/login",
        json!({ "username": USERNAME, "password": "wrong password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app_with_user().await;
    let (status, _) = send(
        &app,
        request("POST", "/auth/register", false)
            .body(Body::from(
                json!({
                    "email": "alice@example.com",
                    "username": "somebody",
                    "password": "long enough",
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_and_list_transactions() {
    let app = app_with_user().await;
    let food = category_id(&app, "Food & Dining").await;

    let (status, body) = post(
        &app,
        "/transactions",
        json!({
            "amount_minor": 45_000,
            "description": "Dinner at Khan Chacha",
            "category_id": food,
            "occurred_at": "2026-08-20T19:30:00Z",
            "kind": "expense",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert!(body["budget_alert"].is_null());

    let (status, body) = get(&app, "/transactions?limit=10").await;
    assert_eq!(status, StatusCode::OK);
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount_inr_minor"], 45_000);
    assert_eq!(transactions[0]["category"], "Food & Dining");
    assert_eq!(transactions[0]["currency"], "INR");
}

#[tokio::test]
async fn non_positive_amounts_are_unprocessable() {
    let app = app_with_user().await;
    let (status, _) = post(
        &app,
        "/transactions",
        json!({
            "amount_minor": -5,
            "description": "bad row",
            "occurred_at": "2026-08-20T19:30:00Z",
            "kind": "expense",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sms_import_records_a_classified_transaction() {
    let app = app_with_user().await;
    let (status, body) = post(
        &app,
        "/import/sms",
        json!({
            "sms_text": "Rs. 2,500.00 debited from a/c XX1234 on 15-08-2026 at AMAZON INDIA. Avl bal Rs. 10,000",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["parsed"]["amount_minor"], 250_000);
    assert_eq!(body["parsed"]["currency"], "INR");
    assert_eq!(body["parsed"]["kind"], "expense");
    assert_eq!(body["category"], "Shopping");
    assert!(body["confidence"].as_f64().unwrap() > 0.0);

    let (_, body) = get(&app, "/transactions").await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(body["transactions"][0]["source"], "bank_sms");
}

#[tokio::test]
async fn sms_without_an_amount_is_a_bad_request() {
    let app = app_with_user().await;
    let (status, _) = post(
        &app,
        "/import/sms",
        json!({ "sms_text": "Your OTP for net banking is 482910. Do not share it." }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_import_counts_rows() {
    let app = app_with_user().await;
    let csv = "date,description,amount,type\n\
               2026-08-01,Swiggy order,450.00,debit\n\
               2026-08-02,Salary August,85000.00,credit\n\
               2026-08-03,Uber ride,230.50,debit\n";
    let (status, body) = post(&app, "/import/csv", json!({ "text": csv })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 3);

    let (_, body) = get(&app, "/transactions").await;
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 3);
    assert!(transactions.iter().all(|t| t["source"] == "csv"));
}

#[tokio::test]
async fn receipt_import_uses_the_largest_amount() {
    let app = app_with_user().await;
    let receipt = "BIG BAZAAR\n\
                   Date: 15-08-2026\n\
                   Rice 5kg 450.00\n\
                   Dal 1kg 180.00\n\
                   TOTAL 630.00\n";
    let (status, body) = post(&app, "/import/receipt", json!({ "text": receipt })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["parsed"]["amount_minor"], 63_000);
    assert_eq!(body["parsed"]["merchant"], "Big Bazaar");
    assert_eq!(body["parsed"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn exceeding_a_budget_raises_an_alert() {
    let app = app_with_user().await;
    let food = category_id(&app, "Food & Dining").await;

    let (status, _) = post(
        &app,
        "/budgets",
        json!({ "category_id": food, "amount_minor": 100_000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app,
        "/transactions",
        json!({
            "amount_minor": 120_000,
            "description": "Anniversary dinner",
            "category_id": food,
            "occurred_at": chrono::Utc::now().to_rfc3339(),
            "kind": "expense",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["budget_alert"], "Food & Dining Budget Exceeded!");

    let (status, body) = get(&app, "/alerts?unread_only=true").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "budget_exceed");

    let alert_id = alerts[0]["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        request("PUT", &format!("/alerts/{alert_id}/read"), true)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (status, body) = get(&app, "/budgets/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "Exceeded");
}

#[tokio::test]
async fn analytics_reports_current_month_spending() {
    let app = app_with_user().await;
    let food = category_id(&app, "Food & Dining").await;
    let (status, _) = post(
        &app,
        "/transactions",
        json!({
            "amount_minor": 50_000,
            "description": "Groceries run",
            "category_id": food,
            "occurred_at": chrono::Utc::now().to_rfc3339(),
            "kind": "expense",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/analytics/spending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["category"], "Food & Dining");
    assert_eq!(body[0]["amount_minor"], 50_000);
    assert_eq!(body[0]["percentage"], 100.0);

    let (status, body) = get(&app, "/analytics/insights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_month_spending_minor"], 50_000);
}

#[tokio::test]
async fn predictions_explain_missing_history() {
    let app = app_with_user().await;
    let (status, body) = get(&app, "/predictions/monthly").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction_minor"].is_null());
    assert!(body["message"].as_str().unwrap().contains("month"));
}

#[tokio::test]
async fn currency_endpoints_use_the_static_tables() {
    let app = app_with_user().await;
    let (status, body) = get(&app, "/currency/rates?base=USD").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_currency"], "USD");
    assert_eq!(body["rates"]["INR"], 83.12);

    let (status, body) = get(&app, "/currency/supported").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (status, body) = post(
        &app,
        "/currency/convert",
        json!({
            "amount_minor": 10_000,
            "from_currency": "USD",
            "to_currency": "INR",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["converted_minor"], 831_200);
    assert_eq!(body["exchange_rate"], 83.12);
}

#[tokio::test]
async fn query_endpoint_answers_in_prose() {
    let app = app_with_user().await;
    let (status, body) = post(
        &app,
        "/query",
        json!({ "query": "how much did I spend this month" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().contains("spent"));
}

#[tokio::test]
async fn export_supports_csv_and_json() {
    let app = app_with_user().await;
    let (status, _) = post(
        &app,
        "/transactions",
        json!({
            "amount_minor": 30_000,
            "description": "Movie night",
            "occurred_at": "2026-08-10T20:00:00Z",
            "kind": "expense",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(
            request("GET", "/transactions/export", true)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/csv");
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("date,description,category"));
    assert!(text.contains("Movie night"));

    let (status, body) = get(&app, "/transactions/export?format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn classifier_labels_match_the_seeded_categories() {
    let app = app_with_user().await;
    let (_, body) = get(&app, "/categories").await;
    let mut seeded: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    seeded.sort();

    let mut labels: Vec<String> = Categorizer::new()
        .labels()
        .iter()
        .map(|l| l.to_string())
        .collect();
    labels.sort();

    assert_eq!(seeded, labels);
}
