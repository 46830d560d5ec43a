use chrono::{Datelike, Duration, Months, TimeZone, Utc};
use sea_orm::Database;

use engine::ops::NewTransaction;
use engine::transactions::{TransactionKind, TransactionSource};
use engine::{Currency, Engine, EngineError};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_user() -> (Engine, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .register("alice@example.com", "alice", "correct horse")
        .await
        .unwrap();
    (engine, user.id)
}

fn expense(amount_minor: i64, description: &str, category: Option<&str>) -> NewTransaction {
    NewTransaction {
        amount_minor,
        currency: Currency::Inr,
        kind: TransactionKind::Expense,
        description: description.to_string(),
        category_id: None,
        category_name: category.map(str::to_string),
        occurred_at: None,
        source: TransactionSource::Manual,
        raw_text: None,
    }
}

fn income(amount_minor: i64, description: &str) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Income,
        category_name: Some("Income".to_string()),
        ..expense(amount_minor, description, None)
    }
}

async fn category_id(engine: &Engine, user_id: Uuid, name: &str) -> Uuid {
    engine
        .list_categories(user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .unwrap()
}

#[tokio::test]
async fn register_seeds_default_categories() {
    let (engine, user_id) = engine_with_user().await;
    let categories = engine.list_categories(user_id).await.unwrap();
    assert_eq!(categories.len(), 12);
    assert!(categories.iter().all(|c| c.is_default));
    assert!(categories.iter().any(|c| c.name == "Food & Dining"));
    assert!(categories.iter().any(|c| c.name == "Others"));
}

#[tokio::test]
async fn register_rejects_taken_email_and_username() {
    let (engine, _) = engine_with_user().await;
    let err = engine
        .register("alice@example.com", "alice2", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("email".to_string()));
    let err = engine
        .register("alice2@example.com", "alice", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("username".to_string()));
}

#[tokio::test]
async fn credentials_are_checked_against_the_stored_hash() {
    let (engine, user_id) = engine_with_user().await;
    let user = engine
        .verify_credentials("alice", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.id, user_id);
    assert!(user.password_hash.starts_with("pbkdf2-sha256$"));
    assert!(matches!(
        engine.verify_credentials("alice", "wrong").await,
        Err(EngineError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.verify_credentials("nobody", "correct horse").await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn foreign_currency_amounts_are_normalized_to_inr() {
    let (engine, user_id) = engine_with_user().await;
    let mut new = expense(100_00, "dinner abroad", Some("Food & Dining"));
    new.currency = Currency::Usd;
    let (tx, _) = engine.create_transaction(user_id, new).await.unwrap();
    assert_eq!(tx.currency, "USD");
    assert_eq!(tx.exchange_rate, 83.12);
    // 100 USD at 83.12 INR/USD.
    assert_eq!(tx.amount_inr_minor, 831_200);
}

#[tokio::test]
async fn unknown_category_names_fall_back_to_others() {
    let (engine, user_id) = engine_with_user().await;
    let (tx, _) = engine
        .create_transaction(user_id, expense(5_00, "mystery", Some("No Such Category")))
        .await
        .unwrap();
    let others = category_id(&engine, user_id, "Others").await;
    assert_eq!(tx.category_id, Some(others));
}

#[tokio::test]
async fn rejects_non_positive_amounts() {
    let (engine, user_id) = engine_with_user().await;
    let err = engine
        .create_transaction(user_id, expense(0, "nothing", None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn listing_is_newest_first_and_paginated() {
    let (engine, user_id) = engine_with_user().await;
    for (i, day) in [3i64, 1, 2].iter().enumerate() {
        let mut new = expense(100 * (i as i64 + 1), &format!("tx {i}"), None);
        new.occurred_at = Some(Utc::now() - Duration::days(*day));
        engine.create_transaction(user_id, new).await.unwrap();
    }
    let all = engine.list_transactions(user_id, 0, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].model.description, "tx 1");
    assert_eq!(all[2].model.description, "tx 0");

    let page = engine.list_transactions(user_id, 1, Some(1)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].model.description, "tx 2");

    let rest = engine.list_transactions(user_id, 1, None).await.unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].model.description, "tx 2");
    assert_eq!(engine.count_transactions(user_id).await.unwrap(), 3);
}

#[tokio::test]
async fn budget_alert_fires_once_per_period() {
    let (engine, user_id) = engine_with_user().await;
    let food = category_id(&engine, user_id, "Food & Dining").await;
    engine
        .upsert_budget(
            user_id,
            food,
            1_000_00,
            engine::budgets::BudgetPeriod::Monthly,
            0.8,
        )
        .await
        .unwrap();

    // 50% spent: no alert yet.
    let (_, alert) = engine
        .create_transaction(user_id, expense(500_00, "groceries run", Some("Food & Dining")))
        .await
        .unwrap();
    assert!(alert.is_none());

    // 90% spent: warning fires.
    let (_, alert) = engine
        .create_transaction(user_id, expense(400_00, "restaurant", Some("Food & Dining")))
        .await
        .unwrap();
    let alert = alert.unwrap();
    assert_eq!(alert.alert_type, "budget_exceed");
    assert!(alert.title.contains("Food & Dining"));
    assert!(alert.title.contains("Warning"));

    // Further spending in the same period stays silent.
    let (_, alert) = engine
        .create_transaction(user_id, expense(300_00, "more food", Some("Food & Dining")))
        .await
        .unwrap();
    assert!(alert.is_none());

    let alerts = engine.list_alerts(user_id, false).await.unwrap();
    assert_eq!(alerts.len(), 1);
}

#[tokio::test]
async fn budget_status_reports_spend_and_state() {
    let (engine, user_id) = engine_with_user().await;
    let shopping = category_id(&engine, user_id, "Shopping").await;
    engine
        .upsert_budget(
            user_id,
            shopping,
            2_000_00,
            engine::budgets::BudgetPeriod::Monthly,
            0.8,
        )
        .await
        .unwrap();
    engine
        .create_transaction(user_id, expense(500_00, "new shoes", Some("Shopping")))
        .await
        .unwrap();

    let statuses = engine.budgets_status(user_id).await.unwrap();
    assert_eq!(statuses.len(), 1);
    let status = &statuses[0];
    assert_eq!(status.category_name, "Shopping");
    assert_eq!(status.spent_minor, 500_00);
    assert_eq!(status.remaining_minor, 1_500_00);
    assert_eq!(status.status, "On Track");
    assert!((status.percentage_used - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn upsert_budget_updates_in_place() {
    let (engine, user_id) = engine_with_user().await;
    let travel = category_id(&engine, user_id, "Travel").await;
    let first = engine
        .upsert_budget(user_id, travel, 1_000_00, engine::budgets::BudgetPeriod::Monthly, 0.8)
        .await
        .unwrap();
    let second = engine
        .upsert_budget(user_id, travel, 3_000_00, engine::budgets::BudgetPeriod::Yearly, 0.5)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.amount_minor, 3_000_00);
    assert_eq!(second.period, "yearly");

    let budgets = engine.list_budgets(user_id, true).await.unwrap();
    assert_eq!(budgets.len(), 1);
}

#[tokio::test]
async fn marking_alerts_read_is_scoped_to_the_user() {
    let (engine, user_id) = engine_with_user().await;
    let food = category_id(&engine, user_id, "Food & Dining").await;
    engine
        .upsert_budget(user_id, food, 100_00, engine::budgets::BudgetPeriod::Monthly, 0.5)
        .await
        .unwrap();
    engine
        .create_transaction(user_id, expense(90_00, "big lunch", Some("Food & Dining")))
        .await
        .unwrap();

    let alert = engine.list_alerts(user_id, true).await.unwrap().remove(0);
    let err = engine
        .mark_alert_read(Uuid::new_v4(), alert.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let updated = engine.mark_alert_read(user_id, alert.id).await.unwrap();
    assert!(updated.is_read);
    assert!(engine.list_alerts(user_id, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn spending_breakdown_computes_percentages() {
    let (engine, user_id) = engine_with_user().await;
    engine
        .create_transaction(user_id, expense(300_00, "dinner", Some("Food & Dining")))
        .await
        .unwrap();
    engine
        .create_transaction(user_id, expense(100_00, "bus pass", Some("Transportation")))
        .await
        .unwrap();

    let breakdown = engine.spending_by_category(user_id, None, None).await.unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].category, "Food & Dining");
    assert!((breakdown[0].percentage - 75.0).abs() < 1e-9);
    assert!((breakdown[1].percentage - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn monthly_trend_zero_fills_empty_months() {
    let (engine, user_id) = engine_with_user().await;
    engine
        .create_transaction(user_id, income(5_000_00, "salary"))
        .await
        .unwrap();
    engine
        .create_transaction(user_id, expense(1_200_00, "rent", Some("Bills & Utilities")))
        .await
        .unwrap();

    let trend = engine.monthly_trend(user_id, 3).await.unwrap();
    assert_eq!(trend.len(), 3);
    assert_eq!(trend[0].income_minor, 0);
    let current = trend.last().unwrap();
    assert_eq!(current.income_minor, 5_000_00);
    assert_eq!(current.expense_minor, 1_200_00);
    assert_eq!(current.savings_minor, 3_800_00);
}

#[tokio::test]
async fn monthly_prediction_needs_three_months() {
    let (engine, user_id) = engine_with_user().await;
    engine
        .create_transaction(user_id, expense(100_00, "one-off", None))
        .await
        .unwrap();
    let prediction = engine.predict_monthly_spending(user_id).await.unwrap();
    assert!(prediction.prediction_minor.is_none());
    assert_eq!(prediction.confidence, 0.0);
    assert!(prediction.message.is_some());
}

#[tokio::test]
async fn monthly_prediction_extrapolates_the_trend() {
    let (engine, user_id) = engine_with_user().await;
    // Steadily rising spend over the previous three calendar months.
    let mid_month = Utc::now().date_naive().with_day(15).unwrap();
    for (months_back, amount) in [(3u32, 1_000_00i64), (2, 1_100_00), (1, 1_200_00)] {
        let day = mid_month - Months::new(months_back);
        let mut new = expense(amount, "monthly spend", None);
        new.occurred_at = Some(Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap()));
        engine.create_transaction(user_id, new).await.unwrap();
    }
    let prediction = engine.predict_monthly_spending(user_id).await.unwrap();
    let predicted = prediction.prediction_minor.unwrap();
    assert!(predicted > 1_200_00, "expected rising forecast, got {predicted}");
    assert_eq!(prediction.trend.as_deref(), Some("increasing"));
    assert!(prediction.confidence > 0.9);
}

#[tokio::test]
async fn category_forecast_scales_ninety_day_history() {
    let (engine, user_id) = engine_with_user().await;
    let mut new = expense(900_00, "groceries", Some("Groceries"));
    new.occurred_at = Some(Utc::now() - Duration::days(10));
    engine.create_transaction(user_id, new).await.unwrap();

    let predictions = engine.predict_category_spending(user_id, 30).await.unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].category, "Groceries");
    // 900 over 90 days projects to 300 over 30 days.
    assert_eq!(predictions[0].predicted_minor, 300_00);
}

#[tokio::test]
async fn import_skips_budget_alerts() {
    let (engine, user_id) = engine_with_user().await;
    let food = category_id(&engine, user_id, "Food & Dining").await;
    engine
        .upsert_budget(user_id, food, 100_00, engine::budgets::BudgetPeriod::Monthly, 0.5)
        .await
        .unwrap();

    let mut row = expense(500_00, "imported dinner", Some("Food & Dining"));
    row.source = TransactionSource::Statement;
    let count = engine.import_transactions(user_id, vec![row]).await.unwrap();
    assert_eq!(count, 1);
    assert!(engine.list_alerts(user_id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_answers_spending_questions() {
    let (engine, user_id) = engine_with_user().await;
    engine
        .create_transaction(user_id, expense(250_00, "lunches", Some("Food & Dining")))
        .await
        .unwrap();
    engine
        .create_transaction(user_id, income(1_000_00, "salary"))
        .await
        .unwrap();

    let total = engine
        .answer_query(user_id, "How much did I spend this month?")
        .await
        .unwrap();
    assert!(total.answer.contains("₹250.00"), "got: {}", total.answer);

    let food = engine
        .answer_query(user_id, "How much did I spend on food this month?")
        .await
        .unwrap();
    assert!(food.answer.contains("Food & Dining"), "got: {}", food.answer);

    let saved = engine
        .answer_query(user_id, "How much did I save this month?")
        .await
        .unwrap();
    assert!(saved.answer.contains("₹750.00"), "got: {}", saved.answer);

    let versus = engine
        .answer_query(user_id, "What's my income vs expenses?")
        .await
        .unwrap();
    assert!(versus.answer.contains("₹1,000.00"), "got: {}", versus.answer);
    assert!(versus.answer.contains("₹250.00"), "got: {}", versus.answer);

    let balance = engine
        .answer_query(user_id, "What's my balance this month?")
        .await
        .unwrap();
    assert!(balance.answer.contains("this month"), "got: {}", balance.answer);
    assert!(balance.answer.contains("₹750.00"), "got: {}", balance.answer);

    let help = engine.answer_query(user_id, "tell me a joke").await.unwrap();
    assert!(help.answer.contains("I can answer questions"));
}

#[tokio::test]
async fn custom_categories_dedupe_on_normalized_name() {
    let (engine, user_id) = engine_with_user().await;
    engine
        .create_category(user_id, "Café", Some("☕"), None)
        .await
        .unwrap();
    let err = engine
        .create_category(user_id, "  cafe ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}
