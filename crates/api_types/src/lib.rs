use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency code shared between client and server.
///
/// All stored amounts are normalized to INR minor units (paise); the
/// original currency and exchange rate are kept alongside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Aed,
    Sgd,
    Cad,
    Aud,
    Jpy,
    Cny,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub email: String,
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginUser {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub username: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub icon: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub is_default: bool,
        pub icon: Option<String>,
        pub color: Option<String>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// Where a transaction row came from.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionSource {
        #[default]
        Manual,
        BankSms,
        Statement,
        Csv,
        Receipt,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Amount in minor units of `currency` (paise for INR). Must be > 0.
        pub amount_minor: i64,
        pub currency: Option<Currency>,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub occurred_at: DateTime<Utc>,
        pub kind: TransactionKind,
        pub source: Option<TransactionSource>,
        pub raw_text: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub currency: Currency,
        /// INR-normalized amount used by budgets and analytics.
        pub amount_inr_minor: i64,
        pub exchange_rate: f64,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub category: Option<String>,
        pub occurred_at: DateTime<Utc>,
        pub kind: TransactionKind,
        pub source: TransactionSource,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
        /// Title of the budget alert raised by this expense, if any.
        pub budget_alert: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExportQuery {
        /// `csv` (default) or `json`.
        pub format: Option<String>,
    }
}

pub mod imports {
    use super::*;
    use crate::transaction::TransactionKind;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SmsImport {
        pub sms_text: String,
    }

    /// Fields the SMS pattern cascade managed to extract.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParsedSms {
        pub amount_minor: Option<i64>,
        pub currency: Currency,
        pub kind: Option<TransactionKind>,
        pub merchant: Option<String>,
        pub card_last_digits: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SmsImportResponse {
        pub transaction_id: Uuid,
        pub parsed: ParsedSms,
        pub category: String,
        pub confidence: f64,
        pub budget_alert: Option<String>,
    }

    /// Bank-statement import: the extracted text layer of a PDF statement
    /// (or any tabular text dump).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatementImport {
        pub text: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportSummary {
        pub message: String,
        pub count: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptImport {
        /// OCR text of the receipt.
        pub text: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptItem {
        pub name: String,
        pub price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParsedReceipt {
        pub amount_minor: Option<i64>,
        pub merchant: String,
        pub date: Option<NaiveDate>,
        pub items: Vec<ReceiptItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptImportResponse {
        pub transaction_id: Uuid,
        pub parsed: ParsedReceipt,
        pub category: String,
        pub confidence: f64,
        pub budget_alert: Option<String>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        #[default]
        Monthly,
        Weekly,
        Yearly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpsert {
        pub category_id: Uuid,
        /// Ceiling in INR minor units.
        pub amount_minor: i64,
        pub period: Option<BudgetPeriod>,
        /// Fraction of the ceiling at which an alert fires (default 0.8).
        pub alert_threshold: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub period: BudgetPeriod,
        pub alert_threshold: f64,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetListQuery {
        pub active_only: Option<bool>,
    }

    /// Derived, never persisted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub budget_id: Uuid,
        pub category_name: String,
        pub budget_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub percentage_used: f64,
        pub days_left: i64,
        /// `On Track`, `Warning` or `Exceeded`.
        pub status: String,
    }
}

pub mod alert {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AlertView {
        pub id: Uuid,
        pub alert_type: String,
        pub title: String,
        pub message: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AlertListQuery {
        pub unread_only: Option<bool>,
    }
}

pub mod analytics {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySpend {
        pub category: String,
        pub amount_minor: i64,
        pub percentage: f64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SpendingQuery {
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyPoint {
        /// `YYYY-MM`.
        pub month: String,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub savings_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TrendQuery {
        pub months: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Insights {
        pub current_month_spending_minor: i64,
        /// `increased` or `decreased` vs the previous 30 days.
        pub spending_trend: String,
        pub trend_percentage: f64,
        pub top_spending_category: Option<String>,
        pub recommendations: Vec<String>,
    }
}

pub mod prediction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyPrediction {
        pub prediction_minor: Option<i64>,
        /// R² of the fit, 0 when there is not enough data.
        pub confidence: f64,
        pub trend: Option<String>,
        pub avg_monthly_change_minor: Option<i64>,
        pub historical_average_minor: Option<i64>,
        pub last_month_minor: Option<i64>,
        pub message: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryPrediction {
        pub category: String,
        pub predicted_minor: i64,
        pub predicted_transactions: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryPredictionQuery {
        pub days: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PredictionInsights {
        pub insights: Vec<String>,
        pub monthly_prediction: MonthlyPrediction,
        pub category_predictions: Vec<CategoryPrediction>,
    }
}

pub mod currency {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RatesQuery {
        pub base: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatesResponse {
        pub base_currency: Currency,
        pub rates: HashMap<String, f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupportedCurrency {
        pub code: String,
        pub symbol: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConvertRequest {
        pub amount_minor: i64,
        pub from_currency: Currency,
        pub to_currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConvertResponse {
        pub original_minor: i64,
        pub from_currency: Currency,
        pub to_currency: Currency,
        pub converted_minor: i64,
        pub exchange_rate: f64,
    }
}

pub mod query {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QueryRequest {
        pub query: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QueryAnswer {
        pub query: String,
        pub answer: String,
        pub data: Option<serde_json::Value>,
    }
}
