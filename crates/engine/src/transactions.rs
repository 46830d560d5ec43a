use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Amount in minor units of `currency`.
    pub amount_minor: i64,
    pub currency: String,
    /// INR-normalised amount, used by budgets and analytics.
    pub amount_inr_minor: i64,
    pub exchange_rate: f64,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub occurred_at: DateTimeUtc,
    pub kind: String,
    pub source: String,
    /// Original SMS / receipt / statement line, kept for auditing imports.
    pub raw_text: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Whether money entered or left the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(EngineError::InvalidName(format!(
                "unknown transaction kind `{other}`"
            ))),
        }
    }
}

/// Where a transaction record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    #[default]
    Manual,
    BankSms,
    Statement,
    Csv,
    Receipt,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::Manual => "manual",
            TransactionSource::BankSms => "bank_sms",
            TransactionSource::Statement => "statement",
            TransactionSource::Csv => "csv",
            TransactionSource::Receipt => "receipt",
        }
    }
}

impl TryFrom<&str> for TransactionSource {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "manual" => Ok(TransactionSource::Manual),
            "bank_sms" => Ok(TransactionSource::BankSms),
            "statement" => Ok(TransactionSource::Statement),
            "csv" => Ok(TransactionSource::Csv),
            "receipt" => Ok(TransactionSource::Receipt),
            other => Err(EngineError::InvalidName(format!(
                "unknown transaction source `{other}`"
            ))),
        }
    }
}
