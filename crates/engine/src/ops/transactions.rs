use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, EngineResult, alerts, rates, transactions,
    transactions::{TransactionKind, TransactionSource},
    util,
};

use super::{Engine, with_tx};

/// Input for recording a transaction, regardless of where it came from.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount_minor: i64,
    pub currency: Currency,
    pub kind: TransactionKind,
    pub description: String,
    /// Direct category reference; must belong to the user.
    pub category_id: Option<Uuid>,
    /// Category name, resolved case-insensitively; unknown names fall back
    /// to `Others`. Ignored when `category_id` is set.
    pub category_name: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub source: TransactionSource,
    pub raw_text: Option<String>,
}

/// A stored transaction together with its resolved category name.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub model: transactions::Model,
    pub category_name: Option<String>,
}

impl Engine {
    /// Record a transaction. Expenses against a budgeted category may
    /// produce a budget alert, returned alongside the stored row.
    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        new: NewTransaction,
    ) -> EngineResult<(transactions::Model, Option<alerts::Model>)> {
        with_tx!(self, |db_tx| {
            let model = self.insert_transaction(&db_tx, user_id, new).await?;
            let alert = match (model.kind.as_str(), model.category_id) {
                ("expense", Some(category_id)) => {
                    self.check_budget_alert(&db_tx, user_id, category_id).await?
                }
                _ => None,
            };
            Ok((model, alert))
        })
    }

    /// Bulk-insert parsed statement or CSV rows. Budget checks are skipped:
    /// imports describe the past, alerts are for spending as it happens.
    pub async fn import_transactions(
        &self,
        user_id: Uuid,
        rows: Vec<NewTransaction>,
    ) -> EngineResult<u64> {
        with_tx!(self, |db_tx| {
            let mut count = 0u64;
            for row in rows {
                self.insert_transaction(&db_tx, user_id, row).await?;
                count += 1;
            }
            tracing::info!(%user_id, count, "imported transactions");
            Ok(count)
        })
    }

    async fn insert_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        new: NewTransaction,
    ) -> EngineResult<transactions::Model> {
        if new.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        let description = util::normalize_required_name(&new.description, "description")?;
        let (amount_inr_minor, exchange_rate) =
            rates::convert_minor(new.amount_minor, new.currency, Currency::Inr);
        let category_id = match new.category_id {
            Some(id) => Some(self.require_category(db, user_id, id).await?.id),
            None => self
                .resolve_category(db, user_id, new.category_name.as_deref())
                .await?
                .map(|c| c.id),
        };

        Ok(transactions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            amount_minor: ActiveValue::Set(new.amount_minor),
            currency: ActiveValue::Set(new.currency.code().to_string()),
            amount_inr_minor: ActiveValue::Set(amount_inr_minor),
            exchange_rate: ActiveValue::Set(exchange_rate),
            description: ActiveValue::Set(description),
            category_id: ActiveValue::Set(category_id),
            occurred_at: ActiveValue::Set(new.occurred_at.unwrap_or_else(Utc::now)),
            kind: ActiveValue::Set(new.kind.as_str().to_string()),
            source: ActiveValue::Set(new.source.as_str().to_string()),
            raw_text: ActiveValue::Set(util::normalize_optional_text(new.raw_text.as_deref())),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?)
    }

    /// Newest-first page of a user's transactions with category names.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        skip: u64,
        limit: Option<u64>,
    ) -> EngineResult<Vec<TransactionRecord>> {
        let mut select = transactions::Entity::find()
            .find_also_related(crate::categories::Entity)
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt);
        if let Some(limit) = limit {
            select = select.offset(skip).limit(limit);
        } else if skip > 0 {
            // SQLite only takes OFFSET after a LIMIT.
            select = select.offset(skip).limit(i64::MAX as u64);
        }
        let rows = select.all(&self.database).await?;
        Ok(rows
            .into_iter()
            .map(|(model, category)| TransactionRecord {
                model,
                category_name: category.map(|c| c.name),
            })
            .collect())
    }

    pub async fn count_transactions(&self, user_id: Uuid) -> EngineResult<u64> {
        Ok(transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .count(&self.database)
            .await?)
    }
}
