use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, prelude::*,
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, EngineResult, alerts, budgets, budgets::BudgetPeriod, categories,
    money, transactions::TransactionKind,
};

use super::Engine;

/// Snapshot of one active budget against spending in its current period.
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub category_name: String,
    pub period: BudgetPeriod,
    pub budget_minor: i64,
    pub spent_minor: i64,
    pub remaining_minor: i64,
    pub percentage_used: f64,
    pub days_left: i64,
    pub status: &'static str,
}

impl Engine {
    /// Create a budget for a category, or update the existing one.
    pub async fn upsert_budget(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        period: BudgetPeriod,
        alert_threshold: f64,
    ) -> EngineResult<budgets::Model> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "budget amount must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&alert_threshold) {
            return Err(EngineError::InvalidAmount(
                "alert threshold must be between 0 and 1".to_string(),
            ));
        }
        self.require_category(&self.database, user_id, category_id)
            .await?;

        let existing = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .one(&self.database)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut active: budgets::ActiveModel = found.into();
                active.amount_minor = ActiveValue::Set(amount_minor);
                active.period = ActiveValue::Set(period.as_str().to_string());
                active.alert_threshold = ActiveValue::Set(alert_threshold);
                active.is_active = ActiveValue::Set(true);
                active.updated_at = ActiveValue::Set(Utc::now());
                active.update(&self.database).await?
            }
            None => {
                budgets::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user_id),
                    category_id: ActiveValue::Set(category_id),
                    amount_minor: ActiveValue::Set(amount_minor),
                    period: ActiveValue::Set(period.as_str().to_string()),
                    alert_threshold: ActiveValue::Set(alert_threshold),
                    is_active: ActiveValue::Set(true),
                    created_at: ActiveValue::Set(Utc::now()),
                    updated_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&self.database)
                .await?
            }
        };
        Ok(model)
    }

    pub async fn list_budgets(
        &self,
        user_id: Uuid,
        active_only: bool,
    ) -> EngineResult<Vec<(budgets::Model, String)>> {
        let mut select = budgets::Entity::find()
            .find_also_related(categories::Entity)
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::CreatedAt);
        if active_only {
            select = select.filter(budgets::Column::IsActive.eq(true));
        }
        let rows = select.all(&self.database).await?;
        Ok(rows
            .into_iter()
            .map(|(budget, category)| {
                let name = category.map(|c| c.name).unwrap_or_default();
                (budget, name)
            })
            .collect())
    }

    /// Status of every active budget for its current period.
    pub async fn budgets_status(&self, user_id: Uuid) -> EngineResult<Vec<BudgetStatus>> {
        let now = Utc::now();
        let rows = self.list_budgets(user_id, true).await?;
        let mut statuses = Vec::with_capacity(rows.len());
        for (budget, category_name) in rows {
            let period = BudgetPeriod::try_from(budget.period.as_str())?;
            let (start, end) = period.bounds(now);
            let spent = self
                .spent_in_window(&self.database, user_id, budget.category_id, start, end)
                .await?;
            let percentage = spent as f64 / budget.amount_minor as f64 * 100.0;
            let status = if percentage >= 100.0 {
                "Exceeded"
            } else if percentage >= budget.alert_threshold * 100.0 {
                "Warning"
            } else {
                "On Track"
            };
            statuses.push(BudgetStatus {
                budget_id: budget.id,
                category_name,
                period,
                budget_minor: budget.amount_minor,
                spent_minor: spent,
                remaining_minor: budget.amount_minor - spent,
                percentage_used: percentage,
                days_left: period.days_left(now),
                status,
            });
        }
        Ok(statuses)
    }

    /// INR spend on a category inside `[start, end)`.
    pub(crate) async fn spent_in_window<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
        start: DateTimeUtc,
        end: DateTimeUtc,
    ) -> EngineResult<i64> {
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COALESCE(SUM(amount_inr_minor), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND category_id = ? AND kind = ? \
               AND occurred_at >= ? AND occurred_at < ?"
                .to_string(),
            vec![
                user_id.into(),
                category_id.into(),
                TransactionKind::Expense.as_str().into(),
                start.into(),
                end.into(),
            ],
        );
        let row = db.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    /// After an expense, raise at most one alert per budget period once the
    /// spend crosses the configured threshold.
    pub(crate) async fn check_budget_alert<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> EngineResult<Option<alerts::Model>> {
        let Some(budget) = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .filter(budgets::Column::IsActive.eq(true))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let period = BudgetPeriod::try_from(budget.period.as_str())?;
        let (start, end) = period.bounds(now);
        let spent = self
            .spent_in_window(db, user_id, category_id, start, end)
            .await?;
        let percentage = spent as f64 / budget.amount_minor as f64 * 100.0;
        if percentage < budget.alert_threshold * 100.0 {
            return Ok(None);
        }

        let category = self.require_category(db, user_id, category_id).await?;

        // One alert per category per period.
        let already = alerts::Entity::find()
            .filter(alerts::Column::UserId.eq(user_id))
            .filter(alerts::Column::AlertType.eq(alerts::ALERT_TYPE_BUDGET))
            .filter(alerts::Column::CreatedAt.gte(start))
            .filter(alerts::Column::Title.contains(&category.name))
            .one(db)
            .await?;
        if already.is_some() {
            return Ok(None);
        }

        let title = if percentage >= 100.0 {
            format!("{} Budget Exceeded!", category.name)
        } else {
            format!("{} Budget Warning", category.name)
        };
        let message = format!(
            "You've spent {} ({percentage:.1}%) of your {} {} budget for {}.",
            money::format_minor(spent, Currency::Inr),
            money::format_minor(budget.amount_minor, Currency::Inr),
            period.as_str(),
            category.name,
        );

        let alert = alerts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            alert_type: ActiveValue::Set(alerts::ALERT_TYPE_BUDGET.to_string()),
            title: ActiveValue::Set(title),
            message: ActiveValue::Set(message),
            is_read: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?;
        tracing::warn!(
            %user_id,
            category = %category.name,
            percentage,
            "budget threshold crossed"
        );
        Ok(Some(alert))
    }
}
