use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Statement, prelude::*};
use uuid::Uuid;

use crate::{EngineResult, transactions::TransactionKind};

use super::Engine;

/// Expense total for one category inside a window.
#[derive(Debug, Clone)]
pub struct CategorySpend {
    pub category: String,
    pub amount_minor: i64,
    pub percentage: f64,
}

/// Income/expense/savings for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyPoint {
    pub month: String,
    pub income_minor: i64,
    pub expense_minor: i64,
    pub savings_minor: i64,
}

/// Thirty-day spending snapshot with plain-language recommendations.
#[derive(Debug, Clone)]
pub struct Insights {
    pub current_month_spending_minor: i64,
    pub spending_trend: String,
    pub trend_percentage: f64,
    pub top_spending_category: Option<String>,
    pub recommendations: Vec<String>,
}

impl Engine {
    /// INR expense totals per category. The window defaults to the current
    /// calendar month.
    pub async fn spending_by_category(
        &self,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> EngineResult<Vec<CategorySpend>> {
        let now = Utc::now();
        let start = start.unwrap_or_else(|| first_of_month(now));
        let end = end.unwrap_or(now);

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT c.name AS category, COALESCE(SUM(t.amount_inr_minor), 0) AS sum \
             FROM transactions t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? AND t.kind = ? \
               AND t.occurred_at >= ? AND t.occurred_at < ? \
             GROUP BY c.name \
             ORDER BY sum DESC"
                .to_string(),
            vec![
                user_id.into(),
                TransactionKind::Expense.as_str().into(),
                start.into(),
                end.into(),
            ],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let category: Option<String> = row.try_get("", "category")?;
            let amount_minor: i64 = row.try_get("", "sum")?;
            totals.push((category.unwrap_or_else(|| "Uncategorized".to_string()), amount_minor));
        }
        let grand_total: i64 = totals.iter().map(|(_, amount)| amount).sum();
        Ok(totals
            .into_iter()
            .map(|(category, amount_minor)| CategorySpend {
                category,
                amount_minor,
                percentage: if grand_total > 0 {
                    amount_minor as f64 / grand_total as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect())
    }

    /// Income, expense and savings per calendar month for the last `months`
    /// months, oldest first. Months without transactions appear as zeros.
    pub async fn monthly_trend(&self, user_id: Uuid, months: u32) -> EngineResult<Vec<MonthlyPoint>> {
        let months = months.clamp(1, 60);
        let now = Utc::now();
        let first = first_of_month(now)
            .date_naive()
            .checked_sub_months(Months::new(months - 1))
            .unwrap_or_else(|| now.date_naive());
        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap_or_default());

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            // occurred_at is stored as an ISO-8601 string, so the first seven
            // characters are the YYYY-MM bucket.
            "SELECT substr(occurred_at, 1, 7) AS month, kind, \
                    COALESCE(SUM(amount_inr_minor), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND occurred_at >= ? \
             GROUP BY month, kind"
                .to_string(),
            vec![user_id.into(), start.into()],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut points: Vec<MonthlyPoint> = (0..months)
            .filter_map(|i| first.checked_add_months(Months::new(i)))
            .map(|date| MonthlyPoint {
                month: format!("{:04}-{:02}", date.year(), date.month()),
                income_minor: 0,
                expense_minor: 0,
                savings_minor: 0,
            })
            .collect();

        for row in rows {
            let month: String = row.try_get("", "month")?;
            let kind: String = row.try_get("", "kind")?;
            let sum: i64 = row.try_get("", "sum")?;
            if let Some(point) = points.iter_mut().find(|p| p.month == month) {
                match kind.as_str() {
                    "income" => point.income_minor = sum,
                    _ => point.expense_minor = sum,
                }
            }
        }
        for point in &mut points {
            point.savings_minor = point.income_minor - point.expense_minor;
        }
        Ok(points)
    }

    /// Compare the last thirty days of spending with the thirty before.
    pub async fn insights(&self, user_id: Uuid) -> EngineResult<Insights> {
        let now = Utc::now();
        let month_ago = now - Duration::days(30);
        let two_months_ago = now - Duration::days(60);

        let current = self.expense_total(user_id, month_ago, now).await?;
        let previous = self.expense_total(user_id, two_months_ago, month_ago).await?;

        let (trend, trend_percentage) = if previous > 0 {
            let change = (current - previous) as f64 / previous as f64 * 100.0;
            let trend = if change > 0.0 { "increased" } else { "decreased" };
            (trend.to_string(), change.abs())
        } else {
            ("stable".to_string(), 0.0)
        };

        let by_category = self
            .spending_by_category(user_id, Some(month_ago), Some(now))
            .await?;
        let top = by_category.first();

        let mut recommendations = Vec::new();
        if trend == "increased" && trend_percentage > 20.0 {
            recommendations.push(format!(
                "Your spending increased by {trend_percentage:.0}% over the last month. \
                 Reviewing recent expenses could help you find where it went."
            ));
        }
        if let Some(top) = top {
            if top.percentage > 40.0 {
                recommendations.push(format!(
                    "{:.0}% of your spending goes to {}. Setting a budget for it \
                     would keep that in check.",
                    top.percentage, top.category
                ));
            }
        }
        if recommendations.is_empty() {
            recommendations
                .push("Keep recording transactions to unlock more insights.".to_string());
        }

        Ok(Insights {
            current_month_spending_minor: current,
            spending_trend: trend,
            trend_percentage,
            top_spending_category: top.map(|t| t.category.clone()),
            recommendations,
        })
    }

    /// Total INR expenses inside `[start, end)`, across all categories.
    pub(crate) async fn expense_total(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<i64> {
        self.kind_total(user_id, TransactionKind::Expense, start, end)
            .await
    }

    pub(crate) async fn kind_total(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<i64> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT COALESCE(SUM(amount_inr_minor), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND kind = ? \
               AND occurred_at >= ? AND occurred_at < ?"
                .to_string(),
            vec![
                user_id.into(),
                kind.as_str().into(),
                start.into(),
                end.into(),
            ],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}

pub(crate) fn first_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap_or_default())
}
