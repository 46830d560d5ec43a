use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use sea_orm::entity::prelude::*;

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    /// Budgeted amount in INR minor units for one period.
    pub amount_minor: i64,
    pub period: String,
    /// Fraction of the budget (0..=1) at which an alert fires.
    pub alert_threshold: f64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Budget accounting period. Weeks run Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Weekly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// Inclusive start and exclusive end of the period containing `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let (start, end) = match self {
            BudgetPeriod::Monthly => {
                let start = today.with_day(1).unwrap_or(today);
                let end = next_month(start);
                (start, end)
            }
            BudgetPeriod::Weekly => {
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(7))
            }
            BudgetPeriod::Yearly => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                    .unwrap_or(start + Duration::days(365));
                (start, end)
            }
        };
        (at_midnight(start), at_midnight(end))
    }

    /// Whole days remaining in the current period, counting today.
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        let (_, end) = self.bounds(now);
        (end.date_naive() - now.date_naive()).num_days()
    }
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first + Duration::days(31))
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(EngineError::InvalidName(format!(
                "unknown budget period `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 30, 0).unwrap()
    }

    #[test]
    fn monthly_bounds_cover_the_calendar_month() {
        let (start, end) = BudgetPeriod::Monthly.bounds(at(2026, 8, 15));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn monthly_bounds_wrap_december() {
        let (start, end) = BudgetPeriod::Monthly.bounds(at(2026, 12, 31));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekly_bounds_start_on_monday() {
        // 2026-08-15 is a Saturday.
        let (start, end) = BudgetPeriod::Weekly.bounds(at(2026, 8, 15));
        assert_eq!(start.date_naive().weekday(), Weekday::Mon);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn days_left_counts_to_period_end() {
        assert_eq!(BudgetPeriod::Monthly.days_left(at(2026, 8, 30)), 2);
        assert_eq!(BudgetPeriod::Weekly.days_left(at(2026, 8, 15)), 2);
    }
}
