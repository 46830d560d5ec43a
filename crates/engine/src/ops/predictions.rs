use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Statement, prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineResult, money, transactions::TransactionKind};

use super::Engine;

const MIN_MONTHS: usize = 3;
const HISTORY_DAYS: i64 = 90;

/// Next-month expense forecast from a least-squares fit over monthly totals.
#[derive(Debug, Clone)]
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

#[derive(Debug, Clone)]
pub struct CategoryPrediction {
    pub category: String,
    pub predicted_minor: i64,
    pub predicted_transactions: i64,
}

#[derive(Debug, Clone)]
pub struct PredictionInsights {
    pub insights: Vec<String>,
    pub monthly_prediction: MonthlyPrediction,
    pub category_predictions: Vec<CategoryPrediction>,
}

impl Engine {
    /// Forecast next month's total expenses. Needs at least three months
    /// with recorded expenses.
    pub async fn predict_monthly_spending(&self, user_id: Uuid) -> EngineResult<MonthlyPrediction> {
        let totals = self.monthly_expense_totals(user_id).await?;
        if totals.len() < MIN_MONTHS {
            return Ok(MonthlyPrediction {
                prediction_minor: None,
                confidence: 0.0,
                trend: None,
                avg_monthly_change_minor: None,
                historical_average_minor: None,
                last_month_minor: None,
                message: Some(format!(
                    "Not enough history yet. Record expenses for at least {MIN_MONTHS} months to get a forecast."
                )),
            });
        }

        let ys: Vec<f64> = totals.iter().map(|(_, total)| *total as f64).collect();
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        let fit = fit_line(&xs, &ys);

        let next = (fit.slope * ys.len() as f64 + fit.intercept).max(0.0);
        let average = ys.iter().sum::<f64>() / ys.len() as f64;
        let trend = if fit.slope > 0.0 { "increasing" } else { "decreasing" };

        Ok(MonthlyPrediction {
            prediction_minor: Some(next.round() as i64),
            confidence: fit.r_squared,
            trend: Some(trend.to_string()),
            avg_monthly_change_minor: Some(fit.slope.round() as i64),
            historical_average_minor: Some(average.round() as i64),
            last_month_minor: totals.last().map(|(_, total)| *total),
            message: None,
        })
    }

    /// Project per-category spending over the next `days` days from the
    /// last ninety days of history.
    pub async fn predict_category_spending(
        &self,
        user_id: Uuid,
        days: u32,
    ) -> EngineResult<Vec<CategoryPrediction>> {
        let days = days.clamp(1, 365) as f64;
        let now = Utc::now();
        let start = now - Duration::days(HISTORY_DAYS);

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT c.name AS category, COUNT(*) AS cnt, \
                    COALESCE(SUM(t.amount_inr_minor), 0) AS sum \
             FROM transactions t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? AND t.kind = ? AND t.occurred_at >= ? \
             GROUP BY c.name \
             ORDER BY sum DESC"
                .to_string(),
            vec![
                user_id.into(),
                TransactionKind::Expense.as_str().into(),
                start.into(),
            ],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut predictions = Vec::with_capacity(rows.len());
        for row in rows {
            let category: Option<String> = row.try_get("", "category")?;
            let count: i64 = row.try_get("", "cnt")?;
            let sum: i64 = row.try_get("", "sum")?;
            let scale = days / HISTORY_DAYS as f64;
            predictions.push(CategoryPrediction {
                category: category.unwrap_or_else(|| "Uncategorized".to_string()),
                predicted_minor: (sum as f64 * scale).round() as i64,
                predicted_transactions: (count as f64 * scale).round() as i64,
            });
        }
        Ok(predictions)
    }

    /// Forecast bundle: monthly fit, thirty-day category projections and
    /// plain-language takeaways.
    pub async fn prediction_insights(&self, user_id: Uuid) -> EngineResult<PredictionInsights> {
        let monthly = self.predict_monthly_spending(user_id).await?;
        let categories = self.predict_category_spending(user_id, 30).await?;

        let mut insights = Vec::new();
        match (&monthly.trend, monthly.avg_monthly_change_minor) {
            (Some(trend), Some(change)) if trend == "increasing" && change > 0 => {
                insights.push(format!(
                    "Your spending is trending up by about {} per month.",
                    money::format_minor(change, Currency::Inr)
                ));
            }
            (Some(trend), Some(change)) if trend == "decreasing" => {
                insights.push(format!(
                    "Your spending is trending down by about {} per month. Keep it up!",
                    money::format_minor(change.abs(), Currency::Inr)
                ));
            }
            _ => {}
        }
        if let Some(top) = categories.first() {
            insights.push(format!(
                "{} is projected to be your biggest expense over the next 30 days ({}).",
                top.category,
                money::format_minor(top.predicted_minor, Currency::Inr)
            ));
        }
        if insights.is_empty() {
            insights.push("Not enough history for forecasts yet.".to_string());
        }

        Ok(PredictionInsights {
            insights,
            monthly_prediction: monthly,
            category_predictions: categories,
        })
    }

    /// Months that actually have expenses, oldest first, as
    /// `(YYYY-MM, total)` pairs.
    async fn monthly_expense_totals(&self, user_id: Uuid) -> EngineResult<Vec<(String, i64)>> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT substr(occurred_at, 1, 7) AS month, \
                    COALESCE(SUM(amount_inr_minor), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND kind = ? \
             GROUP BY month \
             ORDER BY month ASC"
                .to_string(),
            vec![user_id.into(), TransactionKind::Expense.as_str().into()],
        );
        let rows = self.database.query_all(stmt).await?;
        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let month: String = row.try_get("", "month")?;
            let sum: i64 = row.try_get("", "sum")?;
            totals.push((month, sum));
        }
        Ok(totals)
    }
}

struct LineFit {
    slope: f64,
    intercept: f64,
    r_squared: f64,
}

/// Ordinary least squares over `(xs, ys)`. Callers guarantee at least two
/// distinct x values.
fn fit_line(xs: &[f64], ys: &[f64]) -> LineFit {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        ss_xy += (x - mean_x) * (y - mean_y);
        ss_xx += (x - mean_x) * (x - mean_x);
    }
    let slope = if ss_xx == 0.0 { 0.0 } else { ss_xy / ss_xx };
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let predicted = slope * x + intercept;
        ss_res += (y - predicted) * (y - predicted);
        ss_tot += (y - mean_y) * (y - mean_y);
    }
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    LineFit {
        slope,
        intercept,
        r_squared: r_squared.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_a_perfect_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [10.0, 12.0, 14.0, 16.0];
        let fit = fit_line(&xs, &ys);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_data_lowers_confidence() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 40.0, 5.0, 35.0, 12.0];
        let fit = fit_line(&xs, &ys);
        assert!(fit.r_squared < 0.5);
    }

    #[test]
    fn flat_series_has_zero_slope() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [7.0, 7.0, 7.0];
        let fit = fit_line(&xs, &ys);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 1.0);
    }
}
