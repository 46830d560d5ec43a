use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{Currency, EngineResult, money, transactions::TransactionKind};

use super::{Engine, analytics::first_of_month};

/// Answer to a free-text question over the user's own data.
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub query: String,
    pub answer: String,
    pub data: Option<serde_json::Value>,
}

/// Time window a question refers to.
struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    label: &'static str,
}

fn detect_window(question: &str, now: DateTime<Utc>) -> Window {
    if question.contains("today") {
        let start = Utc.from_utc_datetime(
            &now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default(),
        );
        return Window { start, end: now, label: "today" };
    }
    if question.contains("this week") {
        let monday = now.date_naive()
            - Duration::days(now.date_naive().weekday().num_days_from_monday() as i64);
        let start = Utc.from_utc_datetime(&monday.and_hms_opt(0, 0, 0).unwrap_or_default());
        return Window { start, end: now, label: "this week" };
    }
    if question.contains("last month") {
        let this_month = first_of_month(now);
        let start = this_month
            .date_naive()
            .checked_sub_months(Months::new(1))
            .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap_or_default()))
            .unwrap_or(this_month);
        return Window { start, end: this_month, label: "last month" };
    }
    if question.contains("this year") {
        let jan = now.date_naive().with_ordinal(1).unwrap_or(now.date_naive());
        let start = Utc.from_utc_datetime(&jan.and_hms_opt(0, 0, 0).unwrap_or_default());
        return Window { start, end: now, label: "this year" };
    }
    Window {
        start: first_of_month(now),
        end: now,
        label: "this month",
    }
}

fn inr(minor: i64) -> String {
    money::format_minor(minor, Currency::Inr)
}

impl Engine {
    /// Keyword-matched answers over the user's transactions. Branches are
    /// tried in order and the first match wins; anything unrecognized gets
    /// the help text.
    pub async fn answer_query(&self, user_id: Uuid, query: &str) -> EngineResult<QueryAnswer> {
        let question = query.to_lowercase();
        let now = Utc::now();
        let window = detect_window(&question, now);

        let answer = |answer: String, data: Option<serde_json::Value>| QueryAnswer {
            query: query.to_string(),
            answer,
            data,
        };

        if question.contains("percent") {
            let income = self
                .kind_total(user_id, TransactionKind::Income, window.start, window.end)
                .await?;
            let expense = self
                .kind_total(user_id, TransactionKind::Expense, window.start, window.end)
                .await?;
            if income == 0 {
                return Ok(answer(
                    format!("You had no recorded income {}.", window.label),
                    None,
                ));
            }
            let pct = expense as f64 / income as f64 * 100.0;
            return Ok(answer(
                format!(
                    "You spent {:.1}% of your income {} ({} of {}).",
                    pct,
                    window.label,
                    inr(expense),
                    inr(income)
                ),
                Some(json!({
                    "income_minor": income,
                    "expense_minor": expense,
                    "percentage": pct,
                })),
            ));
        }

        let mentions_income = question.contains("income") || question.contains("earn");
        let mentions_expense = question.contains("expense")
            || question.contains("spend")
            || question.contains("spent");
        if question.contains(" vs ")
            || question.contains("versus")
            || (mentions_income && mentions_expense)
        {
            let income = self
                .kind_total(user_id, TransactionKind::Income, window.start, window.end)
                .await?;
            let expense = self
                .kind_total(user_id, TransactionKind::Expense, window.start, window.end)
                .await?;
            let net = income - expense;
            let verdict = if net >= 0 {
                format!(
                    "You earned {} and spent {} {}, leaving {}.",
                    inr(income),
                    inr(expense),
                    window.label,
                    inr(net)
                )
            } else {
                format!(
                    "You earned {} but spent {} {}, overspending by {}.",
                    inr(income),
                    inr(expense),
                    window.label,
                    inr(net.abs())
                )
            };
            return Ok(answer(
                verdict,
                Some(json!({
                    "income_minor": income,
                    "expense_minor": expense,
                    "net_minor": net,
                })),
            ));
        }

        if question.contains("spent") || question.contains("spend") {
            // A category mention narrows the total to that category.
            if let Some(category) = self.mentioned_category(user_id, &question).await? {
                let by_category = self
                    .spending_by_category(user_id, Some(window.start), Some(window.end))
                    .await?;
                let spent = by_category
                    .iter()
                    .find(|c| c.category == category)
                    .map(|c| c.amount_minor)
                    .unwrap_or(0);
                return Ok(answer(
                    format!("You spent {} on {} {}.", inr(spent), category, window.label),
                    Some(json!({ "category": category, "amount_minor": spent })),
                ));
            }
            let expense = self
                .kind_total(user_id, TransactionKind::Expense, window.start, window.end)
                .await?;
            return Ok(answer(
                format!("You spent {} {}.", inr(expense), window.label),
                Some(json!({ "amount_minor": expense })),
            ));
        }

        if question.contains("earn") || question.contains("income") || question.contains("salary") {
            let income = self
                .kind_total(user_id, TransactionKind::Income, window.start, window.end)
                .await?;
            return Ok(answer(
                format!("You earned {} {}.", inr(income), window.label),
                Some(json!({ "amount_minor": income })),
            ));
        }

        if question.contains("save") || question.contains("saving") {
            let income = self
                .kind_total(user_id, TransactionKind::Income, window.start, window.end)
                .await?;
            let expense = self
                .kind_total(user_id, TransactionKind::Expense, window.start, window.end)
                .await?;
            let saved = income - expense;
            let verdict = if saved >= 0 {
                format!("You saved {} {}.", inr(saved), window.label)
            } else {
                format!(
                    "You overspent by {} {}.",
                    inr(saved.abs()),
                    window.label
                )
            };
            return Ok(answer(
                verdict,
                Some(json!({
                    "income_minor": income,
                    "expense_minor": expense,
                    "savings_minor": saved,
                })),
            ));
        }

        if question.contains("most") || question.contains("top") || question.contains("biggest") {
            let by_category = self
                .spending_by_category(user_id, Some(window.start), Some(window.end))
                .await?;
            return Ok(match by_category.first() {
                Some(top) => answer(
                    format!(
                        "Your biggest spending category {} is {} with {} ({:.1}% of the total).",
                        window.label,
                        top.category,
                        inr(top.amount_minor),
                        top.percentage
                    ),
                    Some(json!({
                        "category": top.category,
                        "amount_minor": top.amount_minor,
                        "percentage": top.percentage,
                    })),
                ),
                None => answer(format!("No spending recorded {}.", window.label), None),
            });
        }

        if question.contains("balance") || question.contains("net") {
            let income = self
                .kind_total(user_id, TransactionKind::Income, window.start, window.end)
                .await?;
            let expense = self
                .kind_total(user_id, TransactionKind::Expense, window.start, window.end)
                .await?;
            let balance = income - expense;
            return Ok(answer(
                format!("Your balance {} is {}.", window.label, inr(balance)),
                Some(json!({
                    "income_minor": income,
                    "expense_minor": expense,
                    "balance_minor": balance,
                })),
            ));
        }

        Ok(answer(
            "I can answer questions like: 'How much did I spend this month?', \
             'How much did I spend on food last month?', 'What did I earn this year?', \
             'How much did I save?', 'What's my biggest spending category?' or \
             'What's my balance?'"
                .to_string(),
            None,
        ))
    }

    /// First user category whose name appears in the question.
    async fn mentioned_category(
        &self,
        user_id: Uuid,
        question: &str,
    ) -> EngineResult<Option<String>> {
        let categories = self.list_categories(user_id).await?;
        for category in &categories {
            let name = category.name.to_lowercase();
            if question.contains(&name) {
                return Ok(Some(category.name.clone()));
            }
            // "food" should hit "Food & Dining"; match on each word too.
            if name
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| w.len() >= 4)
                .any(|word| question.contains(word))
            {
                return Ok(Some(category.name.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap()
    }

    #[test]
    fn default_window_is_current_month() {
        let w = detect_window("how much did i spend", at(2026, 8, 30));
        assert_eq!(w.label, "this month");
        assert_eq!(w.start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn last_month_window_is_the_previous_calendar_month() {
        let w = detect_window("what did i spend last month", at(2026, 1, 10));
        assert_eq!(w.label, "last month");
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(w.end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn today_window_starts_at_midnight() {
        let w = detect_window("spending today", at(2026, 8, 30));
        assert_eq!(w.label, "today");
        assert_eq!(w.start, Utc.with_ymd_and_hms(2026, 8, 30, 0, 0, 0).unwrap());
    }
}
