//! Period summary: totals with period-over-period change, top spending
//! categories and a gap-free daily income/expense series.

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;
use crate::period::DateRange;

/// Categories listed individually before the rest collapse into "Other".
pub const TOP_CATEGORIES: usize = 3;
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    pub income: i64,
    /// Sum of negative amounts, so zero or negative.
    pub expenses: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpend {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub income: i64,
    /// Absolute value of the day's spending.
    pub expenses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub remaining_amount: i64,
    pub remaining_change: i64,
    pub income_amount: i64,
    pub income_change: i64,
    pub expenses_amount: i64,
    pub expenses_change: i64,
    pub categories: Vec<CategorySpend>,
    pub days: Vec<DaySummary>,
}

// ---------------------------------------------------------------------------
// Pure computations
// ---------------------------------------------------------------------------

/// Whole-percent change from `previous` to `current`, relative to |previous|.
pub fn percentage_change(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        return if current == 0 { 0 } else { 100 };
    }
    let (current, previous) = (i128::from(current), i128::from(previous));
    let ratio = (current - previous) as f64 * 100.0 / previous.abs() as f64;
    (ratio + 0.5).floor() as i64
}

/// Keep the `top` largest entries and fold the remainder into "Other".
/// Input must already be sorted by descending value.
pub fn rollup_categories(mut sorted: Vec<CategorySpend>, top: usize) -> Vec<CategorySpend> {
    if sorted.len() <= top {
        return sorted;
    }
    let rest = sorted.split_off(top);
    sorted.push(CategorySpend {
        name: OTHER_CATEGORY.to_string(),
        value: rest.iter().fold(0, |acc, c| acc.saturating_add(c.value)),
    });
    sorted
}

/// One entry per day of `range`, zero-filled where `active` has no row.
pub fn fill_missing_days(active: &[DaySummary], range: &DateRange) -> Vec<DaySummary> {
    let by_date: HashMap<NaiveDate, &DaySummary> = active.iter().map(|d| (d.date, d)).collect();
    range
        .days()
        .map(|date| match by_date.get(&date) {
            Some(day) => **day,
            None => DaySummary {
                date,
                income: 0,
                expenses: 0,
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const OWNED_IN_RANGE: &str = "a.user_id = ?1 AND (?2 IS NULL OR t.account_id = ?2) \
     AND t.date >= ?3 AND t.date <= ?4";

fn query_totals(
    conn: &Connection,
    user_id: &str,
    account_id: Option<&str>,
    range: &DateRange,
) -> Result<PeriodTotals> {
    let sql = format!(
        "SELECT \
         COALESCE(SUM(CASE WHEN t.amount >= 0 THEN t.amount ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN t.amount < 0 THEN t.amount ELSE 0 END), 0), \
         COALESCE(SUM(t.amount), 0) \
         FROM transactions t JOIN accounts a ON t.account_id = a.id \
         WHERE {OWNED_IN_RANGE}"
    );
    let totals = conn.query_row(
        &sql,
        params![user_id, account_id, range.start, range.end],
        |row| {
            Ok(PeriodTotals {
                income: row.get(0)?,
                expenses: row.get(1)?,
                remaining: row.get(2)?,
            })
        },
    )?;
    Ok(totals)
}

fn query_category_spend(
    conn: &Connection,
    user_id: &str,
    account_id: Option<&str>,
    range: &DateRange,
) -> Result<Vec<CategorySpend>> {
    let sql = format!(
        "SELECT c.name, SUM(ABS(t.amount)) AS value \
         FROM transactions t \
         JOIN accounts a ON t.account_id = a.id \
         JOIN categories c ON t.category_id = c.id \
         WHERE {OWNED_IN_RANGE} AND t.amount < 0 \
         GROUP BY c.name ORDER BY value DESC, c.name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, account_id, range.start, range.end], |row| {
        Ok(CategorySpend {
            name: row.get(0)?,
            value: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn query_active_days(
    conn: &Connection,
    user_id: &str,
    account_id: Option<&str>,
    range: &DateRange,
) -> Result<Vec<DaySummary>> {
    let sql = format!(
        "SELECT t.date, \
         SUM(CASE WHEN t.amount >= 0 THEN t.amount ELSE 0 END), \
         SUM(CASE WHEN t.amount < 0 THEN ABS(t.amount) ELSE 0 END) \
         FROM transactions t JOIN accounts a ON t.account_id = a.id \
         WHERE {OWNED_IN_RANGE} \
         GROUP BY t.date ORDER BY t.date"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, account_id, range.start, range.end], |row| {
        Ok(DaySummary {
            date: row.get(0)?,
            income: row.get(1)?,
            expenses: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_summary(
    conn: &Connection,
    user_id: &str,
    account_id: Option<&str>,
    range: &DateRange,
) -> Result<Summary> {
    let current = query_totals(conn, user_id, account_id, range)?;
    let previous = query_totals(conn, user_id, account_id, &range.previous()?)?;

    let categories = rollup_categories(
        query_category_spend(conn, user_id, account_id, range)?,
        TOP_CATEGORIES,
    );
    let active = query_active_days(conn, user_id, account_id, range)?;
    let days = fill_missing_days(&active, range);

    tracing::debug!(
        %user_id,
        from = %range.start,
        to = %range.end,
        active_days = active.len(),
        "summary computed"
    );

    Ok(Summary {
        remaining_amount: current.remaining,
        remaining_change: percentage_change(current.remaining, previous.remaining),
        income_amount: current.income,
        income_change: percentage_change(current.income, previous.income),
        expenses_amount: current.expenses,
        expenses_change: percentage_change(current.expenses, previous.expenses),
        categories,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn spend(name: &str, value: i64) -> CategorySpend {
        CategorySpend {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_percentage_change_zero_previous() {
        assert_eq!(percentage_change(0, 0), 0);
        assert_eq!(percentage_change(500, 0), 100);
        assert_eq!(percentage_change(-500, 0), 100);
    }

    #[test]
    fn test_percentage_change_relative_to_abs_previous() {
        assert_eq!(percentage_change(150, 100), 50);
        assert_eq!(percentage_change(50, 100), -50);
        // Expenses are negative: spending more is a negative change.
        assert_eq!(percentage_change(-150, -100), -50);
        assert_eq!(percentage_change(-50, -100), 50);
    }

    #[test]
    fn test_percentage_change_rounds_half_up() {
        assert_eq!(percentage_change(1, 3), -67);
        assert_eq!(percentage_change(2, 3), -33);
        assert_eq!(percentage_change(201, 200), 1);
        assert_eq!(percentage_change(199, 200), 0);
        assert_eq!(percentage_change(197, 200), -1);
        assert_eq!(percentage_change(1005, 1000), 1);
    }

    #[test]
    fn test_percentage_change_extreme_amounts() {
        assert!(percentage_change(i64::MAX, -1) > 0);
        assert!(percentage_change(i64::MIN, i64::MAX) < 0);
        assert_eq!(percentage_change(i64::MIN, i64::MIN), 0);
        assert_eq!(percentage_change(i64::MAX, i64::MAX / 2), 100);
    }

    #[test]
    fn test_rollup_other_saturates() {
        let cats = vec![
            spend("Rent", i64::MAX),
            spend("Food", i64::MAX),
            spend("Travel", i64::MAX),
            spend("Books", i64::MAX),
            spend("Games", i64::MAX),
        ];
        assert_eq!(rollup_categories(cats, 3)[3], spend("Other", i64::MAX));
    }

    #[test]
    fn test_rollup_keeps_small_lists() {
        let cats = vec![spend("Rent", 900), spend("Food", 300)];
        assert_eq!(rollup_categories(cats.clone(), 3), cats);
        assert!(rollup_categories(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_rollup_collapses_tail_into_other() {
        let cats = vec![
            spend("Rent", 900),
            spend("Food", 300),
            spend("Travel", 200),
            spend("Books", 50),
            spend("Games", 25),
        ];
        let rolled = rollup_categories(cats, 3);
        assert_eq!(
            rolled,
            vec![
                spend("Rent", 900),
                spend("Food", 300),
                spend("Travel", 200),
                spend("Other", 75),
            ]
        );
    }

    #[test]
    fn test_fill_missing_days() {
        let range = DateRange::new(d("2024-01-01"), d("2024-01-04")).unwrap();
        let active = vec![
            DaySummary { date: d("2024-01-02"), income: 100, expenses: 0 },
            DaySummary { date: d("2024-01-04"), income: 0, expenses: 40 },
        ];
        let days = fill_missing_days(&active, &range);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], DaySummary { date: d("2024-01-01"), income: 0, expenses: 0 });
        assert_eq!(days[1].income, 100);
        assert_eq!(days[2], DaySummary { date: d("2024-01-03"), income: 0, expenses: 0 });
        assert_eq!(days[3].expenses, 40);
    }

    #[test]
    fn test_fill_missing_days_with_no_activity() {
        let range = DateRange::new(d("2024-01-01"), d("2024-01-31")).unwrap();
        let days = fill_missing_days(&[], &range);
        assert_eq!(days.len(), 31);
        assert!(days.iter().all(|d| d.income == 0 && d.expenses == 0));
    }

    #[test]
    fn test_get_summary() {
        let (_dir, conn) = test_db();
        let acct = add_account(&conn, "alice", "Checking");
        let other_acct = add_account(&conn, "alice", "Savings");
        let bobs = add_account(&conn, "bob", "Bob");
        let rent = add_category(&conn, "alice", "Rent");
        let food = add_category(&conn, "alice", "Food");
        let fun = add_category(&conn, "alice", "Fun");
        let books = add_category(&conn, "alice", "Books");
        let gifts = add_category(&conn, "alice", "Gifts");

        // Current period: 2024-02-01 .. 2024-02-10
        add_txn(&conn, &acct, None, "2024-02-01", 3_000_000);
        add_txn(&conn, &acct, Some(&rent), "2024-02-01", -1_000_000);
        add_txn(&conn, &acct, Some(&food), "2024-02-03", -200_000);
        add_txn(&conn, &acct, Some(&food), "2024-02-05", -100_000);
        add_txn(&conn, &other_acct, Some(&fun), "2024-02-05", -150_000);
        add_txn(&conn, &acct, Some(&books), "2024-02-07", -50_000);
        add_txn(&conn, &acct, Some(&gifts), "2024-02-10", -20_000);
        add_txn(&conn, &acct, None, "2024-02-10", -5_000);
        // Previous period: 2024-01-22 .. 2024-01-31
        add_txn(&conn, &acct, None, "2024-01-25", 2_000_000);
        add_txn(&conn, &acct, Some(&rent), "2024-01-31", -1_000_000);
        // Outside both periods and other users' data.
        add_txn(&conn, &acct, Some(&rent), "2024-01-21", -7_000_000);
        add_txn(&conn, &bobs, None, "2024-02-02", 9_000_000);

        let range = DateRange::new(d("2024-02-01"), d("2024-02-10")).unwrap();
        let s = get_summary(&conn, "alice", None, &range).unwrap();

        assert_eq!(s.income_amount, 3_000_000);
        assert_eq!(s.expenses_amount, -1_525_000);
        assert_eq!(s.remaining_amount, 1_475_000);
        assert_eq!(s.income_change, 50);
        assert_eq!(s.expenses_change, -52);
        assert_eq!(s.remaining_change, 48);

        assert_eq!(
            s.categories,
            vec![
                spend("Rent", 1_000_000),
                spend("Food", 300_000),
                spend("Fun", 150_000),
                spend("Other", 70_000),
            ]
        );

        assert_eq!(s.days.len(), 10);
        assert_eq!(s.days[0].income, 3_000_000);
        assert_eq!(s.days[0].expenses, 1_000_000);
        assert_eq!(s.days[1], DaySummary { date: d("2024-02-02"), income: 0, expenses: 0 });
        assert_eq!(s.days[4].expenses, 250_000);
        assert_eq!(s.days[9].expenses, 25_000);
    }

    #[test]
    fn test_get_summary_breaks_category_ties_by_name() {
        let (_dir, conn) = test_db();
        let acct = add_account(&conn, "alice", "Checking");
        for (name, amount) in [
            ("Zoo", -200_000),
            ("Rent", -500_000),
            ("Games", -100_000),
            ("Food", -200_000),
            ("Books", -100_000),
        ] {
            let category = add_category(&conn, "alice", name);
            add_txn(&conn, &acct, Some(&category), "2024-02-01", amount);
        }

        let range = DateRange::new(d("2024-02-01"), d("2024-02-01")).unwrap();
        let s = get_summary(&conn, "alice", None, &range).unwrap();
        assert_eq!(
            s.categories,
            vec![
                spend("Rent", 500_000),
                spend("Food", 200_000),
                spend("Zoo", 200_000),
                spend("Other", 200_000),
            ]
        );
    }

    #[test]
    fn test_get_summary_account_filter() {
        let (_dir, conn) = test_db();
        let acct = add_account(&conn, "alice", "Checking");
        let other_acct = add_account(&conn, "alice", "Savings");
        add_txn(&conn, &acct, None, "2024-02-01", 1_000);
        add_txn(&conn, &other_acct, None, "2024-02-01", 5_000);

        let range = DateRange::new(d("2024-02-01"), d("2024-02-01")).unwrap();
        let s = get_summary(&conn, "alice", Some(&acct), &range).unwrap();
        assert_eq!(s.income_amount, 1_000);
        assert_eq!(s.income_change, 100);
        assert!(s.categories.is_empty());
        assert_eq!(s.days.len(), 1);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let range = DateRange::new(d("2024-02-01"), d("2024-02-01")).unwrap();
        let s = Summary {
            remaining_amount: 1,
            remaining_change: 2,
            income_amount: 3,
            income_change: 4,
            expenses_amount: -5,
            expenses_change: 6,
            categories: vec![spend("Food", 5)],
            days: fill_missing_days(&[], &range),
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["remainingAmount"], 1);
        assert_eq!(json["expensesChange"], 6);
        assert_eq!(json["categories"][0]["name"], "Food");
        assert_eq!(json["days"][0]["date"], "2024-02-01");
    }
}
