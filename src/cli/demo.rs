use chrono::{Datelike, Duration, Local, NaiveDate};
use rusqlite::Connection;

use super::open_db;
use crate::error::Result;
use crate::fmt::to_milliunits;
use crate::models::NewTransaction;
use crate::named::NamedKind;
use crate::transactions::bulk_create;

const CHECKING: &str = "Demo Checking";
const CREDIT_CARD: &str = "Demo Credit Card";

const CATEGORIES: &[&str] = &["Groceries", "Rent", "Dining", "Utilities", "Transport"];

/// Spending that repeats every `every` days, offset by `offset`.
struct Recurring {
    every: i64,
    offset: i64,
    payee: &'static str,
    category: &'static str,
    amounts: &'static [f64],
    card: bool,
}

const RECURRING: &[Recurring] = &[
    Recurring { every: 7, offset: 1, payee: "Green Valley Market", category: "Groceries", amounts: &[-84.12, -61.30, -97.45, -72.08], card: true },
    Recurring { every: 5, offset: 2, payee: "Luigi's Trattoria", category: "Dining", amounts: &[-38.50, -22.75, -54.10], card: true },
    Recurring { every: 4, offset: 0, payee: "City Transit", category: "Transport", amounts: &[-2.75, -5.50], card: false },
    Recurring { every: 9, offset: 3, payee: "Corner Coffee", category: "Dining", amounts: &[-4.80, -6.25], card: true },
];

/// Monthly items keyed by day of month.
struct Monthly {
    day: u32,
    payee: &'static str,
    category: Option<&'static str>,
    amount: f64,
}

const MONTHLY: &[Monthly] = &[
    Monthly { day: 1, payee: "Acme Corp Payroll", category: None, amount: 3250.00 },
    Monthly { day: 15, payee: "Acme Corp Payroll", category: None, amount: 3250.00 },
    Monthly { day: 3, payee: "Maple Street Apartments", category: Some("Rent"), amount: -1850.00 },
    Monthly { day: 12, payee: "City Power & Light", category: Some("Utilities"), amount: -96.40 },
    Monthly { day: 20, payee: "Northwind Internet", category: Some("Utilities"), amount: -59.99 },
];

const DAYS: i64 = 90;

struct Ids {
    checking: String,
    card: String,
    categories: Vec<(&'static str, String)>,
}

impl Ids {
    fn category(&self, name: &str) -> Option<String> {
        self.categories.iter().find(|(n, _)| *n == name).map(|(_, id)| id.clone())
    }
}

/// Build `DAYS` days of transactions ending at `today`.
fn generate(ids: &Ids, today: NaiveDate) -> Vec<NewTransaction> {
    let mut txns = Vec::new();
    for offset in 0..DAYS {
        let date = today - Duration::days(DAYS - 1 - offset);

        for m in MONTHLY.iter().filter(|m| m.day == date.day()) {
            txns.push(NewTransaction {
                date,
                account_id: ids.checking.clone(),
                category_id: m.category.and_then(|c| ids.category(c)),
                payee: m.payee.to_string(),
                amount: to_milliunits(m.amount),
                notes: None,
            });
        }

        for (i, r) in RECURRING.iter().enumerate() {
            if (offset + r.offset) % r.every != 0 {
                continue;
            }
            let pick = (offset as usize / r.every as usize + i) % r.amounts.len();
            txns.push(NewTransaction {
                date,
                account_id: if r.card { ids.card.clone() } else { ids.checking.clone() },
                category_id: ids.category(r.category),
                payee: r.payee.to_string(),
                amount: to_milliunits(r.amounts[pick]),
                notes: None,
            });
        }
    }
    txns
}

fn ensure_category(conn: &Connection, user_id: &str, name: &'static str) -> Result<(&'static str, String)> {
    let existing = NamedKind::Category.find_by_name(conn, user_id, name)?;
    let category = match existing {
        Some(c) => c,
        None => NamedKind::Category.create(conn, user_id, name)?,
    };
    Ok((name, category.id))
}

pub fn run(user_id: &str) -> Result<()> {
    let mut conn = open_db()?;

    if NamedKind::Account.find_by_name(&conn, user_id, CHECKING)?.is_some() {
        println!("Demo data already loaded for {user_id}.");
        return Ok(());
    }

    let ids = Ids {
        checking: NamedKind::Account.create(&conn, user_id, CHECKING)?.id,
        card: NamedKind::Account.create(&conn, user_id, CREDIT_CARD)?.id,
        categories: CATEGORIES
            .iter()
            .map(|name| ensure_category(&conn, user_id, *name))
            .collect::<Result<Vec<_>>>()?,
    };

    let txns = generate(&ids, Local::now().date_naive());
    let created = bulk_create(&mut conn, user_id, &txns)?;

    println!("Demo data loaded for {user_id}:");
    println!("  2 accounts, {} categories, {} transactions", CATEGORIES.len(), created.len());
    println!();
    println!("Try: tally summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Ids {
        Ids {
            checking: "checking".to_string(),
            card: "card".to_string(),
            categories: CATEGORIES.iter().map(|c| (*c, c.to_lowercase())).collect(),
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let a = generate(&ids(), today);
        let b = generate(&ids(), today);
        assert_eq!(a, b);
        assert!(a.len() > 50);
    }

    #[test]
    fn test_generate_stays_in_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let txns = generate(&ids(), today);
        let first = today - Duration::days(DAYS - 1);
        assert!(txns.iter().all(|t| t.date >= first && t.date <= today));
        assert!(txns.iter().any(|t| t.amount > 0));
        assert!(txns.iter().any(|t| t.category_id.as_deref() == Some("rent")));
    }
}
