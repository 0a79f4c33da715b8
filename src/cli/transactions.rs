use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{open_db, resolve, AddTransactionArgs};
use crate::error::{Result, TallyError};
use crate::fmt::{checked_milliunits, money};
use crate::models::NewTransaction;
use crate::named::NamedKind;
use crate::period::{parse_date, DateRange};
use crate::transactions::{self, TransactionFilter};

pub(crate) fn colored_money(milliunits: i64) -> String {
    if milliunits < 0 {
        money(milliunits).red().to_string()
    } else {
        money(milliunits).green().to_string()
    }
}

pub fn list(user_id: &str, from: Option<&str>, to: Option<&str>, account: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let range = DateRange::resolve_today(from, to)?;
    let account_id = match account {
        Some(key) => Some(resolve(&conn, user_id, NamedKind::Account, key)?.id),
        None => None,
    };
    let filter = TransactionFilter { range, account_id };
    let rows = transactions::list(&conn, user_id, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Payee", "Amount", "Account", "Category", "ID"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.date),
            Cell::new(&row.payee),
            Cell::new(colored_money(row.amount)),
            Cell::new(&row.account),
            Cell::new(row.category.as_deref().unwrap_or("")),
            Cell::new(&row.id),
        ]);
    }
    println!("Transactions {} to {}\n{table}", range.start, range.end);
    println!("{} transaction(s)", rows.len());
    Ok(())
}

pub fn add(user_id: &str, args: &AddTransactionArgs) -> Result<()> {
    let conn = open_db()?;
    let account = resolve(&conn, user_id, NamedKind::Account, &args.account)?;
    let category_id = match &args.category {
        Some(key) => Some(resolve(&conn, user_id, NamedKind::Category, key)?.id),
        None => None,
    };
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    let amount = checked_milliunits(args.amount)
        .ok_or_else(|| TallyError::invalid(format!("invalid amount {}", args.amount)))?;
    let input = NewTransaction {
        date,
        account_id: account.id,
        category_id,
        payee: args.payee.clone(),
        amount,
        notes: args.notes.clone(),
    };
    let created = transactions::create(&conn, user_id, &input)?;
    println!(
        "Added {} {} on {} to {} ({})",
        created.payee,
        colored_money(created.amount),
        created.date,
        account.name,
        created.id
    );
    Ok(())
}

pub fn delete(user_id: &str, id: &str) -> Result<()> {
    let conn = open_db()?;
    transactions::delete(&conn, user_id, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}
