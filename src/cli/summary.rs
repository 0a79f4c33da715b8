use colored::Colorize;
use comfy_table::{Cell, Table};

use super::transactions::colored_money;
use super::{open_db, resolve};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::named::NamedKind;
use crate::period::DateRange;
use crate::summary::get_summary;

fn colored_change(change: i64) -> String {
    let text = format!("{} from last period", percent(change));
    if change < 0 {
        text.red().to_string()
    } else if change > 0 {
        text.green().to_string()
    } else {
        text.dimmed().to_string()
    }
}

pub fn run(user_id: &str, from: Option<&str>, to: Option<&str>, account: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let range = DateRange::resolve_today(from, to)?;
    let account = match account {
        Some(key) => Some(resolve(&conn, user_id, NamedKind::Account, key)?),
        None => None,
    };
    let summary = get_summary(&conn, user_id, account.as_ref().map(|a| a.id.as_str()), &range)?;

    let scope = account.as_ref().map(|a| a.name.as_str()).unwrap_or("All accounts");
    println!("{} {} to {} ({scope})", "Summary".bold(), range.start, range.end);
    println!();

    let mut totals = Table::new();
    totals.set_header(vec!["", "Amount", "Change"]);
    for (label, amount, change) in [
        ("Remaining", summary.remaining_amount, summary.remaining_change),
        ("Income", summary.income_amount, summary.income_change),
        ("Expenses", summary.expenses_amount, summary.expenses_change),
    ] {
        totals.add_row(vec![
            Cell::new(label.bold()),
            Cell::new(colored_money(amount)),
            Cell::new(colored_change(change)),
        ]);
    }
    println!("{totals}");

    if !summary.categories.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Spent"]);
        for category in &summary.categories {
            table.add_row(vec![Cell::new(&category.name), Cell::new(money(category.value))]);
        }
        println!("\nSpending by category\n{table}");
    }

    let mut days = Table::new();
    days.set_header(vec!["Date", "Income", "Expenses"]);
    for day in &summary.days {
        days.add_row(vec![
            Cell::new(day.date),
            Cell::new(money(day.income)),
            Cell::new(money(day.expenses)),
        ]);
    }
    println!("\nDaily\n{days}");
    Ok(())
}
