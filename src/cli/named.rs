use comfy_table::{Cell, Table};

use super::{open_db, resolve};
use crate::error::Result;
use crate::named::NamedKind;

pub fn add(kind: NamedKind, user_id: &str, name: &str) -> Result<()> {
    let conn = open_db()?;
    let created = kind.create(&conn, user_id, name)?;
    println!("Added {}: {}", kind.label(), created.name);
    Ok(())
}

pub fn list(kind: NamedKind, user_id: &str) -> Result<()> {
    let conn = open_db()?;
    let rows = kind.list(&conn, user_id)?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "ID"]);
    for row in &rows {
        table.add_row(vec![Cell::new(&row.name), Cell::new(&row.id)]);
    }
    let title = match kind {
        NamedKind::Account => "Accounts",
        NamedKind::Category => "Categories",
    };
    println!("{title}\n{table}");
    Ok(())
}

pub fn rename(kind: NamedKind, user_id: &str, name: &str, new_name: &str) -> Result<()> {
    let conn = open_db()?;
    let existing = resolve(&conn, user_id, kind, name)?;
    let renamed = kind.rename(&conn, user_id, &existing.id, new_name)?;
    println!("Renamed {} {} to {}", kind.label(), existing.name, renamed.name);
    Ok(())
}

pub fn delete(kind: NamedKind, user_id: &str, name: &str) -> Result<()> {
    let conn = open_db()?;
    let existing = resolve(&conn, user_id, kind, name)?;
    kind.delete(&conn, user_id, &existing.id)?;
    println!("Deleted {}: {}", kind.label(), existing.name);
    Ok(())
}
