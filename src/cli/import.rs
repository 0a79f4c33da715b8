use std::path::Path;

use comfy_table::{Cell, Table};

use super::{open_db, resolve, ImportArgs};
use crate::error::{Result, TallyError};
use crate::importer::{import_file, ColumnMapping, CsvTable, ImportField};
use crate::named::NamedKind;

pub fn run(user_id: &str, args: &ImportArgs) -> Result<()> {
    let file_path = Path::new(&args.file);
    if args.preview {
        return preview(file_path);
    }

    let account_key = args
        .account
        .as_deref()
        .ok_or_else(|| TallyError::invalid("--account is required"))?;

    let mapping = build_mapping(args)?;

    let mut conn = open_db()?;
    let account = resolve(&conn, user_id, NamedKind::Account, account_key)?;
    let result = import_file(
        &mut conn,
        user_id,
        file_path,
        &account.id,
        &mapping,
        &args.date_format,
    )?;

    if result.duplicate_file {
        println!("This file has already been imported into {} (duplicate checksum).", account.name);
        return Ok(());
    }
    println!("{} imported into {}", result.imported, account.name);
    Ok(())
}

fn build_mapping(args: &ImportArgs) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::new();
    for (column, field) in [
        (args.amount_column, ImportField::Amount),
        (args.date_column, ImportField::Date),
        (args.payee_column, ImportField::Payee),
    ] {
        if let Some(column) = column {
            mapping.assign(column, Some(field));
        }
    }
    for entry in &args.map {
        let (column, field) = entry
            .split_once('=')
            .ok_or_else(|| TallyError::invalid(format!("--map expects COLUMN=FIELD, got '{entry}'")))?;
        let column: usize = column
            .trim()
            .parse()
            .map_err(|_| TallyError::invalid(format!("invalid column index '{column}'")))?;
        mapping.assign(column, ImportField::parse(field)?);
    }
    Ok(mapping)
}

/// Show the header row with column indices and the first data row.
fn preview(file_path: &Path) -> Result<()> {
    let csv = CsvTable::from_path(file_path)?;
    if csv.headers.is_empty() {
        return Err(TallyError::invalid(format!("{} is empty", file_path.display())));
    }
    let first = csv.body.first();

    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "First row"]);
    for (i, header) in csv.headers.iter().enumerate() {
        let sample = first.and_then(|row| row.get(i)).map(String::as_str).unwrap_or("");
        table.add_row(vec![Cell::new(i), Cell::new(header), Cell::new(sample)]);
    }
    println!("{table}");
    println!("{} data row(s)", csv.body.len());
    Ok(())
}
