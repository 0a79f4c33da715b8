use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::new_id;
use crate::error::{Result, TallyError};
use crate::models::{Deleted, NewTransaction, Transaction, TransactionRow};
use crate::named::NamedKind;
use crate::period::DateRange;

#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub range: DateRange,
    pub account_id: Option<String>,
}

pub fn list(conn: &Connection, user_id: &str, filter: &TransactionFilter) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, t.amount, t.payee, t.notes, a.name, t.account_id, c.name, t.category_id \
         FROM transactions t \
         JOIN accounts a ON t.account_id = a.id \
         LEFT JOIN categories c ON t.category_id = c.id \
         WHERE a.user_id = ?1 AND (?2 IS NULL OR t.account_id = ?2) \
         AND t.date >= ?3 AND t.date <= ?4 \
         ORDER BY t.date DESC, t.rowid DESC",
    )?;
    let rows = stmt.query_map(
        params![user_id, filter.account_id, filter.range.start, filter.range.end],
        |row| {
            Ok(TransactionRow {
                id: row.get(0)?,
                date: row.get(1)?,
                amount: row.get(2)?,
                payee: row.get(3)?,
                notes: row.get(4)?,
                account: row.get(5)?,
                account_id: row.get(6)?,
                category: row.get(7)?,
                category_id: row.get(8)?,
            })
        },
    )?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        payee: row.get(3)?,
        notes: row.get(4)?,
        account_id: row.get(5)?,
        category_id: row.get(6)?,
    })
}

pub fn get(conn: &Connection, user_id: &str, id: &str) -> Result<Transaction> {
    conn.query_row(
        "SELECT t.id, t.date, t.amount, t.payee, t.notes, t.account_id, t.category_id \
         FROM transactions t JOIN accounts a ON t.account_id = a.id \
         WHERE t.id = ?1 AND a.user_id = ?2",
        params![id, user_id],
        transaction_from_row,
    )
    .optional()?
    .ok_or(TallyError::NotFound)
}

/// Checks the payload and returns it with payee and notes trimmed.
fn validate(conn: &Connection, user_id: &str, input: &NewTransaction) -> Result<NewTransaction> {
    let payee = input.payee.trim();
    if payee.is_empty() {
        return Err(TallyError::invalid("payee must not be empty"));
    }
    if !NamedKind::Account.exists(conn, user_id, &input.account_id)? {
        return Err(TallyError::invalid(format!("unknown account: {}", input.account_id)));
    }
    if let Some(category_id) = &input.category_id {
        if !NamedKind::Category.exists(conn, user_id, category_id)? {
            return Err(TallyError::invalid(format!("unknown category: {category_id}")));
        }
    }
    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    Ok(NewTransaction {
        payee: payee.to_string(),
        notes,
        ..input.clone()
    })
}

fn insert(conn: &Connection, input: NewTransaction, import_id: Option<i64>) -> Result<Transaction> {
    let id = new_id();
    conn.execute(
        "INSERT INTO transactions (id, amount, payee, notes, date, account_id, category_id, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            input.amount,
            input.payee,
            input.notes,
            input.date,
            input.account_id,
            input.category_id,
            import_id,
        ],
    )?;
    Ok(Transaction {
        id,
        date: input.date,
        amount: input.amount,
        payee: input.payee,
        notes: input.notes,
        account_id: input.account_id,
        category_id: input.category_id,
    })
}

pub fn create(conn: &Connection, user_id: &str, input: &NewTransaction) -> Result<Transaction> {
    let input = validate(conn, user_id, input)?;
    let txn = insert(conn, input, None)?;
    tracing::debug!(id = %txn.id, account_id = %txn.account_id, "transaction created");
    Ok(txn)
}

/// Inserts every row or none of them.
pub fn bulk_create(conn: &mut Connection, user_id: &str, inputs: &[NewTransaction]) -> Result<Vec<Transaction>> {
    let tx = conn.transaction()?;
    let created = insert_batch(&tx, user_id, inputs, None)?;
    tx.commit()?;
    tracing::info!(count = created.len(), "transactions bulk created");
    Ok(created)
}

/// Validate and insert `inputs` on a connection the caller has already
/// opened a transaction on. Errors name the 1-based row.
pub(crate) fn insert_batch(
    conn: &Connection,
    user_id: &str,
    inputs: &[NewTransaction],
    import_id: Option<i64>,
) -> Result<Vec<Transaction>> {
    let mut created = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let input = validate(conn, user_id, input).map_err(|e| match e {
            TallyError::Invalid(msg) => TallyError::Invalid(format!("row {}: {msg}", i + 1)),
            other => other,
        })?;
        created.push(insert(conn, input, import_id)?);
    }
    Ok(created)
}

/// Replaces every field of a transaction the user owns.
pub fn update(conn: &Connection, user_id: &str, id: &str, input: &NewTransaction) -> Result<Transaction> {
    // Ownership is checked against the current account before the new one.
    get(conn, user_id, id)?;
    let input = validate(conn, user_id, input)?;
    conn.execute(
        "UPDATE transactions SET amount = ?1, payee = ?2, notes = ?3, date = ?4, \
         account_id = ?5, category_id = ?6 WHERE id = ?7",
        params![
            input.amount,
            input.payee,
            input.notes,
            input.date,
            input.account_id,
            input.category_id,
            id,
        ],
    )?;
    Ok(Transaction {
        id: id.to_string(),
        date: input.date,
        amount: input.amount,
        payee: input.payee,
        notes: input.notes,
        account_id: input.account_id,
        category_id: input.category_id,
    })
}

const DELETE_OWNED: &str = "DELETE FROM transactions WHERE id = ?1 \
     AND account_id IN (SELECT id FROM accounts WHERE user_id = ?2)";

pub fn delete(conn: &Connection, user_id: &str, id: &str) -> Result<Deleted> {
    if conn.execute(DELETE_OWNED, params![id, user_id])? == 0 {
        return Err(TallyError::NotFound);
    }
    Ok(Deleted { id: id.to_string() })
}

pub fn bulk_delete(conn: &Connection, user_id: &str, ids: &[String]) -> Result<Vec<Deleted>> {
    let mut stmt = conn.prepare(DELETE_OWNED)?;
    let mut deleted = Vec::new();
    for id in ids {
        if stmt.execute(params![id, user_id])? > 0 {
            deleted.push(Deleted { id: id.clone() });
        }
    }
    tracing::debug!(requested = ids.len(), deleted = deleted.len(), "transactions bulk delete");
    Ok(deleted)
}
