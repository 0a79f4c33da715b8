use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{Result, TallyError};
use crate::fmt::checked_milliunits;
use crate::models::{ImportRecord, NewTransaction};
use crate::period::DATE_FORMAT;
use crate::transactions;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Target fields and column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportField {
    Amount,
    Date,
    Payee,
}

impl ImportField {
    pub const ALL: [ImportField; 3] = [Self::Amount, Self::Date, Self::Payee];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Date => "date",
            Self::Payee => "payee",
        }
    }

    /// Parse a field key; `skip` and the empty string mean "no field".
    pub fn parse(key: &str) -> Result<Option<Self>> {
        match key.trim().to_ascii_lowercase().as_str() {
            "amount" => Ok(Some(Self::Amount)),
            "date" => Ok(Some(Self::Date)),
            "payee" => Ok(Some(Self::Payee)),
            "skip" | "" => Ok(None),
            other => Err(TallyError::invalid(format!(
                "unknown import field '{other}' (expected amount, date, payee or skip)"
            ))),
        }
    }
}

/// Which column feeds which field. Each field is held by at most one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<usize, ImportField>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `field` to `column`, taking it away from any other column.
    /// `None` clears the column.
    pub fn assign(&mut self, column: usize, field: Option<ImportField>) {
        if let Some(field) = field {
            self.columns.retain(|_, f| *f != field);
            self.columns.insert(column, field);
        } else {
            self.columns.remove(&column);
        }
    }

    pub fn field_for(&self, column: usize) -> Option<ImportField> {
        self.columns.get(&column).copied()
    }

    pub fn column_for(&self, field: ImportField) -> Option<usize> {
        self.columns
            .iter()
            .find_map(|(col, f)| (*f == field).then_some(*col))
    }

    /// Number of fields assigned so far, out of `ImportField::ALL.len()`.
    pub fn progress(&self) -> usize {
        self.columns.len()
    }

    pub fn is_complete(&self) -> bool {
        ImportField::ALL.iter().all(|f| self.column_for(*f).is_some())
    }

    pub fn missing(&self) -> Vec<&'static str> {
        ImportField::ALL
            .iter()
            .filter(|f| self.column_for(**f).is_none())
            .map(|f| f.key())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a display-unit amount. Tolerates thousands separators, a dollar
/// sign, wrapping quotes and accounting-style parentheses for negatives.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.trim().parse::<f64>().ok().map(|v| -v),
        None => s.parse::<f64>().ok(),
    };
    value.filter(|v| v.is_finite())
}

/// Parse `raw` with `format`, falling back to a bare ISO date.
pub fn parse_import_date(raw: &str, format: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, format)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(raw, format))
        .or_else(|_| NaiveDate::parse_from_str(raw, DATE_FORMAT))
        .ok()
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Table → mapped rows
// ---------------------------------------------------------------------------

/// An uploaded CSV: first row is headers, the rest is data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();
        let headers = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };
        let mut body = Vec::new();
        for record in records {
            body.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, body })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

/// A data row after projection and type coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub date: NaiveDate,
    pub payee: String,
    /// Milliunits.
    pub amount: i64,
}

impl MappedRow {
    pub fn into_new_transaction(self, account_id: &str) -> NewTransaction {
        NewTransaction {
            date: self.date,
            account_id: account_id.to_string(),
            category_id: None,
            payee: self.payee,
            amount: self.amount,
            notes: None,
        }
    }
}

/// Project every body row through `mapping` and coerce its cells.
///
/// Rows with no cell in any mapped column are dropped. Row numbers in errors
/// are 1-based data rows (the header row is not counted).
pub fn map_rows(table: &CsvTable, mapping: &ColumnMapping, date_format: &str) -> Result<Vec<MappedRow>> {
    if !mapping.is_complete() {
        return Err(TallyError::invalid(format!(
            "column mapping incomplete ({}/{}), missing: {}",
            mapping.progress(),
            ImportField::ALL.len(),
            mapping.missing().join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (i, record) in table.body.iter().enumerate() {
        let row_no = i + 1;
        let cells: BTreeMap<ImportField, &str> = record
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| mapping.field_for(col).map(|f| (f, cell.as_str())))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let raw_amount = cells.get(&ImportField::Amount).copied().unwrap_or("");
        let amount = parse_amount(raw_amount).and_then(checked_milliunits).ok_or_else(|| {
            TallyError::invalid(format!("row {row_no}: invalid amount '{raw_amount}'"))
        })?;

        let raw_date = cells.get(&ImportField::Date).copied().unwrap_or("");
        let date = parse_import_date(raw_date, date_format).ok_or_else(|| {
            TallyError::invalid(format!(
                "row {row_no}: date '{raw_date}' does not match format '{date_format}'"
            ))
        })?;

        let payee = cells.get(&ImportField::Payee).copied().unwrap_or("").trim().to_string();

        rows.push(MappedRow {
            date,
            payee,
            amount,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicate_file: bool,
}

fn record_import(conn: &Connection, record: &ImportRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO imports (filename, account_id, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            record.filename,
            record.account_id,
            record.record_count,
            record.date_range_start,
            record.date_range_end,
            record.checksum,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Map a CSV file and bulk insert it into `account_id`. A file whose
/// checksum was already imported into the same account is skipped.
pub fn import_file(
    conn: &mut Connection,
    user_id: &str,
    file_path: &Path,
    account_id: &str,
    mapping: &ColumnMapping,
    date_format: &str,
) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND account_id = ?2")?;
        if stmt.exists(rusqlite::params![checksum, account_id])? {
            tracing::info!(file = %file_path.display(), "file already imported, skipping");
            return Ok(ImportResult {
                imported: 0,
                duplicate_file: true,
            });
        }
    }

    let table = CsvTable::from_path(file_path)?;
    let mapped = map_rows(&table, mapping, date_format)?;

    let record = ImportRecord {
        filename: file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        account_id: account_id.to_string(),
        record_count: Some(mapped.len() as i64),
        date_range_start: mapped.iter().map(|r| r.date).min().map(|d| d.to_string()),
        date_range_end: mapped.iter().map(|r| r.date).max().map(|d| d.to_string()),
        checksum: Some(checksum),
    };

    let inputs: Vec<NewTransaction> = mapped
        .into_iter()
        .map(|row| row.into_new_transaction(account_id))
        .collect();

    // The import row and its transactions commit together.
    let tx = conn.transaction()?;
    let import_id = record_import(&tx, &record)?;
    let created = transactions::insert_batch(&tx, user_id, &inputs, Some(import_id))?;
    tx.commit()?;

    tracing::info!(
        file = %record.filename,
        %account_id,
        imported = created.len(),
        "csv import complete"
    );

    Ok(ImportResult {
        imported: created.len(),
        duplicate_file: false,
    })
}
