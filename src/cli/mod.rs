pub mod backup;
pub mod demo;
pub mod import;
pub mod init;
pub mod named;
pub mod serve;
pub mod status;
pub mod summary;
pub mod token;
pub mod transactions;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{Result, TallyError};
use crate::importer::DEFAULT_DATE_FORMAT;
use crate::models::Named;
use crate::named::NamedKind;
use crate::settings::{get_db_path, Settings, AUTH_SECRET_ENV};

/// Open the configured database, failing if `tally init` has not run.
pub(crate) fn open_db() -> Result<Connection> {
    let db_path = get_db_path();
    if !db_path.exists() {
        return Err(TallyError::Other(
            "No database found. Run `tally init` first.".to_string(),
        ));
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

/// Look up an account or category by name, then by id.
pub(crate) fn resolve(conn: &Connection, user_id: &str, kind: NamedKind, key: &str) -> Result<Named> {
    if let Some(found) = kind.find_by_name(conn, user_id, key)? {
        return Ok(found);
    }
    match kind.get(conn, user_id, key) {
        Err(TallyError::NotFound) => Err(match kind {
            NamedKind::Account => TallyError::UnknownAccount(key.to_string()),
            NamedKind::Category => TallyError::UnknownCategory(key.to_string()),
        }),
        other => other,
    }
}

pub(crate) fn auth_secret(settings: &Settings) -> Result<String> {
    settings.resolved_auth_secret().ok_or_else(|| {
        TallyError::Settings(format!(
            "no auth secret configured; set {AUTH_SECRET_ENV} or auth_secret in settings.json"
        ))
    })
}

#[derive(Parser)]
#[command(name = "tally", about = "Personal finance tracker: accounts, transactions and summaries.")]
pub struct Cli {
    /// User id to act as (default: user_id from settings)
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Tally: choose a data directory and initialize the database.
    Init {
        /// Path for Tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: NamedCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: NamedCommands,
    },
    /// List, add and delete transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Import transactions from a CSV file using a column mapping.
    Import(ImportArgs),
    /// Income, expenses and remaining balance for a period.
    Summary {
        /// Start date: YYYY-MM-DD (default: 30 days before --to)
        #[arg(long)]
        from: Option<String>,
        /// End date: YYYY-MM-DD (default: today)
        #[arg(long)]
        to: Option<String>,
        /// Limit to one account (name or id)
        #[arg(long)]
        account: Option<String>,
    },
    /// Run the HTTP API.
    Serve {
        /// Listen host (default: server.host from settings)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (default: server.port from settings)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Mint a bearer token for the API.
    Token {
        /// Hours until the token expires
        #[arg(long, default_value = "24")]
        hours: u64,
    },
    /// Show current database and summary statistics.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/tally-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Load sample accounts, categories and transactions.
    Demo,
}

#[derive(Subcommand)]
pub enum NamedCommands {
    /// Add a new entry.
    Add {
        name: String,
    },
    /// List all entries.
    List,
    /// Rename an entry.
    Rename {
        /// Current name or id
        name: String,
        /// New name
        new_name: String,
    },
    /// Delete an entry.
    Delete {
        /// Name or id
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions for a period.
    List {
        /// Start date: YYYY-MM-DD (default: 30 days before --to)
        #[arg(long)]
        from: Option<String>,
        /// End date: YYYY-MM-DD (default: today)
        #[arg(long)]
        to: Option<String>,
        /// Filter by account (name or id)
        #[arg(long)]
        account: Option<String>,
    },
    /// Record a single transaction.
    Add(AddTransactionArgs),
    /// Delete a transaction by id.
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct AddTransactionArgs {
    /// Account name or id
    #[arg(long)]
    pub account: String,
    #[arg(long)]
    pub payee: String,
    /// Amount in currency units; negative for spending
    #[arg(long, allow_hyphen_values = true)]
    pub amount: f64,
    /// Date: YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Category name or id
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to CSV file; the first row must be headers
    pub file: String,
    /// Print the header row with column indices and exit
    #[arg(long)]
    pub preview: bool,
    /// Account name or id to import into
    #[arg(long, required_unless_present = "preview")]
    pub account: Option<String>,
    /// Zero-based column holding the amount
    #[arg(long = "amount-column")]
    pub amount_column: Option<usize>,
    /// Zero-based column holding the date
    #[arg(long = "date-column")]
    pub date_column: Option<usize>,
    /// Zero-based column holding the payee
    #[arg(long = "payee-column")]
    pub payee_column: Option<usize>,
    /// Column assignment applied after the --*-column flags, e.g. 3=amount or 1=skip
    #[arg(long = "map", value_name = "COLUMN=FIELD")]
    pub map: Vec<String>,
    /// chrono format of the date column
    #[arg(long = "date-format", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,
}
