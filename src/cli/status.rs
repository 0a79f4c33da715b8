use rusqlite::params;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{load_settings, settings_path};

pub fn run(user_id: &str) -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:       {user_id}");
    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!(
        "Auth:       {}",
        if settings.resolved_auth_secret().is_some() { "secret configured" } else { "(no secret)" }
    );

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let count = |sql: &str| -> rusqlite::Result<i64> {
            conn.query_row(sql, params![user_id], |r| r.get(0))
        };
        let accounts = count("SELECT count(*) FROM accounts WHERE user_id = ?1")?;
        let categories = count("SELECT count(*) FROM categories WHERE user_id = ?1")?;
        let transactions = count(
            "SELECT count(*) FROM transactions t JOIN accounts a ON t.account_id = a.id \
             WHERE a.user_id = ?1",
        )?;
        let imports = count(
            "SELECT count(*) FROM imports i JOIN accounts a ON i.account_id = a.id \
             WHERE a.user_id = ?1",
        )?;

        println!();
        println!("Accounts:      {accounts}");
        println!("Categories:    {categories}");
        println!("Transactions:  {transactions}");
        println!("Imports:       {imports}");
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }

    Ok(())
}
