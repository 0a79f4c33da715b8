//! Accounts and categories: user-owned names sharing one set of operations.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::new_id;
use crate::error::{Result, TallyError};
use crate::models::{Deleted, Named};

// ---------------------------------------------------------------------------
// Kind: enum dispatch over the two tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Account,
    Category,
}

impl NamedKind {
    fn table(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Category => "categories",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Category => "category",
        }
    }

    pub fn list(&self, conn: &Connection, user_id: &str) -> Result<Vec<Named>> {
        let sql = format!(
            "SELECT id, name FROM {} WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, id",
            self.table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(Named {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get(&self, conn: &Connection, user_id: &str, id: &str) -> Result<Named> {
        let sql = format!(
            "SELECT id, name FROM {} WHERE id = ?1 AND user_id = ?2",
            self.table()
        );
        conn.query_row(&sql, params![id, user_id], |row| {
            Ok(Named {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?
        .ok_or(TallyError::NotFound)
    }

    pub fn exists(&self, conn: &Connection, user_id: &str, id: &str) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1 AND user_id = ?2", self.table());
        Ok(conn.prepare_cached(&sql)?.exists(params![id, user_id])?)
    }

    /// Case-insensitive lookup used by the CLI, which addresses rows by name.
    pub fn find_by_name(&self, conn: &Connection, user_id: &str, name: &str) -> Result<Option<Named>> {
        let sql = format!(
            "SELECT id, name FROM {} WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE \
             ORDER BY name, id LIMIT 1",
            self.table()
        );
        Ok(conn
            .query_row(&sql, params![user_id, name.trim()], |row| {
                Ok(Named {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?)
    }

    pub fn create(&self, conn: &Connection, user_id: &str, name: &str) -> Result<Named> {
        let name = self.validate_name(name)?;
        let id = new_id();
        let sql = format!("INSERT INTO {} (id, name, user_id) VALUES (?1, ?2, ?3)", self.table());
        conn.execute(&sql, params![id, name, user_id])?;
        tracing::debug!(kind = self.label(), %id, "created");
        Ok(Named { id, name })
    }

    pub fn rename(&self, conn: &Connection, user_id: &str, id: &str, name: &str) -> Result<Named> {
        let name = self.validate_name(name)?;
        let sql = format!(
            "UPDATE {} SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            self.table()
        );
        if conn.execute(&sql, params![name, id, user_id])? == 0 {
            return Err(TallyError::NotFound);
        }
        Ok(Named {
            id: id.to_string(),
            name,
        })
    }

    pub fn delete(&self, conn: &Connection, user_id: &str, id: &str) -> Result<Deleted> {
        let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", self.table());
        if conn.execute(&sql, params![id, user_id])? == 0 {
            return Err(TallyError::NotFound);
        }
        tracing::debug!(kind = self.label(), %id, "deleted");
        Ok(Deleted { id: id.to_string() })
    }

    /// Deletes whichever of `ids` the user owns; the rest are ignored.
    pub fn bulk_delete(&self, conn: &Connection, user_id: &str, ids: &[String]) -> Result<Vec<Deleted>> {
        let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", self.table());
        let mut stmt = conn.prepare(&sql)?;
        let mut deleted = Vec::new();
        for id in ids {
            if stmt.execute(params![id, user_id])? > 0 {
                deleted.push(Deleted { id: id.clone() });
            }
        }
        tracing::debug!(kind = self.label(), requested = ids.len(), deleted = deleted.len(), "bulk delete");
        Ok(deleted)
    }

    fn validate_name(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::invalid(format!("{} name must not be empty", self.label())));
        }
        Ok(name.to_string())
    }
}
