use crate::schema::{FOLD_CASE_FN, SCHEMA};
use indexmap::IndexMap;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Text shown for a flower that has no care entry.
pub const NO_INFO: &str = "No info.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("care guide storage failed: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("failed to encode care guide json: {0}")]
    Json(serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("flower name must not be empty")]
    EmptyName,
    #[error("care text must not be empty")]
    EmptyCare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareEntry {
    pub name: String,
    pub care: String,
}

/// Durable flower name to care text mapping backed by a single SQLite table.
///
/// Names keep their original casing on disk; lookups and searches compare
/// case-folded names.
pub struct CareGuideStore {
    conn: Connection,
}

impl CareGuideStore {
    pub fn open(path: &Path) -> Result<CareGuideStore, StoreError> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened care guide");
        CareGuideStore::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<CareGuideStore, StoreError> {
        CareGuideStore::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<CareGuideStore, StoreError> {
        register_fold_case(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(CareGuideStore { conn })
    }

    /// Seeds `defaults` without touching rows that already exist, so a user's
    /// edit of a built-in flower survives every restart. Returns how many rows
    /// were newly inserted. Nothing is written unless every pair is valid.
    pub fn initialize(&mut self, defaults: &IndexMap<String, String>) -> Result<usize, StoreError> {
        let mut validated = Vec::with_capacity(defaults.len());
        for (name, care) in defaults {
            validated.push((validate(name, care)?, care.as_str()));
        }

        let tx = self.conn.transaction()?;
        let mut seeded = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO flowers (name, care) VALUES (?1, ?2)")?;
            for (name, care) in &validated {
                seeded += stmt.execute(params![name, care])?;
            }
        }
        tx.commit()?;
        debug!(seeded, total = defaults.len(), "seeded care guide defaults");
        Ok(seeded)
    }

    /// Case-insensitive exact match. `Ok(None)` means the flower is unknown.
    pub fn lookup(&self, name: &str) -> Result<Option<String>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let care = self
            .conn
            .query_row(
                "SELECT care FROM flowers \
                 WHERE fold_case(name) = ?1 \
                 ORDER BY name = ?2 DESC, rowid \
                 LIMIT 1",
                params![fold(name), name],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(care.flatten())
    }

    /// Inserts a new entry or replaces the entry stored under exactly `name`.
    pub fn upsert(&self, name: &str, care: &str) -> Result<(), StoreError> {
        let name = validate(name, care)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO flowers (name, care) VALUES (?1, ?2)",
            params![name, care],
        )?;
        debug!(name, "stored care entry");
        Ok(())
    }

    /// Names containing `query`, compared case-insensitively. A blank query
    /// matches nothing.
    pub fn search(&self, query: &str) -> Result<Vec<String>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT name FROM flowers \
             WHERE instr(fold_case(name), ?1) > 0 \
             ORDER BY fold_case(name), name",
        )?;
        let rows = stmt.query_map([fold(query)], |row| row.get::<_, String>(0))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn list(&self) -> Result<Vec<CareEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, care FROM flowers \
             WHERE care IS NOT NULL \
             ORDER BY fold_case(name), name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CareEntry {
                name: row.get(0)?,
                care: row.get(1)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flowers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn export_json(&self, writer: impl Write) -> Result<(), StoreError> {
        let entries = self.list()?;
        serde_json::to_writer_pretty(writer, &entries).map_err(StoreError::Json)?;
        Ok(())
    }

    /// Upserts every entry of a JSON array in one transaction. Nothing is
    /// written unless every entry passes validation.
    pub fn import_json(&mut self, reader: impl Read) -> Result<usize, StoreError> {
        let entries: Vec<CareEntry> = serde_json::from_reader(reader).map_err(StoreError::Json)?;
        let mut validated = Vec::with_capacity(entries.len());
        for entry in &entries {
            validated.push((validate(&entry.name, &entry.care)?, entry.care.as_str()));
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO flowers (name, care) VALUES (?1, ?2)")?;
            for (name, care) in &validated {
                stmt.execute(params![name, care])?;
            }
        }
        tx.commit()?;
        debug!(imported = validated.len(), "imported care entries");
        Ok(validated.len())
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, err)| StoreError::Persistence(err))
    }
}

fn register_fold_case(conn: &Connection) -> Result<(), StoreError> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|value| fold(&value)))
        },
    )?;
    Ok(())
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

fn validate<'a>(name: &'a str, care: &str) -> Result<&'a str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if care.trim().is_empty() {
        return Err(ValidationError::EmptyCare);
    }
    Ok(name)
}
