//! SQLite batch log
//!
//! One row per batch, one row per sequence. Lets a long capture run be
//! audited afterwards for the sequences whose images are missing or bad.
//! Uses WAL mode so the report tool can read while a batch writes.

use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::{Path, PathBuf};

use crate::batch::{ItemOutcome, ItemResult};

/// Database wrapper for batch outcomes
pub struct BatchDatabase {
    conn: Connection,
}

/// One batch row with totals
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub id: String,
    pub created_at: String,
    pub finished_at: Option<String>,
    pub items: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// One non-successful item
#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub position: u32,
    pub sequence: String,
    pub output_path: PathBuf,
    pub simulation_status: String,
    pub capture_status: String,
}

impl BatchDatabase {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS batches (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                finished_at TEXT,
                config_json TEXT
            );

            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                batch_id TEXT NOT NULL REFERENCES batches(id),
                position INTEGER NOT NULL,
                sequence TEXT NOT NULL,
                output_path BLOB NOT NULL,
                simulation_status TEXT,
                capture_status TEXT,
                success INTEGER NOT NULL,
                skipped INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_batch ON items(batch_id, position);
            CREATE INDEX IF NOT EXISTS idx_items_sequence ON items(sequence);
            "#,
        )?;
        Ok(())
    }

    /// Create a new batch and return its ID
    pub fn create_batch(&self, config_json: Option<&str>) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO batches (id, created_at, config_json) VALUES (?1, ?2, ?3)",
            params![id, created_at, config_json],
        )?;

        Ok(id)
    }

    /// Record one item outcome
    pub fn insert_item(&self, batch_id: &str, position: usize, outcome: &ItemOutcome) -> Result<()> {
        let (simulation, capture) = match &outcome.result {
            ItemResult::Ran {
                simulation,
                capture,
            } => (Some(simulation.to_string()), Some(capture.to_string())),
            ItemResult::Skipped => (None, None),
        };

        self.conn.execute(
            r#"INSERT INTO items
               (batch_id, position, sequence, output_path, simulation_status,
                capture_status, success, skipped)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                batch_id,
                position as i64,
                outcome.sequence.as_str(),
                path_to_blob(&outcome.output_path),
                simulation,
                capture,
                outcome.is_success(),
                outcome.is_skipped(),
            ],
        )?;
        Ok(())
    }

    /// Stamp the batch as finished
    pub fn finish_batch(&self, batch_id: &str) -> Result<()> {
        let finished_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE batches SET finished_at = ?1 WHERE id = ?2",
            params![finished_at, batch_id],
        )?;
        Ok(())
    }

    /// All batches, newest first
    pub fn list_batches(&self) -> Result<Vec<BatchRecord>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT b.id, b.created_at, b.finished_at,
                      COUNT(i.id),
                      COALESCE(SUM(CASE WHEN i.success = 0 AND i.skipped = 0 THEN 1 ELSE 0 END), 0),
                      COALESCE(SUM(i.skipped), 0)
               FROM batches b
               LEFT JOIN items i ON i.batch_id = b.id
               GROUP BY b.id
               ORDER BY b.rowid DESC"#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(BatchRecord {
                id: row.get(0)?,
                created_at: row.get(1)?,
                finished_at: row.get(2)?,
                items: row.get(3)?,
                failed: row.get(4)?,
                skipped: row.get(5)?,
            })
        })?;

        rows.collect()
    }

    /// Most recently created batch, if any
    pub fn latest_batch_id(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT id FROM batches ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn has_batch(&self, batch_id: &str) -> Result<bool> {
        self.conn
            .query_row("SELECT 1 FROM batches WHERE id = ?1", params![batch_id], |_| Ok(()))
            .optional()
            .map(|row| row.is_some())
    }

    /// Items of `batch_id` that neither succeeded nor were skipped, in batch order
    pub fn failed_items(&self, batch_id: &str) -> Result<Vec<FailedItem>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT position, sequence, output_path, simulation_status, capture_status
               FROM items
               WHERE batch_id = ?1 AND success = 0 AND skipped = 0
               ORDER BY position"#,
        )?;

        let rows = stmt.query_map(params![batch_id], |row| {
            Ok(FailedItem {
                position: row.get(0)?,
                sequence: row.get(1)?,
                output_path: path_from_blob(row.get(2)?),
                simulation_status: row.get(3)?,
                capture_status: row.get(4)?,
            })
        })?;

        rows.collect()
    }
}

// Paths are stored as raw OS bytes so a non-UTF-8 destination reads back unchanged
#[cfg(unix)]
fn path_to_blob(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn path_from_blob(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_to_blob(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(not(unix))]
fn path_from_blob(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}
