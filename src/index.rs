//! Photo Exporter - Asset Index
//!
//! SQLite table of the assets stored in a directory-backed library.

use std::path::Path;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::library::LibraryError;

/// Stored asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    /// Local identifier handed out as placeholder
    pub id: String,
    /// File name under `assets/`
    pub file_name: String,
    pub uniform_type_identifier: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Asset index database
pub struct AssetIndex {
    conn: Mutex<Connection>,
}

impl AssetIndex {
    /// Open or create the index under `root/db/`
    pub fn open(root: &Path) -> Result<Self, LibraryError> {
        let db_dir = root.join("db");
        std::fs::create_dir_all(&db_dir)?;

        let conn = Connection::open(db_dir.join("index.db"))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                uniform_type TEXT NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_created ON assets(created_at);
            "#,
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert `records` and run `publish` inside one transaction.
    /// Nothing is committed unless both succeed.
    pub fn insert_all<F>(&self, records: &[AssetRecord], publish: F) -> Result<(), LibraryError>
    where
        F: FnOnce() -> Result<(), LibraryError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        for record in records {
            tx.execute(
                "INSERT INTO assets (id, file_name, uniform_type, size, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.file_name,
                    record.uniform_type_identifier,
                    record.size as i64,
                    record.created_at.to_rfc3339(),
                ],
            )?;
        }

        publish()?;
        tx.commit()?;
        Ok(())
    }

    /// All assets, newest first
    pub fn list_all(&self) -> Result<Vec<AssetRecord>, LibraryError> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, file_name, uniform_type, size, created_at FROM assets ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, file_name, uniform_type_identifier, size, created_at) = row?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| LibraryError::Database(format!("bad timestamp for {id}: {e}")))?
                .with_timezone(&Utc);

            records.push(AssetRecord {
                id,
                file_name,
                uniform_type_identifier,
                size: size.max(0) as u64,
                created_at,
            });
        }

        Ok(records)
    }
}
