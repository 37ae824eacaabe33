//! The Library persists the photo catalog in a SQLite database.
//!
//! The whole collection is stored as one JSON value under a single key of a
//! small key-value table, so a session can be reloaded wholesale at startup.
//! Losing the database between sessions is tolerated: loading anything it
//! cannot read or parse yields an empty collection, never an error.

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::image::{ImageModel, MAX_RATING};
use crate::error::Result;

/// The catalog key holding the serialized collection.
const COLLECTION_KEY: &str = "image-collection";

/// One persisted photo record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredImage {
    path: PathBuf,
    caption: String,
    /// Unix seconds, local time zone on load.
    modification_date: i64,
    rating: u8,
}

/// The catalog database.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Opens (or creates) the catalog database in the user's data directory:
    /// - Linux: ~/.local/share/fotag/fotag.db
    /// - macOS: ~/Library/Application Support/fotag/fotag.db
    /// - Windows: %APPDATA%\fotag\fotag.db
    pub fn new() -> Result<Self> {
        let db_path = Self::db_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;
        info!("catalog database at {}", db_path.display());

        let library = Library { conn, db_path };
        library.init_schema()?;
        Ok(library)
    }

    /// An in-memory catalog, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Opens the catalog at an explicit location.
    pub fn open_at(db_path: PathBuf) -> Result<Self> {
        let library = Library {
            conn: Connection::open(&db_path)?,
            db_path,
        };
        library.init_schema()?;
        Ok(library)
    }

    fn db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");
        path.push("fotag");
        path.push("fotag.db");
        path
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS catalog (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Writes the whole collection, replacing whatever was stored before.
    pub fn store(&self, images: &[ImageModel]) -> Result<()> {
        let records: Vec<StoredImage> = images
            .iter()
            .map(|image| StoredImage {
                path: image.path(),
                caption: image.caption(),
                modification_date: image.modification_date().timestamp(),
                rating: image.rating(),
            })
            .collect();

        let value = serde_json::to_string(&records)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO catalog (key, value) VALUES (?1, ?2)",
            rusqlite::params![COLLECTION_KEY, value],
        )?;
        Ok(())
    }

    /// Loads the persisted collection. Anything unreadable degrades to an
    /// empty collection: a missing key (first run), an unreadable row, or
    /// unparsable JSON. A record with an out-of-range rating is dropped
    /// individually; the rest of the collection survives.
    pub fn load(&self) -> Vec<ImageModel> {
        let value: Option<String> = match self
            .conn
            .query_row(
                "SELECT value FROM catalog WHERE key = ?1",
                [COLLECTION_KEY],
                |row| row.get(0),
            )
            .optional()
        {
            Ok(value) => value,
            Err(e) => {
                warn!("could not read stored collection, starting empty: {e}");
                return Vec::new();
            }
        };

        let Some(value) = value else {
            return Vec::new();
        };

        let records: Vec<StoredImage> = match serde_json::from_str(&value) {
            Ok(records) => records,
            Err(e) => {
                warn!("stored collection is malformed, starting empty: {e}");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| {
                if record.rating > MAX_RATING {
                    warn!(
                        "dropping stored record {} with rating {}",
                        record.path.display(),
                        record.rating
                    );
                    return None;
                }
                let date = Local
                    .timestamp_opt(record.modification_date, 0)
                    .single()
                    .unwrap_or_else(Local::now);
                ImageModel::new(record.path, record.caption, date, record.rating).ok()
            })
            .collect()
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
