use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::classify::Thresholds;
use crate::error::EigaError;
use crate::models::{CatalogEntry, UNKNOWN_YEAR};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// Persisted settings keys for the confidence thresholds.
pub const HIGH_CONF_KEY: &str = "high_conf";
pub const LOW_CONF_KEY: &str = "low_conf";

/// SQLite-backed storage for the catalog, junk words, and settings.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, EigaError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, EigaError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Catalog ─────────────────────────────────────────────────

    /// Insert a catalog entry, returning its auto-generated ID.
    ///
    /// An empty year is stored as "Unknown". Duplicate titles are allowed.
    pub fn insert_movie(&self, title: &str, year: &str, file_ref: &str) -> Result<i64, EigaError> {
        let year = if year.trim().is_empty() {
            UNKNOWN_YEAR
        } else {
            year
        };
        self.conn.execute(
            "INSERT INTO movies (title, year, file_ref) VALUES (?1, ?2, ?3)",
            params![title, year, file_ref],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// First catalog entry whose title contains the query, case-insensitive.
    pub fn find_movie(&self, query: &str) -> Result<Option<CatalogEntry>, EigaError> {
        let pattern = format!("%{query}%");
        self.conn
            .query_row(
                "SELECT id, title, year, file_ref FROM movies
                 WHERE title LIKE ?1 ORDER BY id LIMIT 1",
                params![pattern],
                |row| {
                    Ok(CatalogEntry {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        year: row.get(2)?,
                        file_ref: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Number of catalog entries.
    pub fn movie_count(&self) -> Result<i64, EigaError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ── Junk words ──────────────────────────────────────────────

    /// Add a junk word. Duplicates are not rejected.
    pub fn add_junk_word(&self, word: &str) -> Result<(), EigaError> {
        self.conn
            .execute("INSERT INTO junk_words (word) VALUES (?1)", params![word])?;
        Ok(())
    }

    /// Remove a junk word. Returns the number of rows deleted (all
    /// duplicates go at once).
    pub fn remove_junk_word(&self, word: &str) -> Result<usize, EigaError> {
        let n = self
            .conn
            .execute("DELETE FROM junk_words WHERE word = ?1", params![word])?;
        Ok(n)
    }

    /// All junk words, in insertion order.
    pub fn junk_words(&self) -> Result<Vec<String>, EigaError> {
        let mut stmt = self
            .conn
            .prepare("SELECT word FROM junk_words ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ── Settings ────────────────────────────────────────────────

    /// Set a settings value, replacing any existing one.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), EigaError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Get a settings value, or `None` if unset.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, EigaError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Load the confidence thresholds from settings, falling back to the
    /// given defaults for missing keys. A persisted pair that fails
    /// validation (e.g. high < low) falls back entirely, with a warning.
    pub fn load_thresholds(&self, defaults: Thresholds) -> Result<Thresholds, EigaError> {
        let high = self
            .get_setting(HIGH_CONF_KEY)?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(defaults.high);
        let low = self
            .get_setting(LOW_CONF_KEY)?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(defaults.low);

        match Thresholds::new(high, low) {
            Ok(t) => Ok(t),
            Err(e) => {
                warn!(%e, "persisted thresholds invalid, using defaults");
                Ok(defaults)
            }
        }
    }

    /// Persist the confidence thresholds.
    pub fn save_thresholds(&self, thresholds: &Thresholds) -> Result<(), EigaError> {
        self.set_setting(HIGH_CONF_KEY, &thresholds.high.to_string())?;
        self.set_setting(LOW_CONF_KEY, &thresholds.low.to_string())?;
        Ok(())
    }
}

// ── Migrations ──────────────────────────────────────────────────

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), EigaError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}
