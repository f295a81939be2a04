//! SQLite Persistence Layer
//! Mission: One WAL-mode database behind a single guarded connection
//!
//! All cross-request and cross-task coordination goes through SQLite's
//! transactional guarantees; the application adds no locking of its own
//! beyond the connection mutex.

pub mod activity;
pub mod blacklist;
pub mod links;
pub mod notes;
pub mod users;

pub use activity::ActivityLog;
pub use blacklist::BlacklistStore;
pub use links::LinkStore;
pub use notes::NoteStore;
pub use users::UserStore;

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tracing::info;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    login TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS short_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    original_url TEXT NOT NULL,
    short_url TEXT NOT NULL UNIQUE,
    click_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    expires_at TEXT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_short_links_user
    ON short_links(user_id);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    owner TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_owner
    ON notes(owner);

-- Tokens revoked before their natural expiry. The unique column makes
-- re-blacklisting the same string an INSERT OR IGNORE no-op.
CREATE TABLE IF NOT EXISTS blacklisted_tokens (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_blacklisted_tokens_expiry
    ON blacklisted_tokens(expires_at);

CREATE TABLE IF NOT EXISTS user_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    action TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
"#;

/// Shared handle to the application database. Cheap to clone; every store
/// holds one.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database file and apply the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // the parking_lot mutex is the lock

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to apply database schema")?;

        info!("Database ready at {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}
