//! Token Blacklist
//! Mission: Revoked refresh tokens stay dead until they would have expired
//!
//! Entries carry the revoked token's own expiry as a unix timestamp so the
//! periodic sweep can drop rows with a single comparison in SQL.

use crate::store::Db;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// A revoked token as exposed to the admin listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistedToken {
    pub id: i64,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct BlacklistStore {
    db: Db,
}

impl BlacklistStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Record a token as revoked for the remainder of its lifetime.
    /// Blacklisting the same token twice is a no-op.
    pub fn blacklist(&self, token: &str, remaining_ttl: Duration) -> Result<()> {
        let expires_at = Utc::now().timestamp() + remaining_ttl.as_secs() as i64;
        let conn = self.db.lock();
        conn.execute(
            "INSERT OR IGNORE INTO blacklisted_tokens (token, expires_at) VALUES (?1, ?2)",
            params![token, expires_at],
        )
        .context("Failed to blacklist token")?;
        Ok(())
    }

    pub fn is_blacklisted(&self, token: &str) -> Result<bool> {
        let conn = self.db.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM blacklisted_tokens WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drop entries whose underlying token has expired on its own; returns
    /// the number of rows removed. Safe to call repeatedly.
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let conn = self.db.lock();
        let removed = conn
            .execute(
                "DELETE FROM blacklisted_tokens WHERE expires_at <= ?1",
                params![now],
            )
            .context("Failed to sweep expired blacklist entries")?;
        if removed > 0 {
            info!("Swept {} expired blacklist entries", removed);
        }
        Ok(removed)
    }

    pub fn list_all(&self) -> Result<Vec<BlacklistedToken>> {
        let conn = self.db.lock();
        let mut stmt =
            conn.prepare("SELECT id, token, expires_at FROM blacklisted_tokens ORDER BY id")?;
        let tokens = stmt
            .query_map([], |row| {
                Ok(BlacklistedToken {
                    id: row.get(0)?,
                    token: row.get(1)?,
                    expires_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tokens)
    }
}
