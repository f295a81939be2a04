//! User Activity Log

use crate::store::Db;
use anyhow::Result;
use chrono::Utc;
use rusqlite::params;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub username: String,
    pub action: String,
    pub timestamp: String,
}

/// Append-only record of notable user actions (registration, login, token
/// refresh, logout). Writes are best-effort: a failed audit row never fails
/// the request that triggered it.
#[derive(Clone)]
pub struct ActivityLog {
    db: Db,
}

impl ActivityLog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn record(&self, username: &str, action: &str) {
        if let Err(e) = self.try_record(username, action) {
            warn!("Failed to record user activity: {:#}", e);
        }
    }

    fn try_record(&self, username: &str, action: &str) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO user_logs (username, action, timestamp) VALUES (?1, ?2, ?3)",
            params![username, action, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn for_user(&self, username: &str) -> Result<Vec<ActivityEntry>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, username, action, timestamp
             FROM user_logs WHERE username = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![username], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    action: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_db;

    #[test]
    fn test_record_and_list() {
        let (db, _file) = test_db();
        let log = ActivityLog::new(db);

        log.record("alice", "Logged in");
        log.record("alice", "Refreshed token");
        log.record("bobby", "Logged in");

        let entries = log.for_user("alice").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "Logged in");
        assert_eq!(entries[1].action, "Refreshed token");
        assert!(!entries[0].timestamp.is_empty());
    }
}
