//! Short-Link Storage

use crate::store::Db;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

/// A persisted shortened URL owned by exactly one user.
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}

impl LinkRecord {
    /// A link without an expiry, or whose expiry lies ahead, is active.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|e| e > now).unwrap_or(true)
    }
}

#[derive(Clone)]
pub struct LinkStore {
    db: Db,
}

const SELECT_COLS: &str =
    "id, original_url, short_url, click_count, created_at, expires_at, user_id";

impl LinkStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn insert(
        &self,
        original_url: &str,
        short_url: &str,
        expires_at: Option<DateTime<Utc>>,
        user_id: i64,
    ) -> Result<LinkRecord> {
        let created_at = Utc::now();
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO short_links (original_url, short_url, click_count, created_at, expires_at, user_id)
             VALUES (?1, ?2, 0, ?3, ?4, ?5)",
            params![
                original_url,
                short_url,
                created_at.to_rfc3339(),
                expires_at.map(|e| e.to_rfc3339()),
                user_id,
            ],
        )
        .context("Failed to insert short link")?;

        Ok(LinkRecord {
            id: conn.last_insert_rowid(),
            original_url: original_url.to_string(),
            short_url: short_url.to_string(),
            click_count: 0,
            created_at,
            expires_at,
            user_id,
        })
    }

    pub fn find_by_short(&self, short_url: &str) -> Result<Option<LinkRecord>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM short_links WHERE short_url = ?1"
        ))?;
        let link = stmt
            .query_row(params![short_url], row_to_link)
            .optional()
            .context("Failed to query short link")?;
        link.map(RawLink::parse).transpose()
    }

    pub fn for_user(&self, user_id: i64) -> Result<Vec<LinkRecord>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM short_links WHERE user_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_link)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawLink::parse).collect()
    }

    /// Bump the click counter; returns the new count.
    pub fn increment_clicks(&self, id: i64) -> Result<i64> {
        let conn = self.db.lock();
        conn.execute(
            "UPDATE short_links SET click_count = click_count + 1 WHERE id = ?1",
            params![id],
        )?;
        let count = conn.query_row(
            "SELECT click_count FROM short_links WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn update_expiry(&self, id: i64, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "UPDATE short_links SET expires_at = ?1 WHERE id = ?2",
            params![expires_at.map(|e| e.to_rfc3339()), id],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.lock();
        conn.execute("DELETE FROM short_links WHERE id = ?1", params![id])?;
        Ok(())
    }
}

/// Intermediate row shape: timestamps come back as text and are parsed
/// outside the rusqlite callback so parse errors surface as anyhow errors.
struct RawLink {
    id: i64,
    original_url: String,
    short_url: String,
    click_count: i64,
    created_at: String,
    expires_at: Option<String>,
    user_id: i64,
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<RawLink> {
    Ok(RawLink {
        id: row.get(0)?,
        original_url: row.get(1)?,
        short_url: row.get(2)?,
        click_count: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
        user_id: row.get(6)?,
    })
}

impl RawLink {
    fn parse(self) -> Result<LinkRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .context("Bad created_at timestamp in short_links")?
            .with_timezone(&Utc);
        let expires_at = self
            .expires_at
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|d| d.with_timezone(&Utc))
                    .context("Bad expires_at timestamp in short_links")
            })
            .transpose()?;

        Ok(LinkRecord {
            id: self.id,
            original_url: self.original_url,
            short_url: self.short_url,
            click_count: self.click_count,
            created_at,
            expires_at,
            user_id: self.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::store::{testutil::test_db, UserStore};
    use chrono::Duration;

    fn seed_user(db: &Db) -> i64 {
        UserStore::new(db.clone())
            .create("alice", "Passw0rd1", Role::User)
            .unwrap()
            .id
    }

    #[test]
    fn test_insert_and_lookup() {
        let (db, _file) = test_db();
        let user_id = seed_user(&db);
        let store = LinkStore::new(db);

        let link = store
            .insert("https://example.com/long", "https://abc123", None, user_id)
            .unwrap();
        assert_eq!(link.click_count, 0);
        assert!(link.is_active(Utc::now()));

        let found = store.find_by_short("https://abc123").unwrap().unwrap();
        assert_eq!(found.original_url, "https://example.com/long");
        assert!(store.find_by_short("https://zzz").unwrap().is_none());
    }

    #[test]
    fn test_click_counter() {
        let (db, _file) = test_db();
        let user_id = seed_user(&db);
        let store = LinkStore::new(db);
        let link = store
            .insert("https://example.com", "https://abc123", None, user_id)
            .unwrap();

        assert_eq!(store.increment_clicks(link.id).unwrap(), 1);
        assert_eq!(store.increment_clicks(link.id).unwrap(), 2);
    }

    #[test]
    fn test_expiry_update_and_activity() {
        let (db, _file) = test_db();
        let user_id = seed_user(&db);
        let store = LinkStore::new(db);
        let link = store
            .insert("https://example.com", "https://abc123", None, user_id)
            .unwrap();

        let past = Utc::now() - Duration::hours(1);
        store.update_expiry(link.id, Some(past)).unwrap();
        let link = store.find_by_short("https://abc123").unwrap().unwrap();
        assert!(!link.is_active(Utc::now()));

        let future = Utc::now() + Duration::hours(1);
        store.update_expiry(link.id, Some(future)).unwrap();
        let link = store.find_by_short("https://abc123").unwrap().unwrap();
        assert!(link.is_active(Utc::now()));
    }

    #[test]
    fn test_per_user_listing_and_delete() {
        let (db, _file) = test_db();
        let user_id = seed_user(&db);
        let other_id = UserStore::new(db.clone())
            .create("bobby", "Passw0rd1", Role::User)
            .unwrap()
            .id;
        let store = LinkStore::new(db);

        store
            .insert("https://example.com/1", "https://aaa111", None, user_id)
            .unwrap();
        let mine = store
            .insert("https://example.com/2", "https://bbb222", None, user_id)
            .unwrap();
        store
            .insert("https://example.com/3", "https://ccc333", None, other_id)
            .unwrap();

        assert_eq!(store.for_user(user_id).unwrap().len(), 2);
        assert_eq!(store.for_user(other_id).unwrap().len(), 1);

        store.delete(mine.id).unwrap();
        assert_eq!(store.for_user(user_id).unwrap().len(), 1);
    }
}
