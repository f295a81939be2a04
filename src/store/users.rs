//! User Storage
//! Mission: Persist accounts with bcrypt-hashed passwords and a role

use crate::{auth::models::Role, store::Db};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use rusqlite::{params, OptionalExtension};
use tracing::info;

/// A persisted user row. The hash never leaves the store layer except for
/// verification.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a new user. The caller is responsible for lowercasing the
    /// login and for pre-checking duplicates if it wants a clean conflict
    /// answer; a race on the unique column still surfaces as an error here.
    pub fn create(&self, login: &str, password: &str, role: Role) -> Result<UserRecord> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO users (login, password_hash, role) VALUES (?1, ?2, ?3)",
            params![login, password_hash, role.as_str()],
        )
        .context("Failed to insert user")?;
        let id = conn.last_insert_rowid();

        info!("New user registered: {} ({})", login, role.as_str());

        Ok(UserRecord {
            id,
            login: login.to_string(),
            password_hash,
            role,
        })
    }

    /// Case-insensitive lookup by login.
    pub fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, login, password_hash, role
             FROM users WHERE login = ?1 COLLATE NOCASE",
        )?;

        let user = stmt
            .query_row(params![login], |row| {
                let role_str: String = row.get(3)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    role_str,
                ))
            })
            .optional()?;

        match user {
            Some((id, login, password_hash, role_str)) => {
                let role = Role::from_str(&role_str)
                    .with_context(|| format!("Unknown role in users table: {}", role_str))?;
                Ok(Some(UserRecord {
                    id,
                    login,
                    password_hash,
                    role,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn exists(&self, login: &str) -> Result<bool> {
        Ok(self.find_by_login(login)?.is_some())
    }

    /// Verify a candidate password against a stored record.
    pub fn password_matches(&self, user: &UserRecord, password: &str) -> Result<bool> {
        verify(password, &user.password_hash).context("Failed to verify password")
    }

    /// Administrative cleanup: remove a user together with everything the
    /// user owns, in one explicit transaction. The link rows also carry an
    /// ON DELETE CASCADE foreign key; deleting them here keeps the cascade
    /// visible and auditable.
    pub fn delete(&self, login: &str) -> Result<()> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let user_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE login = ?1 COLLATE NOCASE",
                params![login],
                |row| row.get(0),
            )
            .optional()?;

        let Some(user_id) = user_id else {
            anyhow::bail!("User not found: {}", login);
        };

        tx.execute(
            "DELETE FROM short_links WHERE user_id = ?1",
            params![user_id],
        )?;
        tx.execute("DELETE FROM notes WHERE owner = ?1", params![login])?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        tx.commit()?;

        info!("Deleted user and owned data: {}", login);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_db;

    #[test]
    fn test_create_and_find_case_insensitive() {
        let (db, _file) = test_db();
        let store = UserStore::new(db);

        let user = store.create("alice", "Passw0rd1", Role::User).unwrap();
        assert!(user.id > 0);
        assert_eq!(user.role, Role::User);

        let found = store.find_by_login("ALICE").unwrap().unwrap();
        assert_eq!(found.login, "alice");
        assert!(store.exists("Alice").unwrap());
        assert!(!store.exists("bob").unwrap());
    }

    #[test]
    fn test_password_verification() {
        let (db, _file) = test_db();
        let store = UserStore::new(db);
        let user = store.create("alice", "Passw0rd1", Role::User).unwrap();

        assert!(store.password_matches(&user, "Passw0rd1").unwrap());
        assert!(!store.password_matches(&user, "wrong").unwrap());
        // The stored value is a hash, not the password.
        assert_ne!(user.password_hash, "Passw0rd1");
    }

    #[test]
    fn test_duplicate_login_rejected() {
        let (db, _file) = test_db();
        let store = UserStore::new(db);
        store.create("alice", "Passw0rd1", Role::User).unwrap();
        assert!(store.create("alice", "Other0therX", Role::User).is_err());
    }

    #[test]
    fn test_delete_removes_owned_rows() {
        let (db, _file) = test_db();
        let store = UserStore::new(db.clone());
        let links = crate::store::LinkStore::new(db.clone());
        let notes = crate::store::NoteStore::new(db);

        let user = store.create("alice", "Passw0rd1", Role::User).unwrap();
        links
            .insert("https://example.com/a", "https://abc123", None, user.id)
            .unwrap();
        notes.insert("t", Some("c"), "alice").unwrap();

        store.delete("alice").unwrap();

        assert!(store.find_by_login("alice").unwrap().is_none());
        assert!(links.find_by_short("https://abc123").unwrap().is_none());
        assert!(notes.for_owner("alice").unwrap().is_empty());
    }
}
