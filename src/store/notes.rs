//! Note Storage

use crate::store::Db;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

/// A user-created note. The owner is the login of the user who created it.
#[derive(Debug, Clone, Serialize)]
pub struct NoteRecord {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub owner: String,
}

#[derive(Clone)]
pub struct NoteStore {
    db: Db,
}

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<NoteRecord> {
    Ok(NoteRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        owner: row.get(3)?,
    })
}

impl NoteStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn insert(&self, title: &str, content: Option<&str>, owner: &str) -> Result<NoteRecord> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO notes (title, content, owner) VALUES (?1, ?2, ?3)",
            params![title, content, owner],
        )
        .context("Failed to insert note")?;

        Ok(NoteRecord {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            content: content.map(str::to_string),
            owner: owner.to_string(),
        })
    }

    pub fn find(&self, id: i64) -> Result<Option<NoteRecord>> {
        let conn = self.db.lock();
        let mut stmt =
            conn.prepare("SELECT id, title, content, owner FROM notes WHERE id = ?1")?;
        stmt.query_row(params![id], row_to_note)
            .optional()
            .context("Failed to query note")
    }

    pub fn for_owner(&self, owner: &str) -> Result<Vec<NoteRecord>> {
        let conn = self.db.lock();
        let mut stmt = conn
            .prepare("SELECT id, title, content, owner FROM notes WHERE owner = ?1 ORDER BY id")?;
        let notes = stmt
            .query_map(params![owner], row_to_note)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    pub fn update(&self, id: i64, title: &str, content: Option<&str>) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "UPDATE notes SET title = ?1, content = ?2 WHERE id = ?3",
            params![title, content, id],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.lock();
        conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_db;

    #[test]
    fn test_crud_round_trip() {
        let (db, _file) = test_db();
        let store = NoteStore::new(db);

        let note = store
            .insert("groceries", Some("milk, eggs"), "alice")
            .unwrap();
        assert!(note.id > 0);

        let found = store.find(note.id).unwrap().unwrap();
        assert_eq!(found.title, "groceries");
        assert_eq!(found.content.as_deref(), Some("milk, eggs"));

        store.update(note.id, "shopping", None).unwrap();
        let updated = store.find(note.id).unwrap().unwrap();
        assert_eq!(updated.title, "shopping");
        assert!(updated.content.is_none());

        store.delete(note.id).unwrap();
        assert!(store.find(note.id).unwrap().is_none());
    }

    #[test]
    fn test_owner_isolation() {
        let (db, _file) = test_db();
        let store = NoteStore::new(db);

        store.insert("a", None, "alice").unwrap();
        store.insert("b", None, "alice").unwrap();
        store.insert("c", None, "bobby").unwrap();

        assert_eq!(store.for_owner("alice").unwrap().len(), 2);
        assert_eq!(store.for_owner("bobby").unwrap().len(), 1);
        assert!(store.for_owner("carol").unwrap().is_empty());
    }
}
