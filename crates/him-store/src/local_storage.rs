use rusqlite::{params, OptionalExtension};

use crate::database::LocalStorage;
use crate::error::Result;

impl LocalStorage {
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns whether a value was present.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// Set `key` when `value` is present, remove it otherwise.
    pub fn put_or_remove(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.set_item(key, value),
            None => self.remove_item(key).map(|_| ()),
        }
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_overwrite_remove() {
        let storage = LocalStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.len().unwrap(), 1);

        assert!(storage.remove_item("k").unwrap());
        assert!(!storage.remove_item("k").unwrap());
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.db");

        {
            let storage = LocalStorage::open_at(&path).unwrap();
            storage.set_item("token", "abc").unwrap();
        }

        let reopened = LocalStorage::open_at(&path).unwrap();
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));
    }
}
