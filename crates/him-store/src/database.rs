//! Browser-style local storage backed by SQLite.
//!
//! The [`LocalStorage`] struct owns a [`rusqlite::Connection`] and guarantees
//! that migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    /// Open (or create) the default console storage file.
    ///
    /// The file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/him-admin/storage.db`
    /// - macOS:   `~/Library/Application Support/app.helpinminutes.him-admin/storage.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\helpinminutes\him-admin\data\storage.db`
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("app", "helpinminutes", "him-admin")
            .ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("storage.db");

        tracing::info!(path = %db_path.display(), "opening local storage");

        Self::open_at(&db_path)
    }

    /// Open (or create) storage at an explicit path.
    ///
    /// This is useful for tests and for running several isolated consoles
    /// side by side.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Storage that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
