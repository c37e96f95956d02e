//! Schema migrations for the session storage file.
//!
//! The applied version is tracked in `PRAGMA user_version`. Opening a file
//! whose version is ahead of this build fails instead of guessing at its
//! layout.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> std::result::Result<(), rusqlite::Error>;

/// Ordered migrations; entry `i` upgrades the schema to version `i + 1`.
const STEPS: &[(&str, Step)] = &[("v001_initial", v001_initial::up)];

pub fn schema_version() -> u32 {
    STEPS.len() as u32
}

/// Bring `conn` up to [`schema_version`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = schema_version();
    if found > supported {
        return Err(StoreError::SchemaTooNew { found, supported });
    }

    for (index, (name, up)) in STEPS.iter().enumerate().skip(found as usize) {
        let version = index as u32 + 1;
        tracing::info!(version, name, "applying session storage migration");
        up(conn).map_err(|e| StoreError::Migration {
            version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}
