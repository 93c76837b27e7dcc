//! Schema migrations for `generation_records`.
//!
//! The applied version lives in SQLite's `user_version` header field.
//! Each step runs in its own transaction together with the version bump,
//! so a failed step leaves the previous schema intact.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// `(version, sql)` pairs, strictly increasing.
const STEPS: &[(u32, &str)] = &[
    (
        1,
        "CREATE TABLE generation_records (
            seq              INTEGER PRIMARY KEY AUTOINCREMENT,
            id               TEXT NOT NULL UNIQUE,
            prompt           TEXT NOT NULL,
            workflow_name    TEXT NOT NULL,
            node_count       INTEGER NOT NULL DEFAULT 0,
            connection_count INTEGER NOT NULL DEFAULT 0,
            timestamp        TEXT NOT NULL,
            provider         TEXT NOT NULL,
            model            TEXT,
            success          BOOLEAN NOT NULL,
            error            TEXT
        );",
    ),
    (
        2,
        "CREATE INDEX idx_generation_records_failures
            ON generation_records(error) WHERE success = 0;",
    ),
];

/// Version the schema reaches after [`migrate`].
pub const LATEST_VERSION: u32 = 2;

/// Current `user_version` of the database.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Apply every step newer than the stored version and return the version
/// reached.
pub fn migrate(conn: &mut Connection) -> StoreResult<u32> {
    let stored = schema_version(conn)?;
    if stored >= LATEST_VERSION {
        debug!(version = stored, "feedback schema up to date");
        return Ok(stored);
    }

    let mut version = stored;
    for &(step, sql) in STEPS.iter().filter(|(step, _)| *step > stored) {
        apply(conn, step, sql).map_err(|e| StoreError::Migration {
            version: step,
            message: e.to_string(),
        })?;
        info!(from = version, to = step, "feedback schema migrated");
        version = step;
    }
    Ok(version)
}

fn apply(conn: &mut Connection, step: u32, sql: &str) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", step)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_end_at_latest_version() {
        assert!(STEPS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(STEPS.last().map(|(v, _)| *v), Some(LATEST_VERSION));
    }

    #[test]
    fn migrate_twice_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(migrate(&mut conn).unwrap(), LATEST_VERSION);
        assert_eq!(migrate(&mut conn).unwrap(), LATEST_VERSION);
        assert_eq!(schema_version(&conn).unwrap(), LATEST_VERSION);
    }

    #[test]
    fn partial_schema_is_completed() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply(&mut conn, STEPS[0].0, STEPS[0].1).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);

        migrate(&mut conn).unwrap();
        let indexes: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE name = 'idx_generation_records_failures'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn failed_step_rolls_back_with_its_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        // Occupy the index name so step 2 fails after step 1 succeeded.
        conn.execute_batch("CREATE TABLE blocker (x); CREATE INDEX idx_generation_records_failures ON blocker(x);")
            .unwrap();

        let err = migrate(&mut conn).unwrap_err();
        assert!(matches!(err, StoreError::Migration { version: 2, .. }));
        assert_eq!(schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn record_ids_are_unique() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        let insert = "INSERT INTO generation_records \
             (id, prompt, workflow_name, timestamp, provider, success) \
             VALUES ('gen_1_a', 'p', 'w', '2024-01-01T00:00:00Z', 'x', 1)";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
