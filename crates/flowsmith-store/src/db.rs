//! Shared SQLite connection for the feedback store.
//!
//! One connection, guarded by a std mutex and only ever touched from the
//! blocking pool.  Opening a [`Database`] also brings its schema up to
//! date, so a handle is always ready for reads and writes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migration;

/// Location that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Handle to the feedback database.  Cloning shares the connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database at `location` (a file path or [`IN_MEMORY`]),
    /// apply connection pragmas and run pending migrations.
    pub async fn open(location: impl AsRef<Path>) -> StoreResult<Self> {
        let location: PathBuf = location.as_ref().to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> StoreResult<Connection> {
            let mut conn = Connection::open(&location)?;
            tune(&conn)?;
            let version = migration::migrate(&mut conn)?;
            info!(location = %location.display(), schema_version = version, "feedback database ready");
            Ok(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` on the blocking pool with exclusive use of the connection.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::TaskJoin("feedback connection poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }

    /// The schema version recorded in the database file.
    pub async fn schema_version(&self) -> StoreResult<u32> {
        self.call(|conn| migration::schema_version(conn)).await
    }
}

/// WAL lets `load_recent` readers run beside the flushing writer.
fn tune(conn: &Connection) -> StoreResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", 5_000_i32)?;
    debug!("connection pragmas set");
    Ok(())
}
