use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tokio::task;
use crate::error::{Result, KitchenError};

pub mod ingredient;
pub mod migrate;
pub mod recipe;
pub mod rows;
pub mod seed;
pub mod step;
pub mod utensil;

/// Pragmas applied to every connection.
/// WAL for concurrent readers, foreign keys for cascading step deletes,
/// busy_timeout so concurrent writers wait instead of failing immediately.
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
     PRAGMA synchronous = NORMAL; \
     PRAGMA foreign_keys = ON; \
     PRAGMA busy_timeout = 5000; \
     PRAGMA temp_store = MEMORY;";

/// Handle on the graph store.
///
/// Cheap to clone; every operation opens its own connection on the
/// blocking pool, so independent reads run concurrently.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
}

impl Db {
    /// Handle on the kitchen database file; connections open per operation
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open a new database connection with the store pragmas
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(KitchenError::Database)?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        task::spawn_blocking(move || {
            let mut conn = db.open_connection()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            KitchenError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("database task failed: {}", e),
            ))
        })?
    }

    /// Log the shutdown of the store. Connections are per-operation, so
    /// nothing stays open past the last in-flight query.
    pub fn close(&self) {
        log::info!("Disconnecting from SQLite database {}", self.path.display());
    }
}

/// Check the affected-row count of a single-row write.
///
/// 0 rows means the target was missing, more than 1 means the table is
/// corrupted and must not be ignored.
pub fn expect_single(affected: usize, what: &str) -> Result<()> {
    match affected {
        1 => Ok(()),
        0 => Err(KitchenError::NotFound(format!("{} not found", what))),
        n => Err(KitchenError::Integrity(format!(
            "{} rows were deleted instead of one ({})",
            n, what
        ))),
    }
}
