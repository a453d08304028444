// SPDX-License-Identifier: Apache-2.0

use crate::QueryError;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

const PROGRESS_CHECK_OPS: i32 = 1_000;

struct PoolInner {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl PoolInner {
    fn checkout(&self) -> Result<Connection, QueryError> {
        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        match reused {
            Some(conn) => Ok(conn),
            None => self.open(),
        }
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }

    fn open(&self) -> Result<Connection, QueryError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only=ON; PRAGMA temp_store=MEMORY;")?;
        conn.set_prepared_statement_cache_capacity(64);
        info!(path = %self.path.display(), "store connection opened");
        Ok(conn)
    }
}

/// Bounded pool of read-only SQLite connections.
///
/// Connections are opened lazily on first use and reused afterwards. Every
/// statement runs on the blocking thread pool under a progress-handler
/// deadline, so a slow query is interrupted inside SQLite instead of holding a
/// connection after its caller has given up.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    statement_timeout: Duration,
}

impl ConnectionPool {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        max_connections: usize,
        acquire_timeout: Duration,
        statement_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                path: path.into(),
                idle: Mutex::new(Vec::new()),
            }),
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
            acquire_timeout,
            statement_timeout,
        }
    }

    /// Opens one connection eagerly so misconfiguration fails at startup.
    pub async fn warm_up(&self) -> Result<(), QueryError> {
        self.run(|_| Ok(())).await
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn run<T, F>(&self, f: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, QueryError> + Send + 'static,
    {
        let permit = timeout(
            self.acquire_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| QueryError::timeout("timed out waiting for a store connection"))?
        .map_err(|e| QueryError::store(e.to_string()))?;
        let inner = Arc::clone(&self.inner);
        let statement_timeout = self.statement_timeout;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let conn = inner.checkout()?;
            let deadline = Instant::now() + statement_timeout;
            conn.progress_handler(PROGRESS_CHECK_OPS, Some(move || Instant::now() >= deadline));
            let result = f(&conn);
            conn.progress_handler(0, None::<fn() -> bool>);
            match &result {
                Ok(_) => inner.checkin(conn),
                Err(e) => warn!("discarding store connection after error: {e}"),
            }
            result
        })
        .await
        .map_err(|e| QueryError::store(e.to_string()))?
    }
}
