// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle: PRAGMA setup, migrations, WAL checkpoint on close.
//!
//! Every statement runs on `tokio-rusqlite`'s single background thread, which
//! serializes writes. Do not open a second connection for writes.

use std::path::Path;

use parley_core::ParleyError;
use tracing::{debug, info};

use crate::migrations::run_migrations;

const WAL_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA busy_timeout = 5000;
     PRAGMA foreign_keys = ON;";

const ROLLBACK_PRAGMAS: &str = "PRAGMA journal_mode = DELETE;
     PRAGMA synchronous = FULL;
     PRAGMA busy_timeout = 5000;
     PRAGMA foreign_keys = ON;";

/// Handle to the single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode.
    pub async fn open(path: &str) -> Result<Self, ParleyError> {
        Self::open_with(path, true).await
    }

    /// Opens the database at `path`, choosing the journal mode.
    ///
    /// Missing parent directories are created.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ParleyError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ParleyError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(ParleyError::storage)?;
        let db = Self::prepare(conn, wal_mode).await?;
        info!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database, migrated and ready.
    pub async fn open_in_memory() -> Result<Self, ParleyError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(ParleyError::storage)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal_mode: bool) -> Result<Self, ParleyError> {
        let pragmas = if wal_mode { WAL_PRAGMAS } else { ROLLBACK_PRAGMAS };
        conn.call(move |c| c.execute_batch(pragmas))
            .await
            .map_err(map_tr_err)?;

        conn.call(|c| Ok::<_, rusqlite::Error>(run_migrations(c)))
            .await
            .map_err(map_tr_err)??;
        debug!("migrations applied");

        Ok(Self { conn })
    }

    /// The underlying async connection. All queries go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), ParleyError> {
        self.conn
            .call(|c| c.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Maps a `tokio-rusqlite` error onto [`ParleyError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ParleyError {
    match e {
        tokio_rusqlite::Error::Error(inner) => ParleyError::storage(inner),
        other => ParleyError::storage(std::io::Error::other(other.to_string())),
    }
}
