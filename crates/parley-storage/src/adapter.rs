// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`MessageStore`].

use async_trait::async_trait;
use parley_config::model::StorageConfig;
use parley_core::{Message, MessageStore, ParleyError};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// The database is opened by [`initialize`](SqliteStore::initialize); every
/// store operation before that fails with a storage error.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Creates and initializes a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, ParleyError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Opens the database and applies migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), ParleyError> {
        if self.db.initialized() {
            return Err(already_initialized());
        }
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| already_initialized())?;
        debug!(path = %self.config.database_path, "SQLite message store initialized");
        Ok(())
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(&self) -> Result<(), ParleyError> {
        self.db()?.clone().close().await
    }

    /// Number of stored messages for `user_id`.
    pub async fn count(&self, user_id: &str) -> Result<i64, ParleyError> {
        queries::messages::count(self.db()?, user_id).await
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

fn already_initialized() -> ParleyError {
    ParleyError::Storage {
        source: "storage already initialized".into(),
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert(
        &self,
        user_id: &str,
        pending: bool,
        messages: &[Message],
    ) -> Result<Vec<Message>, ParleyError> {
        queries::messages::insert_messages(self.db()?, user_id, pending, messages).await
    }

    async fn unqueue(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        queries::messages::unqueue(self.db()?, user_id).await
    }

    async fn read_history(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        queries::messages::read_history(self.db()?, user_id).await
    }

    async fn pending(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        queries::messages::pending(self.db()?, user_id).await
    }
}
