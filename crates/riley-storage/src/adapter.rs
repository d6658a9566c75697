// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use riley_config::model::StorageConfig;
use riley_core::{
    AdapterType, Channel, Conversation, ConversationFilter, ConversationId, ConversationStats,
    ConversationStatus, ConversationStore, HealthStatus, Message, Metadata, NewConversation,
    PluginAdapter, RileyError, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation store.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RileyError> {
        self.db.get().ok_or_else(|| RileyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Delete conversations idle for longer than the configured retention.
    /// Returns the number removed; a no-op when retention is disabled.
    pub async fn purge_expired(&self) -> Result<usize, RileyError> {
        let Some(days) = self.config.retention_days else {
            return Ok(0);
        };
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let removed = queries::conversations::purge_updated_before(self.db()?, cutoff).await?;
        if removed > 0 {
            info!(removed, retention_days = days, "purged expired conversations");
        }
        Ok(removed)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RileyError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RileyError> {
        if self.db.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RileyError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RileyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RileyError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn find_by_participant(
        &self,
        participant_id: &str,
        channel: Option<Channel>,
    ) -> Result<Option<Conversation>, RileyError> {
        queries::conversations::find_by_participant(self.db()?, participant_id, channel).await
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, RileyError> {
        queries::conversations::find_by_id(self.db()?, id).await
    }

    async fn create(&self, new: NewConversation) -> Result<Conversation, RileyError> {
        queries::conversations::create(self.db()?, new).await
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<(), RileyError> {
        queries::messages::append_message(self.db()?, id, message).await
    }

    async fn update_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<(), RileyError> {
        queries::conversations::update_status(self.db()?, id, status).await
    }

    async fn merge_metadata(
        &self,
        id: &ConversationId,
        patch: Metadata,
    ) -> Result<(), RileyError> {
        queries::conversations::merge_metadata(self.db()?, id, patch).await
    }

    async fn list(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>, RileyError> {
        queries::conversations::list(self.db()?, filter).await
    }

    async fn stats(&self) -> Result<ConversationStats, RileyError> {
        queries::conversations::stats(self.db()?).await
    }
}
