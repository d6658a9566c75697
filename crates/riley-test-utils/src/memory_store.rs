// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`ConversationStore`] for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use riley_core::{
    AdapterType, Channel, Conversation, ConversationFilter, ConversationId, ConversationStats,
    ConversationStatus, ConversationStore, HealthStatus, Message, Metadata, NewConversation,
    PluginAdapter, RileyError, StorageAdapter,
};

/// Conversations kept in insertion order.
///
/// `fail_writes(true)` makes every mutating call return a storage error.
pub struct MemoryStore {
    conversations: Mutex<Vec<Conversation>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored conversations.
    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_writable(&self) -> Result<(), RileyError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RileyError::Storage {
                source: "simulated write failure".into(),
            });
        }
        Ok(())
    }

    async fn modify(
        &self,
        id: &ConversationId,
        apply: impl FnOnce(&mut Conversation),
    ) -> Result<(), RileyError> {
        self.check_writable()?;
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| RileyError::not_found(id.as_str()))?;
        apply(conversation);
        conversation.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RileyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RileyError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn initialize(&self) -> Result<(), RileyError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), RileyError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_by_participant(
        &self,
        participant_id: &str,
        channel: Option<Channel>,
    ) -> Result<Option<Conversation>, RileyError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations
            .iter()
            .rev()
            .find(|c| {
                c.participant_id == participant_id && channel.is_none_or(|ch| c.channel == ch)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, RileyError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.iter().find(|c| &c.id == id).cloned())
    }

    async fn create(&self, new: NewConversation) -> Result<Conversation, RileyError> {
        self.check_writable()?;
        let now = Utc::now();
        let conversation = Conversation {
            id: ConversationId::generate(),
            participant_id: new.participant_id,
            channel: new.channel,
            status: ConversationStatus::Active,
            messages: Vec::new(),
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        };
        self.conversations.lock().await.push(conversation.clone());
        Ok(conversation)
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<(), RileyError> {
        self.modify(id, |c| c.messages.push(message)).await
    }

    async fn update_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<(), RileyError> {
        self.modify(id, |c| c.status = status).await
    }

    async fn merge_metadata(
        &self,
        id: &ConversationId,
        patch: Metadata,
    ) -> Result<(), RileyError> {
        self.modify(id, |c| c.metadata.extend(patch)).await
    }

    async fn list(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>, RileyError> {
        let conversations = self.conversations.lock().await;
        let mut matching: Vec<Conversation> = conversations
            .iter()
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| {
                filter
                    .participant_id
                    .as_deref()
                    .is_none_or(|p| c.participant_id == p)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matching.truncate(filter.limit);
        Ok(matching)
    }

    async fn stats(&self) -> Result<ConversationStats, RileyError> {
        let conversations = self.conversations.lock().await;
        let count = |status: ConversationStatus| conversations.iter().filter(|c| c.status == status).count() as u64;
        let total = conversations.len() as u64;
        let messages: usize = conversations.iter().map(|c| c.messages.len()).sum();
        Ok(ConversationStats {
            total,
            active: count(ConversationStatus::Active),
            pending: count(ConversationStatus::Pending),
            resolved: count(ConversationStatus::Resolved),
            average_messages: if total == 0 {
                0.0
            } else {
                messages as f64 / total as f64
            },
        })
    }
}
