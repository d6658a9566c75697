// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation persistence contract.

use async_trait::async_trait;

use crate::error::RileyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Channel, Conversation, ConversationFilter, ConversationId, ConversationStats,
    ConversationStatus, Message, Metadata, NewConversation,
};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RileyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RileyError>;
}

/// Durable conversation records.
///
/// Implementations provide read-your-writes consistency per conversation id
/// and keep messages in append order.
#[async_trait]
pub trait ConversationStore: StorageAdapter {
    /// Most recent conversation for a participant, optionally restricted to
    /// one channel.
    async fn find_by_participant(
        &self,
        participant_id: &str,
        channel: Option<Channel>,
    ) -> Result<Option<Conversation>, RileyError>;

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, RileyError>;

    /// Creates an active conversation with no messages.
    async fn create(&self, new: NewConversation) -> Result<Conversation, RileyError>;

    /// Appends a turn. Fails with `NotFound` for an unknown id.
    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<(), RileyError>;

    /// Fails with `NotFound` for an unknown id.
    async fn update_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<(), RileyError>;

    /// Adds or overwrites metadata keys. Fails with `NotFound` for an unknown id.
    async fn merge_metadata(&self, id: &ConversationId, patch: Metadata)
    -> Result<(), RileyError>;

    /// Conversations matching the filter, most recently updated first.
    async fn list(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>, RileyError>;

    async fn stats(&self) -> Result<ConversationStats, RileyError>;
}
