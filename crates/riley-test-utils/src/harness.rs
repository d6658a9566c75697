// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles an orchestrator over a temp SQLite database with
//! mock generators and a capturing delivery channel.

use std::sync::Arc;

use riley_agent::{Clock, DeliveryDispatcher, InboundReply, InboundRequest, Orchestrator};
use riley_config::RileyConfig;
use riley_config::model::StorageConfig;
use riley_core::{
    Channel, Conversation, ConversationId, ConversationStore, Metadata, ResponseGenerator,
    RileyError, StorageAdapter,
};
use riley_storage::SqliteStorage;

use crate::mock_delivery::MockDelivery;
use crate::mock_generator::MockGenerator;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: RileyConfig,
    generators: Vec<Arc<MockGenerator>>,
    clock: Option<Clock>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: RileyConfig::default(),
            generators: Vec::new(),
            clock: None,
        }
    }

    /// Start from a custom configuration. Storage settings are replaced with
    /// a temp database.
    pub fn with_config(mut self, config: RileyConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a generator, tried after any added before it.
    pub fn with_generator(mut self, generator: MockGenerator) -> Self {
        self.generators.push(Arc::new(generator));
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the harness, creating the temp database.
    pub async fn build(self) -> Result<TestHarness, RileyError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RileyError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            retention_days: None,
        };

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let delivery = Arc::new(MockDelivery::new());
        let generators: Vec<Arc<dyn ResponseGenerator>> = self
            .generators
            .iter()
            .map(|g| g.clone() as Arc<dyn ResponseGenerator>)
            .collect();

        let mut orchestrator = Orchestrator::new(storage.clone(), &config)?
            .with_generators(generators)
            .with_delivery(DeliveryDispatcher::new(delivery.clone(), &config.delivery));
        if let Some(clock) = self.clock {
            orchestrator = orchestrator.with_clock(clock);
        }

        Ok(TestHarness {
            orchestrator: Arc::new(orchestrator),
            storage,
            delivery,
            generators: self.generators,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    /// Captures operator replies dispatched for delivery.
    pub delivery: Arc<MockDelivery>,
    pub generators: Vec<Arc<MockGenerator>>,
    pub config: RileyConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message through the full pipeline.
    pub async fn send(
        &self,
        participant_id: &str,
        channel: Channel,
        text: &str,
    ) -> Result<InboundReply, RileyError> {
        self.orchestrator
            .handle_inbound(InboundRequest {
                participant_id: participant_id.to_string(),
                channel,
                text: text.to_string(),
                conversation_id: None,
                metadata: Metadata::new(),
            })
            .await
    }

    /// Fetch a conversation that must exist.
    pub async fn conversation(&self, id: &ConversationId) -> Result<Conversation, RileyError> {
        self.storage
            .find_by_id(id)
            .await?
            .ok_or_else(|| RileyError::not_found(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::{ConversationFilter, Role};

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let all = harness.storage.list(&ConversationFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn send_persists_both_turns() {
        let harness = TestHarness::builder().build().await.unwrap();
        let reply = harness.send("+15550100", Channel::Web, "hello").await.unwrap();
        let conv = harness.conversation(&reply.conversation_id).await.unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::User);
        assert_eq!(conv.messages[0].content, "hello");
        assert_eq!(conv.messages[1].role, Role::Assistant);
        assert_eq!(conv.messages[1].content, reply.reply_text);
    }

    #[tokio::test]
    async fn with_generator_uses_its_responses() {
        let harness = TestHarness::builder()
            .with_generator(MockGenerator::with_responses("mock", vec!["custom".into()]))
            .build()
            .await
            .unwrap();
        let reply = harness.send("+1", Channel::Sms, "hi").await.unwrap();
        assert_eq!(reply.reply_text, "custom");
        assert_eq!(harness.generators[0].prompts().await, ["hi"]);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();
        h1.send("+1", Channel::Sms, "msg1").await.unwrap();
        assert_eq!(h1.storage.stats().await.unwrap().total, 1);
        assert_eq!(h2.storage.stats().await.unwrap().total, 0);
    }
}
