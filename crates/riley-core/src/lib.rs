// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Riley CRM assistant.
//!
//! This crate provides the domain types, error type, and adapter traits used
//! throughout the Riley workspace. Storage backends, generative providers,
//! and delivery channels implement traits defined here.

pub mod error;
pub mod secrets;
pub mod traits;
pub mod types;

pub use error::RileyError;
pub use secrets::{
    mask_participant, CachedSecrets, EnvSecretSource, SecretResolver, SecretSource, TtlCache,
};
pub use types::{
    AdapterType, Analysis, CallerContext, Channel, Conversation, ConversationFilter,
    ConversationId, ConversationStats, ConversationStatus, GenerationContext, HealthStatus,
    HistoryTurn, Intent, IntentClassification, Message, MessageId, Metadata, NewConversation,
    OutboundMessage, Role, Sentiment, Service, Urgency,
};

pub use traits::{
    ConversationStore, DeliveryChannel, PluginAdapter, ResponseGenerator, StorageAdapter,
};
