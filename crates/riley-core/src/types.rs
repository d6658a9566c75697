// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the analyzer, the conversation store, the
//! orchestrator, and the HTTP gateway.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Free-form conversation metadata. Merges are additive: keys are added or
/// overwritten, never removed.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// Generates a fresh `conv_`-prefixed identifier.
    pub fn generate() -> Self {
        Self(format!("conv_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn generate() -> Self {
        Self(format!("msg_{}", uuid::Uuid::new_v4().simple()))
    }
}

/// The medium a conversation arrived on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Web,
    Email,
}

/// Lifecycle status of a conversation. Only operators change it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Pending,
    Resolved,
}

/// Author of a message turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Classified purpose of an inbound message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Appointment,
    ServiceInquiry,
    Pricing,
    Emergency,
    Followup,
    Complaint,
    Confirmation,
    Cancellation,
    General,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Urgency level. Ordered so that `Low < Medium < High`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Home-exterior service line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Roofing,
    Siding,
    Windows,
    Gutters,
}

/// Result of analyzing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub intent: Intent,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub service: Option<Service>,
    pub keywords: Vec<String>,
    pub has_question: bool,
}

/// A single turn in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl Message {
    /// A customer turn carrying its analysis.
    pub fn user(content: impl Into<String>, analysis: Analysis) -> Self {
        Self {
            id: MessageId::generate(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            analysis: Some(analysis),
        }
    }

    /// An assistant or operator turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            analysis: None,
        }
    }
}

/// The durable record of one exchange with a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_id: String,
    pub channel: Channel,
    pub status: ConversationStatus,
    pub messages: Vec<Message>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a conversation.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub participant_id: String,
    pub channel: Channel,
    pub metadata: Metadata,
}

/// Filter for listing conversations, newest first.
#[derive(Debug, Clone)]
pub struct ConversationFilter {
    pub status: Option<ConversationStatus>,
    pub participant_id: Option<String>,
    pub limit: usize,
}

impl Default for ConversationFilter {
    fn default() -> Self {
        Self {
            status: None,
            participant_id: None,
            limit: 50,
        }
    }
}

/// Aggregate counts over stored conversations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total: u64,
    pub active: u64,
    pub pending: u64,
    pub resolved: u64,
    pub average_messages: f64,
}

/// What is known about the caller when a reply is chosen and personalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    pub customer_name: Option<String>,
    pub service_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub specialist_name: Option<String>,
    pub address: Option<String>,
    pub eta_minutes: Option<u32>,
    pub has_appointment: bool,
    pub has_recent_inspection: bool,
    pub has_quote: bool,
}

/// One prior turn handed to a generative provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

/// Business context for generative replies.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub company_name: Option<String>,
    pub personality: Option<String>,
    pub company_details: serde_json::Value,
    pub negative_filters: Vec<String>,
    /// Prior turns in chronological order.
    pub history: Vec<HistoryTurn>,
    /// Rule-based analysis of the message being answered.
    pub analysis: Option<Analysis>,
}

/// Provider-side classification of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentClassification {
    pub intent: String,
    pub sentiment: String,
    pub urgency: String,
    pub suggested_action: String,
}

impl Default for IntentClassification {
    fn default() -> Self {
        Self {
            intent: "other".to_string(),
            sentiment: "neutral".to_string(),
            urgency: "medium".to_string(),
            suggested_action: "Provide general assistance".to_string(),
        }
    }
}

/// An outbound message handed to a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: String,
    pub body: String,
    pub conversation_id: ConversationId,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn intent_uses_snake_case_names() {
        assert_eq!(Intent::ServiceInquiry.to_string(), "service_inquiry");
        assert_eq!(
            Intent::from_str("service_inquiry").unwrap(),
            Intent::ServiceInquiry
        );
        let json = serde_json::to_string(&Intent::ServiceInquiry).unwrap();
        assert_eq!(json, "\"service_inquiry\"");
    }

    #[test]
    fn urgency_is_ordered() {
        assert!(Urgency::Low < Urgency::Medium);
        assert!(Urgency::Medium < Urgency::High);
    }

    #[test]
    fn status_parses_lowercase_only() {
        assert_eq!(
            ConversationStatus::from_str("resolved").unwrap(),
            ConversationStatus::Resolved
        );
        assert!(ConversationStatus::from_str("closed").is_err());
    }

    #[test]
    fn conversation_ids_are_prefixed_and_unique() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert!(a.as_str().starts_with("conv_"));
        assert_ne!(a, b);
    }

    #[test]
    fn default_classification_matches_fallback() {
        let c = IntentClassification::default();
        assert_eq!(c.intent, "other");
        assert_eq!(c.sentiment, "neutral");
        assert_eq!(c.urgency, "medium");
        assert_eq!(c.suggested_action, "Provide general assistance");
    }

    #[test]
    fn message_omits_missing_analysis() {
        let msg = Message::assistant("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("analysis").is_none());
        assert_eq!(json["role"], "assistant");
    }
}
