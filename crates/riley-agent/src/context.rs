// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the caller and generation contexts from stored conversation state.

use chrono::{DateTime, SecondsFormat, Utc};
use riley_config::model::AgentConfig;
use riley_core::{
    Analysis, CallerContext, Channel, GenerationContext, HistoryTurn, Intent, Message, Metadata,
    Sentiment, Urgency,
};
use riley_triage::TemplateKey;
use serde_json::Value;

/// Metadata keys written and read by the orchestrator.
pub mod keys {
    pub const CUSTOMER_NAME: &str = "customer_name";
    pub const SERVICE_TYPE: &str = "service_type";
    pub const APPOINTMENT_DATE: &str = "appointment_date";
    pub const APPOINTMENT_TIME: &str = "appointment_time";
    pub const SPECIALIST_NAME: &str = "specialist_name";
    pub const ADDRESS: &str = "address";
    pub const ETA_MINUTES: &str = "eta_minutes";
    pub const HAS_APPOINTMENT: &str = "has_appointment";
    pub const HAS_RECENT_INSPECTION: &str = "has_recent_inspection";
    pub const HAS_QUOTE: &str = "has_quote";

    pub const SOURCE: &str = "source";
    pub const CHANNEL: &str = "channel";
    pub const START_TIME: &str = "start_time";

    pub const LAST_INTENT: &str = "last_intent";
    pub const LAST_SENTIMENT: &str = "last_sentiment";
    pub const LAST_URGENCY: &str = "last_urgency";
    pub const LAST_TEMPLATE: &str = "last_template";
    pub const MESSAGE_COUNT: &str = "message_count";
    pub const ESCALATED: &str = "escalated";
    pub const AFTER_HOURS: &str = "after_hours";
}

fn string_at(metadata: &Metadata, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_at(metadata: &Metadata, key: &str) -> Option<bool> {
    metadata.get(key).and_then(Value::as_bool)
}

/// Caller details for template personalization.
///
/// `has_appointment` falls back to whether an appointment date is on file
/// or the previous reply was the appointment confirmation.
pub fn caller_context(metadata: &Metadata) -> CallerContext {
    let appointment_date = string_at(metadata, keys::APPOINTMENT_DATE);
    let confirmed_before = string_at(metadata, keys::LAST_TEMPLATE)
        .is_some_and(|label| label == TemplateKey::APPOINTMENT_CONFIRMATION.to_string());

    CallerContext {
        customer_name: string_at(metadata, keys::CUSTOMER_NAME),
        service_type: string_at(metadata, keys::SERVICE_TYPE),
        time: string_at(metadata, keys::APPOINTMENT_TIME),
        specialist_name: string_at(metadata, keys::SPECIALIST_NAME),
        address: string_at(metadata, keys::ADDRESS),
        eta_minutes: metadata
            .get(keys::ETA_MINUTES)
            .and_then(Value::as_u64)
            .and_then(|m| u32::try_from(m).ok()),
        has_appointment: bool_at(metadata, keys::HAS_APPOINTMENT)
            .unwrap_or(appointment_date.is_some() || confirmed_before),
        has_recent_inspection: bool_at(metadata, keys::HAS_RECENT_INSPECTION).unwrap_or(false),
        has_quote: bool_at(metadata, keys::HAS_QUOTE).unwrap_or(false),
        date: appointment_date,
    }
}

/// Business context, the current message's analysis, and the last
/// `agent.history_window` turns of `history`.
pub fn generation_context(
    agent: &AgentConfig,
    analysis: &Analysis,
    history: &[Message],
) -> GenerationContext {
    let start = history.len().saturating_sub(agent.history_window);
    GenerationContext {
        company_name: Some(agent.company_name.clone()),
        personality: Some(agent.personality.clone()),
        company_details: Value::Object(
            agent
                .company_details
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
        negative_filters: agent.negative_filters.clone(),
        history: history[start..]
            .iter()
            .map(|m| HistoryTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect(),
        analysis: Some(analysis.clone()),
    }
}

/// Metadata stamped on a freshly created conversation.
pub fn opening_metadata(channel: Channel, now: DateTime<Utc>, supplied: Metadata) -> Metadata {
    let source = match channel {
        Channel::Sms => "twilio_sms",
        Channel::Web => "web_chat",
        Channel::Email => "email",
    };
    let mut metadata = Metadata::new();
    metadata.insert(keys::SOURCE.into(), source.into());
    metadata.insert(keys::CHANNEL.into(), channel.to_string().into());
    metadata.insert(
        keys::START_TIME.into(),
        now.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
    );
    metadata.extend(supplied);
    metadata
}

/// Whether a message should be flagged for a human.
pub fn needs_escalation(analysis: &Analysis) -> bool {
    analysis.urgency == Urgency::High
        || matches!(analysis.intent, Intent::Emergency | Intent::Complaint)
        || analysis.sentiment == Sentiment::Negative
}

/// Audit fields merged after every turn.
pub fn turn_metadata(
    analysis: &Analysis,
    template_label: &str,
    message_count: usize,
    after_hours: bool,
) -> Metadata {
    let mut patch = Metadata::new();
    patch.insert(keys::LAST_INTENT.into(), analysis.intent.to_string().into());
    patch.insert(keys::LAST_SENTIMENT.into(), analysis.sentiment.to_string().into());
    patch.insert(keys::LAST_URGENCY.into(), analysis.urgency.to_string().into());
    patch.insert(keys::LAST_TEMPLATE.into(), template_label.into());
    patch.insert(keys::MESSAGE_COUNT.into(), message_count.into());
    if needs_escalation(analysis) {
        patch.insert(keys::ESCALATED.into(), true.into());
    }
    patch.insert(keys::AFTER_HOURS.into(), after_hours.into());
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::Role;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn analysis(intent: Intent, sentiment: Sentiment, urgency: Urgency) -> Analysis {
        Analysis {
            intent,
            sentiment,
            urgency,
            service: None,
            keywords: Vec::new(),
            has_question: false,
        }
    }

    #[test]
    fn caller_context_reads_metadata() {
        let ctx = caller_context(&metadata(json!({
            "customer_name": "Dana",
            "appointment_date": "Friday",
            "appointment_time": "2 PM",
            "eta_minutes": 20,
            "has_quote": true
        })));
        assert_eq!(ctx.customer_name.as_deref(), Some("Dana"));
        assert_eq!(ctx.date.as_deref(), Some("Friday"));
        assert_eq!(ctx.time.as_deref(), Some("2 PM"));
        assert_eq!(ctx.eta_minutes, Some(20));
        assert!(ctx.has_appointment, "date on file implies appointment");
        assert!(ctx.has_quote);
        assert!(!ctx.has_recent_inspection);
    }

    #[test]
    fn blank_strings_are_treated_as_missing() {
        let ctx = caller_context(&metadata(json!({"customer_name": "  "})));
        assert_eq!(ctx.customer_name, None);
    }

    #[test]
    fn explicit_flag_overrides_derivation() {
        let ctx = caller_context(&metadata(json!({
            "appointment_date": "Friday",
            "has_appointment": false
        })));
        assert!(!ctx.has_appointment);
    }

    #[test]
    fn previous_confirmation_implies_appointment() {
        let ctx = caller_context(&metadata(json!({
            "last_template": TemplateKey::APPOINTMENT_CONFIRMATION.to_string()
        })));
        assert!(ctx.has_appointment);
    }

    #[test]
    fn generation_context_windows_history() {
        let agent = AgentConfig {
            history_window: 2,
            ..Default::default()
        };
        let history = vec![
            Message::assistant("one"),
            Message::assistant("two"),
            Message::assistant("three"),
        ];
        let current = analysis(Intent::Pricing, Sentiment::Neutral, Urgency::Medium);
        let ctx = generation_context(&agent, &current, &history);
        assert_eq!(ctx.analysis.as_ref(), Some(&current));
        let contents: Vec<_> = ctx.history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["two", "three"]);
        assert!(ctx.history.iter().all(|t| t.role == Role::Assistant));
        assert_eq!(ctx.company_name.as_deref(), Some("Panda Exteriors"));
    }

    #[test]
    fn opening_metadata_lets_caller_values_win() {
        let now = Utc::now();
        let md = opening_metadata(
            Channel::Sms,
            now,
            metadata(json!({"source": "import", "customer_name": "Ray"})),
        );
        assert_eq!(md["source"], "import");
        assert_eq!(md["channel"], "sms");
        assert_eq!(md["customer_name"], "Ray");
        assert!(md.contains_key("start_time"));
    }

    #[test]
    fn escalation_triggers() {
        assert!(needs_escalation(&analysis(Intent::General, Sentiment::Neutral, Urgency::High)));
        assert!(needs_escalation(&analysis(Intent::Complaint, Sentiment::Neutral, Urgency::Low)));
        assert!(needs_escalation(&analysis(Intent::General, Sentiment::Negative, Urgency::Low)));
        assert!(!needs_escalation(&analysis(Intent::Pricing, Sentiment::Positive, Urgency::Medium)));
    }

    #[test]
    fn turn_metadata_records_audit_fields() {
        let patch = turn_metadata(
            &analysis(Intent::Emergency, Sentiment::Neutral, Urgency::High),
            "special_situations.storm_response",
            4,
            false,
        );
        assert_eq!(patch["last_intent"], "emergency");
        assert_eq!(patch["last_urgency"], "high");
        assert_eq!(patch["message_count"], 4);
        assert_eq!(patch["escalated"], true);
        assert_eq!(patch["after_hours"], false);
    }

    #[test]
    fn in_hours_turn_clears_after_hours_flag() {
        let general = analysis(Intent::General, Sentiment::Neutral, Urgency::Low);
        let mut stored = turn_metadata(&general, "default", 2, true);
        assert_eq!(stored["after_hours"], true);

        stored.extend(turn_metadata(&general, "default", 4, false));
        assert_eq!(stored["after_hours"], false);
    }
}
