// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio-style SMS webhook.
//!
//! Always answers 200 with a TwiML document so the carrier never retries.

use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use riley_agent::InboundRequest;
use riley_core::{mask_participant, Channel, Metadata, RileyError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::handlers::run_inbound;
use crate::server::GatewayState;

/// Sent when no reply could be produced.
pub const APOLOGY_REPLY: &str = "Thanks for your message! Our team will get back to you shortly.";

/// Form fields posted by the SMS provider.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsWebhook {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub message_sid: Option<String>,
    #[serde(default)]
    pub from_city: Option<String>,
    #[serde(default)]
    pub from_state: Option<String>,
    #[serde(default)]
    pub from_zip: Option<String>,
}

impl SmsWebhook {
    /// Metadata recorded on a conversation opened by this message.
    fn metadata(&self) -> Metadata {
        let unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "Unknown".to_string());
        let mut metadata = Metadata::new();
        if let Some(to) = &self.to {
            metadata.insert("twilio_number".into(), Value::String(to.clone()));
        }
        if let Some(sid) = &self.message_sid {
            metadata.insert("message_sid".into(), Value::String(sid.clone()));
        }
        metadata.insert(
            "location".into(),
            json!({
                "city": unknown(&self.from_city),
                "state": unknown(&self.from_state),
                "zip": unknown(&self.from_zip),
            }),
        );
        metadata
    }
}

/// POST /sms/webhook
pub async fn post_webhook(
    State(state): State<GatewayState>,
    form: Result<Form<SmsWebhook>, FormRejection>,
) -> Response {
    let webhook = match form {
        Ok(Form(webhook)) => webhook,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable sms webhook");
            return twiml(None);
        }
    };

    let (Some(from), Some(body)) = (
        webhook.from.as_deref().filter(|s| !s.trim().is_empty()),
        webhook.body.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        debug!("sms webhook without sender or body");
        return twiml(None);
    };

    let request = InboundRequest {
        participant_id: from.to_string(),
        channel: Channel::Sms,
        text: body.to_string(),
        conversation_id: None,
        metadata: webhook.metadata(),
    };

    let reply = match run_inbound(&state, request).await {
        Ok(reply) => reply.reply_text,
        Err(RileyError::Timeout { .. }) => {
            error!(from = %mask_participant(from), "sms handling timed out");
            APOLOGY_REPLY.to_string()
        }
        Err(e) => {
            error!(from = %mask_participant(from), error = %e, "sms handling failed");
            APOLOGY_REPLY.to_string()
        }
    };
    twiml(Some(&reply))
}

/// A TwiML response, empty or carrying one message.
fn twiml(message: Option<&str>) -> Response {
    let inner = message
        .map(|m| format!("<Message>{}</Message>", xml_escape(m)))
        .unwrap_or_default();
    let body = format!(r#"<?xml version="1.0" encoding="UTF-8"?><Response>{inner}</Response>"#);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        body,
    )
        .into_response()
}

pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
