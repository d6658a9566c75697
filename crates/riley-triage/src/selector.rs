// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted reply selection.
//!
//! [`SELECTION_RULES`] is an ordered list; the first rule that returns an
//! outcome wins. Literal replies are sent verbatim and never personalized.

use std::sync::Arc;

use riley_core::{Analysis, CallerContext, Intent, Sentiment, Service, Urgency};
use tracing::warn;

use crate::personalize::personalize;
use crate::templates::{TemplateKey, TemplateTable};

pub const CONFIRMATION_REPLY: &str = "Great! I've confirmed that for you. You'll receive a confirmation text shortly with all the details.";

pub const CANCELLATION_REPLY: &str = "I understand. I've noted your request. If you change your mind or need our services in the future, we're just a text away. Thank you!";

pub const DEFAULT_REPLY: &str = "Hi! I'm Riley from Panda Exteriors. I can help you with roofing, siding, windows, and gutter services. How can I assist you today?";

/// What the selector decided to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRef {
    /// A table entry to personalize.
    Template(TemplateKey),
    /// A fixed reply returned as-is.
    Literal(&'static str),
}

impl TemplateRef {
    /// Stable label for logs and conversation metadata.
    pub fn label(&self) -> String {
        match self {
            Self::Template(key) => key.to_string(),
            Self::Literal(CONFIRMATION_REPLY) => "literal.confirmation".to_string(),
            Self::Literal(CANCELLATION_REPLY) => "literal.cancellation".to_string(),
            Self::Literal(_) => "literal.default".to_string(),
        }
    }
}

/// A selection rule: returns `Some` to claim the message, `None` to pass.
pub type Rule = fn(&Analysis, &CallerContext) -> Option<TemplateRef>;

/// Selection rules in priority order, with names for auditing.
pub const SELECTION_RULES: &[(&str, Rule)] = &[
    ("emergency", emergency),
    ("appointment", appointment),
    ("service_inquiry", service_inquiry),
    ("pricing", pricing),
    ("followup", followup),
    ("confirmation", confirmation),
    ("cancellation", cancellation),
];

fn emergency(analysis: &Analysis, _: &CallerContext) -> Option<TemplateRef> {
    (analysis.urgency == Urgency::High || analysis.intent == Intent::Emergency)
        .then_some(TemplateRef::Template(TemplateKey::STORM_RESPONSE))
}

fn appointment(analysis: &Analysis, context: &CallerContext) -> Option<TemplateRef> {
    (analysis.intent == Intent::Appointment).then_some(TemplateRef::Template(
        if context.has_appointment {
            TemplateKey::APPOINTMENT_CONFIRMATION
        } else {
            TemplateKey::INITIAL_INTEREST
        },
    ))
}

fn service_inquiry(analysis: &Analysis, _: &CallerContext) -> Option<TemplateRef> {
    match (analysis.intent, analysis.service) {
        (Intent::ServiceInquiry, Some(service)) => {
            Some(TemplateRef::Template(TemplateKey::service(service)))
        }
        _ => None,
    }
}

fn pricing(analysis: &Analysis, _: &CallerContext) -> Option<TemplateRef> {
    (analysis.intent == Intent::Pricing).then_some(TemplateRef::Template(
        if analysis.sentiment == Sentiment::Negative {
            TemplateKey::PRICE_CONCERN
        } else {
            TemplateKey::INITIAL_INTEREST
        },
    ))
}

fn followup(analysis: &Analysis, context: &CallerContext) -> Option<TemplateRef> {
    if analysis.intent != Intent::Followup {
        return None;
    }
    if context.has_recent_inspection {
        Some(TemplateRef::Template(TemplateKey::AFTER_INSPECTION))
    } else if context.has_quote {
        Some(TemplateRef::Template(TemplateKey::QUOTE_FOLLOW_UP))
    } else {
        None
    }
}

fn confirmation(analysis: &Analysis, _: &CallerContext) -> Option<TemplateRef> {
    (analysis.intent == Intent::Confirmation).then_some(TemplateRef::Literal(CONFIRMATION_REPLY))
}

fn cancellation(analysis: &Analysis, _: &CallerContext) -> Option<TemplateRef> {
    (analysis.intent == Intent::Cancellation).then_some(TemplateRef::Literal(CANCELLATION_REPLY))
}

/// Chooses and renders scripted replies against a shared template table.
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    templates: Arc<TemplateTable>,
}

impl ResponseSelector {
    pub fn new(templates: Arc<TemplateTable>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Pick the reply for an analyzed message.
    ///
    /// A service line with no `service_specific` entry falls back to the
    /// roofing script.
    pub fn select(&self, analysis: &Analysis, context: &CallerContext) -> TemplateRef {
        let chosen = SELECTION_RULES
            .iter()
            .find_map(|(_, rule)| rule(analysis, context))
            .unwrap_or(TemplateRef::Literal(DEFAULT_REPLY));

        match chosen {
            TemplateRef::Template(key)
                if key.category == "service_specific" && !self.templates.contains(&key) =>
            {
                TemplateRef::Template(TemplateKey::service(Service::Roofing))
            }
            other => other,
        }
    }

    /// Turn a selection into reply text.
    ///
    /// Templates are personalized; literals are returned verbatim. A key
    /// missing from the table yields the default reply.
    pub fn render(&self, choice: &TemplateRef, context: &CallerContext) -> String {
        match choice {
            TemplateRef::Literal(text) => (*text).to_string(),
            TemplateRef::Template(key) => match self.templates.get(key) {
                Some(template) => personalize(template, context),
                None => {
                    warn!(template = %key, "template missing from table, using default reply");
                    DEFAULT_REPLY.to_string()
                }
            },
        }
    }

    /// Select and render in one step.
    pub fn respond(&self, analysis: &Analysis, context: &CallerContext) -> (TemplateRef, String) {
        let choice = self.select(analysis, context);
        let text = self.render(&choice, context);
        (choice, text)
    }
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(Arc::new(TemplateTable::builtin()))
    }
}
