// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message pipeline: find or create the conversation, analyze,
//! persist, reply, record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use riley_config::RileyConfig;
use riley_config::model::AgentConfig;
use riley_core::{
    mask_participant, Analysis, Channel, Conversation, ConversationId, ConversationStatus,
    ConversationStore, Message, Metadata, NewConversation, OutboundMessage, ResponseGenerator,
    RileyError, Role,
};
use riley_triage::{BusinessHours, MessageAnalyzer, ResponseSelector, TemplateTable};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::context::{self, keys};
use crate::delivery::DeliveryDispatcher;
use crate::lanes::ParticipantLanes;

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

/// Part of the request budget reserved for storage and the scripted reply.
const FALLBACK_HEADROOM: Duration = Duration::from_secs(2);

/// One inbound message from a participant.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub participant_id: String,
    pub channel: Channel,
    pub text: String,
    /// Continue this conversation if it exists.
    pub conversation_id: Option<ConversationId>,
    /// Merged into the metadata of a newly created conversation.
    pub metadata: Metadata,
}

/// The assistant's answer to an [`InboundRequest`].
#[derive(Debug, Clone)]
pub struct InboundReply {
    pub conversation_id: ConversationId,
    pub reply_text: String,
    pub timestamp: DateTime<Utc>,
    pub analysis: Analysis,
}

/// Coordinates the analyzer, selector, generators and store for each
/// inbound message.
pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    analyzer: MessageAnalyzer,
    selector: ResponseSelector,
    generators: Vec<Arc<dyn ResponseGenerator>>,
    generation_timeout: Duration,
    generation_budget: Duration,
    hours: BusinessHours,
    agent: AgentConfig,
    delivery: Option<DeliveryDispatcher>,
    lanes: ParticipantLanes,
    clock: Clock,
}

impl Orchestrator {
    /// Scripted-only orchestrator. Loads template overrides from
    /// `templates.file` when set.
    pub fn new(store: Arc<dyn ConversationStore>, config: &RileyConfig) -> Result<Self, RileyError> {
        let templates = match &config.templates.file {
            Some(path) => TemplateTable::load(std::path::Path::new(path))?,
            None => TemplateTable::builtin(),
        };
        info!(
            templates = templates.len(),
            company = %config.agent.company_name,
            "orchestrator initialized"
        );
        Ok(Self {
            store,
            analyzer: MessageAnalyzer::new(),
            selector: ResponseSelector::new(Arc::new(templates)),
            generators: Vec::new(),
            generation_timeout: Duration::from_secs(config.generative.timeout_secs),
            generation_budget: Duration::from_secs(config.gateway.request_timeout_secs)
                .saturating_sub(FALLBACK_HEADROOM),
            hours: BusinessHours::from_config(&config.business_hours)?,
            agent: config.agent.clone(),
            delivery: None,
            lanes: ParticipantLanes::new(),
            clock: Utc::now,
        })
    }

    /// Generators tried in order before falling back to the scripts.
    pub fn with_generators(mut self, generators: Vec<Arc<dyn ResponseGenerator>>) -> Self {
        self.generators = generators;
        self
    }

    /// Upper bound on the whole generator phase, across all providers.
    pub fn with_generation_budget(mut self, budget: Duration) -> Self {
        self.generation_budget = budget;
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryDispatcher) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn with_selector(mut self, selector: ResponseSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn analyzer(&self) -> &MessageAnalyzer {
        &self.analyzer
    }

    pub fn selector(&self) -> &ResponseSelector {
        &self.selector
    }

    /// Process one inbound message and return the reply.
    ///
    /// Generator failures fall back to the scripted reply. Storage failures
    /// propagate.
    pub async fn handle_inbound(&self, request: InboundRequest) -> Result<InboundReply, RileyError> {
        if request.participant_id.trim().is_empty() {
            return Err(RileyError::validation("participantId"));
        }
        if request.text.trim().is_empty() {
            return Err(RileyError::validation("text"));
        }

        let _lane = self.lanes.acquire(&request.participant_id).await;
        let now = (self.clock)();

        let mut conversation = self.resolve_conversation(&request, now).await?;
        let analysis = self.analyzer.analyze(&request.text);
        debug!(
            conversation_id = %conversation.id,
            intent = %analysis.intent,
            urgency = %analysis.urgency,
            "message analyzed"
        );

        let user_message = Message::user(request.text.clone(), analysis.clone());
        self.store
            .append_message(&conversation.id, user_message.clone())
            .await?;
        conversation.messages.push(user_message);

        let caller = context::caller_context(&conversation.metadata);
        let generated = self.generate(&request.text, &analysis, &conversation).await;
        let (template_label, mut reply_text) = match generated {
            Some(generated) => generated,
            None => {
                let (choice, text) = self.selector.respond(&analysis, &caller);
                (choice.label(), text)
            }
        };

        let notice = self.hours.after_hours_notice(
            now,
            &self.agent.company_name,
            caller.customer_name.as_deref(),
        );
        if let Some(notice) = &notice {
            reply_text.push_str("\n\n");
            reply_text.push_str(notice);
        }

        let assistant_message = Message::assistant(reply_text.clone());
        let timestamp = assistant_message.timestamp;
        self.store
            .append_message(&conversation.id, assistant_message)
            .await?;

        let patch = context::turn_metadata(
            &analysis,
            &template_label,
            conversation.messages.len() + 1,
            notice.is_some(),
        );
        if patch.contains_key(keys::ESCALATED) {
            warn!(
                conversation_id = %conversation.id,
                participant = %mask_participant(&request.participant_id),
                intent = %analysis.intent,
                "conversation flagged for follow-up"
            );
        }
        self.store.merge_metadata(&conversation.id, patch).await?;

        info!(
            conversation_id = %conversation.id,
            channel = %request.channel,
            template = %template_label,
            "reply produced"
        );

        Ok(InboundReply {
            conversation_id: conversation.id,
            reply_text,
            timestamp,
            analysis,
        })
    }

    async fn resolve_conversation(
        &self,
        request: &InboundRequest,
        now: DateTime<Utc>,
    ) -> Result<Conversation, RileyError> {
        if let Some(id) = &request.conversation_id {
            match self.store.find_by_id(id).await? {
                Some(existing)
                    if existing.participant_id == request.participant_id
                        && existing.channel == request.channel =>
                {
                    return Ok(existing);
                }
                Some(_) => warn!(
                    conversation_id = %id,
                    participant = %mask_participant(&request.participant_id),
                    "conversation id belongs to another participant or channel, starting new"
                ),
                None => debug!(conversation_id = %id, "unknown conversation id, starting new"),
            }
        } else if let Some(existing) = self
            .store
            .find_by_participant(&request.participant_id, Some(request.channel))
            .await?
            && existing.status == ConversationStatus::Active
        {
            return Ok(existing);
        }

        let created = self
            .store
            .create(NewConversation {
                participant_id: request.participant_id.clone(),
                channel: request.channel,
                metadata: context::opening_metadata(request.channel, now, request.metadata.clone()),
            })
            .await?;
        info!(
            conversation_id = %created.id,
            participant = %mask_participant(&request.participant_id),
            channel = %request.channel,
            "conversation started"
        );
        Ok(created)
    }

    /// Try each generator in order within the generation budget. Returns
    /// the audit label and the reply.
    async fn generate(
        &self,
        prompt: &str,
        analysis: &Analysis,
        conversation: &Conversation,
    ) -> Option<(String, String)> {
        if self.generators.is_empty() {
            return None;
        }
        let prior = &conversation.messages[..conversation.messages.len().saturating_sub(1)];
        let gen_context = context::generation_context(&self.agent, analysis, prior);
        let deadline = Instant::now() + self.generation_budget;

        for generator in &self.generators {
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    provider = generator.name(),
                    budget_ms = self.generation_budget.as_millis() as u64,
                    "generation budget exhausted, skipping remaining providers"
                );
                break;
            }
            let outcome = tokio::time::timeout_at(
                deadline.min(now + self.generation_timeout),
                generator.generate(prompt, &gen_context),
            )
            .await
            .unwrap_or(Err(RileyError::Timeout {
                duration: self.generation_timeout,
            }));
            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    return Some((format!("generated:{}", generator.name()), text));
                }
                Ok(_) => warn!(provider = generator.name(), "generator returned empty reply"),
                Err(e) => warn!(provider = generator.name(), error = %e, "generator failed"),
            }
        }
        debug!("all generators failed, using scripted reply");
        None
    }

    /// Operator-initiated turn. Assistant turns are also delivered to the
    /// participant.
    pub async fn post_message(
        &self,
        id: &ConversationId,
        content: &str,
        role: Role,
    ) -> Result<Conversation, RileyError> {
        if content.trim().is_empty() {
            return Err(RileyError::validation("message"));
        }
        let conversation = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| RileyError::not_found(id.as_str()))?;

        let message = match role {
            Role::User => Message::user(content, self.analyzer.analyze(content)),
            Role::Assistant => Message::assistant(content),
        };
        self.store.append_message(id, message).await?;

        if role == Role::Assistant {
            match &self.delivery {
                Some(delivery) => {
                    delivery.dispatch(OutboundMessage {
                        destination: conversation.participant_id.clone(),
                        body: content.to_string(),
                        conversation_id: id.clone(),
                    });
                }
                None => debug!(conversation_id = %id, "no delivery channel configured"),
            }
        }

        self.refetch(id).await
    }

    /// Set a conversation's status and return the updated record.
    pub async fn update_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> Result<Conversation, RileyError> {
        self.store.update_status(id, status).await?;
        info!(conversation_id = %id, status = %status, "conversation status updated");
        self.refetch(id).await
    }

    async fn refetch(&self, id: &ConversationId) -> Result<Conversation, RileyError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| RileyError::not_found(id.as_str()))
    }
}
