// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible response generator for the Riley CRM assistant.
//!
//! Implements [`ResponseGenerator`] on top of the chat-completions API. Any
//! endpoint speaking that protocol can be configured as a provider.

pub mod client;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use riley_config::model::ProviderConfig;
use riley_core::{
    AdapterType, GenerationContext, HealthStatus, IntentClassification, PluginAdapter,
    ResponseGenerator, RileyError, Role, SecretResolver,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

const DEFAULT_COMPANY: &str = "Panda Exteriors";
const DEFAULT_PERSONALITY: &str = "Be professional, friendly, and helpful.";

/// Where a provider's API key comes from.
enum ApiKey {
    Inline(Arc<SecretString>),
    /// Looked up through the secret cache on every request.
    Resolved {
        name: String,
        secrets: Arc<dyn SecretResolver>,
    },
}

impl ApiKey {
    fn current(&self) -> Result<Arc<SecretString>, RileyError> {
        match self {
            Self::Inline(key) => Ok(key.clone()),
            Self::Resolved { name, secrets } => secrets.resolve(name),
        }
    }
}

/// A configured chat-completions provider.
///
/// API key resolution order: `api_key` in config, then the environment
/// variable named by `api_key_env` through the secret cache. Cached keys
/// are re-read once their TTL lapses, so a rotated key is picked up without
/// a restart.
pub struct OpenAiProvider {
    name: String,
    client: OpenAiClient,
    api_key: ApiKey,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// Fails when the key cannot be resolved now, so a misconfigured
    /// provider is skipped at startup.
    pub fn new(
        config: &ProviderConfig,
        secrets: Arc<dyn SecretResolver>,
    ) -> Result<Self, RileyError> {
        let api_key = match &config.api_key {
            Some(key) => ApiKey::Inline(Arc::new(SecretString::from(key.clone()))),
            None => ApiKey::Resolved {
                name: config.api_key_env.clone(),
                secrets,
            },
        };
        api_key.current()?;
        let client = OpenAiClient::new(&config.base_url)?;
        info!(provider = %config.name, model = %config.model, "generative provider initialized");
        Ok(Self {
            name: config.name.clone(),
            client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Transcript sent for `prompt`: system prompt, prior turns oldest first,
    /// then the prompt itself.
    pub fn build_request(&self, prompt: &str, context: &GenerationContext) -> ChatRequest {
        let mut messages = Vec::with_capacity(context.history.len() + 2);
        messages.push(ChatMessage::new("system", system_prompt(context)));
        messages.extend(context.history.iter().map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            ChatMessage::new(role, turn.content.clone())
        }));
        messages.push(ChatMessage::new("user", prompt));

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// System prompt describing the business the assistant speaks for.
pub fn system_prompt(context: &GenerationContext) -> String {
    let company = context.company_name.as_deref().unwrap_or(DEFAULT_COMPANY);
    let personality = context.personality.as_deref().unwrap_or(DEFAULT_PERSONALITY);
    let mut prompt = format!("You are Riley, a helpful AI assistant for {company}.\n{personality}");

    let has_details = match &context.company_details {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    };
    if has_details {
        prompt.push_str(&format!("\nCompany info: {}", context.company_details));
    }
    if !context.negative_filters.is_empty() {
        prompt.push_str(&format!(
            "\nAvoid these phrases: {}",
            context.negative_filters.join(", ")
        ));
    }
    if let Some(analysis) = &context.analysis {
        let service = analysis
            .service
            .map_or_else(|| "unspecified".to_string(), |s| s.to_string());
        prompt.push_str(&format!(
            "\nCustomer message analysis: intent={}, urgency={}, sentiment={}, service={service}",
            analysis.intent, analysis.urgency, analysis.sentiment
        ));
    }
    prompt
}

fn classification_prompt(text: &str) -> String {
    format!(
        "Analyze this customer message and determine the intent.\n\
         Message: \"{text}\"\n\n\
         Return a JSON object with:\n\
         - intent: (booking, question, complaint, feedback, other)\n\
         - sentiment: (positive, neutral, negative)\n\
         - urgency: (low, medium, high)\n\
         - suggestedAction: (brief suggestion for response)"
    )
}

/// Parse a classification reply, tolerating a surrounding code fence.
fn parse_classification(reply: &str) -> Option<IntentClassification> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).ok()
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RileyError> {
        // A live request would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RileyError> {
        debug!(provider = %self.name, "generative provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<String, RileyError> {
        let request = self.build_request(prompt, context);
        let api_key = self.api_key.current()?;
        let response = self.client.complete(&api_key, &request).await?;
        let content = response
            .first_content()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| RileyError::provider("response contained no message content"))?;
        Ok(content.to_string())
    }

    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, RileyError> {
        let reply = self
            .generate(&classification_prompt(text), &GenerationContext::default())
            .await?;
        Ok(parse_classification(&reply).unwrap_or_else(|| {
            warn!(provider = %self.name, "undecodable classification, using default");
            IntentClassification::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::{
        Analysis, CachedSecrets, EnvSecretSource, HistoryTurn, Intent, SecretSource, Sentiment,
        Service, Urgency,
    };
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn env_secrets() -> Arc<dyn SecretResolver> {
        Arc::new(CachedSecrets::new(EnvSecretSource, Duration::from_secs(60)))
    }

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        let config = ProviderConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        OpenAiProvider::new(&config, env_secrets()).unwrap()
    }

    /// A secret store whose value can be swapped mid-test.
    #[derive(Clone)]
    struct RotatingSource(Arc<Mutex<String>>);

    impl SecretSource for RotatingSource {
        fn fetch(&self, _name: &str) -> Result<SecretString, RileyError> {
            Ok(SecretString::from(self.0.lock().unwrap().clone()))
        }
    }

    async fn mount_reply(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn system_prompt_uses_defaults() {
        let prompt = system_prompt(&GenerationContext::default());
        assert!(prompt.starts_with("You are Riley, a helpful AI assistant for Panda Exteriors."));
        assert!(prompt.contains(DEFAULT_PERSONALITY));
        assert!(!prompt.contains("Company info"));
        assert!(!prompt.contains("Avoid these phrases"));
    }

    #[test]
    fn system_prompt_includes_details_and_filters() {
        let context = GenerationContext {
            company_name: Some("Acme Siding".into()),
            company_details: serde_json::json!({"phone": "555-0100"}),
            negative_filters: vec!["cheap".into(), "guarantee".into()],
            ..Default::default()
        };
        let prompt = system_prompt(&context);
        assert!(prompt.contains("assistant for Acme Siding."));
        assert!(prompt.contains(r#"Company info: {"phone":"555-0100"}"#));
        assert!(prompt.contains("Avoid these phrases: cheap, guarantee"));
    }

    #[test]
    fn system_prompt_describes_current_message() {
        let context = GenerationContext {
            analysis: Some(Analysis {
                intent: Intent::Emergency,
                sentiment: Sentiment::Negative,
                urgency: Urgency::High,
                service: Some(Service::Roofing),
                keywords: vec!["leak".into()],
                has_question: false,
            }),
            ..Default::default()
        };
        let prompt = system_prompt(&context);
        assert!(
            prompt.ends_with(
                "Customer message analysis: intent=emergency, urgency=high, sentiment=negative, service=roofing"
            ),
            "{prompt}"
        );
    }

    #[tokio::test]
    async fn history_precedes_prompt_in_order() {
        let server = MockServer::start().await;
        let provider = provider_for(&server);
        let context = GenerationContext {
            history: vec![
                HistoryTurn { role: Role::User, content: "first".into() },
                HistoryTurn { role: Role::Assistant, content: "second".into() },
            ],
            ..Default::default()
        };
        let req = provider.build_request("third", &context);
        let roles: Vec<_> = req.messages.iter().map(|m| m.role.as_str()).collect();
        let contents: Vec<_> = req.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(&contents[1..], ["first", "second", "third"]);
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.max_tokens, 150);
    }

    #[tokio::test]
    async fn generate_returns_trimmed_content() {
        let server = MockServer::start().await;
        mount_reply(&server, "  We can help with that!\n").await;
        let reply = provider_for(&server)
            .generate("Do you do gutters?", &GenerationContext::default())
            .await
            .unwrap();
        assert_eq!(reply, "We can help with that!");
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let server = MockServer::start().await;
        mount_reply(&server, "   ").await;
        let err = provider_for(&server)
            .generate("hi", &GenerationContext::default())
            .await
            .unwrap_err();
        assert!(err.is_collaborator_unavailable());
    }

    #[tokio::test]
    async fn classify_intent_parses_json() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            r#"{"intent":"booking","sentiment":"positive","urgency":"low","suggestedAction":"Offer slots"}"#,
        )
        .await;
        let c = provider_for(&server).classify_intent("book me").await.unwrap();
        assert_eq!(c.intent, "booking");
        assert_eq!(c.suggested_action, "Offer slots");
    }

    #[tokio::test]
    async fn classify_intent_accepts_fenced_json() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "```json\n{\"intent\":\"complaint\",\"sentiment\":\"negative\",\"urgency\":\"high\",\"suggestedAction\":\"Apologize\"}\n```",
        )
        .await;
        let c = provider_for(&server).classify_intent("awful").await.unwrap();
        assert_eq!(c.intent, "complaint");
    }

    #[tokio::test]
    async fn classify_intent_falls_back_on_prose() {
        let server = MockServer::start().await;
        mount_reply(&server, "I think the customer wants a quote.").await;
        let c = provider_for(&server).classify_intent("hello").await.unwrap();
        assert_eq!(c, IntentClassification::default());
    }

    #[test]
    fn missing_env_key_fails_construction() {
        let config = ProviderConfig {
            api_key: None,
            api_key_env: "RILEY_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiProvider::new(&config, env_secrets()),
            Err(RileyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn rotated_key_is_used_once_cache_entry_lapses() {
        let server = MockServer::start().await;
        for (key, content) in [("sk-old", "signed with old key"), ("sk-new", "signed with new key")] {
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .and(header("authorization", format!("Bearer {key}").as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": content}}]
                })))
                .mount(&server)
                .await;
        }

        let value = Arc::new(Mutex::new("sk-old".to_string()));
        let secrets = Arc::new(CachedSecrets::new(
            RotatingSource(value.clone()),
            Duration::from_secs(60),
        ));
        let config = ProviderConfig {
            base_url: server.uri(),
            api_key: None,
            api_key_env: "RILEY_ROTATING_KEY".into(),
            ..Default::default()
        };
        let provider = OpenAiProvider::new(&config, secrets.clone()).unwrap();
        let ctx = GenerationContext::default();

        assert_eq!(provider.generate("hi", &ctx).await.unwrap(), "signed with old key");

        *value.lock().unwrap() = "sk-new".to_string();
        assert_eq!(
            provider.generate("hi", &ctx).await.unwrap(),
            "signed with old key",
            "cached key is reused within its TTL"
        );

        secrets.invalidate("RILEY_ROTATING_KEY");
        assert_eq!(provider.generate("hi", &ctx).await.unwrap(), "signed with new key");
    }
}
