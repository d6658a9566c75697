// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock response generator for deterministic testing.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use riley_core::{
    AdapterType, GenerationContext, HealthStatus, IntentClassification, PluginAdapter,
    ResponseGenerator, RileyError,
};

enum Behavior {
    /// Pop queued replies; "mock response" once empty.
    Respond(Mutex<VecDeque<String>>),
    Fail,
    /// Sleep for the duration before answering.
    Hang(Duration),
}

/// A generator whose behavior is fixed at construction. Every prompt and
/// context it receives is recorded.
pub struct MockGenerator {
    name: String,
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
    contexts: Mutex<Vec<GenerationContext>>,
}

impl MockGenerator {
    pub fn new(name: &str) -> Self {
        Self::with_responses(name, Vec::new())
    }

    pub fn with_responses(name: &str, responses: Vec<String>) -> Self {
        Self::with_behavior(name, Behavior::Respond(Mutex::new(VecDeque::from(responses))))
    }

    /// Every call fails with a provider error.
    pub fn failing(name: &str) -> Self {
        Self::with_behavior(name, Behavior::Fail)
    }

    /// Every call takes `delay` before answering.
    pub fn hanging(name: &str, delay: Duration) -> Self {
        Self::with_behavior(name, Behavior::Hang(delay))
    }

    fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            prompts: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Contexts received alongside each prompt.
    pub async fn contexts(&self) -> Vec<GenerationContext> {
        self.contexts.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
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
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RileyError> {
        Ok(())
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<String, RileyError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.contexts.lock().await.push(context.clone());
        match &self.behavior {
            Behavior::Respond(queue) => Ok(queue
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| "mock response".to_string())),
            Behavior::Fail => Err(RileyError::provider(format!("{} is unavailable", self.name))),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }

    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, RileyError> {
        self.generate(text, &GenerationContext::default()).await?;
        Ok(IntentClassification::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let generator = MockGenerator::with_responses("m", vec!["first".into(), "second".into()]);
        let ctx = GenerationContext::default();
        assert_eq!(generator.generate("a", &ctx).await.unwrap(), "first");
        assert_eq!(generator.generate("b", &ctx).await.unwrap(), "second");
        assert_eq!(generator.generate("c", &ctx).await.unwrap(), "mock response");
        assert_eq!(generator.prompts().await, ["a", "b", "c"]);
        assert_eq!(generator.contexts().await.len(), 3);
    }

    #[tokio::test]
    async fn failing_generator_reports_provider_error() {
        let err = MockGenerator::failing("down")
            .generate("x", &GenerationContext::default())
            .await
            .unwrap_err();
        assert!(err.is_collaborator_unavailable());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_generator_waits() {
        let generator = MockGenerator::hanging("slow", Duration::from_secs(30));
        let ctx = GenerationContext::default();
        let result =
            tokio::time::timeout(Duration::from_secs(1), generator.generate("x", &ctx)).await;
        assert!(result.is_err());
    }
}
