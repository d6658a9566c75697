// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget outbound delivery with retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use riley_config::model::DeliveryConfig;
use riley_core::{
    mask_participant, AdapterType, DeliveryChannel, HealthStatus, OutboundMessage, PluginAdapter,
    RileyError,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Hands outbound messages to a [`DeliveryChannel`] on a detached task.
///
/// Each attempt after the first waits `backoff * 2^(attempt - 1)`. Failures
/// are logged and never reach the caller.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    channel: Arc<dyn DeliveryChannel>,
    max_attempts: u32,
    backoff: Duration,
}

impl DeliveryDispatcher {
    pub fn new(channel: Arc<dyn DeliveryChannel>, config: &DeliveryConfig) -> Self {
        Self {
            channel,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Spawn delivery of `message`. The handle resolves to whether it was
    /// eventually accepted by the channel.
    pub fn dispatch(&self, message: OutboundMessage) -> JoinHandle<bool> {
        let this = self.clone();
        tokio::spawn(async move { this.deliver(message).await })
    }

    async fn deliver(&self, message: OutboundMessage) -> bool {
        let destination = mask_participant(&message.destination);
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff * 2u32.saturating_pow(attempt - 2)).await;
            }
            match self.channel.send(&message).await {
                Ok(()) => {
                    debug!(
                        conversation_id = %message.conversation_id,
                        destination = %destination,
                        attempt,
                        "message delivered"
                    );
                    return true;
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        conversation_id = %message.conversation_id,
                        attempt,
                        error = %e,
                        "delivery failed, will retry"
                    );
                }
                Err(e) => {
                    error!(
                        conversation_id = %message.conversation_id,
                        destination = %destination,
                        attempts = self.max_attempts,
                        error = %e,
                        "delivery abandoned"
                    );
                }
            }
        }
        false
    }
}

/// Delivery channel that only records outbound messages in the log.
/// Used when no SMS gateway is configured.
#[derive(Debug, Default)]
pub struct LogDelivery;

#[async_trait]
impl PluginAdapter for LogDelivery {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RileyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RileyError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for LogDelivery {
    async fn send(&self, message: &OutboundMessage) -> Result<(), RileyError> {
        info!(
            conversation_id = %message.conversation_id,
            destination = %mask_participant(&message.destination),
            chars = message.body.chars().count(),
            "outbound message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::ConversationId;
    use riley_test_utils::MockDelivery;
    use tracing_test::traced_test;

    fn outbound() -> OutboundMessage {
        OutboundMessage {
            destination: "+15550001234".into(),
            body: "On our way".into(),
            conversation_id: ConversationId::from("conv_test"),
        }
    }

    fn config(max_attempts: u32) -> DeliveryConfig {
        DeliveryConfig {
            max_attempts,
            backoff_ms: 1,
        }
    }

    #[tokio::test]
    async fn delivers_on_first_attempt() {
        let channel = Arc::new(MockDelivery::new());
        let dispatcher = DeliveryDispatcher::new(channel.clone(), &config(3));
        assert!(dispatcher.dispatch(outbound()).await.unwrap());
        assert_eq!(channel.sent_messages().await, vec![outbound()]);
        assert_eq!(channel.attempts(), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let channel = Arc::new(MockDelivery::failing_first(2));
        let dispatcher = DeliveryDispatcher::new(channel.clone(), &config(3));
        assert!(dispatcher.dispatch(outbound()).await.unwrap());
        assert_eq!(channel.attempts(), 3);
        assert_eq!(channel.sent_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let channel = Arc::new(MockDelivery::failing_first(10));
        let dispatcher = DeliveryDispatcher::new(channel.clone(), &config(2));
        assert!(!dispatcher.dispatch(outbound()).await.unwrap());
        assert_eq!(channel.attempts(), 2);
        assert!(channel.sent_messages().await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn log_delivery_masks_destination() {
        LogDelivery.send(&outbound()).await.unwrap();
        assert!(logs_contain("outbound message"));
        assert!(logs_contain("1234"));
        assert!(!logs_contain("+15550001234"));
    }

    #[tokio::test]
    async fn log_delivery_accepts_everything() {
        let dispatcher = DeliveryDispatcher::new(Arc::new(LogDelivery), &config(1));
        assert_eq!(dispatcher.channel_name(), "log");
        assert!(dispatcher.dispatch(outbound()).await.unwrap());
    }
}
