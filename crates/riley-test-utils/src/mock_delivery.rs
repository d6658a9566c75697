// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery channel that captures outbound messages.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use riley_core::{
    AdapterType, DeliveryChannel, HealthStatus, OutboundMessage, PluginAdapter, RileyError,
};

/// Records every accepted message. Can be told to reject the first `n`
/// attempts.
pub struct MockDelivery {
    sent: Mutex<Vec<OutboundMessage>>,
    attempts: AtomicU32,
    failures_left: AtomicU32,
    notify: Notify,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            failures_left: AtomicU32::new(failures),
            notify: Notify::new(),
        }
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Calls to `send`, successful or not.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait up to five seconds for at least `count` accepted messages and
    /// return what has been captured.
    pub async fn wait_for_sent(&self, count: usize) -> Vec<OutboundMessage> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let sent = self.sent_messages().await;
            if sent.len() >= count {
                return sent;
            }
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return sent;
            }
        }
    }
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock-delivery"
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
impl DeliveryChannel for MockDelivery {
    async fn send(&self, message: &OutboundMessage) -> Result<(), RileyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let rejected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(RileyError::Channel {
                message: "simulated delivery failure".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(message.clone());
        self.notify.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_core::ConversationId;

    fn outbound(body: &str) -> OutboundMessage {
        OutboundMessage {
            destination: "+1".into(),
            body: body.into(),
            conversation_id: ConversationId::from("conv_1"),
        }
    }

    #[tokio::test]
    async fn captures_sent_messages() {
        let channel = MockDelivery::new();
        channel.send(&outbound("a")).await.unwrap();
        channel.send(&outbound("b")).await.unwrap();
        let bodies: Vec<_> = channel.sent_messages().await.into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, ["a", "b"]);
    }

    #[tokio::test]
    async fn rejects_first_attempts() {
        let channel = MockDelivery::failing_first(1);
        assert!(channel.send(&outbound("a")).await.is_err());
        assert!(channel.send(&outbound("a")).await.is_ok());
        assert_eq!(channel.attempts(), 2);
    }

    #[tokio::test]
    async fn wait_for_sent_returns_early_when_satisfied() {
        let channel = std::sync::Arc::new(MockDelivery::new());
        let sender = channel.clone();
        tokio::spawn(async move { sender.send(&outbound("late")).await });
        assert_eq!(channel.wait_for_sent(1).await.len(), 1);
    }
}
