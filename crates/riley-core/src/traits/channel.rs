// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery contract (SMS, email, ...).

use async_trait::async_trait;

use crate::error::RileyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundMessage;

/// Adapter that pushes a message to a participant out of band.
#[async_trait]
pub trait DeliveryChannel: PluginAdapter {
    async fn send(&self, message: &OutboundMessage) -> Result<(), RileyError>;
}
