// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generative reply provider contract.

use async_trait::async_trait;

use crate::error::RileyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationContext, IntentClassification};

/// An optional collaborator that writes free-form replies.
///
/// Callers bound every call with a timeout and fall back to scripted
/// replies on any error.
#[async_trait]
pub trait ResponseGenerator: PluginAdapter {
    /// Produces a reply to `prompt` given the business context and history.
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<String, RileyError>;

    /// Classifies a message. Undecodable provider output yields
    /// [`IntentClassification::default`] rather than an error.
    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, RileyError>;
}
