// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Riley CRM assistant.

use thiserror::Error;

/// The primary error type used across all Riley adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RileyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required request field was missing or malformed.
    #[error("{field} is required")]
    Validation { field: String },

    /// A conversation (or other record) was not found.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery channel errors (outbound send failure, rejected destination).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generative provider errors (API failure, undecodable reply, missing key).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RileyError {
    /// Shorthand for a missing/invalid request field.
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Shorthand for an unknown record id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the error came from an optional collaborator (generator or
    /// delivery channel) and should be recovered from locally.
    pub fn is_collaborator_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Channel { .. } | Self::Timeout { .. }
        )
    }
}
