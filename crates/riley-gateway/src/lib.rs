// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Riley CRM assistant.
//!
//! Web chat and the SMS webhook are public; the conversation API sits
//! behind an optional bearer token.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod sms;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayState, ServerConfig};
