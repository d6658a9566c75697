// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Riley CRM assistant.
//!
//! The [`Orchestrator`] drives each inbound message through the pipeline:
//! - Finds or creates the participant's conversation (one message at a time
//!   per participant)
//! - Analyzes and persists the message
//! - Produces a reply from the configured generators, or the scripted
//!   templates when none succeed
//! - Records escalation and audit metadata
//!
//! Operator replies are delivered through a [`DeliveryDispatcher`].

pub mod context;
pub mod delivery;
pub mod lanes;
pub mod orchestrator;
pub mod shutdown;

pub use delivery::{DeliveryDispatcher, LogDelivery};
pub use lanes::ParticipantLanes;
pub use orchestrator::{Clock, InboundReply, InboundRequest, Orchestrator};
