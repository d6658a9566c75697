// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Riley integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory conversation store with injectable write failures
//! - [`MockGenerator`] - Response generator with queued, failing, or hanging behavior
//! - [`MockDelivery`] - Delivery channel that captures outbound messages
//! - [`TestHarness`] - Orchestrator over a temp SQLite database

pub mod harness;
pub mod memory_store;
pub mod mock_delivery;
pub mod mock_generator;

pub use harness::TestHarness;
pub use memory_store::MemoryStore;
pub use mock_delivery::MockDelivery;
pub use mock_generator::MockGenerator;
