// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based triage for inbound customer messages.
//!
//! This crate provides:
//! - [`MessageAnalyzer`]: keyword heuristics producing an [`Analysis`](riley_core::Analysis)
//! - [`ResponseSelector`]: first-match-wins rules choosing a scripted reply
//! - [`personalize`]: placeholder substitution from a [`CallerContext`](riley_core::CallerContext)
//! - [`TemplateTable`]: the script library, built in or loaded from TOML
//! - [`BusinessHours`]: opening-hours checks and the after-hours notice
//!
//! Everything here is synchronous, deterministic, and free of I/O apart from
//! loading a template file at startup.

pub mod analyzer;
pub mod hours;
pub mod personalize;
pub mod selector;
pub mod templates;

pub use analyzer::MessageAnalyzer;
pub use hours::BusinessHours;
pub use personalize::personalize;
pub use selector::{ResponseSelector, TemplateRef};
pub use templates::{TemplateKey, TemplateTable};
