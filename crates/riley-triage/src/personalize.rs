// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder substitution for reply templates.

use riley_core::CallerContext;

/// Replace every known placeholder with the caller's value or its default.
///
/// Unknown `{placeholders}` are left untouched.
pub fn personalize(template: &str, context: &CallerContext) -> String {
    let eta = context
        .eta_minutes
        .map(|m| m.to_string())
        .unwrap_or_else(|| "30".to_string());

    let substitutions: [(&str, &str); 7] = [
        (
            "{customer_name}",
            context.customer_name.as_deref().unwrap_or("there"),
        ),
        (
            "{service_type}",
            context.service_type.as_deref().unwrap_or("home exterior"),
        ),
        ("{date}", context.date.as_deref().unwrap_or("TBD")),
        ("{time}", context.time.as_deref().unwrap_or("TBD")),
        (
            "{specialist_name}",
            context.specialist_name.as_deref().unwrap_or("our specialist"),
        ),
        (
            "{address}",
            context.address.as_deref().unwrap_or("your property"),
        ),
        ("{eta_minutes}", eta.as_str()),
    ];

    substitutions
        .iter()
        .fold(template.to_string(), |text, (placeholder, value)| {
            text.replace(*placeholder, value)
        })
}
