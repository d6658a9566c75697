// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scripted reply library.
//!
//! Templates are keyed by `(category, subcategory)` and may contain the
//! placeholders handled by [`crate::personalize`]. The table is built once
//! at startup and shared read-only.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use riley_core::{RileyError, Service};
use tracing::info;

/// Address of one template in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub category: &'static str,
    pub subcategory: &'static str,
}

impl TemplateKey {
    pub const STORM_RESPONSE: Self = Self::new("special_situations", "storm_response");
    pub const APPOINTMENT_CONFIRMATION: Self = Self::new("appointment_confirmation", "initial");
    pub const INITIAL_INTEREST: Self = Self::new("lead_qualification", "initial_interest");
    pub const PRICE_CONCERN: Self = Self::new("objection_handling", "price_concern");
    pub const AFTER_INSPECTION: Self = Self::new("follow_up", "after_inspection");
    pub const QUOTE_FOLLOW_UP: Self = Self::new("follow_up", "quote_follow_up");

    pub const fn new(category: &'static str, subcategory: &'static str) -> Self {
        Self {
            category,
            subcategory,
        }
    }

    /// The `service_specific` entry for a service line.
    pub const fn service(service: Service) -> Self {
        let subcategory = match service {
            Service::Roofing => "roofing",
            Service::Siding => "siding",
            Service::Windows => "windows",
            Service::Gutters => "gutters",
        };
        Self::new("service_specific", subcategory)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.subcategory)
    }
}

const BUILTIN: &[(TemplateKey, &str)] = &[
    (
        TemplateKey::STORM_RESPONSE,
        "Hi {customer_name}, we're sorry to hear about the damage. Our emergency crew can be at \
         {address} in about {eta_minutes} minutes to assess and secure your home. If it's safe, \
         reply with a photo so our team knows what to bring.",
    ),
    (
        TemplateKey::APPOINTMENT_CONFIRMATION,
        "Hi {customer_name}, you're all set! {specialist_name} will see you at {address} on \
         {date} at {time} for your {service_type} inspection. Reply YES to confirm or let us \
         know if you need to reschedule.",
    ),
    (
        TemplateKey::INITIAL_INTEREST,
        "Hi {customer_name}! Thanks for your interest in {service_type} services. We offer free \
         inspections and written estimates. What day and time work best for a visit?",
    ),
    (
        TemplateKey::service(Service::Roofing),
        "We repair and replace every kind of roof: shingle, tile, flat, and metal. Would you \
         like to book a free roof inspection, {customer_name}?",
    ),
    (
        TemplateKey::service(Service::Siding),
        "We install vinyl, Hardie board, wood, and fiber cement siding. Would you like a \
         specialist to stop by {address} and walk you through the options?",
    ),
    (
        TemplateKey::service(Service::Windows),
        "We install energy-efficient double pane replacement windows. Would you like to \
         schedule a free in-home consultation, {customer_name}?",
    ),
    (
        TemplateKey::service(Service::Gutters),
        "We install seamless gutters, downspouts, and leaf guards to keep water away from your \
         home. Would you like a free gutter inspection?",
    ),
    (
        TemplateKey::PRICE_CONCERN,
        "I completely understand, {customer_name}. Every project is different, so our estimates \
         are free with no obligation, and we offer financing to keep monthly payments \
         comfortable. Would you like us to put a quote together?",
    ),
    (
        TemplateKey::AFTER_INSPECTION,
        "Hi {customer_name}, thanks for meeting with {specialist_name} about your \
         {service_type} project. Do you have any questions about what we found?",
    ),
    (
        TemplateKey::QUOTE_FOLLOW_UP,
        "Hi {customer_name}, just checking in on the {service_type} quote we sent. Is there \
         anything I can answer to help you decide?",
    ),
];

/// Read-only template library.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    entries: HashMap<String, HashMap<String, String>>,
}

impl TemplateTable {
    /// The built-in scripts.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (key, text) in BUILTIN {
            table.insert(key.category, key.subcategory, *text);
        }
        table
    }

    /// A table with no templates at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces one template.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries
            .entry(category.into())
            .or_default()
            .insert(subcategory.into(), text.into());
    }

    /// Built-in scripts overlaid with `[category] subcategory = "..."`
    /// entries from a TOML document. Entries may also add new keys.
    pub fn from_toml_str(content: &str) -> Result<Self, RileyError> {
        let overrides: HashMap<String, HashMap<String, String>> = toml::from_str(content)
            .map_err(|e| RileyError::Config(format!("invalid template file: {e}")))?;

        let mut table = Self::builtin();
        let mut replaced = 0usize;
        for (category, subs) in overrides {
            for (subcategory, text) in subs {
                table.insert(category.as_str(), subcategory, text);
                replaced += 1;
            }
        }
        info!(templates = replaced, "loaded template overrides");
        Ok(table)
    }

    /// Load overrides from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, RileyError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RileyError::Config(format!(
                "failed to read template file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, key: &TemplateKey) -> Option<&str> {
        self.entries
            .get(key.category)
            .and_then(|subs| subs.get(key.subcategory))
            .map(String::as_str)
    }

    pub fn contains(&self, key: &TemplateKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of templates across all categories.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_selectable_key() {
        let table = TemplateTable::builtin();
        for key in [
            TemplateKey::STORM_RESPONSE,
            TemplateKey::APPOINTMENT_CONFIRMATION,
            TemplateKey::INITIAL_INTEREST,
            TemplateKey::PRICE_CONCERN,
            TemplateKey::AFTER_INSPECTION,
            TemplateKey::QUOTE_FOLLOW_UP,
            TemplateKey::service(Service::Roofing),
            TemplateKey::service(Service::Siding),
            TemplateKey::service(Service::Windows),
            TemplateKey::service(Service::Gutters),
        ] {
            assert!(table.contains(&key), "missing {key}");
        }
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn overrides_replace_and_extend() {
        let table = TemplateTable::from_toml_str(
            r#"
[service_specific]
roofing = "Custom roofing script"

[seasonal]
spring = "Spring special"
"#,
        )
        .unwrap();
        assert_eq!(
            table.get(&TemplateKey::service(Service::Roofing)),
            Some("Custom roofing script")
        );
        assert!(table.contains(&TemplateKey::service(Service::Siding)));
        assert_eq!(
            table.get(&TemplateKey::new("seasonal", "spring")),
            Some("Spring special")
        );
    }

    #[test]
    fn malformed_override_is_config_error() {
        let err = TemplateTable::from_toml_str("service_specific = 3").unwrap_err();
        assert!(matches!(err, RileyError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scripts.toml");
        std::fs::write(&path, "[follow_up]\nafter_inspection = \"How did it go?\"\n").unwrap();
        let table = TemplateTable::load(&path).unwrap();
        assert_eq!(
            table.get(&TemplateKey::AFTER_INSPECTION),
            Some("How did it go?")
        );
    }

    #[test]
    fn key_displays_dotted() {
        assert_eq!(
            TemplateKey::service(Service::Gutters).to_string(),
            "service_specific.gutters"
        );
    }
}
