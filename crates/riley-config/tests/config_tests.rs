// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Riley configuration system.

use riley_config::diagnostic::ConfigError;
use riley_config::model::RileyConfig;
use riley_config::{load_and_validate_str, load_config_from_str};

/// A file touching every section deserializes into the expected values.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "Riley"
company_name = "Acme Roofing"
personality = "Keep it short."
negative_filters = ["guarantee", "cheapest"]
history_window = 6
log_level = "debug"

[agent.company_details]
phone = "555-0100"
service_area = "Springfield"

[gateway]
host = "0.0.0.0"
port = 8080
bearer_token = "operator-secret"

[storage]
database_path = "/tmp/riley.db"
wal_mode = false
retention_days = 90

[generative]
enabled = true
timeout_secs = 3

[[generative.providers]]
name = "openai"
api_key = "sk-test"

[templates]
file = "/etc/riley/scripts.toml"

[business_hours]
enabled = true
utc_offset_minutes = -300

[delivery]
max_attempts = 5
backoff_ms = 100

[secrets]
cache_ttl_secs = 60
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.company_name, "Acme Roofing");
    assert_eq!(config.agent.negative_filters, vec!["guarantee", "cheapest"]);
    assert_eq!(config.agent.company_details["phone"], "555-0100");
    assert_eq!(config.agent.history_window, 6);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("operator-secret"));
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.retention_days, Some(90));
    assert!(config.generative.enabled);
    assert_eq!(config.generative.timeout_secs, 3);
    assert_eq!(config.generative.providers[0].api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.templates.file.as_deref(), Some("/etc/riley/scripts.toml"));
    assert_eq!(config.business_hours.utc_offset_minutes, -300);
    assert_eq!(config.delivery.max_attempts, 5);
    assert_eq!(config.secrets.cache_ttl_secs, 60);
}

/// An empty file yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let defaults = RileyConfig::default();
    assert_eq!(config.agent.company_name, defaults.agent.company_name);
    assert_eq!(config.gateway.port, defaults.gateway.port);
    assert_eq!(config.generative.providers.len(), 1);
    assert!(config.business_hours.schedule.sunday.is_none());
}

/// A misspelled key is reported with a suggestion.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[agent]
compnay_name = "Acme"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "compnay_name" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("company_name"));
}

/// Unknown keys in nested provider tables are rejected too.
#[test]
fn unknown_key_in_provider_is_rejected() {
    let toml = r#"
[[generative.providers]]
name = "openai"
modle = "gpt-4o"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "modle")));
}

/// A value of the wrong type produces an InvalidType error.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

/// Semantic validation runs after a successful parse.
#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[gateway]
port = 0

[delivery]
max_attempts = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
}

/// Unknown top-level sections are rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// Effective config serializes to JSON for `riley config`.
#[test]
fn config_serializes_to_json() {
    let config = RileyConfig::default();
    let value = serde_json::to_value(&config).expect("config should serialize");
    assert_eq!(value["generative"]["providers"][0]["model"], "gpt-4o-mini");
}
