// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: addresses, time-of-day
//! strings, provider lists, and numeric ranges. All errors are collected.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RileyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &RileyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "agent.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("gateway.host", "must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::invalid(
            "gateway.host",
            format!("`{host}` is not a valid IP address or hostname"),
        ));
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::invalid("gateway.port", "must be non-zero"));
    }

    if config.gateway.request_timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "gateway.request_timeout_secs",
            "must be at least 1",
        ));
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::invalid(
            "gateway.bearer_token",
            "must not be empty when set",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    if config.storage.retention_days == Some(0) {
        errors.push(ConfigError::invalid(
            "storage.retention_days",
            "must be at least 1",
        ));
    }

    validate_generative(config, &mut errors);
    validate_business_hours(config, &mut errors);

    if config.delivery.max_attempts == 0 {
        errors.push(ConfigError::invalid(
            "delivery.max_attempts",
            "must be at least 1",
        ));
    }

    if config.secrets.cache_ttl_secs == 0 {
        errors.push(ConfigError::invalid(
            "secrets.cache_ttl_secs",
            "must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_generative(config: &RileyConfig, errors: &mut Vec<ConfigError>) {
    let generative = &config.generative;

    if generative.timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "generative.timeout_secs",
            "must be at least 1",
        ));
    }

    if generative.enabled && generative.providers.is_empty() {
        errors.push(ConfigError::invalid(
            "generative.providers",
            "at least one provider is required when generative replies are enabled",
        ));
    }

    // The scripted fallback must still fit inside the request budget.
    let worst_case = generative
        .timeout_secs
        .saturating_mul(generative.providers.len() as u64);
    if generative.enabled && worst_case >= config.gateway.request_timeout_secs {
        errors.push(ConfigError::invalid(
            "generative.timeout_secs",
            format!(
                "{} provider(s) x {}s must stay below gateway.request_timeout_secs ({}s)",
                generative.providers.len(),
                generative.timeout_secs,
                config.gateway.request_timeout_secs
            ),
        ));
    }

    let mut seen = HashSet::new();
    for (i, provider) in generative.providers.iter().enumerate() {
        let key = |field: &str| format!("generative.providers[{i}].{field}");

        if provider.name.trim().is_empty() {
            errors.push(ConfigError::invalid(key("name"), "must not be empty"));
        } else if !seen.insert(provider.name.as_str()) {
            errors.push(ConfigError::invalid(
                key("name"),
                format!("duplicate provider name `{}`", provider.name),
            ));
        }

        if !(provider.base_url.starts_with("http://") || provider.base_url.starts_with("https://"))
        {
            errors.push(ConfigError::invalid(
                key("base_url"),
                "must start with http:// or https://",
            ));
        }

        if provider.max_tokens == 0 {
            errors.push(ConfigError::invalid(key("max_tokens"), "must be at least 1"));
        }

        if !(0.0..=2.0).contains(&provider.temperature) {
            errors.push(ConfigError::invalid(
                key("temperature"),
                format!("must be between 0.0 and 2.0, got {}", provider.temperature),
            ));
        }
    }
}

fn validate_business_hours(config: &RileyConfig, errors: &mut Vec<ConfigError>) {
    let hours = &config.business_hours;

    if hours.utc_offset_minutes.abs() > 14 * 60 {
        errors.push(ConfigError::invalid(
            "business_hours.utc_offset_minutes",
            "must be within +/-840 minutes",
        ));
    }

    for (name, day) in DAY_NAMES.iter().zip(hours.schedule.days()) {
        let Some(day) = day else { continue };
        let open = parse_hhmm(&day.open);
        let close = parse_hhmm(&day.close);
        if open.is_none() {
            errors.push(ConfigError::invalid(
                format!("business_hours.schedule.{name}.open"),
                format!("`{}` is not an HH:MM time", day.open),
            ));
        }
        if close.is_none() {
            errors.push(ConfigError::invalid(
                format!("business_hours.schedule.{name}.close"),
                format!("`{}` is not an HH:MM time", day.close),
            ));
        }
        if let (Some(open), Some(close)) = (open, close)
            && open >= close
        {
            errors.push(ConfigError::invalid(
                format!("business_hours.schedule.{name}"),
                "opening time must be before closing time",
            ));
        }
    }
}

/// Parses `HH:MM` (24-hour) into minutes past midnight.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (h, m) = value.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}
