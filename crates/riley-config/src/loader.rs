// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./riley.toml` > `~/.config/riley/riley.toml` > `/etc/riley/riley.toml`
//! with environment variable overrides via `RILEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RileyConfig;

/// Config sections that environment variables may address, longest first so
/// `business_hours_` wins over any shorter prefix.
const ENV_SECTIONS: &[&str] = &[
    "business_hours",
    "generative",
    "templates",
    "delivery",
    "gateway",
    "storage",
    "secrets",
    "agent",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/riley/riley.toml` (system-wide)
/// 3. `~/.config/riley/riley.toml` (user XDG config)
/// 4. `./riley.toml` (local directory)
/// 5. `RILEY_*` environment variables
pub fn load_config() -> Result<RileyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RileyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RileyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RileyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RileyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RileyConfig::default()))
        .merge(Toml::file("/etc/riley/riley.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("riley/riley.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("riley.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `RILEY_GATEWAY_BEARER_TOKEN`
/// must become `gateway.bearer_token`, not `gateway.bearer.token`.
fn env_provider() -> Env {
    Env::prefixed("RILEY_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name onto a dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(
            map_env_key("business_hours_utc_offset_minutes"),
            "business_hours.utc_offset_minutes"
        );
        assert_eq!(map_env_key("agent_company_name"), "agent.company_name");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "riley.toml",
                r#"
[gateway]
port = 4000
"#,
            )?;
            jail.set_env("RILEY_GATEWAY_PORT", "5000");
            jail.set_env("RILEY_AGENT_COMPANY_NAME", "Acme Roofing");

            let config = load_config_from_path(Path::new("riley.toml"))?;
            assert_eq!(config.gateway.port, 5000);
            assert_eq!(config.agent.company_name, "Acme Roofing");
            Ok(())
        });
    }
}
