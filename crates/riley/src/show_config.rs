// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `riley config`: print the effective configuration.

use riley_config::RileyConfig;
use riley_core::RileyError;

const REDACTED: &str = "[redacted]";

/// Copy of `config` with every inline secret replaced.
pub fn redacted(config: &RileyConfig) -> RileyConfig {
    let mut config = config.clone();
    if config.gateway.bearer_token.is_some() {
        config.gateway.bearer_token = Some(REDACTED.to_string());
    }
    for provider in &mut config.generative.providers {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.to_string());
        }
    }
    config
}

pub fn run_config(config: &RileyConfig) -> Result<(), RileyError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| RileyError::Internal(format!("cannot render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_redacted() {
        let config = riley_config::load_and_validate_str(
            r#"
[gateway]
bearer_token = "op-token-123"

[[generative.providers]]
name = "primary"
api_key = "sk-live-abc"
"#,
        )
        .unwrap();
        let rendered = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!rendered.contains("op-token-123"));
        assert!(!rendered.contains("sk-live-abc"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("api_key_env = \"OPENAI_API_KEY\""));
    }

    #[test]
    fn unset_secrets_stay_unset() {
        let config = redacted(&RileyConfig::default());
        assert!(config.gateway.bearer_token.is_none());
        assert!(config.generative.providers[0].api_key.is_none());
    }
}
