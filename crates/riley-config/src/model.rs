// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Riley CRM assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Riley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RileyConfig {
    /// Assistant identity and business context.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generative reply providers.
    #[serde(default)]
    pub generative: GenerativeConfig,

    /// Response template overrides.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Opening hours and the after-hours notice.
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,

    /// Outbound delivery retry policy.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Secret cache settings.
    #[serde(default)]
    pub secrets: SecretsConfig,
}

/// Assistant identity and business context.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the assistant introduces itself with.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Company the assistant speaks for.
    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// Tone instructions for generative replies.
    #[serde(default = "default_personality")]
    pub personality: String,

    /// Free-form company facts (phone, service area, ...) passed to providers.
    #[serde(default)]
    pub company_details: BTreeMap<String, String>,

    /// Phrases generative replies must avoid.
    #[serde(default)]
    pub negative_filters: Vec<String>,

    /// Number of prior turns handed to a generative provider.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            company_name: default_company_name(),
            personality: default_personality(),
            company_details: BTreeMap::new(),
            negative_filters: Vec::new(),
            history_window: default_history_window(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "Riley".to_string()
}

fn default_company_name() -> String {
    "Panda Exteriors".to_string()
}

fn default_personality() -> String {
    "Be professional, friendly, and helpful.".to_string()
}

fn default_history_window() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for the operator conversation API. `None` leaves it open.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Conversations idle for longer than this are purged. `None` keeps everything.
    #[serde(default = "default_retention_days")]
    pub retention_days: Option<u32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("riley").join("riley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("riley.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_retention_days() -> Option<u32> {
    Some(30)
}

/// Generative reply configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerativeConfig {
    /// When false, every reply comes from the scripted templates.
    #[serde(default)]
    pub enabled: bool,

    /// Upper bound on a single provider call, in seconds.
    #[serde(default = "default_generative_timeout_secs")]
    pub timeout_secs: u64,

    /// Providers tried in order; later entries act as fallbacks.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: default_generative_timeout_secs(),
            providers: default_providers(),
        }
    }
}

fn default_generative_timeout_secs() -> u64 {
    5
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::default()]
}

/// One OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Label used in logs and metadata.
    #[serde(default = "default_provider_name")]
    pub name: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Inline API key. When `None`, `api_key_env` is consulted.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

/// Response template overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// TOML file whose `[category] subcategory = "..."` entries replace the
    /// built-in scripts.
    #[serde(default)]
    pub file: Option<String>,
}

/// Opening hours configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessHoursConfig {
    /// Append the after-hours notice to replies sent while closed.
    #[serde(default)]
    pub enabled: bool,

    /// Offset of the business's local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Notice text. Supports `[[Next Open Time]]`, `[[Company Name]]`, and
    /// `[[Customer Name]]`.
    #[serde(default = "default_after_hours_message")]
    pub after_hours_message: String,

    #[serde(default)]
    pub schedule: WeeklySchedule,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            utc_offset_minutes: 0,
            after_hours_message: default_after_hours_message(),
            schedule: WeeklySchedule::default(),
        }
    }
}

fn default_after_hours_message() -> String {
    "Thanks for reaching out! We are currently closed, but we wanted to confirm we received \
     your message. We'll get back to you as soon as possible after we open at [[Next Open Time]]."
        .to_string()
}

/// Open/close times per weekday. A missing day is closed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub sunday: Option<DayHours>,
    #[serde(default = "weekday_hours")]
    pub monday: Option<DayHours>,
    #[serde(default = "weekday_hours")]
    pub tuesday: Option<DayHours>,
    #[serde(default = "weekday_hours")]
    pub wednesday: Option<DayHours>,
    #[serde(default = "weekday_hours")]
    pub thursday: Option<DayHours>,
    #[serde(default = "weekday_hours")]
    pub friday: Option<DayHours>,
    #[serde(default = "saturday_hours")]
    pub saturday: Option<DayHours>,
}

impl WeeklySchedule {
    /// Days indexed from Sunday (0) to Saturday (6).
    pub fn days(&self) -> [Option<&DayHours>; 7] {
        [
            self.sunday.as_ref(),
            self.monday.as_ref(),
            self.tuesday.as_ref(),
            self.wednesday.as_ref(),
            self.thursday.as_ref(),
            self.friday.as_ref(),
            self.saturday.as_ref(),
        ]
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            sunday: None,
            monday: weekday_hours(),
            tuesday: weekday_hours(),
            wednesday: weekday_hours(),
            thursday: weekday_hours(),
            friday: weekday_hours(),
            saturday: saturday_hours(),
        }
    }
}

fn weekday_hours() -> Option<DayHours> {
    Some(DayHours {
        open: "08:00".to_string(),
        close: "18:00".to_string(),
    })
}

fn saturday_hours() -> Option<DayHours> {
    Some(DayHours {
        open: "09:00".to_string(),
        close: "16:00".to_string(),
    })
}

/// `HH:MM` opening and closing time for one day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

/// Outbound delivery retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Total send attempts per message, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each subsequent retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

/// Secret cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsConfig {
    /// How long a resolved secret is reused before being looked up again.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RileyConfig::default();
        assert_eq!(config.agent.company_name, "Panda Exteriors");
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.storage.retention_days, Some(30));
        assert!(!config.generative.enabled);
        assert_eq!(config.generative.timeout_secs, 5);
        assert_eq!(config.generative.providers.len(), 1);
        assert_eq!(config.generative.providers[0].model, "gpt-4o-mini");
        assert_eq!(config.generative.providers[0].max_tokens, 150);
        assert_eq!(config.secrets.cache_ttl_secs, 300);
    }

    #[test]
    fn default_schedule_closes_sunday() {
        let schedule = WeeklySchedule::default();
        let days = schedule.days();
        assert!(days[0].is_none());
        assert_eq!(days[1].map(|d| d.open.as_str()), Some("08:00"));
        assert_eq!(days[6].map(|d| d.close.as_str()), Some("16:00"));
    }

    #[test]
    fn partial_schedule_keeps_other_defaults() {
        let toml_str = r#"
[business_hours.schedule]
saturday = { open = "10:00", close = "14:00" }
"#;
        let config: RileyConfig = toml::from_str(toml_str).unwrap();
        let days = config.business_hours.schedule.days();
        assert_eq!(days[6].map(|d| d.open.as_str()), Some("10:00"));
        assert_eq!(days[2].map(|d| d.close.as_str()), Some("18:00"));
    }

    #[test]
    fn provider_list_deserializes() {
        let toml_str = r#"
[generative]
enabled = true

[[generative.providers]]
name = "primary"
api_key = "sk-1"

[[generative.providers]]
name = "backup"
base_url = "https://llm.example.com"
model = "gpt-4o"
"#;
        let config: RileyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generative.providers.len(), 2);
        assert_eq!(config.generative.providers[0].api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.generative.providers[1].base_url, "https://llm.example.com");
        assert_eq!(config.generative.providers[1].temperature, 0.7);
    }
}
