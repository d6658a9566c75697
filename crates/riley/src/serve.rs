// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `riley serve` command implementation.
//!
//! Opens SQLite storage, builds the generative providers and delivery
//! channel, and runs the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use riley_agent::{shutdown, DeliveryDispatcher, LogDelivery, Orchestrator};
use riley_config::RileyConfig;
use riley_core::{
    CachedSecrets, EnvSecretSource, PluginAdapter, ResponseGenerator, RileyError, StorageAdapter,
};
use riley_gateway::{GatewayState, ServerConfig};
use riley_openai::OpenAiProvider;
use riley_storage::SqliteStorage;
use tracing::{info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Runs the `riley serve` command.
pub async fn run_serve(config: RileyConfig) -> Result<(), RileyError> {
    init_tracing(&config.agent.log_level);

    info!("starting riley serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    storage.purge_expired().await?;

    let secrets = Arc::new(CachedSecrets::new(
        EnvSecretSource,
        Duration::from_secs(config.secrets.cache_ttl_secs),
    ));
    let generators = build_generators(&config, &secrets);

    let delivery = DeliveryDispatcher::new(Arc::new(LogDelivery), &config.delivery);
    info!(channel = delivery.channel_name(), "delivery channel ready");

    let orchestrator = Orchestrator::new(storage.clone(), &config)?
        .with_generators(generators)
        .with_delivery(delivery);

    let cancel = shutdown::install_signal_handler();

    let purge_task = config.storage.retention_days.map(|days| {
        info!(retention_days = days, "conversation retention enabled");
        let storage = storage.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown::run_periodic(PURGE_INTERVAL, cancel, || {
                let storage = storage.clone();
                async move {
                    if let Err(e) = storage.purge_expired().await {
                        warn!(error = %e, "retention purge failed");
                    }
                }
            })
            .await;
        })
    });

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        bearer_token: config.gateway.bearer_token.clone(),
        request_timeout_secs: config.gateway.request_timeout_secs,
    };
    if server_config.bearer_token.is_none() {
        warn!("gateway.bearer_token not set, conversation API is unauthenticated");
    }
    let state = GatewayState::new(Arc::new(orchestrator), &server_config);

    let server_cancel = cancel.clone();
    let served = riley_gateway::start_server(&server_config, state, async move {
        server_cancel.cancelled().await;
    })
    .await;

    cancel.cancel();
    if let Some(task) = purge_task {
        let _ = task.await;
    }
    storage.shutdown().await?;
    served?;

    info!("riley serve shutdown complete");
    Ok(())
}

/// One provider per `[[generative.providers]]` entry, in order. Providers
/// whose key cannot be resolved are skipped.
fn build_generators(
    config: &RileyConfig,
    secrets: &Arc<CachedSecrets<EnvSecretSource>>,
) -> Vec<Arc<dyn ResponseGenerator>> {
    if !config.generative.enabled {
        info!("generative replies disabled, using scripted templates");
        return Vec::new();
    }

    let mut generators: Vec<Arc<dyn ResponseGenerator>> = Vec::new();
    for provider in &config.generative.providers {
        match OpenAiProvider::new(provider, secrets.clone()) {
            Ok(p) => generators.push(Arc::new(p)),
            Err(e) => warn!(provider = %provider.name, error = %e, "provider unavailable, skipping"),
        }
    }
    if generators.is_empty() {
        warn!("no generative provider could be initialized, using scripted templates");
    }
    generators
}

/// `RUST_LOG` wins over `agent.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "riley={log_level},riley_agent={log_level},riley_gateway={log_level},\
             riley_storage={log_level},riley_openai={log_level},riley_triage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use riley_config::model::ProviderConfig;

    #[test]
    fn disabled_generative_builds_nothing() {
        let secrets = Arc::new(CachedSecrets::new(EnvSecretSource, Duration::from_secs(1)));
        assert!(build_generators(&RileyConfig::default(), &secrets).is_empty());
    }

    #[test]
    fn providers_with_inline_keys_are_built_in_order() {
        let mut config = RileyConfig::default();
        config.generative.enabled = true;
        config.generative.providers = vec![
            ProviderConfig {
                name: "primary".into(),
                api_key: Some("sk-one".into()),
                ..Default::default()
            },
            ProviderConfig {
                name: "unset".into(),
                api_key_env: "RILEY_TEST_KEY_THAT_IS_NEVER_SET".into(),
                ..Default::default()
            },
            ProviderConfig {
                name: "backup".into(),
                api_key: Some("sk-two".into()),
                ..Default::default()
            },
        ];
        let secrets = Arc::new(CachedSecrets::new(EnvSecretSource, Duration::from_secs(1)));
        let names: Vec<String> = build_generators(&config, &secrets)
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["primary", "backup"]);
    }
}
