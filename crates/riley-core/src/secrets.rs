// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret lookup with a time-bounded in-process cache.
//!
//! The cache is an owned value handed to whoever needs secrets; nothing here
//! is global.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use secrecy::SecretString;
use tracing::debug;

use crate::error::RileyError;

/// Default lifetime of a cached secret.
pub const DEFAULT_SECRET_TTL: Duration = Duration::from_secs(300);

/// A map whose entries expire a fixed duration after insertion.
#[derive(Debug)]
pub struct TtlCache<K: Eq + Hash, V> {
    entries: DashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a live entry, evicting it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let hit = self.entries.get(key).map(|entry| {
            let (value, inserted) = entry.value();
            (value.clone(), now.duration_since(*inserted) < self.ttl)
        });
        match hit {
            Some((value, true)) => Some(value),
            Some((_, false)) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (value, now));
    }

    /// Returns the cached value or computes, stores, and returns a fresh one.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        fetch: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where secret values ultimately come from.
pub trait SecretSource: Send + Sync {
    fn fetch(&self, name: &str) -> Result<SecretString, RileyError>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn fetch(&self, name: &str) -> Result<SecretString, RileyError> {
        std::env::var(name)
            .map(SecretString::from)
            .map_err(|_| RileyError::Config(format!("secret `{name}` is not set")))
    }
}

/// A [`SecretSource`] wrapper that caches lookups for a fixed TTL.
pub struct CachedSecrets<S> {
    source: S,
    cache: TtlCache<String, Arc<SecretString>>,
}

impl<S: SecretSource> CachedSecrets<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Resolves a secret, hitting the underlying source at most once per TTL.
    pub fn resolve(&self, name: &str) -> Result<Arc<SecretString>, RileyError> {
        self.cache.get_or_try_insert_with(name.to_string(), || {
            debug!(secret = name, "secret cache miss");
            self.source.fetch(name).map(Arc::new)
        })
    }

    pub fn invalidate(&self, name: &str) {
        self.cache.invalidate(&name.to_string());
    }
}

/// Object-safe handle on a secret cache, for holders that resolve on every
/// use.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Arc<SecretString>, RileyError>;
}

impl<S: SecretSource> SecretResolver for CachedSecrets<S> {
    fn resolve(&self, name: &str) -> Result<Arc<SecretString>, RileyError> {
        CachedSecrets::resolve(self, name)
    }
}

/// Masks all but the last four characters of an identifier for logging.
pub fn mask_participant(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}
