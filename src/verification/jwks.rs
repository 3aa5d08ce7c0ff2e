// JWK set structures and the in-memory signing key cache

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Back-off after a failed fetch before the keys are requested again
pub const FETCH_RETRY_BACKOFF: Duration = Duration::from_secs(300);

/// Minimum spacing between refetches triggered by an unknown key id
pub const KEY_MISS_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonWebKey {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// Signing keys of a single issuer, indexed by key id
pub struct JwksCache {
    keys: HashMap<String, JsonWebKey>,
    last_updated: Option<DateTime<Utc>>,
    last_failed: Option<DateTime<Utc>>,
    cache_duration: Duration,
    retry_backoff: Duration,
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl JwksCache {
    #[must_use]
    pub fn new(cache_duration: Duration) -> Self {
        Self {
            keys: HashMap::new(),
            last_updated: None,
            last_failed: None,
            cache_duration,
            retry_backoff: FETCH_RETRY_BACKOFF,
        }
    }

    #[must_use]
    pub fn is_cache_valid(&self) -> bool {
        self.last_updated
            .is_some_and(|updated| elapsed_since(updated) < self.cache_duration)
    }

    #[must_use]
    pub fn should_retry_fetch(&self) -> bool {
        self.last_failed
            .is_none_or(|failed| elapsed_since(failed) >= self.retry_backoff)
    }

    /// Whether a token with an unknown key id may trigger a refetch
    #[must_use]
    pub fn should_refetch_for_unknown_key(&self) -> bool {
        self.last_updated
            .is_none_or(|updated| elapsed_since(updated) >= KEY_MISS_REFETCH_INTERVAL)
    }

    #[must_use]
    pub fn get_key(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.get(kid)
    }

    /// Replace the cached keys; keys without an id cannot be selected and are skipped
    pub fn store_keys(&mut self, keys: Vec<JsonWebKey>) {
        self.keys = keys
            .into_iter()
            .filter_map(|key| key.kid.clone().map(|kid| (kid, key)))
            .collect();
        debug!("💾 Cached {} signing keys", self.keys.len());
        self.last_updated = Some(Utc::now());
        self.last_failed = None;
    }

    pub fn record_fetch_failure(&mut self) {
        self.last_failed = Some(Utc::now());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn elapsed_since(instant: DateTime<Utc>) -> Duration {
    Utc::now()
        .signed_duration_since(instant)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
