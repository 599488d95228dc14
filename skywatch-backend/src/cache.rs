///! In-memory cache of computed target responses.
///!
///! Entries are keyed by target name, the observation instant rounded down to
///! a time bucket, and the observer location snapped to a grid. A lookup for a
///! different bucket or cell is a miss and gets recomputed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use skywatch_common::{ObserverLocation, TargetResponse};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::CacheConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    pub bucket_minutes: i64,
    pub location_precision_deg: f64,
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            bucket_minutes: config.bucket_minutes.max(1),
            location_precision_deg: config.location_precision_deg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    /// Unix seconds at the start of the instant's bucket
    pub bucket_start: i64,
    pub lat_cell: i64,
    pub lon_cell: i64,
}

impl CacheKey {
    pub fn new(
        name: &str,
        instant: DateTime<Utc>,
        location: &ObserverLocation,
        policy: &CachePolicy,
    ) -> Self {
        let bucket_secs = policy.bucket_minutes.max(1) * 60;
        let cell = |value: f64| (value / policy.location_precision_deg).round() as i64;

        Self {
            name: name.to_string(),
            bucket_start: instant.timestamp().div_euclid(bucket_secs) * bucket_secs,
            lat_cell: cell(location.latitude),
            lon_cell: cell(location.longitude),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedTarget {
    pub response: TargetResponse,
    /// Exact instant the response was computed for
    pub computed_for: DateTime<Utc>,
    pub stored_at: DateTime<Utc>,
}

pub struct TargetCache {
    policy: CachePolicy,
    entries: RwLock<HashMap<CacheKey, CachedTarget>>,
}

impl TargetCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn key(&self, name: &str, instant: DateTime<Utc>, location: &ObserverLocation) -> CacheKey {
        CacheKey::new(name, instant, location, &self.policy)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedTarget> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: CacheKey, response: TargetResponse, computed_for: DateTime<Utc>) {
        let entry = CachedTarget {
            response,
            computed_for,
            stored_at: Utc::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every entry for `name`; returns how many were removed.
    pub async fn invalidate(&self, name: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.name != name);
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop entries stored longer than `max_age` ago.
    pub async fn prune(&self, max_age: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age));
        let Some(cutoff) = cutoff else {
            return 0;
        };

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at >= cutoff);
        before - entries.len()
    }
}

/// Periodically prune `cache`, like the log cleanup task.
pub fn start_prune_task(cache: Arc<TargetCache>, max_age: Duration, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; nothing to prune at startup
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.prune(max_age).await;
            if removed > 0 {
                info!("Pruned {} cached target(s)", removed);
            } else {
                debug!("Cache prune found nothing older than {:?}", max_age);
            }
        }
    })
}
