//! High-Performance In-Memory Result Cache
//!
//! Thread-safe caching layer for wallet analysis results.
//! Uses DashMap for concurrent access without lock contention.
//!
//! Features:
//! - TTL-based expiration (5 minutes default), never extended on read
//! - Keyed by canonical address
//! - Background sweep of entries older than 3x TTL
//! - Cache HIT/MISS counters

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::types::{AnalysisResult, WalletAddress};
use crate::utils::constants::{CACHE_SWEEP_TTL_MULTIPLIER, DEFAULT_CACHE_TTL_SECS};

/// Cache entry with creation time for TTL validation
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub result: AnalysisResult,
    pub created_at: Instant,
}

impl CacheEntry {
    #[inline]
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// Process-scoped result cache
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<DashMap<WalletAddress, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Live entry for `address`, or `None` once the TTL has elapsed
    pub fn get(&self, address: &WalletAddress) -> Option<AnalysisResult> {
        self.get_at(address, Instant::now())
    }

    pub(crate) fn get_at(&self, address: &WalletAddress, now: Instant) -> Option<AnalysisResult> {
        let live = self
            .store
            .get(address)
            .filter(|entry| entry.age(now) < self.ttl)
            .map(|entry| entry.result.clone());

        match live {
            Some(result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                info!("✅ CACHE HIT: {}", address);
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS: {}", address);
                None
            }
        }
    }

    /// Store a fresh result, replacing any previous entry
    pub fn put(&self, address: &WalletAddress, result: AnalysisResult) {
        self.put_at(address, result, Instant::now());
    }

    pub(crate) fn put_at(&self, address: &WalletAddress, result: AnalysisResult, now: Instant) {
        self.store.insert(
            address.clone(),
            CacheEntry {
                result,
                created_at: now,
            },
        );
        info!("💾 CACHE SET: {} (TTL: {}s)", address, self.ttl.as_secs());
    }

    /// Drop entries older than 3x TTL; returns how many were removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let horizon = self.ttl * CACHE_SWEEP_TTL_MULTIPLIER;
        let before = self.store.len();
        self.store.retain(|_, entry| entry.age(now) <= horizon);
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            info!("🧹 CACHE SWEEP: {} stale entries removed", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}
