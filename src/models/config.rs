//! Configuration module for Wallet Scout
//!
//! Defaults come from utils/constants.rs; `from_env()` lets a deployment
//! override them without a rebuild.

use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use super::types::WalletAddress;
use crate::utils::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_EXPLORER_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS,
    ENRICH_CONCURRENCY, ENRICH_SETTLE_DELAY_MS, KNOWN_BRIDGES, KNOWN_DAPPS,
    MAINTENANCE_INTERVAL_SECS, MAX_COUNTERPARTIES, RATE_LIMIT_MAX_REQ, RATE_LIMIT_WINDOW_SECS,
    SAMPLE_COUNTERPARTIES,
};

/// Read an env var and parse it, keeping `default` when absent or invalid
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("⚠️ Ignoring invalid {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Pipeline tuning shared by the analyzer and its components
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Fixed rate-limit window
    pub rate_limit_window: Duration,
    /// Requests admitted per client per window
    pub rate_limit_max_requests: u32,
    /// Result cache time-to-live
    pub cache_ttl: Duration,
    /// Max in-flight code lookups per request
    pub enrich_concurrency: usize,
    /// Pause after each lookup before its slot frees
    pub enrich_settle_delay: Duration,
    /// Counterparties considered for enrichment
    pub max_counterparties: usize,
    /// Counterparties echoed in the response sample
    pub sample_size: usize,
    /// Interval between cache/rate-limit sweeps
    pub maintenance_interval: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rate_limit_window: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
            rate_limit_max_requests: RATE_LIMIT_MAX_REQ,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            enrich_concurrency: ENRICH_CONCURRENCY,
            enrich_settle_delay: Duration::from_millis(ENRICH_SETTLE_DELAY_MS),
            max_counterparties: MAX_COUNTERPARTIES,
            sample_size: SAMPLE_COUNTERPARTIES,
            maintenance_interval: Duration::from_secs(MAINTENANCE_INTERVAL_SECS),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults overridden by `WALLET_SCOUT_*` env vars
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            rate_limit_window: Duration::from_secs(env_or(
                "WALLET_SCOUT_RATE_WINDOW_SECS",
                d.rate_limit_window.as_secs(),
            )),
            rate_limit_max_requests: env_or(
                "WALLET_SCOUT_RATE_MAX_REQ",
                d.rate_limit_max_requests,
            ),
            cache_ttl: Duration::from_secs(env_or(
                "WALLET_SCOUT_CACHE_TTL_SECS",
                d.cache_ttl.as_secs(),
            )),
            enrich_concurrency: env_or("WALLET_SCOUT_ENRICH_CONCURRENCY", d.enrich_concurrency)
                .max(1),
            ..d
        }
    }
}

/// Etherscan-compatible upstream settings
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub base_url: String,
    /// Never logged
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl ExplorerConfig {
    /// Name reported when the key is missing
    pub const API_KEY_VAR: &'static str = "EXPLORER_API_KEY";

    pub fn from_env() -> Self {
        let api_key = std::env::var(Self::API_KEY_VAR)
            .or_else(|_| std::env::var("ETHERSCAN_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty() && k != "YOUR_API_KEY");

        if api_key.is_some() {
            info!("🔑 Explorer API key configured (key hidden)");
        } else {
            warn!("⚠️ {} not set; analyses will fail with missing credentials", Self::API_KEY_VAR);
        }

        Self {
            base_url: std::env::var("EXPLORER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EXPLORER_BASE_URL.to_string()),
            api_key,
            timeout: Duration::from_secs(env_or(
                "EXPLORER_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
        }
    }
}

/// Static bridge and dApp lists used by scoring
#[derive(Debug, Clone, Default)]
pub struct KnownAddresses {
    pub bridges: HashSet<WalletAddress>,
    pub dapps: HashSet<WalletAddress>,
}

impl KnownAddresses {
    /// Built-in mainnet lists
    pub fn mainnet() -> Self {
        Self::from_lists(KNOWN_BRIDGES, KNOWN_DAPPS)
    }

    /// Build from raw strings, skipping anything malformed
    pub fn from_lists<S: AsRef<str>>(bridges: &[S], dapps: &[S]) -> Self {
        let collect = |list: &[S]| {
            list.iter()
                .filter_map(|s| WalletAddress::parse(s.as_ref()).ok())
                .collect::<HashSet<_>>()
        };
        Self {
            bridges: collect(bridges),
            dapps: collect(dapps),
        }
    }

    #[inline]
    pub fn is_bridge(&self, address: &WalletAddress) -> bool {
        self.bridges.contains(address)
    }

    #[inline]
    pub fn is_dapp(&self, address: &WalletAddress) -> bool {
        self.dapps.contains(address)
    }
}

/// HTTP listener settings for the binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `PORT` wins over `WALLET_SCOUT_PORT` (platform convention)
    pub fn from_env() -> Self {
        let host = std::env::var("WALLET_SCOUT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("WALLET_SCOUT_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self { host, port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_lists_load() {
        let known = KnownAddresses::mainnet();
        assert_eq!(known.bridges.len(), KNOWN_BRIDGES.len());
        assert_eq!(known.dapps.len(), KNOWN_DAPPS.len());

        let uniswap_v2 = WalletAddress::parse("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D").unwrap();
        assert!(known.is_dapp(&uniswap_v2));
        assert!(!known.is_bridge(&uniswap_v2));
    }

    #[test]
    fn test_from_lists_normalizes_and_skips_garbage() {
        let known = KnownAddresses::from_lists(
            &["0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "nope"],
            &[],
        );
        assert_eq!(known.bridges.len(), 1);
        let addr = WalletAddress::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert!(known.is_bridge(&addr));
        assert!(known.dapps.is_empty());
    }

    #[test]
    fn test_default_config_values() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.enrich_concurrency, 6);
        assert_eq!(cfg.max_counterparties, 250);
        assert_eq!(ExplorerConfig::default().timeout, Duration::from_secs(15));
    }
}
