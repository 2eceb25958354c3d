//! Wallet Analyzer - one request, start to finish
//!
//! admit -> validate -> cache -> fetch (x3) -> counterparties -> enrich
//! -> score -> cache store
//!
//! The analyzer owns all process-scoped state (rate windows, cache,
//! telemetry). Build one at startup and share it behind an `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::enricher::{counterparty_set, BoundedEnricher};
use super::scoring::{self, ScoringInput};
use crate::models::config::{AnalyzerConfig, KnownAddresses};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    AnalysisOutcome, AnalysisResult, CodePresence, CounterpartySample, SampleSummary,
    WalletAddress,
};
use crate::providers::source::ChainDataSource;
use crate::utils::cache::ResultCache;
use crate::utils::rate_limiter::{Admission, RateLimitConfig, RateLimiter};
use crate::utils::telemetry::TelemetryCollector;

pub struct WalletAnalyzer<S: ChainDataSource> {
    source: Arc<S>,
    limiter: Arc<RateLimiter>,
    cache: ResultCache,
    enricher: BoundedEnricher,
    known: Arc<KnownAddresses>,
    telemetry: Arc<TelemetryCollector>,
    config: AnalyzerConfig,
}

impl<S: ChainDataSource> WalletAnalyzer<S> {
    pub fn new(source: S, config: AnalyzerConfig) -> Self {
        Self::with_known_addresses(source, config, KnownAddresses::mainnet())
    }

    /// Same as `new` but with custom bridge/dApp lists
    pub fn with_known_addresses(source: S, config: AnalyzerConfig, known: KnownAddresses) -> Self {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: config.rate_limit_max_requests,
            window_duration: config.rate_limit_window,
        });

        Self {
            source: Arc::new(source),
            limiter: Arc::new(limiter),
            cache: ResultCache::new(config.cache_ttl),
            enricher: BoundedEnricher::from_config(&config),
            known: Arc::new(known),
            telemetry: Arc::new(TelemetryCollector::new()),
            config,
        }
    }

    /// Analyze `raw_address` on behalf of `client_key`
    pub async fn analyze(&self, client_key: &str, raw_address: &str) -> AppResult<AnalysisOutcome> {
        let outcome = self.run(client_key, raw_address).await;
        if let Err(ref e) = outcome {
            self.telemetry.record_failure(e.code);
        }
        outcome
    }

    async fn run(&self, client_key: &str, raw_address: &str) -> AppResult<AnalysisOutcome> {
        if let Admission::Denied { retry_after } = self.limiter.admit(client_key) {
            return Err(AppError::rate_limited(retry_after));
        }

        let address = WalletAddress::parse(raw_address)?;

        if let Some(result) = self.cache.get(&address) {
            self.telemetry.record_cache_hit();
            return Ok(AnalysisOutcome {
                result,
                cached: true,
            });
        }

        let started = Instant::now();
        let result = self.compute(&address).await?;
        self.cache.put(&address, result.clone());

        let latency_ms = started.elapsed().as_millis() as u64;
        self.telemetry.record_analysis(latency_ms);
        info!(
            address = %address,
            score = result.score,
            tier = result.tier.label(),
            latency_ms,
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            result,
            cached: false,
        })
    }

    /// Fetch, enrich and score without touching cache or rate limits
    pub async fn compute(&self, address: &WalletAddress) -> AppResult<AnalysisResult> {
        let source = &self.source;
        let (normal, tokens, internal) = tokio::try_join!(
            source.normal_transactions(address),
            source.token_transfers(address),
            source.internal_transactions(address),
        )
        .map_err(|e| {
            warn!("⚠️ Transaction fetch failed for {}: {}", address, e);
            e
        })?;

        let counterparties =
            counterparty_set(address, [&normal[..], &tokens[..], &internal[..]]);
        let contracts = self.enricher.resolve(&self.source, &counterparties).await;
        let unknown = contracts
            .values()
            .filter(|s| **s == CodePresence::Unknown)
            .count();
        self.telemetry.record_unknown_lookups(unknown as u64);

        let bounded = self.enricher.bound(&counterparties);
        let card = scoring::score(
            &ScoringInput {
                normal: &normal,
                tokens: &tokens,
                internal: &internal,
                counterparties: bounded,
                contracts: &contracts,
            },
            &self.known,
        );

        let sample = SampleSummary {
            tx_count: normal.len(),
            token_tx_count: tokens.len(),
            internal_tx_count: internal.len(),
            total_tx_count: card.total_tx_count,
            first_tx: normal.first().map(|tx| tx.timestamp),
            last_tx: normal.last().map(|tx| tx.timestamp),
            counterparties_count: counterparties.len(),
            counterparties: bounded
                .iter()
                .take(self.config.sample_size)
                .map(|addr| CounterpartySample {
                    address: addr.clone(),
                    is_contract: contracts.get(addr).copied().unwrap_or(CodePresence::Unknown),
                })
                .collect(),
        };

        Ok(AnalysisResult {
            address: address.clone(),
            sample,
            bridged: card.bridged,
            dapp_counter: card.dapp_counter,
            sybil_risk: card.sybil_risk,
            score: card.score,
            tier: card.tier,
            estimates: card.estimates,
        })
    }

    /// Start the periodic cache and rate-window sweep
    pub fn spawn_maintenance(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let limiter = Arc::clone(&self.limiter);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let swept = cache.sweep();
                let idle = limiter.cleanup();
                if swept > 0 || idle > 0 {
                    info!("🧹 Maintenance: {} cache entries, {} idle rate windows removed", swept, idle);
                }
            }
        })
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}
