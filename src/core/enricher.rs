//! Counterparty extraction and bounded contract-status enrichment
//!
//! Code lookups run as spawned tasks gated by a semaphore with K permits.
//! A task keeps its permit through a short settle delay after its lookup so
//! the upstream provider never sees more than K calls from one request.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::models::config::AnalyzerConfig;
use crate::models::types::{CodePresence, ContractMap, Transaction, WalletAddress};
use crate::providers::source::ChainDataSource;

/// De-duplicated counterparties in first-seen order, subject excluded.
///
/// Collections are walked in the order given; within a transaction the
/// order is `from`, `to`, `contract_address`.
pub fn counterparty_set<'a>(
    subject: &WalletAddress,
    collections: impl IntoIterator<Item = &'a [Transaction]>,
) -> Vec<WalletAddress> {
    let mut seen: HashSet<&WalletAddress> = HashSet::new();
    let mut ordered = Vec::new();

    for tx in collections.into_iter().flatten() {
        for addr in [&tx.from, &tx.to, &tx.contract_address].into_iter().flatten() {
            if addr != subject && seen.insert(addr) {
                ordered.push(addr.clone());
            }
        }
    }
    ordered
}

/// Semaphore-gated `has_code` dispatcher
#[derive(Debug, Clone)]
pub struct BoundedEnricher {
    concurrency: usize,
    settle_delay: Duration,
    max_counterparties: usize,
}

impl BoundedEnricher {
    pub fn new(concurrency: usize, settle_delay: Duration, max_counterparties: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            settle_delay,
            max_counterparties,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            config.enrich_concurrency,
            config.enrich_settle_delay,
            config.max_counterparties,
        )
    }

    /// The prefix of `counterparties` that gets enriched
    pub fn bound<'a>(&self, counterparties: &'a [WalletAddress]) -> &'a [WalletAddress] {
        &counterparties[..counterparties.len().min(self.max_counterparties)]
    }

    /// Resolve code presence for the bounded set: one lookup and one map
    /// entry per address, `Unknown` for any lookup that did not finish.
    pub async fn resolve<S: ChainDataSource>(
        &self,
        source: &Arc<S>,
        counterparties: &[WalletAddress],
    ) -> ContractMap {
        let bounded = self.bound(counterparties);
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = bounded
            .iter()
            .cloned()
            .map(|addr| {
                let source = Arc::clone(source);
                let semaphore = Arc::clone(&semaphore);
                let settle = self.settle_delay;
                let task_addr = addr.clone();
                let handle = tokio::spawn(async move {
                    // Only fails if the semaphore is closed
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return CodePresence::Unknown,
                    };
                    let status = source.has_code(&task_addr).await;
                    if !settle.is_zero() {
                        tokio::time::sleep(settle).await;
                    }
                    status
                });
                (addr, handle)
            })
            .collect();

        let mut contracts = ContractMap::with_capacity(handles.len());
        for (addr, handle) in handles {
            let status = match handle.await {
                Ok(status) => status,
                Err(e) => {
                    warn!("⚠️ Code lookup task for {} failed: {}", addr, e);
                    CodePresence::Unknown
                }
            };
            contracts.insert(addr, status);
        }

        debug!(
            resolved = contracts.len(),
            skipped = counterparties.len() - bounded.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Enrichment complete"
        );
        contracts
    }
}

impl Default for BoundedEnricher {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}
