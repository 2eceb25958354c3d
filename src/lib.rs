//! Wallet Scout Library
//!
//! Request-scoped wallet analysis: pulls a wallet's transaction history
//! from an Etherscan-compatible explorer, derives behavioral signals and
//! produces a deterministic eligibility score:
//! - Bridge / contract interaction
//! - dApp diversity (bounded, concurrency-capped code lookups)
//! - Activity span in months
//! - Sybil risk from volume vs. counterparty diversity

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{BoundedEnricher, Scorecard, ScoringInput, WalletAnalyzer};
pub use models::{
    AnalysisOutcome, AnalysisResult, AnalyzerConfig, AppError, AppResult, CodePresence,
    ContractMap, ErrorCode, ExplorerConfig, KnownAddresses, SybilRisk, Tier, Transaction,
    TxCategory, WalletAddress,
};
pub use providers::{ChainDataSource, ExplorerClient};
pub use utils::{Admission, CacheStats, RateLimiter, ResultCache, TelemetryCollector};
