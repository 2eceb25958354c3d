//! Eligibility Scoring Module
//!
//! Turns aggregated wallet signals into a 0-100 score, a tier and reward
//! estimates. Everything here is pure: same transactions and contract map
//! in, same scorecard out.
//!
//! Score accumulation, in order:
//! - +20 if the wallet looks bridged
//! - +30 / +20 / +10 for >= 50 / >= 20 / >= 5 total transactions
//! - +3 per dApp hit, capped at 10 hits
//! - +1 per active month, capped at 12
//! - -40 for High sybil risk, -15 for Medium, floored at 0

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::config::KnownAddresses;
use crate::models::types::{
    CodePresence, ContractMap, Estimates, SybilRisk, Tier, Transaction, WalletAddress,
};
use crate::utils::constants::{
    ACTIVE_POOL_SHARE, ACTIVE_POPULATION_HIGH, ACTIVE_POPULATION_LOW, BRIDGE_POINTS,
    BUILDER_POOL_SHARE, BUILDER_POPULATION, COMMUNITY_ALLOCATION, CREATOR_POOL_SHARE,
    CREATOR_POPULATION, DAPP_COUNTER_CAP, DAPP_POINTS_EACH, MONTHS_ACTIVE_CAP,
    SYBIL_HIGH_MAX_CONTRACTS, SYBIL_HIGH_MIN_TXS, SYBIL_HIGH_PENALTY, SYBIL_MEDIUM_MAX_TXS,
    SYBIL_MEDIUM_PENALTY, TIER_1_MIN_SCORE, TIER_2_MIN_SCORE, TIER_3_MIN_SCORE,
    TOTAL_VALUATION_USD, VOLUME_TIERS,
};

/// Everything the engine looks at for one wallet
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub normal: &'a [Transaction],
    pub tokens: &'a [Transaction],
    pub internal: &'a [Transaction],
    /// Bounded counterparty set, in enrichment order
    pub counterparties: &'a [WalletAddress],
    pub contracts: &'a ContractMap,
}

impl<'a> ScoringInput<'a> {
    fn all_transactions(self) -> impl Iterator<Item = &'a Transaction> {
        self.normal.iter().chain(self.tokens).chain(self.internal)
    }

    pub fn total_tx_count(&self) -> usize {
        self.normal.len() + self.tokens.len() + self.internal.len()
    }
}

/// One line of the score breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFactor {
    pub name: String,
    pub points: i32,
    pub reason: String,
}

/// Full output of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub bridged: bool,
    pub dapp_counter: u32,
    pub months_active: u32,
    pub total_tx_count: usize,
    pub sybil_risk: SybilRisk,
    pub score: u8,
    pub tier: Tier,
    pub estimates: Estimates,
    pub breakdown: Vec<ScoreFactor>,
}

// ============================================
// SIGNALS
// ============================================

/// Broad on purpose: any bridge touch, contract address or call data counts
pub fn detect_bridged<'a>(
    txs: impl IntoIterator<Item = &'a Transaction>,
    known: &KnownAddresses,
) -> bool {
    txs.into_iter().any(|tx| {
        let touches_bridge = [&tx.to, &tx.from]
            .into_iter()
            .flatten()
            .any(|addr| known.is_bridge(addr));
        touches_bridge || tx.contract_address.is_some() || tx.has_call_data()
    })
}

/// +1 for a resolved contract, +1 for a known dApp; both conditions count twice
pub fn count_dapps(
    counterparties: &[WalletAddress],
    contracts: &ContractMap,
    known: &KnownAddresses,
) -> u32 {
    counterparties
        .iter()
        .map(|addr| {
            let contract = matches!(contracts.get(addr), Some(CodePresence::Contract)) as u32;
            let dapp = known.is_dapp(addr) as u32;
            contract + dapp
        })
        .sum()
}

/// Whole calendar months between first and last normal transaction (UTC)
pub fn months_active(normal: &[Transaction]) -> u32 {
    let (first, last) = match (normal.first(), normal.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => return 0,
    };
    let to_date = |ts: i64| DateTime::<Utc>::from_timestamp(ts, 0);
    match (to_date(first), to_date(last)) {
        (Some(a), Some(b)) => {
            let months =
                (b.year() - a.year()) as i64 * 12 + (b.month() as i64 - a.month() as i64);
            months.max(0) as u32
        }
        _ => 0,
    }
}

pub fn classify_sybil(total_tx_count: usize, contracts: &ContractMap) -> SybilRisk {
    if total_tx_count >= SYBIL_HIGH_MIN_TXS && contracts.len() <= SYBIL_HIGH_MAX_CONTRACTS {
        SybilRisk::High
    } else if total_tx_count <= SYBIL_MEDIUM_MAX_TXS {
        SybilRisk::Medium
    } else {
        SybilRisk::Low
    }
}

pub fn tier_for(score: u8) -> Tier {
    if score >= TIER_1_MIN_SCORE {
        Tier::Tier1
    } else if score >= TIER_2_MIN_SCORE {
        Tier::Tier2
    } else if score >= TIER_3_MIN_SCORE {
        Tier::Tier3
    } else {
        Tier::Ineligible
    }
}

/// Reward projections from fixed constants (independent of the wallet)
pub fn estimates() -> Estimates {
    let community = TOTAL_VALUATION_USD * COMMUNITY_ALLOCATION;
    Estimates {
        total_valuation_usd: TOTAL_VALUATION_USD,
        community_allocation_usd: community,
        builder_per_wallet_usd: community * BUILDER_POOL_SHARE / BUILDER_POPULATION,
        creator_per_wallet_usd: community * CREATOR_POOL_SHARE / CREATOR_POPULATION,
        active_per_wallet_low_usd: community * ACTIVE_POOL_SHARE / ACTIVE_POPULATION_LOW,
        active_per_wallet_high_usd: community * ACTIVE_POOL_SHARE / ACTIVE_POPULATION_HIGH,
    }
}

// ============================================
// SCORE BUILDER
// ============================================

/// Accumulates score points in the fixed order, keeping a breakdown
#[derive(Debug, Default)]
pub struct ScoreBuilder {
    factors: Vec<ScoreFactor>,
    raw: i64,
    penalty: i64,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, points: u32, reason: String) {
        self.raw += points as i64;
        self.factors.push(ScoreFactor {
            name: name.to_string(),
            points: points as i32,
            reason,
        });
    }

    pub fn with_bridge(mut self, bridged: bool) -> Self {
        let points = if bridged { BRIDGE_POINTS } else { 0 };
        self.add(
            "Bridge activity",
            points,
            if bridged {
                "Bridge, contract or call-data interaction found".to_string()
            } else {
                "No bridge or contract interaction".to_string()
            },
        );
        self
    }

    pub fn with_volume(mut self, total_tx_count: usize) -> Self {
        let points = VOLUME_TIERS
            .iter()
            .find(|(min, _)| total_tx_count >= *min)
            .map(|(_, points)| *points)
            .unwrap_or(0);
        self.add("Transaction volume", points, format!("{} total transactions", total_tx_count));
        self
    }

    pub fn with_dapps(mut self, dapp_counter: u32) -> Self {
        let points = dapp_counter.min(DAPP_COUNTER_CAP) * DAPP_POINTS_EACH;
        self.add("dApp diversity", points, format!("{} contract/dApp hits", dapp_counter));
        self
    }

    pub fn with_activity(mut self, months_active: u32) -> Self {
        let points = months_active.min(MONTHS_ACTIVE_CAP);
        self.add("Activity span", points, format!("{} months active", months_active));
        self
    }

    pub fn with_sybil_penalty(mut self, risk: SybilRisk) -> Self {
        let penalty = match risk {
            SybilRisk::High => SYBIL_HIGH_PENALTY,
            SybilRisk::Medium => SYBIL_MEDIUM_PENALTY,
            SybilRisk::Low => 0,
        };
        self.penalty = penalty as i64;
        self.factors.push(ScoreFactor {
            name: "Sybil penalty".to_string(),
            points: -(penalty as i32),
            reason: format!("{} sybil risk", risk.as_str()),
        });
        self
    }

    /// Sum before the sybil penalty
    pub fn raw_total(&self) -> i64 {
        self.raw
    }

    /// Sum after the penalty, before flooring
    pub fn penalized_total(&self) -> i64 {
        self.raw - self.penalty
    }

    pub fn build(self) -> (u8, Vec<ScoreFactor>) {
        let score = self.penalized_total().max(0).clamp(0, 100) as u8;
        (score, self.factors)
    }
}

// ============================================
// ENGINE
// ============================================

/// Score one wallet
pub fn score(input: &ScoringInput<'_>, known: &KnownAddresses) -> Scorecard {
    let bridged = detect_bridged(input.all_transactions(), known);
    let dapp_counter = count_dapps(input.counterparties, input.contracts, known);
    let total_tx_count = input.total_tx_count();
    let months_active = months_active(input.normal);
    let sybil_risk = classify_sybil(total_tx_count, input.contracts);

    let (score, breakdown) = ScoreBuilder::new()
        .with_bridge(bridged)
        .with_volume(total_tx_count)
        .with_dapps(dapp_counter)
        .with_activity(months_active)
        .with_sybil_penalty(sybil_risk)
        .build();

    let tier = tier_for(score);
    debug!(score, tier = tier.label(), ?breakdown, "Scored wallet");

    Scorecard {
        bridged,
        dapp_counter,
        months_active,
        total_tx_count,
        sybil_risk,
        score,
        tier,
        estimates: estimates(),
        breakdown,
    }
}
