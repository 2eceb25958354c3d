//! Type definitions for Wallet Scout
//! All core data structures for wallet analysis

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult};

// ============================================
// ADDRESS
// ============================================

/// Canonical wallet address: lowercase `0x` + 40 hex digits.
///
/// The only way to obtain one is through [`WalletAddress::parse`], so every
/// value held anywhere in the pipeline is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Trim, lowercase and validate raw input
    pub fn parse(raw: &str) -> AppResult<Self> {
        let candidate = raw.trim().to_lowercase();
        let digits = candidate
            .strip_prefix("0x")
            .ok_or_else(|| AppError::invalid_address(raw))?;

        if digits.len() != 40 || hex::decode(digits).is_err() {
            return Err(AppError::invalid_address(raw));
        }

        Ok(Self(candidate))
    }

    /// Lenient variant for provider data: empty or malformed yields `None`
    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty())
            .and_then(|s| Self::parse(s).ok())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|e| serde::de::Error::custom(e.message))
    }
}

// ============================================
// TRANSACTIONS
// ============================================

/// Which upstream collection a transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxCategory {
    Normal,
    Token,
    Internal,
}

impl TxCategory {
    /// Explorer `action` parameter for this collection
    pub fn action(&self) -> &'static str {
        match self {
            TxCategory::Normal => "txlist",
            TxCategory::Token => "tokentx",
            TxCategory::Internal => "txlistinternal",
        }
    }
}

/// A normal transaction, internal transaction or token transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub category: TxCategory,
    pub from: Option<WalletAddress>,
    pub to: Option<WalletAddress>,
    pub contract_address: Option<WalletAddress>,
    pub input: Option<String>,
    /// Unix seconds
    pub timestamp: i64,
    pub block_number: u64,
}

impl Transaction {
    /// Non-empty call data (anything other than `""` or `"0x"`)
    pub fn has_call_data(&self) -> bool {
        matches!(self.input.as_deref(), Some(input) if !input.is_empty() && input != "0x")
    }
}

// ============================================
// CONTRACT STATUS
// ============================================

/// Result of one code-presence lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePresence {
    Contract,
    NotContract,
    /// The lookup failed; status is not known
    Unknown,
}

impl CodePresence {
    /// `Some(true)`, `Some(false)` or `None` for unknown
    pub fn as_option(&self) -> Option<bool> {
        match self {
            CodePresence::Contract => Some(true),
            CodePresence::NotContract => Some(false),
            CodePresence::Unknown => None,
        }
    }
}

impl Serialize for CodePresence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CodePresence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            Some(true) => CodePresence::Contract,
            Some(false) => CodePresence::NotContract,
            None => CodePresence::Unknown,
        })
    }
}

/// Address -> code presence, one entry per enriched counterparty
pub type ContractMap = HashMap<WalletAddress, CodePresence>;

// ============================================
// CLASSIFICATION
// ============================================

/// Heuristic estimate of automated or low-diversity behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SybilRisk {
    Low,
    Medium,
    High,
}

impl SybilRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            SybilRisk::Low => "Low",
            SybilRisk::Medium => "Medium",
            SybilRisk::High => "High",
        }
    }
}

/// Eligibility bracket derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Ineligible,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier 1 — Builder",
            Tier::Tier2 => "Tier 2 — Creator",
            Tier::Tier3 => "Tier 3 — Active Wallet",
            Tier::Ineligible => "Not Eligible",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Ineligible]
            .into_iter()
            .find(|t| t.label() == label)
    }

    pub fn is_eligible(&self) -> bool {
        !matches!(self, Tier::Ineligible)
    }
}

impl Serialize for Tier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Tier::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown tier '{}'", label)))
    }
}

/// Illustrative per-wallet reward projections (USD), not guarantees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimates {
    pub total_valuation_usd: f64,
    pub community_allocation_usd: f64,
    pub builder_per_wallet_usd: f64,
    pub creator_per_wallet_usd: f64,
    pub active_per_wallet_low_usd: f64,
    pub active_per_wallet_high_usd: f64,
}

// ============================================
// RESULT
// ============================================

/// One counterparty echoed back in the response sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartySample {
    pub address: WalletAddress,
    pub is_contract: CodePresence,
}

/// Raw counts behind the score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSummary {
    pub tx_count: usize,
    pub token_tx_count: usize,
    pub internal_tx_count: usize,
    pub total_tx_count: usize,
    /// Unix seconds of the first normal transaction
    pub first_tx: Option<i64>,
    /// Unix seconds of the last normal transaction
    pub last_tx: Option<i64>,
    pub counterparties_count: usize,
    pub counterparties: Vec<CounterpartySample>,
}

/// Immutable outcome of one successful analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub address: WalletAddress,
    pub sample: SampleSummary,
    pub bridged: bool,
    pub dapp_counter: u32,
    pub sybil_risk: SybilRisk,
    pub score: u8,
    pub tier: Tier,
    pub estimates: Estimates,
}

/// What `analyze` hands back: the result plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub cached: bool,
}
