//! Constants Module - Single Source of Truth
//!
//! Every tunable default, known-address list and reward constant used across
//! the service is defined here. Other modules reference these by name.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "WalletScout";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for upstream HTTP requests
pub const USER_AGENT: &str = concat!("WalletScout/", env!("CARGO_PKG_VERSION"));

// ============================================
// UPSTREAM CONSTANTS
// ============================================

/// Default Etherscan-compatible endpoint
pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://api.etherscan.io/api";

/// Default timeout for every upstream request (seconds)
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Block range requested for transaction lists
pub const START_BLOCK: u64 = 0;
pub const END_BLOCK: u64 = 99_999_999;

// ============================================
// PIPELINE DEFAULTS
// ============================================

/// Rate-limit window length (seconds)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Requests admitted per client per window
pub const RATE_LIMIT_MAX_REQ: u32 = 30;

/// Result cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Entries older than this many TTLs are swept
pub const CACHE_SWEEP_TTL_MULTIPLIER: u32 = 3;

/// Interval between background sweeps (seconds)
pub const MAINTENANCE_INTERVAL_SECS: u64 = 60;

/// Maximum concurrent `eth_getCode` lookups per request
pub const ENRICH_CONCURRENCY: usize = 6;

/// Pause after each lookup before its slot frees (milliseconds)
pub const ENRICH_SETTLE_DELAY_MS: u64 = 50;

/// Counterparties considered for enrichment and dApp counting
pub const MAX_COUNTERPARTIES: usize = 250;

/// Counterparties echoed back in the response sample
pub const SAMPLE_COUNTERPARTIES: usize = 20;

// ============================================
// SCORING CONSTANTS
// ============================================

pub const BRIDGE_POINTS: u32 = 20;
pub const DAPP_POINTS_EACH: u32 = 3;
pub const DAPP_COUNTER_CAP: u32 = 10;
pub const MONTHS_ACTIVE_CAP: u32 = 12;

/// (minimum total tx count, points), checked top-down
pub const VOLUME_TIERS: [(usize, u32); 3] = [(50, 30), (20, 20), (5, 10)];

pub const SYBIL_HIGH_MIN_TXS: usize = 400;
pub const SYBIL_HIGH_MAX_CONTRACTS: usize = 2;
pub const SYBIL_MEDIUM_MAX_TXS: usize = 2;
pub const SYBIL_HIGH_PENALTY: u32 = 40;
pub const SYBIL_MEDIUM_PENALTY: u32 = 15;

pub const TIER_1_MIN_SCORE: u8 = 80;
pub const TIER_2_MIN_SCORE: u8 = 50;
pub const TIER_3_MIN_SCORE: u8 = 25;

// ============================================
// REWARD ESTIMATE CONSTANTS
// ============================================

/// Assumed fully diluted valuation (USD)
pub const TOTAL_VALUATION_USD: f64 = 1_000_000_000.0;

/// Share of supply reserved for the community
pub const COMMUNITY_ALLOCATION: f64 = 0.20;

pub const BUILDER_POOL_SHARE: f64 = 0.25;
pub const CREATOR_POOL_SHARE: f64 = 0.35;
pub const ACTIVE_POOL_SHARE: f64 = 0.40;

/// Assumed eligible wallets per pool
pub const BUILDER_POPULATION: f64 = 100_000.0;
pub const CREATOR_POPULATION: f64 = 1_000_000.0;
pub const ACTIVE_POPULATION_LOW: f64 = 10_000_000.0;
pub const ACTIVE_POPULATION_HIGH: f64 = 5_000_000.0;

// ============================================
// KNOWN ADDRESSES (Ethereum mainnet, lowercase)
// ============================================

/// Canonical L1 bridge contracts
pub const KNOWN_BRIDGES: &[&str] = &[
    // Arbitrum Delayed Inbox
    "0x4dbd4fc535ac27206064b68ffcf827b0a60bab3f",
    // Arbitrum L1 Gateway Router
    "0x72ce9c846789fdb6fc1f34ac4ad25dd9ef7031ef",
    // Optimism L1 Standard Bridge
    "0x99c9fc46f92e8a1c0dec1b1747d010903e884be1",
    // Base L1 Standard Bridge
    "0x3154cf16ccdb4c6d922629664174b904d80f2c35",
    // Polygon RootChainManager
    "0xa0c68c638235ee32657e8f720a23cec1bfc77c77",
    // Polygon ERC20 Predicate
    "0x40ec5b33f54e0e8a33a975908c5ba1c14e5bbbdf",
    // zkSync Era Diamond Proxy
    "0x32400084c286cf3e17e7b677ea9583e60a000324",
];

/// Widely used dApp entry points
pub const KNOWN_DAPPS: &[&str] = &[
    // Uniswap V2 Router
    "0x7a250d5630b4cf539739df2c5dacb4c659f2488d",
    // Uniswap V3 Router
    "0xe592427a0aece92de3edee1f18e0157c05861564",
    // Uniswap Universal Router
    "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad",
    // SushiSwap Router
    "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f",
    // 1inch Router V5
    "0x1111111254eeb25477b68fb85ed929f73a960582",
    // Aave V2 Lending Pool
    "0x7d2768de32b0b80b7a3454c06bdac94a69ddc7a9",
    // Aave V3 Pool
    "0x87870bca3f3fd6335c3f4ce8392d69350b4fa4e2",
    // Curve 3pool
    "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7",
    // OpenSea Seaport 1.5
    "0x00000000000000adc04c56bf30ac9d3c0aaf14dc",
    // ENS ETH Registrar Controller
    "0x253553366da8546fc250f225fe3d25d0c782303b",
];
