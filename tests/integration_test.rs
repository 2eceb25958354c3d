//! Integration tests for Wallet Scout

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use wallet_scout::api::{create_router, AppState};
use wallet_scout::{
    AnalyzerConfig, AppError, AppResult, ChainDataSource, CodePresence, ErrorCode,
    KnownAddresses, SybilRisk, Tier, Transaction, TxCategory, WalletAddress, WalletAnalyzer,
};

const SUBJECT: &str = "0x1111111111111111111111111111111111111111";
const BRIDGE: &str = "0x99c9fc46f92e8a1c0dec1b1747d010903e884be1";
const DAPP: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";

fn addr(s: &str) -> WalletAddress {
    WalletAddress::parse(s).unwrap()
}

fn numbered(n: u32) -> WalletAddress {
    WalletAddress::parse(&format!("0x{:040x}", n + 0x1000)).unwrap()
}

fn tx(category: TxCategory, from: &WalletAddress, to: &WalletAddress, ts: i64) -> Transaction {
    Transaction {
        category,
        from: Some(from.clone()),
        to: Some(to.clone()),
        contract_address: None,
        input: Some("0x".to_string()),
        timestamp: ts,
        block_number: ts as u64,
    }
}

/// Scripted explorer: per-category histories plus a code map
#[derive(Default)]
struct ScriptedSource {
    lists: HashMap<TxCategory, Vec<Transaction>>,
    code: HashMap<WalletAddress, CodePresence>,
    fail: Option<ErrorCode>,
    list_calls: AtomicUsize,
    code_calls: AtomicUsize,
}

#[async_trait]
impl ChainDataSource for ScriptedSource {
    async fn transactions(
        &self,
        category: TxCategory,
        _address: &WalletAddress,
    ) -> AppResult<Vec<Transaction>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail {
            Some(ErrorCode::MissingCredentials) => {
                Err(AppError::missing_credentials("EXPLORER_API_KEY"))
            }
            Some(_) => Err(AppError::upstream("connection reset by peer")),
            None => Ok(self.lists.get(&category).cloned().unwrap_or_default()),
        }
    }

    async fn has_code(&self, address: &WalletAddress) -> CodePresence {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        self.code.get(address).copied().unwrap_or(CodePresence::Unknown)
    }
}

fn test_config() -> AnalyzerConfig {
    AnalyzerConfig {
        enrich_settle_delay: Duration::ZERO,
        ..AnalyzerConfig::default()
    }
}

/// Active wallet: 2022-01 .. 2022-10, bridge use, a known dApp and some contracts
fn active_wallet() -> ScriptedSource {
    let me = addr(SUBJECT);
    let bridge = addr(BRIDGE);
    let dapp = addr(DAPP);
    let jan_2022 = 1_641_038_400; // 2022-01-01T12:00:00Z
    let oct_2022 = 1_664_625_600; // 2022-10-01T12:00:00Z

    let mut normal = vec![tx(TxCategory::Normal, &me, &bridge, jan_2022)];
    for i in 0..30 {
        normal.push(tx(TxCategory::Normal, &me, &numbered(i % 10), jan_2022 + 86_400 * (i as i64 + 1)));
    }
    normal.push(tx(TxCategory::Normal, &me, &dapp, oct_2022));

    let mut code = HashMap::new();
    code.insert(dapp.clone(), CodePresence::Contract);
    for i in 0..4 {
        code.insert(numbered(i), CodePresence::Contract);
    }
    for i in 4..10 {
        code.insert(numbered(i), CodePresence::NotContract);
    }

    let mut lists = HashMap::new();
    lists.insert(TxCategory::Normal, normal);
    lists.insert(TxCategory::Internal, vec![tx(TxCategory::Internal, &bridge, &me, jan_2022 + 10)]);

    ScriptedSource {
        lists,
        code,
        ..ScriptedSource::default()
    }
}

#[tokio::test]
async fn test_full_pipeline_scoring() {
    let analyzer = WalletAnalyzer::new(active_wallet(), test_config());
    let outcome = analyzer.analyze("client-a", SUBJECT).await.unwrap();
    let r = &outcome.result;

    assert!(!outcome.cached);
    assert_eq!(r.address.as_str(), SUBJECT);
    assert_eq!(r.sample.tx_count, 32);
    assert_eq!(r.sample.internal_tx_count, 1);
    assert_eq!(r.sample.total_tx_count, 33);
    // bridge, 10 numbered, dapp
    assert_eq!(r.sample.counterparties_count, 12);
    assert!(!r.sample.counterparties.iter().any(|c| c.address.as_str() == SUBJECT));
    assert_eq!(r.sample.first_tx, Some(1_641_038_400));

    assert!(r.bridged);
    // 4 numbered contracts + dApp counted twice
    assert_eq!(r.dapp_counter, 6);
    assert_eq!(r.sybil_risk, SybilRisk::Low);
    // 20 bridged + 20 volume + 18 dApps + 9 months (Jan -> Oct)
    assert_eq!(r.score, 67);
    assert_eq!(r.tier, Tier::Tier2);
    assert_eq!(analyzer.source().code_calls.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn test_cached_result_is_identical_and_skips_upstream() {
    let analyzer = WalletAnalyzer::new(active_wallet(), test_config());
    let fresh = analyzer.analyze("client-a", SUBJECT).await.unwrap();
    let cached = analyzer.analyze("client-b", &SUBJECT.to_uppercase()).await.unwrap();

    assert!(cached.cached);
    assert_eq!(cached.result, fresh.result);
    assert_eq!(analyzer.source().list_calls.load(Ordering::SeqCst), 3);
    assert_eq!(analyzer.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_custom_known_lists_change_signals() {
    let analyzer = WalletAnalyzer::with_known_addresses(
        active_wallet(),
        test_config(),
        KnownAddresses::from_lists::<&str>(&[], &[]),
    );
    let r = analyzer.analyze("client", SUBJECT).await.unwrap().result;
    // No bridge list and plain "0x" inputs: nothing marks the wallet as bridged
    assert!(!r.bridged);
    assert_eq!(r.dapp_counter, 5);
}

#[tokio::test]
async fn test_missing_credentials_is_distinct() {
    let analyzer = WalletAnalyzer::new(
        ScriptedSource {
            fail: Some(ErrorCode::MissingCredentials),
            ..ScriptedSource::default()
        },
        test_config(),
    );
    let err = analyzer.analyze("client", SUBJECT).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingCredentials);
    assert!(analyzer.cache().is_empty());
}

#[tokio::test]
async fn test_empty_wallet_is_medium_risk_and_ineligible() {
    let analyzer = WalletAnalyzer::new(ScriptedSource::default(), test_config());
    let r = analyzer.analyze("client", SUBJECT).await.unwrap().result;
    assert_eq!(r.sample.total_tx_count, 0);
    assert_eq!(r.sample.first_tx, None);
    assert_eq!(r.sybil_risk, SybilRisk::Medium);
    assert_eq!(r.score, 0);
    assert_eq!(r.tier, Tier::Ineligible);
    assert_eq!(analyzer.source().code_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_requests_share_rate_window() {
    let analyzer = Arc::new(WalletAnalyzer::new(
        ScriptedSource::default(),
        AnalyzerConfig {
            rate_limit_max_requests: 5,
            ..test_config()
        },
    ));

    let results = join_all((0..12).map(|_| {
        let analyzer = analyzer.clone();
        async move { analyzer.analyze("shared-client", SUBJECT).await }
    }))
    .await;

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.code == ErrorCode::RateLimited))
        .count();
    assert_eq!(admitted, 5);
    assert_eq!(limited, 7);
}

// ============================================
// HTTP surface
// ============================================

async fn call(app: axum::Router, req: Request<Body>) -> (StatusCode, HashMap<String, String>, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

fn router(source: ScriptedSource, config: AnalyzerConfig) -> axum::Router {
    let analyzer = Arc::new(WalletAnalyzer::new(source, config));
    create_router(Arc::new(AppState::new(analyzer)))
}

#[tokio::test]
async fn test_http_analyze_get_and_post() {
    let app = router(active_wallet(), test_config());

    let get = Request::get(format!("/v1/analyze/{}", SUBJECT))
        .header("x-api-key", "pk_test")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = call(app.clone(), get).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["score"], 67);
    assert_eq!(body["data"]["tier"], "Tier 2 — Creator");
    assert_eq!(body["data"]["sybilRisk"], "Low");
    assert_eq!(body["data"]["cached"], false);
    assert_eq!(body["data"]["sample"]["counterpartiesCount"], 12);

    let post = Request::post("/v1/analyze")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"address":"{}"}}"#, SUBJECT)))
        .unwrap();
    let (status, _, body) = call(app, post).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cached"], true);
}

#[tokio::test]
async fn test_http_errors() {
    let app = router(
        ScriptedSource {
            fail: Some(ErrorCode::UpstreamFailure),
            ..ScriptedSource::default()
        },
        AnalyzerConfig {
            rate_limit_max_requests: 2,
            ..test_config()
        },
    );
    let get = |path: &str| {
        Request::get(path)
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    let (status, _, body) = call(app.clone(), get("/v1/analyze/0xZZZZ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ADDR_INVALID");

    let (status, _, body) = call(app.clone(), get(&format!("/v1/analyze/{}", SUBJECT))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");

    let (status, headers, body) = call(app.clone(), get(&format!("/v1/analyze/{}", SUBJECT))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"]["retryAfterMs"].as_u64().unwrap() <= 60_000);
    assert!(headers.contains_key("retry-after"));

    let (status, _, body) = call(app, get("/v1/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["telemetry"]["failuresByCode"]["API_RATE_LIMITED"], 1);
    assert_eq!(body["data"]["telemetry"]["failuresByCode"]["UPSTREAM_FAILURE"], 1);
}

#[tokio::test]
async fn test_http_health() {
    let app = router(ScriptedSource::default(), test_config());
    let req = Request::get("/v1/health").body(Body::empty()).unwrap();
    let (status, _, body) = call(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}
