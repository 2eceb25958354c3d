//! Explorer Client Module - Etherscan-compatible REST API
//!
//! Implements the account and proxy endpoints the analyzer needs:
//! 1. `txlist` - normal transactions
//! 2. `tokentx` - ERC-20 token transfers
//! 3. `txlistinternal` - internal transactions
//! 4. `eth_getCode` - bytecode presence
//!
//! Every response has the shape `{ status, message, result }` where
//! `result` is an array on success and a string otherwise. A string result
//! on a list endpoint means "no data", never a hard failure.
//!
//! No retries here: a failed list fetch fails the request, a failed code
//! lookup degrades to unknown.

use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use super::source::ChainDataSource;
use crate::models::config::ExplorerConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{CodePresence, Transaction, TxCategory, WalletAddress};
use crate::utils::constants::{END_BLOCK, START_BLOCK, USER_AGENT as USER_AGENT_CONST};

// ============================================
// WIRE TYPES
// ============================================

/// Generic explorer envelope
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// One row of txlist / tokentx / txlistinternal (all fields are strings)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub time_stamp: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
}

impl RawTransaction {
    pub fn into_transaction(self, category: TxCategory) -> Transaction {
        let parse_num = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Transaction {
            category,
            from: WalletAddress::parse_opt(self.from.as_deref()),
            to: WalletAddress::parse_opt(self.to.as_deref()),
            contract_address: WalletAddress::parse_opt(self.contract_address.as_deref()),
            input: self.input,
            timestamp: parse_num(self.time_stamp).unwrap_or(0),
            block_number: parse_num(self.block_number).unwrap_or(0).max(0) as u64,
        }
    }
}

/// Turn an explorer envelope into block-ascending transactions
pub fn parse_transactions(category: TxCategory, response: ExplorerResponse) -> Vec<Transaction> {
    let rows = match response.result {
        serde_json::Value::Array(rows) => rows,
        other => {
            debug!(
                "📭 {} returned no list (status: {:?}, message: {:?}, result: {})",
                category.action(),
                response.status,
                response.message,
                other
            );
            return Vec::new();
        }
    };

    let mut txs: Vec<Transaction> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<RawTransaction>(row) {
            Ok(raw) => Some(raw.into_transaction(category)),
            Err(e) => {
                debug!("Skipping malformed {} row: {}", category.action(), e);
                None
            }
        })
        .collect();

    // Upstream is asked for sort=asc; keep that order stable regardless
    txs.sort_by_key(|tx| (tx.block_number, tx.timestamp));
    txs
}

/// Classify an `eth_getCode` result value
pub fn classify_code(result: &serde_json::Value) -> CodePresence {
    let code = match result.as_str() {
        Some(code) => code.trim().to_lowercase(),
        None => return CodePresence::Unknown,
    };

    match code.as_str() {
        "" | "0x" | "0x0" => CodePresence::NotContract,
        _ => match code.strip_prefix("0x") {
            Some(body) if body.chars().all(|c| c.is_ascii_hexdigit()) => CodePresence::Contract,
            // Error strings such as "Invalid API Key" land here
            _ => CodePresence::Unknown,
        },
    }
}

// ============================================
// CLIENT
// ============================================

/// Etherscan-compatible explorer client
#[derive(Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Build HTTP client with custom headers and the upstream timeout
    fn build_client(config: &ExplorerConfig) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }

    fn api_key(&self) -> AppResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::missing_credentials(ExplorerConfig::API_KEY_VAR))
    }

    /// GET the explorer with `params` plus the API key
    async fn get(&self, params: &[(&str, &str)], api_key: &str) -> AppResult<ExplorerResponse> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .query(&[("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("Explorer HTTP error: {}", status)));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<ExplorerResponse>(&body)?)
    }
}

#[async_trait]
impl ChainDataSource for ExplorerClient {
    async fn transactions(
        &self,
        category: TxCategory,
        address: &WalletAddress,
    ) -> AppResult<Vec<Transaction>> {
        let api_key = self.api_key()?;
        let start = START_BLOCK.to_string();
        let end = END_BLOCK.to_string();
        let params = [
            ("module", "account"),
            ("action", category.action()),
            ("address", address.as_str()),
            ("startblock", start.as_str()),
            ("endblock", end.as_str()),
            ("sort", "asc"),
        ];

        let response = self.get(&params, api_key).await.map_err(|e| {
            warn!("⚠️ {} fetch failed for {}: {}", category.action(), address, e);
            e
        })?;

        let txs = parse_transactions(category, response);
        debug!("📥 {} {} rows for {}", txs.len(), category.action(), address);
        Ok(txs)
    }

    async fn has_code(&self, address: &WalletAddress) -> CodePresence {
        let api_key = match self.api_key() {
            Ok(key) => key,
            Err(_) => return CodePresence::Unknown,
        };
        let params = [
            ("module", "proxy"),
            ("action", "eth_getCode"),
            ("address", address.as_str()),
            ("tag", "latest"),
        ];

        match self.get(&params, api_key).await {
            Ok(response) => classify_code(&response.result),
            Err(e) => {
                debug!("eth_getCode failed for {}: {}", address, e);
                CodePresence::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    fn envelope(json: &str) -> ExplorerResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_txlist_rows() {
        let resp = envelope(
            r#"{
            "status": "1",
            "message": "OK",
            "result": [
                {"blockNumber": "200", "timeStamp": "1700000100",
                 "from": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                 "to": "", "contractAddress": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                 "input": "0x60806040"},
                {"blockNumber": "100", "timeStamp": "1700000000",
                 "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                 "to": "0xcccccccccccccccccccccccccccccccccccccccc",
                 "contractAddress": "", "input": "0x"}
            ]
        }"#,
        );

        let txs = parse_transactions(TxCategory::Normal, resp);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].block_number, 100);
        assert_eq!(txs[0].timestamp, 1_700_000_000);
        assert!(txs[0].contract_address.is_none());
        assert!(txs[1].to.is_none());
        assert_eq!(
            txs[1].from.as_ref().map(|a| a.as_str()),
            Some("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
        );
        assert!(txs[1].has_call_data());
    }

    #[test]
    fn test_string_result_is_empty() {
        let resp = envelope(r#"{"status":"0","message":"No transactions found","result":"No transactions found"}"#);
        assert!(parse_transactions(TxCategory::Token, resp).is_empty());

        let resp = envelope(r#"{"status":"0","message":"NOTOK","result":null}"#);
        assert!(parse_transactions(TxCategory::Internal, resp).is_empty());

        let resp = envelope(r#"{}"#);
        assert!(parse_transactions(TxCategory::Normal, resp).is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let resp = envelope(r#"{"result": [42, {"blockNumber": "7", "timeStamp": "9"}]}"#);
        let txs = parse_transactions(TxCategory::Internal, resp);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].category, TxCategory::Internal);
        assert!(txs[0].from.is_none());
    }

    #[test]
    fn test_classify_code() {
        use serde_json::json;
        assert_eq!(classify_code(&json!("0x")), CodePresence::NotContract);
        assert_eq!(classify_code(&json!("0x0")), CodePresence::NotContract);
        assert_eq!(classify_code(&json!("")), CodePresence::NotContract);
        assert_eq!(classify_code(&json!("0x6080604052")), CodePresence::Contract);
        assert_eq!(classify_code(&json!("Invalid API Key")), CodePresence::Unknown);
        assert_eq!(classify_code(&json!(null)), CodePresence::Unknown);
        assert_eq!(classify_code(&json!(["0x60"])), CodePresence::Unknown);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = ExplorerClient::new(ExplorerConfig {
            // Unroutable: a network attempt would surface as UpstreamFailure instead
            base_url: "http://127.0.0.1:9/api".to_string(),
            api_key: None,
            ..ExplorerConfig::default()
        })
        .unwrap();
        let addr = WalletAddress::parse("0x0000000000000000000000000000000000000001").unwrap();

        let err = client.normal_transactions(&addr).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingCredentials);
        assert_eq!(client.has_code(&addr).await, CodePresence::Unknown);
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = ExplorerClient::new(ExplorerConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            api_key: Some("test".to_string()),
            timeout: std::time::Duration::from_secs(2),
        })
        .unwrap();
        let addr = WalletAddress::parse("0x0000000000000000000000000000000000000001").unwrap();

        let err = client.token_transfers(&addr).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamFailure);
        assert_eq!(client.has_code(&addr).await, CodePresence::Unknown);
    }

    const SECRET_KEY: &str = "SECRETKEY1234567890ABCDEFGHIJKLMNO";

    /// Local upstream that reads each request, then either hangs up or stalls
    async fn local_upstream(stall: bool) -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                if stall {
                    held.push(socket);
                }
            }
        });
        format!("http://127.0.0.1:{}/api", port)
    }

    fn keyed_client(base_url: String, timeout: std::time::Duration) -> ExplorerClient {
        ExplorerClient::new(ExplorerConfig {
            base_url,
            api_key: Some(SECRET_KEY.to_string()),
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_transport_errors_never_expose_api_key() {
        let base_url = local_upstream(false).await;
        let client = keyed_client(base_url, std::time::Duration::from_secs(5));
        let addr = WalletAddress::parse("0x0000000000000000000000000000000000000001").unwrap();

        let err = client.token_transfers(&addr).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamFailure);
        assert!(!err.message.contains("SECRETKEY"), "leaked: {}", err.message);
        assert!(!err.message.contains("apikey"));
        assert!(!err.to_string().contains("SECRETKEY"));

        let source = std::error::Error::source(&err).map(|s| s.to_string()).unwrap_or_default();
        assert!(!source.contains("SECRETKEY"), "leaked via source: {}", source);
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_failure() {
        let base_url = local_upstream(true).await;
        let client = keyed_client(base_url, std::time::Duration::from_millis(300));
        let addr = WalletAddress::parse("0x0000000000000000000000000000000000000001").unwrap();

        let err = client.normal_transactions(&addr).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamFailure);
        assert_eq!(err.code.http_status(), 502);
        assert!(err.message.contains("timed out"));
        assert_eq!(client.has_code(&addr).await, CodePresence::Unknown);
    }
}
