//! JSON-RPC over HTTP: the native [`WalletProvider`]
//!
//! Talks to a node that manages the sending account itself (anvil, geth --dev,
//! a signing proxy). Wallet-only methods are forwarded unchanged and fail with
//! whatever the node answers.

use std::cell::Cell;
use std::sync::OnceLock;

use alloy_primitives::B256;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::platform::{sleep, Duration};
use crate::provider::{SendCapability, WalletProvider};

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default http client: {e}");
                reqwest::Client::new()
            })
    })
}

/// Split a JSON-RPC response into its result or a coded provider error.
pub fn parse_rpc_response(v: Value) -> Result<Value, ProviderError> {
    if let Some(err) = v.get("error") {
        let code = err.get("code").and_then(|c| c.as_i64());
        let msg = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("rpc error");
        return Err(ProviderError::new(code, msg));
    }
    match v {
        Value::Object(mut obj) => obj
            .remove("result")
            .ok_or_else(|| ProviderError::transport("invalid rpc payload (no result)")),
        _ => Err(ProviderError::transport("invalid rpc payload")),
    }
}

/// POST one JSON-RPC call. Transient HTTP statuses get a small bounded retry,
/// except for `eth_sendTransaction`, which is never re-sent.
pub async fn rpc_post(url: &str, body: &Value, timeout: Duration) -> Result<Value, ProviderError> {
    let retryable = body.get("method").and_then(|m| m.as_str()) != Some("eth_sendTransaction");
    let mut attempt = 0u32;
    loop {
        let res = http_client()
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("http request failed: {e}")))?;

        let status = res.status();
        if status.is_success() {
            let v: Value = res
                .json()
                .await
                .map_err(|e| ProviderError::transport(format!("invalid rpc body: {e}")))?;
            return parse_rpc_response(v);
        }
        if retryable && matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504) && attempt < 2 {
            attempt += 1;
            log::debug!("http {status} from {url}, retry {attempt}");
            sleep(Duration::from_millis(150 * attempt as u64)).await;
            continue;
        }
        return Err(ProviderError::transport(format!("http {status}")));
    }
}

#[derive(Debug)]
pub struct HttpProvider {
    url: String,
    timeout: Duration,
    poll_interval: Duration,
    capability: SendCapability,
    next_id: Cell<u64>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
            capability: SendCapability::RawRequest,
            next_id: Cell::new(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_capability(mut self, capability: SendCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        // nodes have no authorization prompt
        let method = match method {
            "eth_requestAccounts" => "eth_accounts",
            m => m,
        };
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        log::debug!("rpc -> {method} #{id}");
        rpc_post(&self.url, &body, self.timeout).await
    }

    async fn wait_mined(&self, hash: B256) -> Result<(), ProviderError> {
        loop {
            let receipt = self
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if !receipt.is_null() {
                return Ok(());
            }
            sleep(self.poll_interval).await;
        }
    }

    fn capability(&self) -> SendCapability {
        self.capability
    }
}
