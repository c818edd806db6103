//! Scripted in-memory wallet shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use alloy_primitives::B256;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use sendx::error::ProviderError;
use sendx::provider::{SendCapability, WalletProvider};
use sendx::storage::MemoryStore;
use sendx::Session;

pub const ACCOUNT: &str = "0x77D89FF4b6bc52057d6116F4928072018Ee6f36E";
pub const RECIPIENT: &str = "0x1000000000000000000000000000000000000001";

type Answer = Result<Value, ProviderError>;

/// Answers wallet requests from a script. One-shot answers are consumed first,
/// then the sticky answer for the method; anything else is "method not found".
pub struct MockProvider {
    sticky: RefCell<HashMap<String, Answer>>,
    queued: RefCell<HashMap<String, VecDeque<Answer>>>,
    calls: RefCell<Vec<(String, Value)>>,
    send_gate: RefCell<Option<oneshot::Receiver<()>>>,
    capability: SendCapability,
}

impl MockProvider {
    pub fn new(capability: SendCapability) -> Self {
        Self {
            sticky: RefCell::new(HashMap::new()),
            queued: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            send_gate: RefCell::new(None),
            capability,
        }
    }

    /// A Goerli wallet holding 1 ETH at nonce 3.
    pub fn wallet() -> Self {
        Self::wallet_with(SendCapability::TypedSend)
    }

    pub fn wallet_with(capability: SendCapability) -> Self {
        let p = Self::new(capability);
        p.on("eth_requestAccounts", Ok(json!([ACCOUNT])));
        p.on("eth_accounts", Ok(json!([ACCOUNT])));
        p.on("eth_chainId", Ok(json!("0x5")));
        p.on("eth_getBalance", Ok(json!("0xde0b6b3a7640000")));
        p.on("eth_getTransactionCount", Ok(json!("0x3")));
        p.on("eth_gasPrice", Ok(json!("0x3b9aca00")));
        p.on(
            "eth_getBlockByNumber",
            Ok(json!({ "number": "0x10", "baseFeePerGas": "0x3b9aca00" })),
        );
        p.on("eth_getTransactionByHash", Ok(Value::Null));
        p
    }

    pub fn on(&self, method: &str, answer: Answer) {
        self.sticky.borrow_mut().insert(method.to_string(), answer);
    }

    pub fn once(&self, method: &str, answer: Answer) {
        self.queued
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Hold the next `eth_sendTransaction` until the returned sender fires,
    /// like a wallet waiting on its confirmation prompt.
    pub fn hold_send(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.send_gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push((method.to_string(), params));
        if method == "eth_sendTransaction" {
            let gate = self.send_gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
        }
        if let Some(answer) = self
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return answer;
        }
        self.sticky
            .borrow()
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::new(Some(-32601), "method not found")))
    }

    async fn wait_mined(&self, _hash: B256) -> Result<(), ProviderError> {
        Ok(())
    }

    fn capability(&self) -> SendCapability {
        self.capability
    }
}

pub type TestSession = Session<MockProvider, MemoryStore>;

pub fn session(provider: MockProvider) -> TestSession {
    Session::new(provider, MemoryStore::new())
}

pub async fn connected(provider: MockProvider) -> TestSession {
    let mut s = session(provider);
    s.connect().await.expect("connect");
    s.app_mut().take_notices();
    s
}

pub fn hash(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn rejected() -> ProviderError {
    ProviderError::new(
        Some(4001),
        "MetaMask Tx Signature: User denied transaction signature.",
    )
}
