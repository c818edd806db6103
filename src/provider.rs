//! Wallet provider surface
//!
//! Implementors supply the raw EIP-1193 `request` call and a one-shot mined
//! watch; every typed query below is built on top of `request`.
//!
//! Implementations:
//! - `webshim::InjectedProvider` (wasm32): `window.ethereum`
//! - `rpc_utils::HttpProvider` (native): plain JSON-RPC endpoint

use alloy_primitives::{Address, B256, U256, U64};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::constants::tx::DEFAULT_PRIORITY_FEE_WEI;
use crate::error::ProviderError;
use crate::types::{ChainInfo, FeeData, RpcTransaction, TransactionRequest};
use crate::util_text::number_to_chain_id;

/// How a wallet must be asked to send a transfer, resolved once per session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SendCapability {
    /// Standard typed send. The wallet may ignore the caller's nonce.
    #[default]
    TypedSend,
    /// Fully assembled `eth_sendTransaction` (explicit nonce, fees and gas
    /// limit) for in-wallet browsers whose standard send path drops the nonce.
    RawRequest,
}

impl std::str::FromStr for SendCapability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "typed" | "typed-send" | "standard" => Ok(SendCapability::TypedSend),
            "raw" | "raw-request" => Ok(SendCapability::RawRequest),
            _ => anyhow::bail!("Invalid send mode '{s}'. Valid options: typed, raw"),
        }
    }
}

impl std::fmt::Display for SendCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendCapability::TypedSend => write!(f, "typed"),
            SendCapability::RawRequest => write!(f, "raw"),
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|e| ProviderError::decode(method, e))
}

#[async_trait(?Send)]
pub trait WalletProvider {
    /// Raw EIP-1193 request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Resolves once the transaction is mined. No timeout.
    async fn wait_mined(&self, hash: B256) -> Result<(), ProviderError>;

    fn capability(&self) -> SendCapability {
        SendCapability::TypedSend
    }

    /// Prompting account request (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let v = self.request("eth_requestAccounts", json!([])).await?;
        decode("eth_requestAccounts", v)
    }

    /// Non-prompting; empty when the site is not yet authorized.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let v = self.request("eth_accounts", json!([])).await?;
        decode("eth_accounts", v)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let v: U64 = decode("eth_chainId", self.request("eth_chainId", json!([])).await?)?;
        Ok(v.to::<u64>())
    }

    async fn balance(&self, account: Address) -> Result<U256, ProviderError> {
        let v = self
            .request("eth_getBalance", json!([account, "latest"]))
            .await?;
        decode("eth_getBalance", v)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, ProviderError> {
        let v = self
            .request("eth_getTransactionCount", json!([account, "latest"]))
            .await?;
        let count: U64 = decode("eth_getTransactionCount", v)?;
        Ok(count.to::<u64>())
    }

    /// `None` while the wallet cannot resolve the hash (e.g. queued nonce gap).
    async fn transaction(&self, hash: B256) -> Result<Option<RpcTransaction>, ProviderError> {
        let v = self
            .request("eth_getTransactionByHash", json!([hash]))
            .await?;
        decode("eth_getTransactionByHash", v)
    }

    /// `gasPrice` plus EIP-1559 suggestions when the latest block has a base fee.
    async fn fee_data(&self) -> Result<FeeData, ProviderError> {
        let gas_price: U256 = decode("eth_gasPrice", self.request("eth_gasPrice", json!([])).await?)?;
        let block = self
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let base_fee = match block.get("baseFeePerGas") {
            Some(v) if !v.is_null() => Some(decode::<U256>("eth_getBlockByNumber", v.clone())?),
            _ => None,
        };

        let mut fees = FeeData {
            gas_price: Some(gas_price),
            ..FeeData::default()
        };
        if let Some(base_fee) = base_fee {
            let priority = U256::from(DEFAULT_PRIORITY_FEE_WEI);
            fees.max_priority_fee_per_gas = Some(priority);
            fees.max_fee_per_gas = Some(base_fee * U256::from(2u8) + priority);
        }
        Ok(fees)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        let v = self.request("eth_sendTransaction", json!([tx])).await?;
        decode("eth_sendTransaction", v)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": number_to_chain_id(chain_id) }]),
        )
        .await
        .map(|_| ())
    }

    async fn add_chain(&self, info: &ChainInfo) -> Result<(), ProviderError> {
        self.request("wallet_addEthereumChain", json!([info]))
            .await
            .map(|_| ())
    }
}
