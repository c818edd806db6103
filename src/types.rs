use alloy_primitives::{Address, B256, U256, U64, U8};
use serde::{Deserialize, Serialize};

use crate::constants::tx::DEFAULT_BALANCE_DIGITS;
use crate::util_text::{format_address, format_balance, number_to_chain_id, parse_chain_id};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub symbol: String,
    pub decimals: u8,
}

/// A known network, as kept in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainDescriptor {
    /// Wire form for `wallet_addEthereumChain` (hex chain id).
    pub fn to_chain_info(&self) -> ChainInfo {
        ChainInfo {
            chain_id: number_to_chain_id(self.chain_id),
            chain_name: self.chain_name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: self.block_explorer_urls.clone(),
        }
    }
}

/// Chain descriptor as the wallet expects it: `chainId` is a `0x` hex string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl TryFrom<ChainInfo> for ChainDescriptor {
    type Error = String;

    fn try_from(info: ChainInfo) -> Result<Self, Self::Error> {
        let chain_id = parse_chain_id(&info.chain_id)
            .ok_or_else(|| format!("invalid chain id '{}'", info.chain_id))?;
        Ok(ChainDescriptor {
            chain_id,
            chain_name: info.chain_name,
            native_currency: info.native_currency,
            rpc_urls: info.rpc_urls,
            block_explorer_urls: info.block_explorer_urls,
        })
    }
}

/// Transfer form input, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub network: String,
    pub to: String,
    pub amount: String,
    pub nonce: String,
}

/// A transfer that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub chain_id: Option<u64>,
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
}

/// Add-network form input, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNetworkPayload {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: String,
    pub currency_symbol: String,
    pub currency_decimals: String,
    #[serde(default)]
    pub block_explore_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub gas_price: Option<U256>,
}

impl FeeData {
    /// `(maxFeePerGas, maxPriorityFeePerGas)`, falling back to the legacy gas
    /// price on chains without a base fee.
    pub fn eip1559_fees(&self) -> Option<(U256, U256)> {
        match (self.max_fee_per_gas, self.max_priority_fee_per_gas) {
            (Some(max), Some(prio)) => Some((max, prio)),
            _ => self.gas_price.map(|p| (p, p)),
        }
    }
}

/// Body of an `eth_sendTransaction` request. Quantities serialize as hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: U64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<U8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
}

/// Transaction object returned by `eth_getTransactionByHash`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: U64,
    pub gas: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOrigin {
    /// Normalized from the wallet's own transaction object.
    Provider,
    /// Built from the submitted payload because the wallet could not resolve
    /// the hash yet (queued out-of-order nonces, some in-wallet browsers).
    Synthesized,
}

/// A submitted transfer that has not been reported as mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub gas_limit: U256,
    pub hash: Option<B256>,
    pub origin: TxOrigin,
}

impl PendingTransaction {
    pub fn from_rpc(tx: RpcTransaction, requested_to: Address) -> Self {
        let legacy = tx.gas_price.unwrap_or_default();
        Self {
            from: tx.from,
            to: tx.to.unwrap_or(requested_to),
            value: tx.value,
            nonce: tx.nonce.to::<u64>(),
            max_fee_per_gas: tx.max_fee_per_gas.unwrap_or(legacy),
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas.unwrap_or(legacy),
            gas_limit: tx.gas,
            hash: Some(tx.hash),
            origin: TxOrigin::Provider,
        }
    }

    pub fn synthesized(
        from: Address,
        transfer: &Transfer,
        fees: &FeeData,
        gas_limit: u64,
        hash: B256,
    ) -> Self {
        let (max_fee, prio) = fees.eip1559_fees().unwrap_or_default();
        Self {
            from,
            to: transfer.to,
            value: transfer.value,
            nonce: transfer.nonce,
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: prio,
            gas_limit: U256::from(gas_limit),
            hash: Some(hash),
            origin: TxOrigin::Synthesized,
        }
    }

    /// Display rows for the pending list.
    pub fn summary(&self) -> TxSummary {
        TxSummary {
            nonce: self.nonce.to_string(),
            to: format_address(&self.to.to_checksum(None)),
            amount: format_balance(self.value, DEFAULT_BALANCE_DIGITS),
            gas_limit: self.gas_limit.to_string(),
            hash: self
                .hash
                .map(|h| format_address(&h.to_string()))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxSummary {
    pub nonce: String,
    pub to: String,
    pub amount: String,
    pub gas_limit: String,
    pub hash: String,
}

/// Events delivered back to the session from detached wallet watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TxMined { hash: B256 },
    WatchFailed { hash: B256, message: String },
}
