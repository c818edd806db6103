//! Transfer submission, one implementation per [`SendCapability`]

use alloy_primitives::{Address, B256, U256, U64, U8};
use async_trait::async_trait;

use crate::constants::tx::{DEFAULT_GAS_LIMIT, EIP1559_TYPE};
use crate::error::ProviderError;
use crate::provider::{SendCapability, WalletProvider};
use crate::types::{FeeData, PendingTransaction, Transfer, TransactionRequest};

/// Result of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub hash: B256,
    pub pending: PendingTransaction,
}

#[async_trait(?Send)]
pub trait TransferSender {
    fn capability(&self) -> SendCapability;

    /// Build the wallet request for `transfer`.
    fn build_request(&self, from: Address, transfer: &Transfer, fees: &FeeData)
        -> TransactionRequest;

    async fn submit(
        &self,
        provider: &dyn WalletProvider,
        from: Address,
        transfer: &Transfer,
        fees: &FeeData,
    ) -> Result<Submission, ProviderError> {
        let request = self.build_request(from, transfer, fees);
        log::debug!(
            "eth_sendTransaction via {} (nonce {})",
            self.capability(),
            transfer.nonce
        );
        let hash = provider.send_transaction(&request).await?;
        let pending = resolve_pending(provider, from, transfer, fees, hash).await;
        Ok(Submission { hash, pending })
    }
}

/// Standard EIP-1559 send; the wallet fills fees and gas and may override the nonce.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypedSender;

impl TransferSender for TypedSender {
    fn capability(&self) -> SendCapability {
        SendCapability::TypedSend
    }

    fn build_request(&self, from: Address, transfer: &Transfer, _fees: &FeeData) -> TransactionRequest {
        TransactionRequest {
            from,
            to: transfer.to,
            value: transfer.value,
            nonce: U64::from(transfer.nonce),
            tx_type: Some(U8::from(EIP1559_TYPE)),
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            gas_limit: None,
        }
    }
}

/// Fully assembled request: explicit nonce, fees and a fixed transfer gas limit.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRequestSender;

impl TransferSender for RawRequestSender {
    fn capability(&self) -> SendCapability {
        SendCapability::RawRequest
    }

    fn build_request(&self, from: Address, transfer: &Transfer, fees: &FeeData) -> TransactionRequest {
        let (max_fee, priority) = fees.eip1559_fees().unzip();
        TransactionRequest {
            from,
            to: transfer.to,
            value: transfer.value,
            nonce: U64::from(transfer.nonce),
            tx_type: None,
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: priority,
            gas_limit: Some(U256::from(DEFAULT_GAS_LIMIT)),
        }
    }
}

pub fn sender_for(capability: SendCapability) -> Box<dyn TransferSender> {
    match capability {
        SendCapability::TypedSend => Box::new(TypedSender),
        SendCapability::RawRequest => Box::new(RawRequestSender),
    }
}

/// Prefer the wallet's own transaction object; synthesize one from the payload
/// when it cannot be resolved yet.
async fn resolve_pending(
    provider: &dyn WalletProvider,
    from: Address,
    transfer: &Transfer,
    fees: &FeeData,
    hash: B256,
) -> PendingTransaction {
    match provider.transaction(hash).await {
        Ok(Some(tx)) => PendingTransaction::from_rpc(tx, transfer.to),
        Ok(None) => {
            log::info!("transaction {hash} not yet visible; tracking submitted payload");
            PendingTransaction::synthesized(from, transfer, fees, DEFAULT_GAS_LIMIT, hash)
        }
        Err(e) => {
            log::warn!("eth_getTransactionByHash({hash}) failed: {e}; tracking submitted payload");
            PendingTransaction::synthesized(from, transfer, fees, DEFAULT_GAS_LIMIT, hash)
        }
    }
}
