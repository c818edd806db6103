//! Error types for wallet interaction and session flows
//!
//! Wallet failures arrive as [`ProviderError`] and are classified into an
//! [`ErrorKind`] before anything user-facing happens. EIP-1193 codes are
//! trusted first; providers that only return prose fall back to text matching.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// EIP-1193: the user rejected the request.
pub const CODE_USER_REJECTED: i64 = 4001;

/// Returned by wallets for `wallet_switchEthereumChain` when the chain is unknown.
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// An error reported by the wallet provider (or the transport in front of it).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Transport-level failure with no provider code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// The response could not be decoded into the expected shape.
    pub fn decode(method: &str, detail: impl fmt::Display) -> Self {
        Self::new(None, format!("invalid {method} response: {detail}"))
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::classify(self.code, &self.message)
    }

    /// The provider's own message, or `fallback` when it sent none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let msg = self.message.trim();
        if msg.is_empty() {
            fallback
        } else {
            msg
        }
    }
}

/// Best-effort classification of a wallet failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user declined in the wallet UI. Never a fault.
    UserRejected,
    /// The user dismissed an authorization prompt (some in-wallet browsers).
    Canceled,
    /// The wallet does not know the requested chain.
    UnrecognizedChain,
    Other,
}

impl ErrorKind {
    pub fn classify(code: Option<i64>, message: &str) -> Self {
        match code {
            Some(CODE_USER_REJECTED) => return ErrorKind::UserRejected,
            Some(CODE_UNRECOGNIZED_CHAIN) => return ErrorKind::UnrecognizedChain,
            _ => {}
        }

        let msg = message.to_ascii_lowercase();
        if msg.contains("rejected") || msg.contains("denied") {
            ErrorKind::UserRejected
        } else if msg.contains("user_canceled") {
            ErrorKind::Canceled
        } else if msg.contains("unrecognized chain") {
            ErrorKind::UnrecognizedChain
        } else {
            ErrorKind::Other
        }
    }
}

/// Per-field validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when no field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Wallet connection canceled by the user")]
    Canceled(#[source] ProviderError),

    #[error("Failed to connect: {0}")]
    Connect(#[source] ProviderError),

    #[error("Wallet returned no accounts")]
    NoAccounts,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("A transfer is already being sent")]
    Busy,

    #[error("Invalid transfer: {0}")]
    Invalid(FieldErrors),

    #[error("Fee retrieval failed: {0}")]
    FeeData(#[source] ProviderError),

    #[error("User rejected transaction")]
    Rejected(#[source] ProviderError),

    #[error("Send failed: {0}")]
    Send(#[source] ProviderError),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Network {0} is not in the registry")]
    UnknownNetwork(u64),

    #[error("Invalid network: {0}")]
    Invalid(FieldErrors),

    #[error("Wallet does not recognize chain {chain_id}")]
    Unrecognized {
        chain_id: u64,
        #[source]
        source: ProviderError,
    },

    #[error("User rejected the network request")]
    Rejected(#[source] ProviderError),

    #[error("Network request failed: {0}")]
    Provider(#[source] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_take_precedence_over_text() {
        assert_eq!(
            ErrorKind::classify(Some(4001), "something else"),
            ErrorKind::UserRejected
        );
        assert_eq!(
            ErrorKind::classify(Some(4902), "User rejected"),
            ErrorKind::UnrecognizedChain
        );
    }

    #[test]
    fn text_fallback_is_case_insensitive() {
        assert_eq!(
            ErrorKind::classify(None, "MetaMask Tx Signature: User denied transaction signature."),
            ErrorKind::UserRejected
        );
        assert_eq!(
            ErrorKind::classify(Some(-32000), "USER REJECTED the request"),
            ErrorKind::UserRejected
        );
        assert_eq!(
            ErrorKind::classify(None, "Unrecognized chain ID \"0xa65b1f\""),
            ErrorKind::UnrecognizedChain
        );
        assert_eq!(
            ErrorKind::classify(None, "user_canceled"),
            ErrorKind::Canceled
        );
        assert_eq!(
            ErrorKind::classify(None, "insufficient funds"),
            ErrorKind::Other
        );
    }

    #[test]
    fn message_or_falls_back_on_blank() {
        let e = ProviderError::new(Some(-32603), "  ");
        assert_eq!(e.message_or("fallback"), "fallback");
        let e = ProviderError::new(None, "boom");
        assert_eq!(e.message_or("fallback"), "boom");
    }

    #[test]
    fn field_errors_keep_first_message() {
        let mut errs = FieldErrors::new();
        errs.insert("to", "first");
        errs.insert("to", "second");
        errs.insert("amount", "required");
        assert_eq!(errs.get("to"), Some("first"));
        assert_eq!(errs.len(), 2);
        assert_eq!(errs.to_string(), "amount: required; to: first");
        assert!(errs.into_result(()).is_err());
    }
}
